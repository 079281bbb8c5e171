//! Diagnostics Module
//!
//! Structured records of detected inconsistencies and the sinks that
//! receive them. A diagnostic never changes what the observed program does;
//! it is only reported.

use std::fmt;

use entities_epoll_state::{Epfd, Fd};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Suspicious bookkeeping, likely harmless for the program
    Warning,
    /// Readiness that the program lost track of
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// `epoll_create` returned a handle that is already tracked
    DuplicateInstance,
    /// Input monitoring was removed before any input was consumed
    UndrainedRead,
    /// Output monitoring was removed before anything was written
    UndrainedWrite,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::DuplicateInstance => Severity::Warning,
            DiagnosticKind::UndrainedRead | DiagnosticKind::UndrainedWrite => Severity::Error,
        }
    }
}

/// One detected inconsistency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub handle: Option<Epfd>,
    pub fd: Option<Fd>,
    pub message: String,
}

impl Diagnostic {
    pub fn duplicate_instance(handle: Epfd) -> Self {
        Self::new(
            DiagnosticKind::DuplicateInstance,
            Some(handle),
            None,
            format!("epoll instance {} is registered already", handle),
        )
    }

    pub fn undrained_read(handle: Epfd, fd: Fd) -> Self {
        Self::new(
            DiagnosticKind::UndrainedRead,
            Some(handle),
            Some(fd),
            format!(
                "fd {} was monitored for input by epoll instance {}, never had its input consumed \
                 and is no longer monitored for input",
                fd, handle
            ),
        )
    }

    pub fn undrained_write(handle: Epfd, fd: Fd) -> Self {
        Self::new(
            DiagnosticKind::UndrainedWrite,
            Some(handle),
            Some(fd),
            format!(
                "fd {} was monitored for output by epoll instance {}, never had anything written \
                 and is no longer monitored for output",
                fd, handle
            ),
        )
    }

    /// Note that the registration was edge-triggered: the readiness that
    /// was lost will not be reported again
    #[must_use]
    pub fn on_edge_triggered(mut self) -> Self {
        self.message.push_str(" (edge-triggered: pending readiness is not reported again)");
        self
    }

    fn new(kind: DiagnosticKind, handle: Option<Epfd>, fd: Option<Fd>, message: String) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            handle,
            fd,
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Receiver of diagnostics
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Writes every diagnostic through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log::warn!(target: "epoll_checker", "{}", diagnostic.message),
            Severity::Error => log::error!(target: "epoll_checker", "{}", diagnostic.message),
        }
    }
}

/// Keeps every diagnostic in memory, in report order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    diagnostics: Vec<Diagnostic>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of recorded diagnostics of `kind`
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    /// Remove and return everything recorded so far
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
