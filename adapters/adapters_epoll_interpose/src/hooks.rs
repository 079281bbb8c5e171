//! Hooks Module
//!
//! Glue between the exported wrappers and the tracking engine. The wrappers
//! hand over raw return values; this module classifies them, applies them
//! to the engine and reports what the engine found.
//!
//! Nothing in here may disturb the intercepted call: engine errors are
//! logged, panics are caught at the hook boundary, and only strict mode
//! turns a contract violation into an abort.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use entities_epoll_state::{classify_read, classify_write, CtlOp, Epfd, Fd, Interest};
use usecases_epoll_tracking::{
    DiagnosticSink, LogSink, ReadyEvent, RecordingSink, SharedEngine, TrackingEngine, TrackingError,
};

use crate::config::CheckerConfig;

/// The registration passed to `epoll_ctl`, when one was passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtlEvent {
    pub events: Interest,
    pub token: u64,
}

/// Tracking state of one process
#[derive(Debug)]
pub struct Checker {
    config: CheckerConfig,
    engine: SharedEngine<RecordingSink>,
}

impl Checker {
    pub fn new(config: CheckerConfig) -> Self {
        Self {
            config,
            engine: SharedEngine::new(TrackingEngine::with_sink(RecordingSink::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.disabled
    }

    /// `epoll_create`/`epoll_create1` returned `ret`
    pub fn after_epoll_create(&self, ret: Epfd) {
        self.run("epoll_create", |engine| {
            engine.on_epoll_create(ret);
            Ok(())
        });
    }

    /// `epoll_ctl(epfd, op, fd, event)` returned `ret`
    ///
    /// Failed calls and unknown operations change nothing.
    pub fn after_epoll_ctl(&self, epfd: Epfd, op: i32, fd: Fd, event: Option<CtlEvent>, ret: i32) {
        if ret != 0 {
            return;
        }
        let Some(op) = CtlOp::from_raw(op) else {
            return;
        };

        self.run("epoll_ctl", |engine| match (op, event) {
            (CtlOp::Add, Some(event)) => {
                engine.on_add_event(epfd, fd, event.events)?;
                engine.bind_token(epfd, fd, event.token)
            }
            (CtlOp::Mod, Some(event)) => {
                engine.on_mod_event(epfd, fd, event.events)?;
                engine.bind_token(epfd, fd, event.token)
            }
            (CtlOp::Del, _) => engine.on_erase_event(epfd, fd),
            // ADD and MOD with a null event fail with EFAULT
            (CtlOp::Add | CtlOp::Mod, None) => Ok(()),
        });
    }

    /// `epoll_wait(epfd, ..)` filled `ready`
    pub fn after_epoll_wait(&self, epfd: Epfd, ready: &[ReadyEvent]) {
        if ready.is_empty() {
            return;
        }
        self.run("epoll_wait", |engine| {
            engine.on_wait(epfd, ready);
            Ok(())
        });
    }

    /// `close(fd)` returned `ret`
    pub fn after_close(&self, fd: Fd, ret: i32) {
        if ret != 0 {
            return;
        }
        self.run("close", |engine| {
            engine.on_close(fd);
            Ok(())
        });
    }

    /// A read-family call on `fd` returned `ret` with `errno`
    pub fn after_read(&self, fd: Fd, ret: isize, errno: i32) {
        let Some(outcome) = classify_read(ret, errno) else {
            return;
        };
        self.run("read", |engine| {
            engine.on_read(fd, outcome);
            Ok(())
        });
    }

    /// A write-family call on `fd` returned `ret` with `errno`
    pub fn after_write(&self, fd: Fd, ret: isize, errno: i32) {
        let Some(outcome) = classify_write(ret, errno) else {
            return;
        };
        self.run("write", |engine| {
            engine.on_write(fd, outcome);
            Ok(())
        });
    }

    /// Run `f` on the engine, then report its diagnostics outside the lock
    fn run<F>(&self, hook: &str, f: F)
    where
        F: FnOnce(&mut TrackingEngine<RecordingSink>) -> Result<(), TrackingError>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.engine.with(|engine| {
                let result = f(engine);
                (result, engine.sink_mut().take())
            })
        }));

        match outcome {
            Ok((result, diagnostics)) => {
                let mut sink = LogSink;
                for diagnostic in diagnostics {
                    sink.report(diagnostic);
                }
                if let Err(e) = result {
                    self.contract_violation(hook, &e);
                }
            }
            Err(payload) => {
                log::error!("something went really wrong in {}: {}", hook, panic_message(&*payload));
            }
        }
    }

    fn contract_violation(&self, hook: &str, error: &TrackingError) {
        log::error!("{}: {}", hook, error);
        if self.config.strict {
            log::error!("aborting ({} is set)", crate::config::STRICT_VAR);
            std::process::abort();
        }
    }

    /// Run `f` against the engine; used by tests to inspect shadow state
    pub fn inspect<R>(&self, f: impl FnOnce(&TrackingEngine<RecordingSink>) -> R) -> R {
        self.engine.with(|engine| f(&*engine))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

static CHECKER: OnceLock<Checker> = OnceLock::new();
static INIT_FAILED: AtomicBool = AtomicBool::new(false);

/// The process-wide checker, created on first use
///
/// Creation reads [`CheckerConfig::from_env`] and installs the stderr
/// logger unless the host program installed one already. If creation
/// panics, `None` is returned from then on and nothing is tracked.
pub fn checker() -> Option<&'static Checker> {
    get_or_create(&CHECKER, &INIT_FAILED, || {
        let config = CheckerConfig::from_env();
        init_logger(&config);
        log::debug!("epoll checker loaded: {:?}", config);
        Checker::new(config)
    })
}

fn get_or_create<'a>(
    cell: &'a OnceLock<Checker>,
    failed: &AtomicBool,
    create: impl FnOnce() -> Checker,
) -> Option<&'a Checker> {
    if let Some(checker) = cell.get() {
        return Some(checker);
    }
    if failed.load(Ordering::Acquire) {
        return None;
    }
    match panic::catch_unwind(AssertUnwindSafe(|| cell.get_or_init(create))) {
        Ok(checker) => Some(checker),
        Err(_) => {
            failed.store(true, Ordering::Release);
            None
        }
    }
}

fn init_logger(config: &CheckerConfig) {
    let _ = env_logger::Builder::new()
        .parse_filters(&config.log_filter)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init();
}
