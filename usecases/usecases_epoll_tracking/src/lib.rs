//! Use Cases Layer: epoll Tracking
//!
//! Mirrors, in a shadow data structure, every epoll instance of the process,
//! every descriptor registered with it and every read/write/close performed on
//! those descriptors, and reports registrations whose readiness was never
//! consumed before the registration changed.
//!
//! ## Overview
//!
//! The interception layer calls one hook per intercepted primitive, after the
//! real call has completed:
//!
//! | Hook | Called after |
//! |---|---|
//! | [`TrackingEngine::on_epoll_create`] | `epoll_create`, `epoll_create1` |
//! | [`TrackingEngine::on_add_event`] | successful `EPOLL_CTL_ADD` |
//! | [`TrackingEngine::on_mod_event`] | successful `EPOLL_CTL_MOD` |
//! | [`TrackingEngine::on_erase_event`] | successful `EPOLL_CTL_DEL` |
//! | [`TrackingEngine::on_wait`] | `epoll_wait` reporting events |
//! | [`TrackingEngine::on_read`] | any read-family call |
//! | [`TrackingEngine::on_write`] | any write-family call |
//! | [`TrackingEngine::on_close`] | successful `close` |
//!
//! Inconsistencies are reported as [`Diagnostic`] values to a
//! [`DiagnosticSink`]. Misuse by the caller (e.g. modifying a registration
//! that was never added) is a [`TrackingError`] and leaves the state untouched.
//!
//! ## Modules
//!
//! - **[`engine`](engine/index.html)**: the tracking engine
//! - **[`diagnostics`](diagnostics/index.html)**: diagnostic records and sinks
//! - **[`shared`](shared/index.html)**: a mutex-guarded engine for multi-threaded callers
//! - **[`error`](error/index.html)**: contract violations
//!
//! ## Usage
//!
//! ```rust
//! use entities_epoll_state::{Interest, ReadOutcome};
//! use usecases_epoll_tracking::{RecordingSink, TrackingEngine};
//!
//! let mut engine = TrackingEngine::with_sink(RecordingSink::new());
//! engine.on_epoll_create(3);
//! engine.on_add_event(3, 5, Interest::EPOLLIN).unwrap();
//! engine.on_read(5, ReadOutcome::NothingToRead);
//! engine.on_mod_event(3, 5, Interest::EPOLLOUT).unwrap();
//! assert_eq!(engine.sink().len(), 1);
//! ```

pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod shared;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, LogSink, RecordingSink, Severity};
pub use engine::{ReadyEvent, TrackingEngine};
pub use error::TrackingError;
pub use shared::SharedEngine;
