//! Shared Engine Module
//!
//! A [`TrackingEngine`] behind one mutex, for callers on several threads.
//!
//! Every hook runs with the whole engine locked, so hooks for one
//! descriptor are applied in the order their callers acquired the lock,
//! which is the order in which the real calls completed on that thread.

use std::sync::{Mutex, PoisonError};

use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::engine::TrackingEngine;

/// A tracking engine serialized by a mutex
#[derive(Debug)]
pub struct SharedEngine<S: DiagnosticSink = LogSink> {
    engine: Mutex<TrackingEngine<S>>,
    verify: bool,
}

impl<S: DiagnosticSink> SharedEngine<S> {
    pub fn new(engine: TrackingEngine<S>) -> Self {
        Self {
            engine: Mutex::new(engine),
            verify: false,
        }
    }

    /// Like [`Self::new`], but run [`TrackingEngine::check_consistency`]
    /// after every call to [`Self::with`]
    ///
    /// The check walks the whole engine; meant for tests.
    pub fn with_verification(engine: TrackingEngine<S>) -> Self {
        Self {
            engine: Mutex::new(engine),
            verify: true,
        }
    }

    pub fn verifies(&self) -> bool {
        self.verify
    }

    /// Run `f` with exclusive access to the engine
    ///
    /// A panic inside a previous call does not make the engine unusable:
    /// hooks validate before they mutate, so the state behind a poisoned
    /// lock is still a state some sequence of hooks produced.
    pub fn with<R>(&self, f: impl FnOnce(&mut TrackingEngine<S>) -> R) -> R {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut engine);

        if self.verify {
            if let Err(e) = engine.check_consistency() {
                log::error!("{}", e);
            }
        }

        result
    }

    pub fn into_inner(self) -> TrackingEngine<S> {
        self.engine.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SharedEngine<LogSink> {
    fn default() -> Self {
        Self::new(TrackingEngine::new())
    }
}
