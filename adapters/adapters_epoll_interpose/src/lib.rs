//! Adapters Layer: epoll Interposition
//!
//! Builds `libepoll_checker.so`, a library meant to be injected with
//! `LD_PRELOAD`. It shadows the libc functions that create, configure and
//! wait on epoll instances, plus `close` and the read/write families, and
//! reports every completed call to the tracking engine.
//!
//! ```text
//! LD_PRELOAD=target/release/libepoll_checker.so ./server
//! ```
//!
//! ## Overview
//!
//! The `adapters_epoll_interpose` crate is the only place where the checker
//! touches the outside world. Each exported wrapper:
//!
//! 1. calls the original implementation, found with `dlsym(RTLD_NEXT, ..)`
//! 2. hands the return value and `errno` to the process-wide [`hooks::Checker`]
//! 3. restores `errno` and returns the original result
//!
//! The checker serializes the engine behind one mutex and logs diagnostics
//! to stderr through `env_logger`, configured from the environment (see
//! [`config`]).
//!
//! ## Modules
//!
//! - **[`config`](config/index.html)**: environment configuration
//! - **[`hooks`](hooks/index.html)**: classification and engine dispatch
//! - **[`guard`](guard/index.html)**: thread-local reentrancy guard
//! - **[`symbols`](symbols/index.html)**: lazily resolved original functions
//! - **[`errno`](errno/index.html)**: saving and restoring `errno`
//!
//! The exported symbols themselves are behind the `preload` feature and are
//! never compiled into this crate's unit tests.
//!
//! ## See Also
//!
//! - [`usecases_epoll_tracking`](../usecases_epoll_tracking/index.html): the tracking engine
//! - [`frameworks_epoll_demo`](../frameworks_epoll_demo/index.html): programs to run under the checker

pub mod config;
pub mod guard;
pub mod hooks;

#[cfg(target_os = "linux")]
pub mod errno;
#[cfg(target_os = "linux")]
pub mod symbols;

#[cfg(all(target_os = "linux", feature = "preload", not(test)))]
mod exports;

pub use config::CheckerConfig;
pub use hooks::{checker, Checker, CtlEvent};
