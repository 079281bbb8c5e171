//! Frameworks Layer: epoll Demo Programs
//!
//! Small programs that make real epoll calls, meant to be run with the
//! checker preloaded:
//!
//! ```text
//! LD_PRELOAD=target/release/libepoll_checker.so target/release/epoll-demo undrained-rearm
//! ```
//!
//! ## Modules
//!
//! - **[`args`](args/index.html)**: command-line parsing
//! - **[`scenarios`](scenarios/index.html)**: the call sequences, one per subcommand
//!
//! This crate does not link the checker; it only produces the calls the
//! checker observes.

pub mod args;
pub mod scenarios;

pub use args::{DemoArgs, Scenario};
pub use scenarios::{run, DemoError, ScenarioReport};
