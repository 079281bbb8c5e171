//! Entities Layer: epoll Descriptor State
//!
//! Provides the value types shared by every layer of the epoll checker:
//! the per-registration descriptor state, the decoding of the event bitset
//! passed to `epoll_ctl`, and the classification of raw read/write results.
//!
//! ## Overview
//!
//! The `entities_epoll_state` crate is the innermost layer of the checker.
//! It does no I/O; its only dependency is `bitflags`. Everything here is a plain value:
//! the tracking engine in `usecases_epoll_tracking` builds its shadow model
//! out of these types, and the interposer in `adapters_epoll_interpose`
//! uses the classification functions to turn syscall results into outcomes.
//!
//! ## Modules
//!
//! - **[`interest`](interest/index.html)**: `epoll_event.events` bits and
//!   `epoll_ctl` operations
//! - **[`descriptor_state`](descriptor_state/index.html)**: monitoring and
//!   activity flags of one (instance, descriptor) pair
//! - **[`outcome`](outcome/index.html)**: read/write outcome taxonomy and
//!   classification of raw results
//!
//! ## Usage
//!
//! ```rust
//! use entities_epoll_state::{classify_read, DescriptorState, Interest, ReadOutcome};
//!
//! let state = DescriptorState::from_events(Interest::EPOLLIN);
//! assert!(state.in_monitored());
//!
//! assert_eq!(classify_read(16, 0), Some(ReadOutcome::ReadSuccessfully));
//! ```
//!
//! ## See Also
//!
//! - [`usecases_epoll_tracking`](../usecases_epoll_tracking/index.html): the tracking engine

pub mod descriptor_state;
pub mod interest;
pub mod outcome;

pub use descriptor_state::DescriptorState;
pub use interest::{CtlOp, Interest};
pub use outcome::{classify_read, classify_write, ReadOutcome, WriteOutcome};

/// Handle of an epoll instance (the descriptor returned by `epoll_create`)
pub type Epfd = i32;

/// Any file descriptor
pub type Fd = i32;
