//! Error Module
//!
//! Contract violations by the caller of the tracking engine. None of these
//! come from the observed program; they mean the interception layer reported
//! a sequence the kernel could not have produced.

use entities_epoll_state::{Epfd, Fd};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("epoll instance {handle} is not tracked")]
    UnknownInstance { handle: Epfd },

    #[error("fd {fd} is not registered with epoll instance {handle}")]
    UnknownDescriptor { handle: Epfd, fd: Fd },

    #[error("registration index out of sync for fd {fd} and epoll instance {handle}")]
    IndexOutOfSync { handle: Epfd, fd: Fd },
}
