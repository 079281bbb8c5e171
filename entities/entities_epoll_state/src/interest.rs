//! Interest Module
//!
//! Decoding of the `events` bitset of `struct epoll_event` and of the
//! `op` argument of `epoll_ctl`. Values match `<sys/epoll.h>` on Linux.

use bitflags::bitflags;

bitflags! {
    /// The `events` field of an `epoll_event`, as registered or as reported
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Interest: u32 {
        const EPOLLIN = 0x001;
        const EPOLLPRI = 0x002;
        const EPOLLOUT = 0x004;
        const EPOLLERR = 0x008;
        const EPOLLHUP = 0x010;
        const EPOLLRDHUP = 0x2000;
        const EPOLLEXCLUSIVE = 1 << 28;
        const EPOLLWAKEUP = 1 << 29;
        const EPOLLONESHOT = 1 << 30;
        const EPOLLET = 1 << 31;
    }
}

impl Interest {
    /// Registered (or reported) for input: `EPOLLIN` or `EPOLLPRI`
    pub const fn is_readable(self) -> bool {
        self.intersects(Self::EPOLLIN.union(Self::EPOLLPRI))
    }

    /// Registered (or reported) for output
    pub const fn is_writable(self) -> bool {
        self.contains(Self::EPOLLOUT)
    }

    pub const fn is_edge_triggered(self) -> bool {
        self.contains(Self::EPOLLET)
    }

    pub const fn is_one_shot(self) -> bool {
        self.contains(Self::EPOLLONESHOT)
    }
}

/// `epoll_ctl` operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtlOp {
    /// `EPOLL_CTL_ADD`
    Add,
    /// `EPOLL_CTL_DEL`
    Del,
    /// `EPOLL_CTL_MOD`
    Mod,
}

impl CtlOp {
    /// Decode the raw `op` argument; `None` for values the kernel would reject
    pub fn from_raw(op: i32) -> Option<Self> {
        match op {
            1 => Some(CtlOp::Add),
            2 => Some(CtlOp::Del),
            3 => Some(CtlOp::Mod),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_match_libc() {
        assert_eq!(Interest::EPOLLIN.bits(), libc::EPOLLIN as u32);
        assert_eq!(Interest::EPOLLPRI.bits(), libc::EPOLLPRI as u32);
        assert_eq!(Interest::EPOLLOUT.bits(), libc::EPOLLOUT as u32);
        assert_eq!(Interest::EPOLLRDHUP.bits(), libc::EPOLLRDHUP as u32);
        assert_eq!(Interest::EPOLLONESHOT.bits(), libc::EPOLLONESHOT as u32);
        assert_eq!(Interest::EPOLLET.bits(), libc::EPOLLET as u32);
    }

    #[test]
    fn test_ctl_op_matches_libc() {
        assert_eq!(CtlOp::from_raw(libc::EPOLL_CTL_ADD), Some(CtlOp::Add));
        assert_eq!(CtlOp::from_raw(libc::EPOLL_CTL_DEL), Some(CtlOp::Del));
        assert_eq!(CtlOp::from_raw(libc::EPOLL_CTL_MOD), Some(CtlOp::Mod));
        assert_eq!(CtlOp::from_raw(0), None);
        assert_eq!(CtlOp::from_raw(42), None);
    }

    #[test]
    fn test_priority_input_counts_as_readable() {
        assert!(Interest::EPOLLPRI.is_readable());
        assert!(Interest::EPOLLIN.is_readable());
        assert!(!Interest::EPOLLOUT.is_readable());
        assert!(!Interest::EPOLLRDHUP.is_readable());
    }

    #[test]
    fn test_modes() {
        let interest = Interest::EPOLLIN | Interest::EPOLLET | Interest::EPOLLONESHOT;
        assert!(interest.is_edge_triggered());
        assert!(interest.is_one_shot());
        assert!(!interest.is_writable());
    }

    #[test]
    fn test_unknown_bits_are_retained() {
        let interest = Interest::from_bits_retain(0x100 | libc::EPOLLIN as u32);
        assert!(interest.is_readable());
        assert_eq!(interest.bits(), 0x101);
        assert!(Interest::from_bits(0x100).is_none());
    }

    #[test]
    fn test_debug_lists_flags() {
        let rendered = format!("{:?}", Interest::EPOLLIN | Interest::EPOLLOUT);
        assert!(rendered.contains("EPOLLIN"), "{}", rendered);
        assert!(rendered.contains("EPOLLOUT"), "{}", rendered);
    }
}
