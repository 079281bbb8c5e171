//! Outcome Module
//!
//! Maps the raw result of a read-family or write-family call onto a small
//! closed taxonomy. `EINTR` is not an outcome: the call is expected to be
//! retried, so classification yields `None` and nothing is recorded.

use std::io;

/// Result of a read-family call (`read`, `readv`, `recv`, `recvmsg`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadOutcome {
    /// `EAGAIN`/`EWOULDBLOCK`: the descriptor had nothing to offer
    NothingToRead,
    /// At least one byte was read
    ReadSuccessfully,
    /// Zero bytes: peer closed or end of file
    EndOfFile,
    /// Any other failure
    Error,
}

impl ReadOutcome {
    /// Whether this outcome consumes input readiness
    pub fn is_activity(self) -> bool {
        !matches!(self, ReadOutcome::NothingToRead)
    }
}

/// Result of a write-family call (`write`, `writev`, `send`, `sendmsg`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOutcome {
    /// `EAGAIN`/`EWOULDBLOCK`: the send buffer is full
    WriteBufFull,
    /// The call returned a non-negative count
    WroteSuccessfully,
    /// Any other failure
    Error,
}

impl WriteOutcome {
    /// Whether this outcome consumes output readiness
    pub fn is_activity(self) -> bool {
        !matches!(self, WriteOutcome::WriteBufFull)
    }
}

/// Classify the return value of a read-family call
///
/// # Arguments
///
/// * `result` - the value returned by the call
/// * `errno` - `errno` as observed right after the call; ignored unless
///   `result` is negative
///
/// # Returns
///
/// The outcome, or `None` when the call was interrupted
pub fn classify_read(result: isize, errno: i32) -> Option<ReadOutcome> {
    if result > 0 {
        return Some(ReadOutcome::ReadSuccessfully);
    }
    if result == 0 {
        return Some(ReadOutcome::EndOfFile);
    }
    match io::Error::from_raw_os_error(errno).kind() {
        io::ErrorKind::WouldBlock => Some(ReadOutcome::NothingToRead),
        io::ErrorKind::Interrupted => None,
        _ => Some(ReadOutcome::Error),
    }
}

/// Classify the return value of a write-family call
///
/// Same contract as [`classify_read`]; a zero-length write is a success.
pub fn classify_write(result: isize, errno: i32) -> Option<WriteOutcome> {
    if result >= 0 {
        return Some(WriteOutcome::WroteSuccessfully);
    }
    match io::Error::from_raw_os_error(errno).kind() {
        io::ErrorKind::WouldBlock => Some(WriteOutcome::WriteBufFull),
        io::ErrorKind::Interrupted => None,
        _ => Some(WriteOutcome::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_read() {
        assert_eq!(classify_read(1, 0), Some(ReadOutcome::ReadSuccessfully));
        assert_eq!(classify_read(4096, libc::EAGAIN), Some(ReadOutcome::ReadSuccessfully));
        assert_eq!(classify_read(0, 0), Some(ReadOutcome::EndOfFile));
        assert_eq!(classify_read(-1, libc::EAGAIN), Some(ReadOutcome::NothingToRead));
        assert_eq!(classify_read(-1, libc::EWOULDBLOCK), Some(ReadOutcome::NothingToRead));
        assert_eq!(classify_read(-1, libc::EINTR), None);
        assert_eq!(classify_read(-1, libc::ECONNRESET), Some(ReadOutcome::Error));
        assert_eq!(classify_read(-1, libc::EBADF), Some(ReadOutcome::Error));
    }

    #[test]
    fn test_classify_write() {
        assert_eq!(classify_write(0, 0), Some(WriteOutcome::WroteSuccessfully));
        assert_eq!(classify_write(12, 0), Some(WriteOutcome::WroteSuccessfully));
        assert_eq!(classify_write(-1, libc::EAGAIN), Some(WriteOutcome::WriteBufFull));
        assert_eq!(classify_write(-1, libc::EINTR), None);
        assert_eq!(classify_write(-1, libc::EPIPE), Some(WriteOutcome::Error));
    }

    #[test]
    fn test_activity() {
        assert!(!ReadOutcome::NothingToRead.is_activity());
        assert!(ReadOutcome::ReadSuccessfully.is_activity());
        assert!(ReadOutcome::EndOfFile.is_activity());
        assert!(ReadOutcome::Error.is_activity());

        assert!(!WriteOutcome::WriteBufFull.is_activity());
        assert!(WriteOutcome::WroteSuccessfully.is_activity());
        assert!(WriteOutcome::Error.is_activity());
    }
}
