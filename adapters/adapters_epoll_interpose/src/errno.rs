//! errno Module
//!
//! Hooks run after the real call and may clobber `errno`; the exported
//! wrappers save it before observing and restore it before returning.

use libc::c_int;

unsafe fn location() -> *mut c_int {
    libc::__errno_location()
}

/// Current thread's `errno`
pub fn get() -> c_int {
    // SAFETY: the errno location is valid for the lifetime of the thread
    unsafe { *location() }
}

/// Overwrite the current thread's `errno`
pub fn set(value: c_int) {
    // SAFETY: see `get`
    unsafe { *location() = value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let saved = get();
        set(libc::EAGAIN);
        assert_eq!(get(), libc::EAGAIN);
        set(saved);
        assert_eq!(get(), saved);
    }
}
