//! Original Symbols Module
//!
//! Resolves the implementations that the exported wrappers shadow, using
//! `dlsym(RTLD_NEXT, ..)`: the next definition in library search order after
//! this one, normally libc's. Each symbol is resolved on first use and cached.
//!
//! A symbol that cannot be resolved is fatal. The wrapper has nothing to
//! forward to, and returning an error would change the observed program's
//! behavior.

use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use libc::{c_int, iovec, msghdr, size_t, ssize_t};

fn resolve(slot: &AtomicPtr<c_void>, name: &'static str) -> *mut c_void {
    let cached = slot.load(Ordering::Acquire);
    if !cached.is_null() {
        return cached;
    }

    debug_assert!(name.ends_with('\0'));
    // SAFETY: `name` is NUL-terminated; RTLD_NEXT is a valid pseudo-handle
    let address = unsafe { libc::dlsym(libc::RTLD_NEXT, name.as_ptr().cast()) };
    if address.is_null() {
        missing(name);
    }
    slot.store(address, Ordering::Release);
    address
}

fn missing(name: &str) -> ! {
    let message = format!(
        "epoll_checker: failed to find next symbol {}\n",
        name.trim_end_matches('\0')
    );
    // Raw syscall: `write` itself may be the symbol that is missing
    unsafe {
        libc::syscall(
            libc::SYS_write,
            libc::STDERR_FILENO,
            message.as_ptr(),
            message.len(),
        );
        libc::abort()
    }
}

macro_rules! original {
    ($(#[$doc:meta])* $name:ident, fn($($arg:ty),*) -> $ret:ty) => {
        $(#[$doc])*
        pub fn $name() -> unsafe extern "C" fn($($arg),*) -> $ret {
            static SLOT: AtomicPtr<c_void> = AtomicPtr::new(ptr::null_mut());
            let address = resolve(&SLOT, concat!(stringify!($name), "\0"));
            // SAFETY: the symbol has this C signature in libc
            unsafe {
                std::mem::transmute::<*mut c_void, unsafe extern "C" fn($($arg),*) -> $ret>(address)
            }
        }
    };
}

original!(epoll_create, fn(c_int) -> c_int);
original!(epoll_create1, fn(c_int) -> c_int);
original!(epoll_ctl, fn(c_int, c_int, c_int, *mut libc::epoll_event) -> c_int);
original!(epoll_wait, fn(c_int, *mut libc::epoll_event, c_int, c_int) -> c_int);
original!(close, fn(c_int) -> c_int);

original!(read, fn(c_int, *mut c_void, size_t) -> ssize_t);
original!(readv, fn(c_int, *const iovec, c_int) -> ssize_t);
original!(recv, fn(c_int, *mut c_void, size_t, c_int) -> ssize_t);
original!(recvmsg, fn(c_int, *mut msghdr, c_int) -> ssize_t);

original!(write, fn(c_int, *const c_void, size_t) -> ssize_t);
original!(writev, fn(c_int, *const iovec, c_int) -> ssize_t);
original!(send, fn(c_int, *const c_void, size_t, c_int) -> ssize_t);
original!(sendmsg, fn(c_int, *const msghdr, c_int) -> ssize_t);
