//! Exported Symbols
//!
//! The functions a preloaded `libepoll_checker.so` puts in front of libc.
//! Each one forwards to the original first and only then observes the
//! result, so the program sees exactly what libc returned, `errno` included.

#![allow(clippy::missing_safety_doc)]

use std::ptr;

use libc::{c_int, c_void, epoll_event, iovec, msghdr, size_t, ssize_t};

use entities_epoll_state::Interest;
use usecases_epoll_tracking::ReadyEvent;

use crate::hooks::{self, Checker, CtlEvent};
use crate::{errno, guard, symbols};

/// Report to the checker unless this thread is already inside a hook
fn observe(f: impl FnOnce(&Checker, c_int)) {
    let saved = errno::get();
    if let Some(_guard) = guard::enter() {
        if let Some(checker) = hooks::checker().filter(|checker| checker.is_enabled()) {
            f(checker, saved);
        }
    }
    errno::set(saved);
}

#[no_mangle]
pub unsafe extern "C" fn epoll_create(size: c_int) -> c_int {
    let ret = symbols::epoll_create()(size);
    observe(|checker, _| checker.after_epoll_create(ret));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn epoll_create1(flags: c_int) -> c_int {
    let ret = symbols::epoll_create1()(flags);
    observe(|checker, _| checker.after_epoll_create(ret));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn epoll_ctl(epfd: c_int, op: c_int, fd: c_int, event: *mut epoll_event) -> c_int {
    let registration = if event.is_null() {
        None
    } else {
        let event = ptr::read_unaligned(event);
        Some(CtlEvent {
            events: Interest::from_bits_retain(event.events),
            token: event.u64,
        })
    };

    let ret = symbols::epoll_ctl()(epfd, op, fd, event);
    observe(|checker, _| checker.after_epoll_ctl(epfd, op, fd, registration, ret));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn epoll_wait(
    epfd: c_int,
    events: *mut epoll_event,
    maxevents: c_int,
    timeout: c_int,
) -> c_int {
    let ret = symbols::epoll_wait()(epfd, events, maxevents, timeout);
    if ret > 0 && !events.is_null() {
        observe(|checker, _| {
            let reported = std::slice::from_raw_parts(events, ret as usize);
            let ready: Vec<ReadyEvent> = reported
                .iter()
                .map(|event| ReadyEvent {
                    token: event.u64,
                    events: Interest::from_bits_retain(event.events),
                })
                .collect();
            checker.after_epoll_wait(epfd, &ready);
        });
    }
    ret
}

#[no_mangle]
pub unsafe extern "C" fn close(fd: c_int) -> c_int {
    let ret = symbols::close()(fd);
    observe(|checker, _| checker.after_close(fd, ret));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn read(fd: c_int, buf: *mut c_void, count: size_t) -> ssize_t {
    let ret = symbols::read()(fd, buf, count);
    observe(|checker, errno| checker.after_read(fd, ret, errno));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn readv(fd: c_int, iov: *const iovec, iovcnt: c_int) -> ssize_t {
    let ret = symbols::readv()(fd, iov, iovcnt);
    observe(|checker, errno| checker.after_read(fd, ret, errno));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn recv(sockfd: c_int, buf: *mut c_void, len: size_t, flags: c_int) -> ssize_t {
    let ret = symbols::recv()(sockfd, buf, len, flags);
    observe(|checker, errno| checker.after_read(sockfd, ret, errno));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn recvmsg(sockfd: c_int, msg: *mut msghdr, flags: c_int) -> ssize_t {
    let ret = symbols::recvmsg()(sockfd, msg, flags);
    observe(|checker, errno| checker.after_read(sockfd, ret, errno));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn write(fd: c_int, buf: *const c_void, count: size_t) -> ssize_t {
    let ret = symbols::write()(fd, buf, count);
    observe(|checker, errno| checker.after_write(fd, ret, errno));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn writev(fd: c_int, iov: *const iovec, iovcnt: c_int) -> ssize_t {
    let ret = symbols::writev()(fd, iov, iovcnt);
    observe(|checker, errno| checker.after_write(fd, ret, errno));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn send(sockfd: c_int, buf: *const c_void, len: size_t, flags: c_int) -> ssize_t {
    let ret = symbols::send()(sockfd, buf, len, flags);
    observe(|checker, errno| checker.after_write(sockfd, ret, errno));
    ret
}

#[no_mangle]
pub unsafe extern "C" fn sendmsg(sockfd: c_int, msg: *const msghdr, flags: c_int) -> ssize_t {
    let ret = symbols::sendmsg()(sockfd, msg, flags);
    observe(|checker, errno| checker.after_write(sockfd, ret, errno));
    ret
}
