//! Reentrancy Guard Module
//!
//! While a hook runs, the checker itself may call intercepted functions:
//! the logger writes to stderr, `dlsym` may read files. Those nested calls
//! must reach the real implementation without being tracked, otherwise the
//! engine lock would be taken twice on the same thread.

use std::cell::Cell;

thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running a hook until dropped
#[derive(Debug)]
pub struct HookGuard {
    _not_send: std::marker::PhantomData<*const ()>,
}

/// Enter hook context
///
/// Returns `None` when the thread is already inside a hook, or when its
/// thread-local storage is gone (a call made during thread teardown).
pub fn enter() -> Option<HookGuard> {
    IN_HOOK
        .try_with(|in_hook| {
            if in_hook.replace(true) {
                None
            } else {
                Some(HookGuard {
                    _not_send: std::marker::PhantomData,
                })
            }
        })
        .ok()
        .flatten()
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        let _ = IN_HOOK.try_with(|in_hook| in_hook.set(false));
    }
}
