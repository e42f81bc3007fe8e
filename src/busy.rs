//! Per-action busy flags.
//!
//! Each user action (login, generate, save preferences, ...) owns one flag.
//! While a call is in flight the flag is held and a second attempt of the
//! same action is refused; other actions are unaffected.

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a busy flag until dropped.
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Take the flag, or `None` if the action is already running.
    pub fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
