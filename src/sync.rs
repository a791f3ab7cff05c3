//! Poison-tolerant locking.
//!
//! Shared state in this crate is the visible-width cache in [`crate::cells`]
//! and the output sink of [`crate::logging::TableLogger`]. Both lock through
//! [`lock_recover`], which returns the guard even when a previous holder
//! panicked.

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering from poison if necessary.
///
/// # Example
///
/// ```rust
/// use std::sync::Mutex;
/// use gridbox::sync::lock_recover;
///
/// let mutex = Mutex::new(42);
/// let guard = lock_recover(&mutex);
/// assert_eq!(*guard, 42);
/// ```
#[inline]
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::debug!("recovered poisoned mutex");
        poisoned.into_inner()
    })
}
