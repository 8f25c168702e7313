//! Synchronization utilities for robust mutex handling
//!
//! This module provides utilities for handling mutex poisoning and other
//! synchronization concerns in a consistent manner across the codebase.

use std::sync::{LockResult, Mutex, MutexGuard, PoisonError};

/// Handle poisoned mutex cases with consistent error handling
///
/// Converts mutex poison errors into application-specific errors using a
/// provided error constructor. Works for plain `lock()` results as well as
/// the guards handed back by `Condvar::wait` and `Condvar::wait_timeout`.
///
/// # Arguments
/// * `result` - The result from a mutex lock or condvar wait
/// * `error_constructor` - Function to create the appropriate error type
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use handoff::core::sync::handle_mutex_poison;
/// use handoff::pipeline::api::PipelineError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| PipelineError::Synchronisation { message }
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). \
             This indicates a panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Lock a mutex, recovering the guard if a previous holder panicked
///
/// Only for state that stays structurally valid whatever point a panic
/// interrupted (a cursor, an append-only `Vec`). The poisoning is logged at
/// warn level with the supplied `context`.
pub fn lock_recovering<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<MutexGuard<'a, T>>| {
        log::warn!(
            "{}: recovering lock poisoned by a panicked thread",
            context
        );
        poisoned.into_inner()
    })
}
