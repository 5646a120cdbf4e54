use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock, ignoring poisoning. Writers never leave guarded state half-updated.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
