//! Minimal spin lock
//!
//! The log engine's synchronization domain. Producers may run in contexts
//! that cannot sleep, so waiting is a busy spin; every critical section in
//! the engine is bounded (no I/O, no allocation, no unbounded loop), which
//! keeps the spin short.
//!
//! # Safety Invariants
//!
//! 1. `data` is only reachable through a `SpinLockGuard`
//! 2. A guard exists only while `locked` is `true` and was set by the
//!    `compare_exchange` that created that guard
//! 3. Dropping the guard releases the lock with `Release` ordering, pairing
//!    with the `Acquire` of the next successful lock

use core::cell::UnsafeCell;
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// A test-and-test-and-set spin lock.
pub struct SpinLock<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: the lock hands out at most one guard at a time (invariant 2), so
// moving `T` between threads through the lock is sound when `T: Send`.
unsafe impl<T: Send> Send for SpinLock<T> {}

// SAFETY: shared references to the lock only ever yield exclusive access to
// `T` through a guard; `T: Send` is sufficient, as for `std::sync::Mutex`.
unsafe impl<T: Send> Sync for SpinLock<T> {}

/// RAII guard; the lock is released when this is dropped.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> SpinLock<T> {
    /// Create an unlocked spin lock.
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquire the lock, spinning until it is free.
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.locked.load(Ordering::Relaxed) {
                core::hint::spin_loop();
            }
        }
        SpinLockGuard { lock: self }
    }

    /// Try to acquire the lock without spinning.
    ///
    /// Returns `None` if the lock is currently held.
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| SpinLockGuard { lock: self })
    }

    /// Whether the lock is held right now. Only a hint; the answer may be
    /// stale by the time the caller looks at it.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Mutable access without locking; `&mut self` proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consume the lock and return the protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: this guard is the only one alive (invariant 2).
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: this guard is the only one alive (invariant 2), and it is
        // borrowed mutably, so no other reference derived from it exists.
        unsafe { &mut *self.lock.data.get() }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn test_lock_and_mutate() {
        let lock = SpinLock::new(1u32);
        *lock.lock() += 1;
        assert_eq!(*lock.lock(), 2);
    }

    #[test]
    fn test_try_lock_fails_while_held() {
        let lock = SpinLock::new(());
        let guard = lock.lock();
        assert!(lock.is_locked());
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(!lock.is_locked());
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn test_into_inner_and_get_mut() {
        let mut lock = SpinLock::new(5u8);
        *lock.get_mut() = 9;
        assert_eq!(lock.into_inner(), 9);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        const THREADS: usize = 8;
        const ITERS: usize = 10_000;

        let lock = Arc::new(SpinLock::new(0usize));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for _ in 0..ITERS {
                        *lock.lock() += 1;
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.lock(), THREADS * ITERS);
    }

    #[test]
    fn test_critical_section_is_never_torn() {
        // Writers store the same value into both halves; a reader must
        // never see them differ.
        let lock = Arc::new(SpinLock::new((0u64, 0u64)));
        let writers: Vec<_> = (1..=4u64)
            .map(|id| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for i in 0..5_000u64 {
                        let mut pair = lock.lock();
                        pair.0 = id * 1_000_000 + i;
                        pair.1 = id * 1_000_000 + i;
                    }
                })
            })
            .collect();

        for _ in 0..5_000 {
            let pair = lock.lock();
            assert_eq!(pair.0, pair.1);
        }
        for w in writers {
            w.join().unwrap();
        }
    }

    // Compile-time check that SpinLock is Send + Sync for Send payloads
    fn _assert_send<T: Send>() {}
    fn _assert_sync<T: Sync>() {}

    #[test]
    fn test_send_sync_traits() {
        _assert_send::<SpinLock<[u8; 16]>>();
        _assert_sync::<SpinLock<[u8; 16]>>();
    }
}
