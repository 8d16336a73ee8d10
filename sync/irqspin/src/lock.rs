//! Spinlock implementation with configurable guards.
//!
//! The lock carries no atomic state: on a single cooperative execution
//! context the guard alone provides mutual exclusion, by keeping IRQ
//! delivery suppressed while the data is borrowed.

use core::{
    cell::UnsafeCell,
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use crate::guard::BaseGuard;

/// A lock with configurable guard behavior.
///
/// The guard type `G` determines what happens when acquiring the lock:
/// - [`crate::NoOp`]: no special behavior, for data IRQ handlers never touch
/// - [`crate::IrqSave`]: saves and disables local IRQs for the critical
///   section
///
/// # Examples
///
/// ```rust,ignore
/// use irqspin::SpinIrqSave;
///
/// let lock = SpinIrqSave::new(42);
/// {
///     let guard = lock.lock();
///     assert_eq!(*guard, 42);
///     // IRQ delivery is suppressed here
/// } // lock released, IRQ state restored
/// ```
pub struct SpinLock<G: BaseGuard, T: ?Sized> {
    _phantom: PhantomData<G>,
    data: UnsafeCell<T>,
}

/// RAII guard for [`SpinLock`].
///
/// Provides mutable access to the protected data and restores the guard
/// state when dropped.
pub struct SpinLockGuard<'a, G: BaseGuard, T: ?Sized + 'a> {
    _phantom: PhantomData<G>,
    state: G::State,
    data: &'a mut T,
}

// Same unsafe impls as `std::sync::Mutex`
unsafe impl<G: BaseGuard, T: ?Sized + Send> Sync for SpinLock<G, T> {}
unsafe impl<G: BaseGuard, T: ?Sized + Send> Send for SpinLock<G, T> {}

impl<G: BaseGuard, T> SpinLock<G, T> {
    /// Create a new lock.
    #[inline(always)]
    pub const fn new(data: T) -> Self {
        Self {
            _phantom: PhantomData,
            data: UnsafeCell::new(data),
        }
    }

    /// Consume the lock and return the inner value.
    #[inline(always)]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<G: BaseGuard, T: ?Sized> SpinLock<G, T> {
    /// Acquire the lock.
    ///
    /// The returned guard keeps the critical section entered until it is
    /// dropped. Acquiring again while a guard is alive in the same context
    /// is a usage error.
    #[inline(always)]
    pub fn lock(&self) -> SpinLockGuard<'_, G, T> {
        let state = G::acquire();
        SpinLockGuard {
            _phantom: PhantomData,
            state,
            data: unsafe { &mut *self.data.get() },
        }
    }

    /// Get a mutable reference (zero-cost).
    ///
    /// Since this requires a mutable reference to the lock itself, no
    /// critical section is needed.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<G: BaseGuard, T: Default> Default for SpinLock<G, T> {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl<G: BaseGuard, T: ?Sized + fmt::Debug> fmt::Debug for SpinLock<G, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SpinLock")
            .field("data", &&*self.lock())
            .finish()
    }
}

impl<G: BaseGuard, T: ?Sized> Deref for SpinLockGuard<'_, G, T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        self.data
    }
}

impl<G: BaseGuard, T: ?Sized> DerefMut for SpinLockGuard<'_, G, T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        self.data
    }
}

impl<G: BaseGuard, T: ?Sized + fmt::Debug> fmt::Debug for SpinLockGuard<'_, G, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<G: BaseGuard, T: ?Sized> Drop for SpinLockGuard<'_, G, T> {
    #[inline(always)]
    fn drop(&mut self) {
        G::release(self.state);
    }
}
