//! Racy memory accessors for plain values shared with interrupt context.

use core::cell::UnsafeCell;
use core::fmt;

/// A cell whose loads and stores are compiled as volatile accesses.
///
/// Used for flags that ordinary control flow spins on after they are set by
/// logic reached from interrupt context: the compiler must neither cache the
/// value in a register nor reorder accesses across the boundary.
///
/// The `Copy` bound restricts the cell to trivially copyable values; using
/// it with anything else is a compile-time error.
pub struct RacyCell<T: Copy>(UnsafeCell<T>);

impl<T: Copy> RacyCell<T> {
    /// Create a cell holding `value`.
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }

    /// Read the current value with a volatile load.
    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.0.get()) }
    }

    /// Overwrite the value with a volatile store.
    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.0.get(), value) }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for RacyCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RacyCell").field(&self.get()).finish()
    }
}
