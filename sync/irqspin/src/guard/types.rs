//! Concrete guard type implementations.

use super::BaseGuard;

/// No-op guard (does nothing).
#[derive(Debug, Clone, Copy)]
pub struct NoOp;

impl BaseGuard for NoOp {
    type State = ();

    #[inline(always)]
    fn acquire() -> Self::State {}

    #[inline(always)]
    fn release(_state: Self::State) {}
}

impl NoOp {
    /// Create a new no-op guard.
    #[inline(always)]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for NoOp {
    fn default() -> Self {
        Self
    }
}

/// Guard that saves and disables local IRQs, restoring the saved state on
/// drop.
///
/// Non-copyable by construction; each instance pairs exactly one
/// save-and-disable with one restore, so instances nest freely.
#[derive(Debug)]
pub struct IrqSave(usize);

impl BaseGuard for IrqSave {
    type State = usize;

    #[inline]
    fn acquire() -> Self::State {
        crate_interface::call_interface!(crate::guard::IrqIf::local_irq_save_and_disable)
    }

    #[inline]
    fn release(state: Self::State) {
        crate_interface::call_interface!(crate::guard::IrqIf::local_irq_restore, state)
    }
}

impl IrqSave {
    /// Create a new guard, entering the critical section.
    #[inline]
    pub fn new() -> Self {
        Self(<Self as BaseGuard>::acquire())
    }
}

impl Drop for IrqSave {
    #[inline]
    fn drop(&mut self) {
        <Self as BaseGuard>::release(self.0)
    }
}

impl Default for IrqSave {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
