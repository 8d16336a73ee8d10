//! RAII guards for critical sections with local IRQs disabled.

/// Low-level platform interface for local IRQ control.
///
/// Implemented once by the embedding firmware with
/// `#[crate_interface::impl_interface]`; host test suites implement it with
/// a double that tracks the nesting depth instead of touching hardware.
#[crate_interface::def_interface]
pub trait IrqIf {
    /// Save the current local-IRQ state and disable delivery, returning the
    /// saved flags.
    fn local_irq_save_and_disable() -> usize;

    /// Restore local-IRQ delivery from previously saved flags.
    ///
    /// Must re-enable delivery only if the saved flags say it was enabled,
    /// so nested critical sections compose.
    fn local_irq_restore(flags: usize);
}

/// Base trait for all guard types.
///
/// Guards implement the RAII pattern to automatically manage critical
/// sections.
pub trait BaseGuard {
    /// State saved when entering the critical section.
    type State: Clone + Copy;

    /// Enter the critical section, returning saved state.
    fn acquire() -> Self::State;

    /// Exit the critical section, restoring state.
    fn release(state: Self::State);
}

mod types;

pub use types::{IrqSave, NoOp};
