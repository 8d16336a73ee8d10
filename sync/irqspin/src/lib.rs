// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

//! Spinlocks and RAII guards for single-context firmware where interrupt
//! handlers are the only concurrent execution agent.
//!
//! # Architecture
//!
//! The crate is organized into two main components:
//!
//! ## Guards (`guard` module)
//!
//! RAII guards that manage critical sections:
//! - [`NoOp`]: No protection (for data never touched from IRQ context)
//! - [`IrqSave`]: Saves the local IRQ state, disables delivery, and restores
//!   the saved state on drop
//!
//! The IRQ enable/disable primitives are not accessed directly; they are
//! reached through the [`IrqIf`] platform interface, so the same code runs
//! on real hardware and on a host with a test double.
//!
//! ## Locks (`lock` module)
//!
//! Generic spinlock implementation [`SpinLock<G, T>`] parameterized by guard
//! type. There is no atomic lock word: the crate targets a single cooperative
//! execution context, where mutual exclusion against IRQ handlers is provided
//! entirely by the guard.
//!
//! # Usage Patterns
//!
//! ## Implementing IrqIf
//!
//! ```rust,ignore
//! use irqspin::IrqIf;
//!
//! struct PlatformIrq;
//!
//! #[crate_interface::impl_interface]
//! impl IrqIf for PlatformIrq {
//!     fn local_irq_save_and_disable() -> usize {
//!         // read PRIMASK (or equivalent), then disable delivery
//!     }
//!
//!     fn local_irq_restore(flags: usize) {
//!         // re-enable delivery only if `flags` says it was enabled
//!     }
//! }
//! ```
//!
//! ## Protecting data shared with an IRQ handler
//!
//! ```rust,ignore
//! use irqspin::SpinIrqSave;
//!
//! static EVENTS: SpinIrqSave<Vec<u8>> = SpinIrqSave::new(Vec::new());
//!
//! fn record(ev: u8) {
//!     // IRQ delivery is suppressed while the guard is alive
//!     EVENTS.lock().push(ev);
//! }
//! ```

mod guard;
mod lock;
#[cfg(test)]
mod tests;

pub use guard::{BaseGuard, IrqIf, IrqSave, NoOp};
pub use lock::{SpinLock, SpinLockGuard};

/// Raw spinlock with no guards.
///
/// **Warning**: Must only be used for data that is never observed or mutated
/// from IRQ context.
pub type SpinRaw<T> = SpinLock<NoOp, T>;

/// Guard for [`SpinRaw`].
pub type SpinRawGuard<'a, T> = SpinLockGuard<'a, NoOp, T>;

/// Spinlock that saves and disables local IRQs in the critical section.
///
/// Safe for data shared between ordinary control flow and IRQ handlers.
pub type SpinIrqSave<T> = SpinLock<IrqSave, T>;

/// Guard for [`SpinIrqSave`].
pub type SpinIrqSaveGuard<'a, T> = SpinLockGuard<'a, IrqSave, T>;
