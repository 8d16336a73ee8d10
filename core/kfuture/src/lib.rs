// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

//! Deferred values for firmware running without an operating system.
//!
//! A [`Deferred<R>`] represents a result that will become available later,
//! typically from a DMA transfer or another peripheral operation. A single
//! cooperative control flow (main loop plus interrupt handlers) advances
//! completion; there is no scheduler and no blocking primitive, only
//! polling.
//!
//! # Architecture
//!
//! - `racy`: [`RacyCell`], volatile accessors for the completion flag shared
//!   with interrupt context.
//! - `state`: the completion-state node tracking which dependent nodes to
//!   notify when a value becomes fulfilled.
//! - `future`: [`Deferred`] itself, with the polling protocol
//!   ([`Deferred::is_done`], [`Deferred::wait`], [`Deferred::get`]), direct
//!   fulfillment ([`Deferred::set_value`]) and driver-backed completion
//!   ([`Deferred::set_done_callback`]).
//! - `chain`: the continuation node behind [`Deferred::then`], which links
//!   one value's completion to the launch of the next.
//!
//! The only hardware coupling is the IRQ save/restore pair consumed by the
//! `irqspin` locks; the embedding firmware provides it by implementing
//! [`irqspin::IrqIf`] once.
//!
//! # Usage Patterns
//!
//! ## Driver-backed value
//!
//! ```rust,ignore
//! use kfuture::Deferred;
//!
//! fn read_data(dst: &'static mut [u8]) -> Deferred<bool> {
//!     start_dma_read(dst);
//!     let mut f = Deferred::new();
//!     f.set_done_callback(|f| {
//!         if !dma_read_finished() {
//!             return false;
//!         }
//!         f.set_result(dma_read_succeeded());
//!         true
//!     });
//!     f
//! }
//! ```
//!
//! ## Chaining
//!
//! ```rust,ignore
//! use kfuture::make_ready_future;
//!
//! let ok = read_data(buf).then(|mut f| {
//!     if !f.get() {
//!         return make_ready_future(false);
//!     }
//!     read_data(next_buf) // still pending: the chain tracks it
//! });
//! ```

extern crate alloc;

mod chain;
mod future;
mod racy;
mod state;
#[cfg(test)]
mod tests;

pub use future::{Deferred, DoneCallback, make_ready_future};
pub use racy::RacyCell;
