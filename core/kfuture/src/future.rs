//! The deferred value: a result that becomes available later.

use alloc::{
    boxed::Box,
    sync::{Arc, Weak},
};
use core::fmt;

use crate::{
    chain,
    racy::RacyCell,
    state::{ChainableState, CompleteState, Continuation},
};

/// Poll closure supplied by a hardware driver.
///
/// Invoked by [`Deferred::is_done`] to ask whether the underlying operation
/// has finished. The closure may latch the produced value into the deferred
/// value (via [`Deferred::set_result`]) before reporting `true`.
pub type DoneCallback<R> = Box<dyn FnMut(&mut Deferred<R>) -> bool + Send>;

/// A value that will become available later, fulfilled at most once.
///
/// A `Deferred` is created empty and becomes fulfilled either directly
/// ([`Deferred::set_value`]) or indirectly, when the poll closure attached
/// with [`Deferred::set_done_callback`] first reports completion. Follow-up
/// work is chained with [`Deferred::then`].
///
/// The value has exactly one owner at a time and transfers only by move;
/// moving it carries its completion-state node and result slot along.
///
/// ```rust,ignore
/// use kfuture::{Deferred, make_ready_future};
///
/// let mut read = dma.read_block(addr); // Deferred<bool> from a driver
/// let mut ok = read.then(|mut done| make_ready_future(done.get()));
/// while !ok.is_done() {
///     // advance other work
/// }
/// assert!(ok.get());
/// ```
pub struct Deferred<R> {
    done: RacyCell<bool>,
    done_callback: Option<DoneCallback<R>>,
    result: Option<R>,
    state: Arc<dyn ChainableState<R>>,
}

impl<R: Send + 'static> Deferred<R> {
    /// Create an unfulfilled value with a fresh completion-state node.
    pub fn new() -> Self {
        Self::with_state(Arc::new(CompleteState::new()))
    }

    pub(crate) fn with_state(state: Arc<dyn ChainableState<R>>) -> Self {
        Self {
            done: RacyCell::new(false),
            done_callback: None,
            result: None,
            state,
        }
    }

    /// Poll whether the value is fulfilled.
    ///
    /// Evaluation order:
    /// 1. With a poll closure attached, ask it. Not done: report `false`.
    ///    Done: latch the completion flag, drop the closure, notify
    ///    dependents, report `true`.
    /// 2. Without one, a value whose prerequisites are still pending is not
    ///    done.
    /// 3. Otherwise trust the completion flag, first adopting the result a
    ///    chained prerequisite may have produced.
    pub fn is_done(&mut self) -> bool {
        if let Some(mut callback) = self.done_callback.take() {
            if !callback(self) {
                self.done_callback = Some(callback);
                return false;
            }
            self.done.set(true);
            self.state.base().do_continuation();
            return true;
        }
        if !self.state.prereqs_done() {
            return false;
        }
        if !self.done.get() {
            // Chained value: the alternate precondition has settled, adopt
            // its result as our own and complete.
            if let Some(result) = self.state.try_take_result() {
                self.result = Some(result);
                self.done.set(true);
                self.state.base().do_continuation();
            }
        }
        self.done.get()
    }

    /// Spin until the value is fulfilled.
    ///
    /// The scheduling model has no blocking primitive; this busy-polls
    /// [`Deferred::is_done`] and only guarantees eventual return once
    /// completion is observed.
    pub fn wait(&mut self) {
        while !self.is_done() {
            core::hint::spin_loop();
        }
    }

    /// Wait for fulfillment, then move the result out.
    ///
    /// Consumes the value, so a result can be taken at most once.
    ///
    /// # Panics
    ///
    /// Panics if the value completed without a result ever being stored,
    /// i.e. a driver poll closure reported done without latching one.
    pub fn get(mut self) -> R {
        self.wait();
        self.result
            .take()
            .expect("deferred value completed without a result")
    }

    /// Store the result and fulfill the value, synchronously notifying
    /// dependents.
    ///
    /// Must not be called from interrupt context: continuations launched by
    /// the notification run in the caller's context and are free to do
    /// non-reentrant work.
    pub fn set_value(&mut self, result: R) {
        self.result = Some(result);
        self.done.set(true);
        self.state.base().do_continuation();
    }

    /// Store the result without fulfilling the value.
    ///
    /// Intended for driver poll closures that latch the produced value just
    /// before reporting done.
    pub fn set_result(&mut self, result: R) {
        self.result = Some(result);
    }

    /// Attach the driver poll closure consulted by [`Deferred::is_done`].
    ///
    /// For hardware-backed values only; a value is either poll-driven or
    /// fulfilled directly with [`Deferred::set_value`], not both.
    pub fn set_done_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut Deferred<R>) -> bool + Send + 'static,
    {
        self.done_callback = Some(Box::new(callback));
    }

    /// Register a dependent node on this value's completion-state node.
    ///
    /// A dependent attached after completion already happened is notified
    /// immediately rather than missed.
    pub(crate) fn set_continuation_ptr(&mut self, node: Weak<dyn Continuation>) {
        self.state.base().push(node);
        if self.is_done() {
            self.state.base().do_continuation();
        }
    }

    /// Chain a continuation onto this value.
    ///
    /// `func` runs once this value is fulfilled, receives it by move, and
    /// returns the next deferred value; the value returned by `then`
    /// transparently tracks that follow-on, so a continuation may itself
    /// start another deferred operation without blocking.
    pub fn then<T, F>(self, func: F) -> Deferred<T>
    where
        T: Send + 'static,
        F: FnOnce(Deferred<R>) -> Deferred<T> + Send + 'static,
    {
        chain::make_continuation_future(self, func)
    }

    pub(crate) fn take_result(&mut self) -> Option<R> {
        self.result.take()
    }
}

impl<R: Send + 'static> Default for Deferred<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Deferred<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("done", &self.done.get())
            .field("has_result", &self.result.is_some())
            .field("polled", &self.done_callback.is_some())
            .finish()
    }
}

/// Create an already-fulfilled value wrapping `value`.
///
/// The result is immediately consumable: no poll closure, no live
/// prerequisite, [`Deferred::is_done`] reports `true` from the first call.
pub fn make_ready_future<R: Send + 'static>(value: R) -> Deferred<R> {
    let mut f = Deferred::new();
    f.set_value(value);
    f
}
