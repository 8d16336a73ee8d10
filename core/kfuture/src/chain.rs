//! The continuation node bridging one deferred value to the next.

use alloc::sync::{Arc, Weak};

use irqspin::SpinRaw;
use log::debug;

use crate::{
    future::Deferred,
    state::{ChainableState, CompleteState, Continuation},
};

/// Mutable half of a [`ChainState`].
///
/// Exactly one of `precondition` and `alt_precondition` is live at a time:
/// construction starts with the precondition; launching the continuation
/// consumes it and populates the alternate. Touched only from ordinary
/// (non-interrupt) control flow, hence the raw lock.
struct ChainInner<P, F, R> {
    precondition: Option<Deferred<P>>,
    func: Option<F>,
    alt_precondition: Option<Deferred<R>>,
}

/// Completion-state node wired between a precondition value and the value
/// its continuation produces.
///
/// Registered as a dependent of the precondition at construction. The
/// continuation can launch through two paths that must compose: direct
/// notification (the precondition fulfilled with a stored result) and poll
/// discovery (the owner of the chained value polls [`prereqs_done`] and the
/// precondition's closure reports done there). Taking `func` out of the
/// inner state is the once-only guard for both.
///
/// [`prereqs_done`]: ChainableState::prereqs_done
pub(crate) struct ChainState<P, F, R> {
    base: CompleteState,
    inner: SpinRaw<ChainInner<P, F, R>>,
}

impl<P, F, R> ChainState<P, F, R>
where
    P: Send + 'static,
    R: Send + 'static,
    F: FnOnce(Deferred<P>) -> Deferred<R> + Send + 'static,
{
    /// Run the continuation with the completed precondition, if this node
    /// still holds both. The precondition is consumed; its completion-state
    /// node is released with it.
    fn run_continuation(&self, precondition: Deferred<P>, func: F) {
        debug!("launching continuation");
        let alt = func(precondition);
        self.inner.lock().alt_precondition = Some(alt);
    }
}

impl<P, F, R> Continuation for ChainState<P, F, R>
where
    P: Send + 'static,
    R: Send + 'static,
    F: FnOnce(Deferred<P>) -> Deferred<R> + Send + 'static,
{
    fn launch(&self) {
        let (pre, func) = {
            let mut inner = self.inner.lock();
            (inner.precondition.take(), inner.func.take())
        };
        match (pre, func) {
            (Some(pre), Some(func)) => self.run_continuation(pre, func),
            (pre, func) => {
                // Notified while the precondition is checked out: its owner
                // is polling it inside `prereqs_done` right now and runs the
                // continuation itself when the poll reports done. Put back
                // whatever was taken.
                let mut inner = self.inner.lock();
                if pre.is_some() {
                    inner.precondition = pre;
                }
                if func.is_some() {
                    inner.func = func;
                }
            }
        }
    }
}

impl<P, F, R> ChainableState<R> for ChainState<P, F, R>
where
    P: Send + 'static,
    R: Send + 'static,
    F: FnOnce(Deferred<P>) -> Deferred<R> + Send + 'static,
{
    fn base(&self) -> &CompleteState {
        &self.base
    }

    fn prereqs_done(&self) -> bool {
        // The live precondition is checked out of the lock before polling:
        // a poll that discovers completion drains the precondition's
        // continuation list, which re-enters `launch` on this very node.
        let pre = self.inner.lock().precondition.take();
        if let Some(mut pre) = pre {
            if !pre.is_done() {
                self.inner.lock().precondition = Some(pre);
                return false;
            }
            // The precondition completed under this poll; run the
            // continuation unless the notification path already claimed it.
            let func = self.inner.lock().func.take();
            if let Some(func) = func {
                self.run_continuation(pre, func);
            }
        }
        let alt = self.inner.lock().alt_precondition.take();
        if let Some(mut alt) = alt {
            let done = alt.is_done();
            self.inner.lock().alt_precondition = Some(alt);
            return done;
        }
        // Both sides checked out: the continuation is launching right now.
        false
    }

    fn try_take_result(&self) -> Option<R> {
        let alt = self.inner.lock().alt_precondition.take();
        let Some(mut alt) = alt else {
            return None;
        };
        let result = if alt.is_done() { alt.take_result() } else { None };
        self.inner.lock().alt_precondition = Some(alt);
        result
    }
}

/// Build the chained value for [`Deferred::then`]: wires a [`ChainState`]
/// between `precondition` and the value `func` will produce, and returns the
/// deferred value owning that node.
///
/// A precondition that is already done launches the continuation before this
/// returns, not on a later poll.
pub(crate) fn make_continuation_future<P, F, R>(
    mut precondition: Deferred<P>,
    func: F,
) -> Deferred<R>
where
    P: Send + 'static,
    R: Send + 'static,
    F: FnOnce(Deferred<P>) -> Deferred<R> + Send + 'static,
{
    let chain = Arc::new(ChainState {
        base: CompleteState::new(),
        inner: SpinRaw::new(ChainInner {
            precondition: None,
            func: Some(func),
            alt_precondition: None,
        }),
    });
    let weak = Arc::downgrade(&chain);
    let node: Weak<dyn Continuation> = weak;

    // Single cooperative context: nothing can fulfill the precondition
    // between this check and stowing it below.
    let was_done = precondition.is_done();
    precondition.set_continuation_ptr(node);
    chain.inner.lock().precondition = Some(precondition);
    if was_done {
        // Late attachment: the registration above drained before the
        // precondition was stowed, so fire the launch by hand.
        chain.launch();
    }

    Deferred::with_state(chain)
}
