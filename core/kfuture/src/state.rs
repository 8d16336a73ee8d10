//! Completion bookkeeping shared between deferred values.

use alloc::{sync::Weak, vec::Vec};

use irqspin::SpinIrqSave;
use log::trace;

/// A dependent node recorded on a [`CompleteState`] list, notified when the
/// value owning that list completes.
///
/// The list holds non-owning handles: every node is owned, through its
/// `Arc`, by the deferred value that created it, and a handle that fails to
/// upgrade is simply skipped during the drain.
pub(crate) trait Continuation: Send + Sync {
    /// Run the user continuation bridged by this node.
    fn launch(&self);
}

/// Interface a deferred value uses to query the state node it owns.
///
/// The plain [`CompleteState`] keeps the defaults: no prerequisites, no
/// proxied result. The continuation-bridge node overrides both to defer to
/// whichever of its preconditions is currently live.
pub(crate) trait ChainableState<R>: Send + Sync {
    /// The completion bookkeeping embedded in this node.
    fn base(&self) -> &CompleteState;

    /// Whether the prerequisites tracked by this node have completed.
    fn prereqs_done(&self) -> bool {
        true
    }

    /// Result proxied from a completed alternate precondition, if any.
    fn try_take_result(&self) -> Option<R> {
        None
    }
}

/// Tracks who must be notified when a deferred value becomes fulfilled.
pub(crate) struct CompleteState {
    continuations: SpinIrqSave<Vec<Weak<dyn Continuation>>>,
}

impl CompleteState {
    pub(crate) const fn new() -> Self {
        Self {
            continuations: SpinIrqSave::new(Vec::new()),
        }
    }

    /// Append a dependent node.
    ///
    /// IRQ delivery is suppressed for the append; this is the only mutation
    /// an interrupt handler could otherwise observe mid-update.
    pub(crate) fn push(&self, node: Weak<dyn Continuation>) {
        self.continuations.lock().push(node);
    }

    /// Take the current continuation list and launch every entry, in
    /// registration order.
    ///
    /// Called exactly once per completion event of the owning value. The
    /// list is swapped out before iterating: a continuation that re-registers
    /// while being launched lands on the fresh list and is visited on the
    /// next completion event, exactly once.
    pub(crate) fn do_continuation(&self) {
        let taken = core::mem::take(&mut *self.continuations.lock());
        if taken.is_empty() {
            return;
        }
        trace!("draining {} continuation(s)", taken.len());
        for node in taken {
            if let Some(node) = node.upgrade() {
                node.launch();
            }
        }
    }
}

impl<R> ChainableState<R> for CompleteState {
    fn base(&self) -> &CompleteState {
        self
    }
}
