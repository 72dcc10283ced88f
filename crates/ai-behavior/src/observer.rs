use std::borrow::Cow;

use crate::{BehaviorKey, BehaviorResult, NodeId};

/// What a node left behind when it finalized (or was discarded from a queue).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishRecord {
    pub node: NodeId,
    pub key: BehaviorKey,
    pub result: BehaviorResult,
    pub reason: Option<Cow<'static, str>>,
    pub tick: u64,
}

impl FinishRecord {
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Outcome of a finish request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishOutcome {
    /// The node (and its descendants) finalized synchronously.
    Finalized,
    /// Recorded; finalization waits for interruption to clear or a child to finalize.
    Deferred,
    /// The node was still queued and was dropped without ever starting.
    Discarded,
}

/// Completion callback registered with `BehaviorRuntime::observe_finish`.
pub(crate) type FinishObserver = Box<dyn FnOnce(&FinishRecord)>;
