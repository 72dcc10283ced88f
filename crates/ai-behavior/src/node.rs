use std::borrow::Cow;

use ai_core::WorldMut;

use crate::observer::FinishObserver;
use crate::selector::SelectorState;
use crate::{Behavior, BehaviorKey, BehaviorKind, BehaviorResult, LifecycleState, Priority};

slotmap::new_key_type! {
    /// Generational handle to a node in a runtime's arena.
    ///
    /// A handle to a released node never resolves again, even after its slot is reused.
    pub struct NodeId;
}

/// Child-finish notification buffered while the parent's own hook is running.
pub(crate) struct ChildFinished {
    pub key: BehaviorKey,
    pub result: BehaviorResult,
    pub reason: Option<Cow<'static, str>>,
}

pub struct BehaviorNode<W>
where
    W: WorldMut + 'static,
{
    pub(crate) key: BehaviorKey,
    pub(crate) kind: BehaviorKind,
    pub(crate) priority: Priority,
    pub(crate) exclusive: Option<&'static str>,
    pub(crate) state: LifecycleState,
    pub(crate) interrupted: bool,
    pub(crate) finishing: bool,
    pub(crate) pending_finish: bool,
    pub(crate) finish: Option<(BehaviorResult, Option<Cow<'static, str>>)>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) active_child: Option<NodeId>,
    /// Children displaced from the slot whose finalize is still deferred.
    pub(crate) detached: Vec<NodeId>,
    pub(crate) queued: Option<NodeId>,
    pub(crate) owned_by_selector: bool,
    pub(crate) displaced: bool,
    pub(crate) selector: Option<SelectorState>,
    /// `None` while one of the node's hooks is executing.
    pub(crate) behavior: Option<Box<dyn Behavior<W>>>,
    pub(crate) inbox: Vec<ChildFinished>,
    pub(crate) observers: Vec<FinishObserver>,
}

impl<W> BehaviorNode<W>
where
    W: WorldMut + 'static,
{
    pub(crate) fn new(
        key: BehaviorKey,
        kind: BehaviorKind,
        priority: Priority,
        exclusive: Option<&'static str>,
        selector: Option<SelectorState>,
        behavior: Box<dyn Behavior<W>>,
    ) -> Self {
        Self {
            key,
            kind,
            priority,
            exclusive,
            state: LifecycleState::Uninitialized,
            interrupted: false,
            finishing: false,
            pending_finish: false,
            finish: None,
            parent: None,
            active_child: None,
            detached: Vec::new(),
            queued: None,
            owned_by_selector: false,
            displaced: false,
            selector,
            behavior: Some(behavior),
            inbox: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn key(&self) -> BehaviorKey {
        self.key
    }

    pub fn kind(&self) -> BehaviorKind {
        self.kind
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// A finish was requested; the node may still be waiting to finalize.
    pub fn is_finishing(&self) -> bool {
        self.finishing
    }

    pub fn pending_finish(&self) -> bool {
        self.pending_finish
    }

    /// Result and reason recorded by the first finish request.
    pub fn finish_result(&self) -> Option<(BehaviorResult, Option<&str>)> {
        self.finish
            .as_ref()
            .map(|(result, reason)| (*result, reason.as_deref()))
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn active_child(&self) -> Option<NodeId> {
        self.active_child
    }

    /// Displaced children that have not finalized yet. The node cannot finalize
    /// before they do.
    pub fn detached_children(&self) -> &[NodeId] {
        &self.detached
    }

    pub fn queued(&self) -> Option<NodeId> {
        self.queued
    }

    pub fn owned_by_selector(&self) -> bool {
        self.owned_by_selector
    }

    pub fn selector(&self) -> Option<&SelectorState> {
        self.selector.as_ref()
    }

    pub fn exclusive_group(&self) -> Option<&'static str> {
        self.exclusive
    }

    pub(crate) fn in_hook(&self) -> bool {
        self.behavior.is_none()
    }

    /// Active, not finishing: eligible for ticks and continuations.
    pub(crate) fn accepts_continuations(&self) -> bool {
        self.state == LifecycleState::Active && !self.finishing
    }
}

impl<W> core::fmt::Debug for BehaviorNode<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BehaviorNode")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("state", &self.state)
            .field("interrupted", &self.interrupted)
            .field("finishing", &self.finishing)
            .field("pending_finish", &self.pending_finish)
            .field("parent", &self.parent)
            .field("active_child", &self.active_child)
            .field("detached", &self.detached)
            .field("queued", &self.queued)
            .finish()
    }
}
