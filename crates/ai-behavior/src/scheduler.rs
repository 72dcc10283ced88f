use std::borrow::Cow;
use std::rc::Rc;

use ai_core::WorldMut;

use crate::node::BehaviorNode;
use crate::selector::{Pick, SelectorState};
use crate::{
    reason, Behavior, BehaviorError, BehaviorKey, BehaviorKind, BehaviorResult, BehaviorRuntime,
    LifecycleState, NodeId, NoopBehavior, PreemptionPolicy, Priority, Result,
};

/// Upper bound on displacements per admission, in case a parent keeps refilling its slot
/// from `on_child_finish`.
const MAX_DISPLACEMENTS: usize = 4;

impl<W> BehaviorRuntime<W>
where
    W: WorldMut + 'static,
{
    /// Start `key` as the agent's root, displacing the current root.
    pub fn start(&mut self, world: &mut W, key: BehaviorKey) -> Result<NodeId> {
        self.run_behavior(world, None, key)
    }

    /// Request `key` under `parent` (or at the root when `parent` is `None`).
    ///
    /// The returned handle may refer to an active node, or to a node waiting in the
    /// parent's queue slot.
    pub fn run_behavior(
        &mut self,
        world: &mut W,
        parent: Option<NodeId>,
        key: BehaviorKey,
    ) -> Result<NodeId> {
        self.run_behavior_with(world, parent, key, None, true)
    }

    /// Like [`BehaviorRuntime::run_behavior`] with an explicit instance (`None` uses the
    /// registered factory). With `ready == false` an admitted node stays in
    /// `AwaitingActivation` until [`BehaviorRuntime::request_ready`].
    pub fn run_behavior_with(
        &mut self,
        world: &mut W,
        parent: Option<NodeId>,
        key: BehaviorKey,
        behavior: Option<Box<dyn Behavior<W>>>,
        ready: bool,
    ) -> Result<NodeId> {
        self.spawn(world, parent, key, behavior, ready, false)
    }

    /// Activate a node admitted with `ready == false`.
    pub fn request_ready(&mut self, world: &mut W, id: NodeId) -> Result<()> {
        let Some(node) = self.nodes.get(id) else {
            self.error("ready.released", format!("node {id:?} has been released"));
            return Err(BehaviorError::NodeReleased(id));
        };

        if node.interrupted {
            let key = node.key;
            self.warn("ready.interrupted", format!("`{key}` ({id:?}) is interrupted"));
            return Err(BehaviorError::Interrupted(id));
        }

        if node.state != LifecycleState::AwaitingActivation || node.finishing {
            let (key, actual) = (node.key, node.state);
            self.error(
                "ready.invalid_state",
                format!("cannot ready `{key}` ({id:?}) in state {actual:?}"),
            );
            return Err(BehaviorError::InvalidState {
                node: id,
                actual,
                expected: LifecycleState::AwaitingActivation,
            });
        }

        self.activate(world, id);
        Ok(())
    }

    pub(crate) fn spawn(
        &mut self,
        world: &mut W,
        parent: Option<NodeId>,
        key: BehaviorKey,
        behavior: Option<Box<dyn Behavior<W>>>,
        ready: bool,
        owned_by_selector: bool,
    ) -> Result<NodeId> {
        let registry = Rc::clone(&self.registry);
        let Some(def) = registry.get(key) else {
            self.error("run.unregistered", format!("behavior `{key}` is not registered"));
            return Err(BehaviorError::Unregistered(key));
        };

        if let Some(parent) = parent {
            self.check_parent(parent, key, def.exclusive)?;
        }

        let behavior = behavior
            .or_else(|| registry.instantiate(key))
            .unwrap_or_else(|| Box::new(NoopBehavior));
        let selector = (def.kind == BehaviorKind::Selector).then(|| SelectorState::new(&def.candidates));
        let mut node = BehaviorNode::new(key, def.kind, def.priority, def.exclusive, selector, behavior);
        node.owned_by_selector = owned_by_selector;
        let (kind, priority) = (def.kind, def.priority);
        let id = self.nodes.insert(node);

        match (kind, parent) {
            (BehaviorKind::Parallel, _) => {
                self.parallel.push(id);
                self.attach(world, None, id, ready);
            }
            (_, None) => self.admit_root(world, id, ready),
            (BehaviorKind::Selector, Some(parent)) if !owned_by_selector => {
                let target = self.chain_root(parent).unwrap_or(parent);
                if self.slot_open_for_routed(target) {
                    self.admit(world, target, id, ready)?;
                } else {
                    self.enqueue(target, id);
                }
            }
            (_, Some(parent)) => {
                if self.slot_open_for(parent, priority) {
                    self.admit(world, parent, id, ready)?;
                } else {
                    self.enqueue(parent, id);
                }
            }
        }

        Ok(id)
    }

    fn check_parent(
        &mut self,
        parent: NodeId,
        key: BehaviorKey,
        exclusive: Option<&'static str>,
    ) -> Result<()> {
        let Some(node) = self.nodes.get(parent) else {
            self.error(
                "run.parent_released",
                format!("cannot run `{key}` under released node {parent:?}"),
            );
            return Err(BehaviorError::NodeReleased(parent));
        };

        if node.finishing || node.state == LifecycleState::Finished {
            let parent_key = node.key;
            self.warn(
                "run.parent_finishing",
                format!("cannot run `{key}` under finishing `{parent_key}` ({parent:?})"),
            );
            return Err(BehaviorError::ParentFinishing(parent));
        }

        if node.state == LifecycleState::Uninitialized {
            let parent_key = node.key;
            self.warn(
                "run.parent_inactive",
                format!("cannot run `{key}` under queued `{parent_key}` ({parent:?})"),
            );
            return Err(BehaviorError::InvalidState {
                node: parent,
                actual: LifecycleState::Uninitialized,
                expected: LifecycleState::Active,
            });
        }

        let Some(group) = exclusive else {
            return Ok(());
        };
        let mut current = Some(parent);
        while let Some(ancestor) = current.and_then(|id| self.nodes.get(id)) {
            if ancestor.exclusive == Some(group) {
                let ancestor_key = ancestor.key;
                self.error(
                    "run.nested_exclusive",
                    format!("`{key}` cannot run under `{ancestor_key}` (group `{group}`)"),
                );
                return Err(BehaviorError::NestedExclusive {
                    child: key,
                    ancestor: ancestor_key,
                    group,
                });
            }
            current = ancestor.parent;
        }
        Ok(())
    }

    /// Standalone admission: empty slot, or a newcomer at least as important as the
    /// active child (which must not be interrupted unless the policy ignores that).
    pub(crate) fn slot_open_for(&self, parent: NodeId, priority: Priority) -> bool {
        let Some(node) = self.nodes.get(parent) else {
            return false;
        };
        match node.active_child.and_then(|c| self.nodes.get(c)) {
            None => true,
            Some(child) => {
                priority <= child.priority
                    && (self.config.preemption == PreemptionPolicy::IgnoreInterruption
                        || !child.interrupted)
            }
        }
    }

    /// Selector-kind requests ignore priority. Under `RequireUninterrupted` neither the
    /// chain root nor its active child may be interrupted.
    fn slot_open_for_routed(&self, target: NodeId) -> bool {
        if self.config.preemption == PreemptionPolicy::IgnoreInterruption {
            return true;
        }
        let Some(node) = self.nodes.get(target) else {
            return false;
        };
        !node.interrupted
            && node
                .active_child
                .and_then(|c| self.nodes.get(c))
                .map_or(true, |child| !child.interrupted)
    }

    fn admit_root(&mut self, world: &mut W, id: NodeId, ready: bool) {
        if let Some(old) = self.root.filter(|old| *old != id) {
            if let Some(node) = self.nodes.get_mut(old) {
                node.displaced = true;
                if !node.finishing {
                    let _ = self.finish_node(
                        world,
                        old,
                        BehaviorResult::Skipped,
                        Some(Cow::Borrowed(reason::OVERRIDDEN)),
                    );
                }
            }
        }
        self.root = Some(id);
        self.attach(world, None, id, ready);
    }

    /// Put `id` into `parent`'s active-child slot, displacing whatever occupies it.
    pub(crate) fn admit(
        &mut self,
        world: &mut W,
        parent: NodeId,
        id: NodeId,
        ready: bool,
    ) -> Result<()> {
        for _ in 0..MAX_DISPLACEMENTS {
            let Some(old) = self.nodes.get(parent).and_then(|n| n.active_child) else {
                break;
            };
            self.displace(world, parent, old);
        }

        let open = self.nodes.get(parent).is_some_and(|n| {
            !n.finishing && n.state != LifecycleState::Finished && n.active_child.is_none()
        });
        if !open {
            self.nodes.remove(id);
            self.warn(
                "run.parent_finishing",
                format!("slot of {parent:?} closed while admitting {id:?}"),
            );
            return Err(BehaviorError::ParentFinishing(parent));
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            node.active_child = Some(id);
        }
        self.attach(world, Some(parent), id, ready);
        Ok(())
    }

    fn attach(&mut self, world: &mut W, parent: Option<NodeId>, id: NodeId, ready: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.parent = parent;
        node.state = LifecycleState::AwaitingActivation;
        let (key, priority) = (node.key, node.priority);

        tracing::debug!(node = ?id, behavior = %key, priority, parent = ?parent, "behavior admitted");
        self.emit("beh.admit", id, priority as u64);

        if ready {
            self.activate(world, id);
        }
    }

    /// Force-finish an active child to make room for a newcomer.
    fn displace(&mut self, world: &mut W, parent: NodeId, old: NodeId) {
        let Some(node) = self.nodes.get_mut(old) else {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.active_child = None;
            }
            return;
        };
        node.displaced = true;
        if !node.finishing {
            let _ = self.finish_node(
                world,
                old,
                BehaviorResult::Skipped,
                Some(Cow::Borrowed(reason::OVERRIDDEN)),
            );
        }

        // Deferred: the old child leaves the slot but stays attached to the parent,
        // which cannot finalize until it does.
        let still_in_slot = self.nodes.get(parent).and_then(|n| n.active_child) == Some(old);
        if !still_in_slot {
            return;
        }
        let owned = self
            .nodes
            .get_mut(old)
            .map(|n| std::mem::replace(&mut n.owned_by_selector, false))
            .unwrap_or(false);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.active_child = None;
            p.detached.push(old);
            if owned {
                if let Some(selector) = p.selector.as_mut() {
                    if let Some(index) = selector.selected() {
                        selector.apply_cooldown(index);
                    }
                }
            }
        }
    }

    /// Park `id` in `parent`'s queue slot, discarding any previous occupant.
    fn enqueue(&mut self, parent: NodeId, id: NodeId) {
        let priority = match self.nodes.get_mut(id) {
            Some(node) => {
                node.parent = Some(parent);
                node.priority
            }
            None => return,
        };
        let previous = self
            .nodes
            .get_mut(parent)
            .and_then(|p| p.queued.replace(id));
        if let Some(previous) = previous {
            self.discard(previous);
        }

        tracing::debug!(node = ?id, parent = ?parent, priority, "behavior queued");
        self.emit("beh.queue", id, priority as u64);
    }

    pub(crate) fn activate(&mut self, world: &mut W, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.state = LifecycleState::Active;
        let key = node.key;
        self.live.push(id);

        tracing::debug!(node = ?id, behavior = %key, "behavior started");
        self.call_hook(world, id, |b, cx| b.on_start(cx));
        self.settle(world, id);
    }

    /// One scheduling tick of a single node: hook, pending finish, queue, selector.
    pub(crate) fn tick_node(&mut self, world: &mut W, id: NodeId, dt: f32) {
        if !self
            .nodes
            .get(id)
            .is_some_and(|n| n.state == LifecycleState::Active)
        {
            return;
        }

        self.call_hook(world, id, |b, cx| b.on_tick(cx, dt));
        self.settle(world, id);

        match self.nodes.get(id) {
            Some(node) if !node.finishing => {}
            _ => return,
        }

        self.promote_queued(world, id);
        self.run_selector(world, id, dt);
    }

    fn promote_queued(&mut self, world: &mut W, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let Some(queued_id) = node.queued else {
            return;
        };

        let queued = match self.nodes.get(queued_id) {
            Some(q) if q.state == LifecycleState::Uninitialized => q,
            _ => {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.queued = None;
                }
                return;
            }
        };

        let allowed = match queued.kind {
            BehaviorKind::Selector => self.slot_open_for_routed(id),
            _ => self.slot_open_for(id, queued.priority),
        };
        if !allowed {
            return;
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.queued = None;
        }
        tracing::debug!(node = ?queued_id, parent = ?id, "queued behavior promoted");
        self.emit("beh.promote", queued_id, 0);

        if let Err(err) = self.admit(world, id, queued_id, true) {
            tracing::debug!(node = ?queued_id, %err, "queued behavior could not be promoted");
        }
    }

    fn run_selector(&mut self, world: &mut W, id: NodeId, dt: f32) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.finishing || node.state != LifecycleState::Active {
            return;
        }
        let occupied = node.active_child.is_some() || node.queued.is_some();
        let key = node.key;
        let Some(selector) = node.selector.as_mut() else {
            return;
        };

        selector.decay(dt);
        if occupied {
            return;
        }

        match selector.pick(&mut *self.rng) {
            Pick::Selected(index) => {
                selector.starved = false;
                let candidate = selector.begin(index, &mut *self.rng);
                let repeat_limit = selector.repeat_limit();
                selector.note_started(index);

                tracing::debug!(node = ?id, selector = %key, candidate = %candidate, repeat_limit, "candidate selected");
                self.emit("beh.select", id, index as u64);

                if let Err(err) = self.spawn(world, Some(id), candidate, None, true, true) {
                    tracing::debug!(node = ?id, %err, "selected candidate did not start");
                    if let Some(selector) = self.nodes.get_mut(id).and_then(|n| n.selector.as_mut()) {
                        selector.undo_start(index);
                    }
                }
            }
            Pick::Starved | Pick::Empty if selector.starved => {}
            pick => {
                selector.starved = true;
                if pick == Pick::Empty {
                    self.warn("selector.empty", format!("selector `{key}` ({id:?}) has no candidates"));
                } else {
                    self.warn(
                        "selector.starved",
                        format!("selector `{key}` ({id:?}) has no eligible weight"),
                    );
                }
            }
        }
    }
}
