use std::borrow::Cow;

use ai_core::WorldMut;

use crate::node::ChildFinished;
use crate::observer::{FinishOutcome, FinishRecord};
use crate::{
    reason, BehaviorError, BehaviorKey, BehaviorResult, BehaviorRuntime, LifecycleState, NodeId,
    Result,
};

impl<W> BehaviorRuntime<W>
where
    W: WorldMut + 'static,
{
    /// Finish `id` with `result`. Active children are force-finished first.
    ///
    /// While the node is interrupted the request is latched and replayed on a later
    /// tick with the originally recorded result. Repeated requests only warn.
    pub fn request_finish(
        &mut self,
        world: &mut W,
        id: NodeId,
        result: BehaviorResult,
        reason: Option<&'static str>,
    ) -> Result<FinishOutcome> {
        self.finish_node(world, id, result, reason.map(Cow::Borrowed))
    }

    pub(crate) fn finish_node(
        &mut self,
        world: &mut W,
        id: NodeId,
        result: BehaviorResult,
        reason: Option<Cow<'static, str>>,
    ) -> Result<FinishOutcome> {
        let Some(node) = self.nodes.get_mut(id) else {
            self.warn("finish.released", format!("finish requested on released node {id:?}"));
            return Err(BehaviorError::NodeReleased(id));
        };

        if node.finishing || node.state == LifecycleState::Finished {
            let key = node.key;
            self.warn("finish.repeat", format!("`{key}` ({id:?}) is already finishing"));
            return Err(BehaviorError::AlreadyFinishing(id));
        }

        if node.state == LifecycleState::Uninitialized {
            self.discard(id);
            return Ok(FinishOutcome::Discarded);
        }

        node.finishing = true;
        node.finish = Some((result, reason));
        let children: Vec<NodeId> = node
            .active_child
            .into_iter()
            .chain(node.detached.iter().copied())
            .collect();

        for child in children {
            if self.nodes.get(child).is_some_and(|c| !c.finishing) {
                let _ = self.finish_node(
                    world,
                    child,
                    BehaviorResult::Skipped,
                    Some(Cow::Borrowed(reason::ABORTED)),
                );
            }
        }

        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(FinishOutcome::Finalized);
        };
        if node.interrupted
            || node.in_hook()
            || node.active_child.is_some()
            || !node.detached.is_empty()
        {
            node.pending_finish = true;
            let (key, interrupted) = (node.key, node.interrupted);
            tracing::debug!(node = ?id, behavior = %key, interrupted, "finish deferred");
            self.emit("beh.defer", id, interrupted as u64);
            return Ok(FinishOutcome::Deferred);
        }

        self.finalize(world, id);
        Ok(FinishOutcome::Finalized)
    }

    pub(crate) fn finalize_ready(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| {
            n.finishing
                && n.pending_finish
                && !n.interrupted
                && !n.in_hook()
                && n.active_child.is_none()
                && n.detached.is_empty()
                && n.state != LifecycleState::Finished
        })
    }

    /// Finish hook, `Finished`, observers, parent notification, repeat rule, release.
    pub(crate) fn finalize(&mut self, world: &mut W, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.state == LifecycleState::Finished {
            return;
        }
        node.pending_finish = false;
        node.finishing = true;
        let queued = node.queued.take();
        let (result, finish_reason) = node
            .finish
            .clone()
            .unwrap_or((BehaviorResult::Skipped, None));

        if let Some(queued) = queued {
            self.discard(queued);
        }

        self.call_hook(world, id, |b, cx| {
            b.on_finish(cx, result, finish_reason.as_deref())
        });

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.state = LifecycleState::Finished;
        let key = node.key;
        let parent = node.parent;
        let owned = node.owned_by_selector;
        let displaced = node.displaced;
        let observers = std::mem::take(&mut node.observers);

        self.timers.cancel_where(|c| c.node == id);
        self.live.retain(|n| *n != id);

        tracing::debug!(node = ?id, behavior = %key, ?result, reason = ?finish_reason, "behavior finished");
        self.emit("beh.finalize", id, result as u64);

        let record = FinishRecord {
            node: id,
            key,
            result,
            reason: finish_reason.clone(),
            tick: self.tick,
        };
        for observer in observers {
            observer(&record);
        }
        self.record_finished(record);

        // Detach before notifying so the parent may fill its slot from `on_child_finish`.
        let in_slot = match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) if p.active_child == Some(id) => {
                p.active_child = None;
                true
            }
            Some(p) => {
                p.detached.retain(|n| *n != id);
                false
            }
            None => false,
        };

        self.nodes.remove(id);
        self.parallel.retain(|n| *n != id);
        if self.root == Some(id) {
            self.root = None;
        }

        let Some(parent) = parent else {
            return;
        };
        self.notify_parent(world, parent, key, result, finish_reason);
        if in_slot && owned {
            self.apply_repeat_rule(world, parent, displaced);
        }
        self.settle(world, parent);
    }

    fn notify_parent(
        &mut self,
        world: &mut W,
        parent: NodeId,
        child: BehaviorKey,
        result: BehaviorResult,
        reason: Option<Cow<'static, str>>,
    ) {
        let Some(node) = self.nodes.get_mut(parent) else {
            return;
        };
        if node.state == LifecycleState::Finished {
            return;
        }
        if node.in_hook() {
            node.inbox.push(ChildFinished {
                key: child,
                result,
                reason,
            });
            return;
        }
        self.call_hook(world, parent, |b, cx| {
            b.on_child_finish(cx, child, result, reason.as_deref())
        });
    }

    /// Re-run the selected candidate while repeats remain, otherwise start its cooldown.
    fn apply_repeat_rule(&mut self, world: &mut W, parent: NodeId, displaced: bool) {
        let Some(node) = self.nodes.get_mut(parent) else {
            return;
        };
        let may_repeat = !displaced
            && !node.finishing
            && node.state == LifecycleState::Active
            && node.active_child.is_none();
        let Some(selector) = node.selector.as_mut() else {
            return;
        };
        let Some(index) = selector.selected() else {
            return;
        };

        match selector.on_selected_finished(may_repeat) {
            Some(candidate) => {
                let repeat = selector.repeat_count();
                tracing::debug!(node = ?parent, candidate = %candidate, repeat, "repeating candidate");
                self.emit("beh.repeat", parent, repeat as u64);
                if let Err(err) = self.spawn(world, Some(parent), candidate, None, true, true) {
                    tracing::debug!(node = ?parent, %err, "repeat did not start");
                }
            }
            None => {
                tracing::trace!(node = ?parent, index, "candidate cooling down");
                self.emit("beh.cooldown", parent, index as u64);
            }
        }
    }

    /// Drop a node that never left the queue.
    pub(crate) fn discard(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p)) {
            if parent.queued == Some(id) {
                parent.queued = None;
            }
        }

        tracing::debug!(node = ?id, behavior = %node.key, "queued behavior discarded");
        let record = FinishRecord {
            node: id,
            key: node.key,
            result: BehaviorResult::Skipped,
            reason: Some(Cow::Borrowed(reason::DISCARDED)),
            tick: self.tick,
        };
        for observer in node.observers {
            observer(&record);
        }
        self.record_finished(record);
    }

    /// Set the interruption flag of `id` and every ancestor up to the root.
    ///
    /// Interruption never aborts work; it only holds back finalization.
    pub fn set_interrupted(&mut self, id: NodeId, interrupted: bool) -> Result<()> {
        if !self.nodes.contains_key(id) {
            self.warn("node.released", format!("cannot interrupt released node {id:?}"));
            return Err(BehaviorError::NodeReleased(id));
        }

        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get_mut(c)) {
            node.interrupted = interrupted;
            current = node.parent;
        }
        tracing::trace!(node = ?id, interrupted, "interruption propagated");
        Ok(())
    }

    /// Reset per-stage counters of the selector at `id`. Non-selectors are left as is.
    pub fn new_stage(&mut self, id: NodeId) -> Result<()> {
        let Some(node) = self.nodes.get_mut(id) else {
            self.warn("node.released", format!("new stage on released node {id:?}"));
            return Err(BehaviorError::NodeReleased(id));
        };
        if let Some(selector) = node.selector.as_mut() {
            selector.new_stage();
        }
        Ok(())
    }

    /// Reset per-stage counters of every live selector.
    pub fn new_stage_all(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            if let Some(selector) = node.selector.as_mut() {
                selector.new_stage();
            }
        }
    }
}
