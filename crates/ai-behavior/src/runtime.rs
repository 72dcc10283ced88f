//! Per-agent behavior runtime: node arena, hook dispatch, timers and queries.
//!
//! Admission and queueing live in `scheduler.rs`; finish and interruption in
//! `finish.rs`. Both are further `impl` blocks on [`BehaviorRuntime`].

use std::collections::VecDeque;
use std::rc::Rc;

use ai_core::{rng, AgentId, RandomSource, SplitMix64, TickContext, TimerQueue, WorldMut};
use ai_tools::{DiagnosticLog, DiagnosticSink, TraceEvent, TraceSink};
use slotmap::{Key, SlotMap};

use crate::node::BehaviorNode;
use crate::observer::FinishRecord;
use crate::selector::SelectorState;
use crate::{
    Behavior, BehaviorCx, BehaviorError, BehaviorRegistry, LifecycleState, MoveOutcome, NodeId,
    Result, SchedulerConfig,
};

const RNG_STREAM: u64 = 0xB5E1_EC70;

/// Delayed hook invocation, validated against the node's generation when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Continuation {
    pub node: NodeId,
    pub tag: u64,
}

pub struct BehaviorRuntime<W>
where
    W: WorldMut + 'static,
{
    agent: W::Agent,
    pub(crate) registry: Rc<BehaviorRegistry<W>>,
    pub(crate) config: SchedulerConfig,
    pub(crate) nodes: SlotMap<NodeId, BehaviorNode<W>>,
    pub(crate) root: Option<NodeId>,
    pub(crate) parallel: Vec<NodeId>,
    /// Active nodes in activation order.
    pub(crate) live: Vec<NodeId>,
    pub(crate) timers: TimerQueue<Continuation>,
    pub(crate) rng: Box<dyn RandomSource>,
    pub(crate) diagnostics: DiagnosticLog,
    trace: Option<Box<dyn TraceSink>>,
    pub(crate) tick: u64,
    pub(crate) finished: VecDeque<FinishRecord>,
    finished_dropped: u64,
}

impl<W> BehaviorRuntime<W>
where
    W: WorldMut + 'static,
{
    pub fn new(agent: W::Agent, registry: Rc<BehaviorRegistry<W>>) -> Self {
        Self::with_config(agent, registry, SchedulerConfig::default())
    }

    pub fn with_config(
        agent: W::Agent,
        registry: Rc<BehaviorRegistry<W>>,
        config: SchedulerConfig,
    ) -> Self {
        let mut diagnostics = DiagnosticLog::with_capacity(config.diagnostics_capacity);
        for issue in registry.validate() {
            diagnostics.error(0, issue.code, issue.context);
        }

        Self {
            agent,
            registry,
            config,
            nodes: SlotMap::with_key(),
            root: None,
            parallel: Vec::new(),
            live: Vec::new(),
            timers: TimerQueue::new(),
            rng: Box::new(SplitMix64::new(rng::derive_seed(
                0,
                agent.stable_id(),
                RNG_STREAM,
            ))),
            diagnostics,
            trace: None,
            tick: 0,
            finished: VecDeque::new(),
            finished_dropped: 0,
        }
    }

    /// Reseed the selector RNG from `(seed, agent, stream)`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Box::new(SplitMix64::new(rng::derive_seed(
            seed,
            self.agent.stable_id(),
            RNG_STREAM,
        )));
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Forward diagnostics to `sink` in addition to the runtime's own log.
    pub fn with_diagnostic_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.diagnostics.set_forward(sink);
        self
    }

    pub fn agent(&self) -> W::Agent {
        self.agent
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Rc<BehaviorRegistry<W>> {
        &self.registry
    }

    /// Tick number of the last [`BehaviorRuntime::tick`] call.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Deliver due timers, then tick every active node in activation order.
    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) {
        self.tick = ctx.tick;
        let dt = ctx.delta();

        for (_token, continuation) in self.timers.advance(dt) {
            self.deliver_timer(world, continuation);
        }

        let order = self.live.clone();
        for id in order {
            self.tick_node(world, id, dt);
        }
    }

    /// Report the terminal result of a movement request issued by `node`.
    ///
    /// Returns `false` (and does nothing) if the node already finalized or is finishing.
    pub fn complete_move(&mut self, world: &mut W, node: NodeId, outcome: MoveOutcome) -> bool {
        if !self.accepts_continuations(node) {
            tracing::debug!(node = ?node, ?outcome, "stale move completion dropped");
            return false;
        }
        self.call_hook(world, node, |b, cx| b.on_move_complete(cx, outcome));
        self.settle(world, node);
        true
    }

    /// Register a callback invoked once, synchronously, when `node` finalizes.
    pub fn observe_finish<F>(&mut self, node: NodeId, observer: F) -> Result<()>
    where
        F: FnOnce(&FinishRecord) + 'static,
    {
        match self.nodes.get_mut(node) {
            Some(n) if n.state != LifecycleState::Finished => {
                n.observers.push(Box::new(observer));
                Ok(())
            }
            _ => {
                self.warn("node.released", format!("cannot observe released node {node:?}"));
                Err(BehaviorError::NodeReleased(node))
            }
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&BehaviorNode<W>> {
        self.nodes.get(id)
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn parallel_roots(&self) -> &[NodeId] {
        &self.parallel
    }

    /// Active nodes in the order they were activated.
    pub fn active_nodes(&self) -> &[NodeId] {
        &self.live
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn active_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.active_child)
    }

    pub fn queued(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.queued)
    }

    /// Topmost ancestor of `id` (the behavior owner of its chain).
    pub fn chain_root(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes.get(id).map(|_| id)?;
        while let Some(parent) = self.parent(current).filter(|p| self.nodes.contains_key(*p)) {
            current = parent;
        }
        Some(current)
    }

    /// Deepest node reached by following active children from `id`.
    pub fn last_in_chain(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes.get(id).map(|_| id)?;
        while let Some(child) = self.active_child(current) {
            current = child;
        }
        Some(current)
    }

    /// Behavior names along the active chain, starting with the root.
    pub fn debug_hierarchy(&self) -> Vec<&'static str> {
        match self.root {
            Some(root) => self.debug_hierarchy_from(root),
            None => Vec::new(),
        }
    }

    pub fn debug_hierarchy_from(&self, id: NodeId) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c)) {
            names.push(node.key.name());
            current = node.active_child;
        }
        names
    }

    pub fn selector(&self, id: NodeId) -> Option<&SelectorState> {
        self.nodes.get(id).and_then(|n| n.selector.as_ref())
    }

    /// Records of nodes that finalized (or were discarded) since the last `take_finished`.
    ///
    /// Holds at most `finished_capacity` records; older ones are evicted.
    pub fn finished(&self) -> &VecDeque<FinishRecord> {
        &self.finished
    }

    pub fn take_finished(&mut self) -> Vec<FinishRecord> {
        self.finished.drain(..).collect()
    }

    /// Records evicted from `finished` because nobody drained them in time.
    pub fn finished_dropped(&self) -> u64 {
        self.finished_dropped
    }

    pub(crate) fn record_finished(&mut self, record: FinishRecord) {
        if self.finished.len() >= self.config.finished_capacity.max(1) {
            self.finished.pop_front();
            self.finished_dropped += 1;
        }
        self.finished.push_back(record);
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.diagnostics
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn warn(&mut self, code: &'static str, context: String) {
        self.diagnostics.warn(self.tick, code, context);
    }

    pub(crate) fn error(&mut self, code: &'static str, context: String) {
        self.diagnostics.error(self.tick, code, context);
    }

    pub(crate) fn emit(&mut self, tag: &'static str, node: NodeId, value: u64) {
        if !self.config.trace {
            return;
        }
        if let Some(sink) = self.trace.as_mut() {
            sink.emit(
                TraceEvent::new(self.tick, tag)
                    .with_node(node.data().as_ffi())
                    .with_value(value),
            );
        }
    }

    pub(crate) fn accepts_continuations(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.accepts_continuations())
    }

    /// Run one hook of `id` with its behavior taken out of the arena.
    ///
    /// Returns `false` if the node is gone or one of its hooks is already running.
    pub(crate) fn call_hook<F>(&mut self, world: &mut W, id: NodeId, hook: F) -> bool
    where
        F: FnOnce(&mut dyn Behavior<W>, &mut BehaviorCx<'_, W>),
    {
        let Some(mut behavior) = self.nodes.get_mut(id).and_then(|n| n.behavior.take()) else {
            return false;
        };

        {
            let mut cx = BehaviorCx {
                runtime: &mut *self,
                world,
                node: id,
            };
            hook(&mut *behavior, &mut cx);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.behavior = Some(behavior);
        }
        true
    }

    /// Deliver child notifications buffered during a hook, then finalize a pending finish
    /// that is no longer blocked.
    pub(crate) fn settle(&mut self, world: &mut W, id: NodeId) {
        loop {
            let Some(node) = self.nodes.get_mut(id) else {
                return;
            };
            if node.in_hook() || node.inbox.is_empty() {
                break;
            }
            for note in std::mem::take(&mut node.inbox) {
                self.call_hook(world, id, |b, cx| {
                    b.on_child_finish(cx, note.key, note.result, note.reason.as_deref())
                });
            }
        }

        if self.finalize_ready(id) {
            self.finalize(world, id);
        }
    }

    fn deliver_timer(&mut self, world: &mut W, continuation: Continuation) {
        if !self.accepts_continuations(continuation.node) {
            tracing::trace!(node = ?continuation.node, tag = continuation.tag, "stale timer dropped");
            return;
        }
        self.call_hook(world, continuation.node, |b, cx| {
            b.on_timer(cx, continuation.tag)
        });
        self.settle(world, continuation.node);
    }
}

impl<W> core::fmt::Debug for BehaviorRuntime<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BehaviorRuntime")
            .field("agent", &self.agent)
            .field("tick", &self.tick)
            .field("root", &self.root)
            .field("parallel", &self.parallel)
            .field("live", &self.live)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
