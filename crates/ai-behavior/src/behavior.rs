use ai_core::{TimerService, TimerToken, WorldMut};

use crate::runtime::Continuation;
use crate::{
    AnimationId, AnimationProvider, BehaviorKey, BehaviorResult, BehaviorRuntime, FinishOutcome,
    MoveOutcome, MovementProvider, MoveTo, NodeId, PlayAnimation, Result, Vec3, Wait, MOVE_TO,
    PLAY_ANIMATION, WAIT,
};

/// Hooks of a concrete behavior type. Every hook has a no-op default.
///
/// Hooks run synchronously inside runtime calls. A node finishing itself from one of
/// its own hooks finalizes as soon as that hook returns.
pub trait Behavior<W>: 'static
where
    W: WorldMut + 'static,
{
    fn on_start(&mut self, _cx: &mut BehaviorCx<'_, W>) {}

    fn on_tick(&mut self, _cx: &mut BehaviorCx<'_, W>, _dt_seconds: f32) {}

    fn on_finish(
        &mut self,
        _cx: &mut BehaviorCx<'_, W>,
        _result: BehaviorResult,
        _reason: Option<&str>,
    ) {
    }

    fn on_child_finish(
        &mut self,
        _cx: &mut BehaviorCx<'_, W>,
        _child: BehaviorKey,
        _result: BehaviorResult,
        _reason: Option<&str>,
    ) {
    }

    /// A delay scheduled with [`BehaviorCx::delay`] fired.
    fn on_timer(&mut self, _cx: &mut BehaviorCx<'_, W>, _tag: u64) {}

    fn on_move_complete(&mut self, _cx: &mut BehaviorCx<'_, W>, _outcome: MoveOutcome) {}
}

/// Behavior without hooks; the default for definitions registered without a factory.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBehavior;

impl<W> Behavior<W> for NoopBehavior where W: WorldMut + 'static {}

/// What a hook may touch: the host world and the runtime that owns its node.
pub struct BehaviorCx<'a, W>
where
    W: WorldMut + 'static,
{
    pub(crate) runtime: &'a mut BehaviorRuntime<W>,
    pub(crate) world: &'a mut W,
    pub(crate) node: NodeId,
}

impl<'a, W> BehaviorCx<'a, W>
where
    W: WorldMut + 'static,
{
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn agent(&self) -> W::Agent {
        self.runtime.agent()
    }

    pub fn tick(&self) -> u64 {
        self.runtime.current_tick()
    }

    pub fn world(&mut self) -> &mut W {
        &mut *self.world
    }

    pub fn runtime(&self) -> &BehaviorRuntime<W> {
        &*self.runtime
    }

    pub fn is_interrupted(&self) -> bool {
        self.runtime
            .node(self.node)
            .is_some_and(|n| n.is_interrupted())
    }

    pub fn active_child(&self) -> Option<NodeId> {
        self.runtime.active_child(self.node)
    }

    /// Request `key` as a child of this node, ready immediately.
    pub fn run(&mut self, key: BehaviorKey) -> Result<NodeId> {
        self.runtime.run_behavior(self.world, Some(self.node), key)
    }

    /// Request `key` with an explicit instance; with `ready == false` the child waits for
    /// [`BehaviorCx::ready`].
    pub fn run_with(
        &mut self,
        key: BehaviorKey,
        behavior: Option<Box<dyn Behavior<W>>>,
        ready: bool,
    ) -> Result<NodeId> {
        self.runtime
            .run_behavior_with(self.world, Some(self.node), key, behavior, ready)
    }

    pub fn ready(&mut self, node: NodeId) -> Result<()> {
        self.runtime.request_ready(self.world, node)
    }

    pub fn finish(
        &mut self,
        result: BehaviorResult,
        reason: Option<&'static str>,
    ) -> Result<FinishOutcome> {
        self.runtime
            .request_finish(self.world, self.node, result, reason)
    }

    pub fn succeed(&mut self) -> Result<FinishOutcome> {
        self.finish(BehaviorResult::Success, None)
    }

    pub fn fail(&mut self, reason: &'static str) -> Result<FinishOutcome> {
        self.finish(BehaviorResult::Failed, Some(reason))
    }

    /// Finish another node (usually a child) on behalf of this one.
    pub fn finish_node(
        &mut self,
        node: NodeId,
        result: BehaviorResult,
        reason: Option<&'static str>,
    ) -> Result<FinishOutcome> {
        self.runtime.request_finish(self.world, node, result, reason)
    }

    pub fn set_interrupted(&mut self, interrupted: bool) -> Result<()> {
        self.runtime.set_interrupted(self.node, interrupted)
    }

    /// Schedule [`Behavior::on_timer`] with `tag` after `seconds`.
    ///
    /// The continuation is dropped if the node finalizes or starts finishing first.
    pub fn delay(&mut self, seconds: f32, tag: u64) -> TimerToken {
        self.runtime.timers.schedule_once(
            seconds,
            Continuation {
                node: self.node,
                tag,
            },
        )
    }

    pub fn cancel_delay(&mut self, token: TimerToken) -> bool {
        self.runtime.timers.cancel(token)
    }

    pub fn new_stage(&mut self) -> Result<()> {
        self.runtime.new_stage(self.node)
    }
}

impl<'a, W> BehaviorCx<'a, W>
where
    W: WorldMut + 'static,
{
    /// Run a [`Wait`] child for `seconds`.
    pub fn wait(&mut self, seconds: f32) -> Result<NodeId> {
        self.run_with(WAIT, Some(Box::new(Wait::new(seconds))), true)
    }
}

impl<'a, W> BehaviorCx<'a, W>
where
    W: MovementProvider + 'static,
{
    pub fn move_to(&mut self, target: Vec3, acceptance_radius: f32) -> Result<NodeId> {
        self.run_with(
            MOVE_TO,
            Some(Box::new(MoveTo::new(target, acceptance_radius))),
            true,
        )
    }
}

impl<'a, W> BehaviorCx<'a, W>
where
    W: AnimationProvider + 'static,
{
    pub fn play_animation(
        &mut self,
        animation: Option<AnimationId>,
        looping: bool,
        reset_pose: bool,
    ) -> Result<NodeId> {
        self.run_with(
            PLAY_ANIMATION,
            Some(Box::new(PlayAnimation::new(animation, looping, reset_pose))),
            true,
        )
    }
}
