#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use ai_behavior::{
    AnimationError, AnimationId, AnimationProvider, Behavior, BehaviorCx, BehaviorDef, BehaviorKey,
    BehaviorRegistry, BehaviorResult, BehaviorRuntime, MoveOutcome, MoveRequest, MoveStartError,
    MovementProvider, NodeId,
};
use ai_core::{RandomSource, TickContext, WorldMut, WorldView};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Default)]
pub struct RecordingWorld {
    pub log: Vec<String>,
    pub has_controller: bool,
    pub reject_moves: Option<MoveOutcome>,
    pub moves: Vec<MoveRequest>,
    pub stopped: Vec<NodeId>,
    pub has_character: bool,
    pub animations: BTreeMap<&'static str, f32>,
    pub played: Vec<(&'static str, bool)>,
    pub resets: u32,
    /// `(animation, ran_to_end)` per finished playback node.
    pub completed: Vec<(&'static str, bool)>,
}

impl RecordingWorld {
    pub fn new() -> Self {
        Self {
            has_controller: true,
            has_character: true,
            ..Self::default()
        }
    }

    pub fn entries(&self, prefix: &str) -> Vec<&str> {
        self.log
            .iter()
            .filter(|l| l.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl WorldView for RecordingWorld {
    type Agent = u64;
}

impl WorldMut for RecordingWorld {}

impl MovementProvider for RecordingWorld {
    fn start_move(&mut self, _agent: u64, request: MoveRequest) -> Result<(), MoveStartError> {
        if !self.has_controller {
            return Err(MoveStartError::NoController);
        }
        if let Some(outcome) = self.reject_moves {
            return Err(MoveStartError::Rejected(outcome));
        }
        self.moves.push(request);
        Ok(())
    }

    fn stop_move(&mut self, _agent: u64, requester: NodeId) {
        self.stopped.push(requester);
    }
}

impl AnimationProvider for RecordingWorld {
    fn play_animation(
        &mut self,
        _agent: u64,
        animation: AnimationId,
        looping: bool,
    ) -> Result<f32, AnimationError> {
        if !self.has_character {
            return Err(AnimationError::NoCharacter);
        }
        let duration = self
            .animations
            .get(animation.0)
            .copied()
            .ok_or(AnimationError::UnknownAnimation)?;
        self.played.push((animation.0, looping));
        Ok(duration)
    }

    fn reset_animation(&mut self, _agent: u64) {
        self.resets += 1;
    }

    fn animation_finished(&mut self, _agent: u64, animation: AnimationId, played: bool) {
        self.completed.push((animation.0, played));
    }
}

/// Logs every hook into `RecordingWorld::log`.
#[derive(Debug, Clone, Copy)]
pub struct Recorder {
    pub name: &'static str,
}

impl Behavior<RecordingWorld> for Recorder {
    fn on_start(&mut self, cx: &mut BehaviorCx<'_, RecordingWorld>) {
        cx.world().log.push(format!("start:{}", self.name));
    }

    fn on_tick(&mut self, cx: &mut BehaviorCx<'_, RecordingWorld>, _dt: f32) {
        cx.world().log.push(format!("tick:{}", self.name));
    }

    fn on_finish(
        &mut self,
        cx: &mut BehaviorCx<'_, RecordingWorld>,
        result: BehaviorResult,
        reason: Option<&str>,
    ) {
        cx.world().log.push(format!(
            "finish:{}:{:?}:{}",
            self.name,
            result,
            reason.unwrap_or("-")
        ));
    }

    fn on_child_finish(
        &mut self,
        cx: &mut BehaviorCx<'_, RecordingWorld>,
        child: BehaviorKey,
        result: BehaviorResult,
        reason: Option<&str>,
    ) {
        cx.world().log.push(format!(
            "child:{}<-{}:{:?}:{}",
            self.name,
            child,
            result,
            reason.unwrap_or("-")
        ));
    }
}

/// Finishes itself with `Success` on its first tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinishOnTick;

impl<W> Behavior<W> for FinishOnTick
where
    W: WorldMut + 'static,
{
    fn on_tick(&mut self, cx: &mut BehaviorCx<'_, W>, _dt: f32) {
        let _ = cx.succeed();
    }
}

pub fn register_recorder(registry: &mut BehaviorRegistry<RecordingWorld>, def: BehaviorDef) {
    let name = def.key.name();
    registry.register(def, move || Box::new(Recorder { name }));
}

pub fn runtime(registry: BehaviorRegistry<RecordingWorld>) -> BehaviorRuntime<RecordingWorld> {
    init_tracing();
    BehaviorRuntime::new(1, Rc::new(registry))
}

pub fn ctx(tick: u64, dt_seconds: f32) -> TickContext {
    TickContext::new(tick, dt_seconds, 0)
}

/// Replays fixed draws; falls back to the low bound once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedRng {
    pub floats: VecDeque<f32>,
    pub ints: VecDeque<u32>,
}

impl ScriptedRng {
    pub fn new(floats: &[f32], ints: &[u32]) -> Self {
        Self {
            floats: floats.iter().copied().collect(),
            ints: ints.iter().copied().collect(),
        }
    }
}

impl RandomSource for ScriptedRng {
    fn range_f32(&mut self, lo: f32, _hi: f32) -> f32 {
        self.floats.pop_front().unwrap_or(lo)
    }

    fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        self.ints.pop_front().map(|v| v.clamp(lo, hi.max(lo))).unwrap_or(lo)
    }
}
