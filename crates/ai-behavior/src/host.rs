//! Capability traits the host world implements for the built-in leaf behaviors.
//!
//! The scheduler itself only needs [`ai_core::WorldMut`]; movement and animation are
//! extension traits so hosts without them can still run custom behaviors.

use core::ops::Sub;

use ai_core::WorldMut;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BehaviorResult, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Terminal result of a movement request, reported exactly once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveOutcome {
    Success,
    Blocked,
    OffPath,
    Aborted,
    Invalid,
}

impl MoveOutcome {
    pub const ALL: [MoveOutcome; 5] = [
        MoveOutcome::Success,
        MoveOutcome::Blocked,
        MoveOutcome::OffPath,
        MoveOutcome::Aborted,
        MoveOutcome::Invalid,
    ];

    /// Finish result and reason code a movement behavior reports for this outcome.
    pub fn finish(self) -> (BehaviorResult, Option<&'static str>) {
        match self {
            MoveOutcome::Success => (BehaviorResult::Success, None),
            MoveOutcome::Blocked => (BehaviorResult::Failed, Some("Blocked")),
            MoveOutcome::OffPath => (BehaviorResult::Failed, Some("OffPath")),
            MoveOutcome::Aborted => (BehaviorResult::Failed, Some("Aborted")),
            MoveOutcome::Invalid => (BehaviorResult::Failed, Some("Invalid")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Node to report back to via `BehaviorRuntime::complete_move`.
    pub requester: NodeId,
    pub target: Vec3,
    pub acceptance_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStartError {
    /// The agent has no movement controller.
    NoController,
    /// The request failed before any movement started.
    Rejected(MoveOutcome),
}

pub trait MovementProvider: WorldMut {
    /// Start an asynchronous move. Completion is reported through
    /// `BehaviorRuntime::complete_move(world, request.requester, outcome)`.
    fn start_move(&mut self, agent: Self::Agent, request: MoveRequest) -> Result<(), MoveStartError>;

    fn stop_move(&mut self, agent: Self::Agent, requester: NodeId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimationId(pub &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationError {
    /// Nothing on the agent can play animations.
    NoCharacter,
    UnknownAnimation,
}

pub trait AnimationProvider: WorldMut {
    /// Start playback and return its duration in seconds (ignored for looping playback).
    fn play_animation(
        &mut self,
        agent: Self::Agent,
        animation: AnimationId,
        looping: bool,
    ) -> Result<f32, AnimationError>;

    /// Return the agent to its default pose.
    fn reset_animation(&mut self, agent: Self::Agent);

    /// Called once when a started playback node finishes. `played` is true only
    /// when non-looping playback ran to its end.
    fn animation_finished(&mut self, _agent: Self::Agent, _animation: AnimationId, _played: bool) {}
}
