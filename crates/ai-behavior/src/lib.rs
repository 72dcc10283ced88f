//! Hierarchical behavior scheduler built on `ai-core`.
//!
//! Each agent owns a [`BehaviorRuntime`]: an arena of behavior nodes forming one
//! active chain (plus independent parallel roots). The runtime arbitrates which
//! child runs when requests collide, defers finalization while a chain is
//! interrupted, cascades finishes bottom-up and drives weighted-random selector
//! nodes with cooldown, per-stage and repeat rules.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod behavior;
pub mod config;
pub mod def;
pub mod driver;
pub mod error;
mod finish;
pub mod host;
pub mod kind;
pub mod leaves;
pub mod node;
pub mod observer;
pub mod registry;
pub mod runtime;
mod scheduler;
pub mod selector;

pub use behavior::{Behavior, BehaviorCx, NoopBehavior};
pub use config::{PreemptionPolicy, SchedulerConfig};
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub use config::{BehaviorSetConfig, BehaviorTuning, CandidateTuning};
pub use def::{BehaviorDef, CandidateDef};
pub use driver::tick_runtimes;
pub use error::{BehaviorError, Result};
pub use host::{
    AnimationError, AnimationId, AnimationProvider, MoveOutcome, MoveRequest, MoveStartError,
    MovementProvider, Vec3,
};
pub use kind::{reason, BehaviorKey, BehaviorKind, BehaviorResult, LifecycleState, Priority, DEFAULT_PRIORITY};
pub use leaves::{MoveTo, PlayAnimation, Wait, MOVEMENT_GROUP, MOVE_TO, PLAY_ANIMATION, WAIT};
pub use node::{BehaviorNode, NodeId};
pub use observer::{FinishOutcome, FinishRecord};
pub use registry::{BehaviorRegistry, ConfigIssue};
pub use runtime::BehaviorRuntime;
pub use selector::{Candidate, Pick, SelectorState};
