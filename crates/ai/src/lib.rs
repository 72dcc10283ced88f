//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! `behavior` pulls in the hierarchical scheduler together with the kernel and tooling
//! crates it is built on.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(feature = "behavior")]
#[cfg_attr(docsrs, doc(cfg(feature = "behavior")))]
pub use ai_behavior as behavior;

/// Everything a host needs to register behaviors and drive runtimes.
#[cfg(feature = "behavior")]
#[cfg_attr(docsrs, doc(cfg(feature = "behavior")))]
pub mod prelude {
    pub use ai_behavior::{
        tick_runtimes, Behavior, BehaviorCx, BehaviorDef, BehaviorKey, BehaviorKind,
        BehaviorRegistry, BehaviorResult, BehaviorRuntime, CandidateDef, NodeId, SchedulerConfig,
    };
    pub use ai_core::{AgentId, TickContext, WorldMut, WorldView};
}
