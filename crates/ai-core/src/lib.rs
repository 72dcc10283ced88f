//! Deterministic, engine-agnostic kernel primitives shared by the behavior runtime.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod rng;
pub mod tick;
pub mod timer;
pub mod world;

pub use rng::{DeterministicRng, RandomSource, SplitMix64};
pub use tick::TickContext;
pub use timer::{TimerQueue, TimerService, TimerToken};
pub use world::{AgentId, WorldMut, WorldView};
