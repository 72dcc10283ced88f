use crate::{rng, AgentId, SplitMix64};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-frame input from the host's tick driver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32, seed: u64) -> Self {
        Self {
            tick,
            dt_seconds,
            seed,
        }
    }

    /// Frame delta clamped to a non-negative, finite value.
    pub fn delta(&self) -> f32 {
        if self.dt_seconds.is_finite() {
            self.dt_seconds.max(0.0)
        } else {
            0.0
        }
    }

    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, agent.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
