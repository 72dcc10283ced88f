#[cfg(feature = "serde")]
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::{BehaviorKind, Priority, Result};

/// Whether an interrupted active child shields its slot from more important requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PreemptionPolicy {
    /// A newcomer displaces the active child only if that child is not interrupted;
    /// otherwise it is queued.
    #[default]
    RequireUninterrupted,
    /// Priority alone decides; interruption only defers finalization.
    IgnoreInterruption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    pub preemption: PreemptionPolicy,
    /// Diagnostics kept by the runtime before the oldest are evicted.
    pub diagnostics_capacity: usize,
    /// Finish records kept by the runtime before the oldest are evicted.
    pub finished_capacity: usize,
    /// Emit scheduler events to the attached trace sink.
    pub trace: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            preemption: PreemptionPolicy::default(),
            diagnostics_capacity: 256,
            finished_capacity: 256,
            trace: true,
        }
    }
}

/// Data-driven tuning for a set of registered behaviors.
///
/// ```yaml
/// scheduler:
///   preemption: ignore_interruption
/// behaviors:
///   idle:
///     kind: selector
///     candidates:
///       - { behavior: wander, weight: 2.0, cooldown: 5.0 }
///       - { behavior: look_around, weight: 1.0, max_per_stage: 3 }
///   alert:
///     priority: 10
/// ```
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorSetConfig {
    pub scheduler: SchedulerConfig,
    pub behaviors: BTreeMap<String, BehaviorTuning>,
}

#[cfg(feature = "serde")]
impl BehaviorSetConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Overrides for one registered behavior. Absent fields keep the registered value.
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BehaviorTuning {
    pub kind: Option<BehaviorKind>,
    pub priority: Option<Priority>,
    pub candidates: Option<Vec<CandidateTuning>>,
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateTuning {
    pub behavior: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub cooldown: f32,
    #[serde(default)]
    pub max_per_stage: u32,
    #[serde(default)]
    pub max_rand_repeat: u32,
}

#[cfg(feature = "serde")]
fn default_weight() -> f32 {
    0.5
}
