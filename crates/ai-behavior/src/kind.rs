use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lower value = more important. Ties favor the incoming request.
pub type Priority = u8;

pub const DEFAULT_PRIORITY: Priority = 127;

/// Registered behavior type, e.g. `BehaviorKey("patrol")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BehaviorKey(pub &'static str);

impl BehaviorKey {
    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for BehaviorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How a node is admitted relative to its requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BehaviorKind {
    /// Runs exclusively in its parent's single active-child slot.
    #[default]
    Standalone,
    /// Independent root; never queued, never preempted by sibling priority.
    Parallel,
    /// Owns a weighted candidate array and picks children from it.
    Selector,
}

/// Forward-only node lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Uninitialized,
    AwaitingActivation,
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BehaviorResult {
    Success,
    Failed,
    Skipped,
}

/// Reason codes attached by the scheduler itself.
pub mod reason {
    /// Active child displaced by a more important request.
    pub const OVERRIDDEN: &str = "overridden";
    /// Child force-finished because its parent finished.
    pub const ABORTED: &str = "aborted";
    /// Queued node replaced by a newer request before it ever started.
    pub const DISCARDED: &str = "discarded";
}
