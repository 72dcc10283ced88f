use crate::{BehaviorKey, BehaviorKind, Priority, DEFAULT_PRIORITY};

/// One weighted entry of a selector's candidate array.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDef {
    pub behavior: BehaviorKey,
    pub weight: f32,
    /// Seconds the candidate stays ineligible once its repeats are exhausted.
    pub cooldown: f32,
    /// Runs allowed per stage; `0` means unlimited.
    pub max_per_stage: u32,
    /// Upper bound (inclusive) of the random repeat count drawn on selection.
    pub max_rand_repeat: u32,
}

impl CandidateDef {
    pub fn new(behavior: BehaviorKey, weight: f32) -> Self {
        Self {
            behavior,
            weight,
            cooldown: 0.0,
            max_per_stage: 0,
            max_rand_repeat: 0,
        }
    }

    pub fn with_cooldown(mut self, seconds: f32) -> Self {
        self.cooldown = seconds;
        self
    }

    pub fn with_max_per_stage(mut self, max: u32) -> Self {
        self.max_per_stage = max;
        self
    }

    pub fn with_max_rand_repeat(mut self, max: u32) -> Self {
        self.max_rand_repeat = max;
        self
    }
}

/// Static description of a registered behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorDef {
    pub key: BehaviorKey,
    pub kind: BehaviorKind,
    pub priority: Priority,
    /// Only meaningful for `BehaviorKind::Selector`.
    pub candidates: Vec<CandidateDef>,
    /// Behaviors sharing a group may not be nested inside one another (e.g. `"movement"`).
    pub exclusive: Option<&'static str>,
}

impl BehaviorDef {
    pub fn standalone(key: BehaviorKey) -> Self {
        Self {
            key,
            kind: BehaviorKind::Standalone,
            priority: DEFAULT_PRIORITY,
            candidates: Vec::new(),
            exclusive: None,
        }
    }

    pub fn parallel(key: BehaviorKey) -> Self {
        Self {
            kind: BehaviorKind::Parallel,
            ..Self::standalone(key)
        }
    }

    pub fn selector(key: BehaviorKey, candidates: Vec<CandidateDef>) -> Self {
        Self {
            kind: BehaviorKind::Selector,
            candidates,
            ..Self::standalone(key)
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_exclusive(mut self, group: &'static str) -> Self {
        self.exclusive = Some(group);
        self
    }
}
