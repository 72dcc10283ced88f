//! Weighted-random candidate selection with cooldown, per-stage and repeat bookkeeping.
//!
//! Everything here is pure state; the runtime decides when to call it and
//! instantiates whatever it picks.

use ai_core::RandomSource;

use crate::{BehaviorKey, CandidateDef};

/// A candidate plus its mutable runtime counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub def: CandidateDef,
    pub per_stage_count: u32,
    pub cooldown_remaining: f32,
}

impl Candidate {
    pub fn new(def: CandidateDef) -> Self {
        Self {
            def,
            per_stage_count: 0,
            cooldown_remaining: 0.0,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.cooldown_remaining <= 0.0
            && (self.def.max_per_stage == 0 || self.per_stage_count < self.def.max_per_stage)
    }

    /// Weight that participates in the draw. Non-positive or NaN weights never win.
    fn draw_weight(&self) -> f32 {
        if self.is_eligible() && self.def.weight > 0.0 {
            self.def.weight
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Selected(usize),
    /// Eligible weight sums to zero; nothing runs this tick.
    Starved,
    Empty,
}

/// Stable left-to-right threshold scan over eligible candidates.
///
/// Draws `r` in `[0, total)` and returns the first candidate whose accumulated
/// weight reaches `r`, so declaration order is part of the contract.
pub fn pick(candidates: &[Candidate], rng: &mut dyn RandomSource) -> Pick {
    if candidates.is_empty() {
        return Pick::Empty;
    }

    let total: f32 = candidates.iter().map(Candidate::draw_weight).sum();
    if total <= 0.0 {
        return Pick::Starved;
    }

    let r = rng.range_f32(0.0, total);
    let mut accumulated = 0.0;
    let mut last = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let w = candidate.draw_weight();
        if w <= 0.0 {
            continue;
        }
        accumulated += w;
        last = Some(i);
        if accumulated >= r {
            return Pick::Selected(i);
        }
    }

    // Only reachable through float rounding; the last eligible candidate owns the tail.
    last.map(Pick::Selected).unwrap_or(Pick::Starved)
}

/// Runtime state of a selector node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorState {
    candidates: Vec<Candidate>,
    selected: Option<usize>,
    repeat_count: u32,
    repeat_limit: u32,
    pub(crate) starved: bool,
}

impl SelectorState {
    pub fn new(defs: &[CandidateDef]) -> Self {
        Self {
            candidates: defs.iter().cloned().map(Candidate::new).collect(),
            ..Self::default()
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate_mut(&mut self, index: usize) -> Option<&mut Candidate> {
        self.candidates.get_mut(index)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn repeat_limit(&self) -> u32 {
        self.repeat_limit
    }

    /// Reduce every cooldown by `dt`, clamped at zero.
    pub fn decay(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for c in &mut self.candidates {
            c.cooldown_remaining = (c.cooldown_remaining - dt).max(0.0);
        }
    }

    /// Reset per-stage counters ("new stage" signal).
    pub fn new_stage(&mut self) {
        for c in &mut self.candidates {
            c.per_stage_count = 0;
        }
        self.starved = false;
    }

    pub fn pick(&self, rng: &mut dyn RandomSource) -> Pick {
        pick(&self.candidates, rng)
    }

    /// Record a fresh selection and draw its repeat budget. Returns the behavior to run.
    pub(crate) fn begin(&mut self, index: usize, rng: &mut dyn RandomSource) -> BehaviorKey {
        let candidate = &self.candidates[index];
        self.selected = Some(index);
        self.repeat_limit = rng.range_u32(0, candidate.def.max_rand_repeat);
        self.repeat_count = 0;
        candidate.def.behavior
    }

    pub(crate) fn note_started(&mut self, index: usize) {
        if let Some(c) = self.candidates.get_mut(index) {
            c.per_stage_count = c.per_stage_count.saturating_add(1);
        }
    }

    pub(crate) fn undo_start(&mut self, index: usize) {
        if let Some(c) = self.candidates.get_mut(index) {
            c.per_stage_count = c.per_stage_count.saturating_sub(1);
        }
    }

    /// Apply the repeat-on-completion rule for the selected candidate.
    ///
    /// Returns the behavior to re-run, or `None` once the candidate went on cooldown.
    pub(crate) fn on_selected_finished(&mut self, may_repeat: bool) -> Option<BehaviorKey> {
        let index = self.selected?;
        if may_repeat && self.repeat_count < self.repeat_limit {
            self.repeat_count += 1;
            return Some(self.candidates[index].def.behavior);
        }
        self.apply_cooldown(index);
        None
    }

    pub(crate) fn apply_cooldown(&mut self, index: usize) {
        if let Some(c) = self.candidates.get_mut(index) {
            c.cooldown_remaining = if c.def.cooldown.is_finite() {
                c.def.cooldown.max(0.0)
            } else {
                0.0
            };
        }
    }
}
