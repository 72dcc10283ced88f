//! One-shot timers keyed by opaque tokens.
//!
//! Timers carry a payload instead of a closure: the owner decides what a fired
//! payload means (for the behavior runtime it is a node continuation that is
//! validated against the node's generation before it runs).

use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimerToken(pub u64);

/// Host capability for delayed continuations.
///
/// A scheduled payload fires at most once and never after `cancel` returned `true`.
pub trait TimerService<T> {
    fn schedule_once(&mut self, delay_seconds: f32, payload: T) -> TimerToken;

    fn cancel(&mut self, token: TimerToken) -> bool;
}

#[derive(Debug, Clone)]
struct PendingTimer<T> {
    due: f64,
    token: TimerToken,
    payload: T,
}

/// Deterministic timer wheel driven by frame deltas.
///
/// Due timers are returned ordered by `(due time, token)`, so timers scheduled
/// for the same instant fire in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: f64,
    next_token: u64,
    pending: Vec<PendingTimer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_token: 1,
            pending: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since the queue was created.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.iter().any(|p| p.token == token)
    }

    /// Advance the clock by `dt_seconds` and remove every timer that became due.
    pub fn advance(&mut self, dt_seconds: f32) -> Vec<(TimerToken, T)> {
        if dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.now += dt_seconds as f64;
        }

        let now = self.now;
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }

        due.sort_by(|a, b| {
            a.due
                .partial_cmp(&b.due)
                .unwrap_or(Ordering::Equal)
                .then(a.token.cmp(&b.token))
        });
        due.into_iter().map(|p| (p.token, p.payload)).collect()
    }

    /// Cancel every pending timer whose payload matches `pred`. Returns how many were removed.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !pred(&p.payload));
        before - self.pending.len()
    }
}

impl<T> TimerService<T> for TimerQueue<T> {
    fn schedule_once(&mut self, delay_seconds: f32, payload: T) -> TimerToken {
        let delay = if delay_seconds.is_finite() {
            delay_seconds.max(0.0) as f64
        } else {
            0.0
        };
        let token = TimerToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.pending.push(PendingTimer {
            due: self.now + delay,
            token,
            payload,
        });
        token
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.token != token);
        before != self.pending.len()
    }
}
