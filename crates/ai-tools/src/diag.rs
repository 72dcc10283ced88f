//! Structured diagnostics.
//!
//! Warnings and errors raised by the scheduler are routed through a [`DiagnosticSink`]
//! instead of a process-wide logger, so tests can assert on them. [`DiagnosticLog`]
//! keeps a bounded history and mirrors every entry into `tracing`.

use std::borrow::Cow;
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    pub tick: u64,
    pub severity: Severity,
    /// Stable, machine-matchable code such as `finish.repeat`.
    pub code: Cow<'static, str>,
    /// Free-form context (node, behavior name, ...).
    pub context: String,
}

pub trait DiagnosticSink {
    fn warn(&mut self, tick: u64, code: &'static str, context: String);

    fn error(&mut self, tick: u64, code: &'static str, context: String);
}

#[derive(Debug, Default)]
pub struct NullDiagnosticSink;

impl DiagnosticSink for NullDiagnosticSink {
    fn warn(&mut self, _tick: u64, _code: &'static str, _context: String) {}

    fn error(&mut self, _tick: u64, _code: &'static str, _context: String) {}
}

/// Bounded diagnostic history with an optional downstream sink.
pub struct DiagnosticLog {
    capacity: usize,
    entries: VecDeque<Diagnostic>,
    dropped: u64,
    forward: Option<Box<dyn DiagnosticSink>>,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl core::fmt::Debug for DiagnosticLog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DiagnosticLog")
            .field("capacity", &self.capacity)
            .field("entries", &self.entries)
            .field("dropped", &self.dropped)
            .field("forward", &self.forward.is_some())
            .finish()
    }
}

impl DiagnosticLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
            dropped: 0,
            forward: None,
        }
    }

    pub fn set_forward(&mut self, sink: Box<dyn DiagnosticSink>) {
        self.forward = Some(sink);
    }

    pub fn entries(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted because the log was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn count(&self, code: &str) -> usize {
        self.entries.iter().filter(|d| d.code == code).count()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|d| d.code == code)
    }

    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.entries.drain(..).collect()
    }

    fn record(&mut self, tick: u64, severity: Severity, code: &'static str, context: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(Diagnostic {
            tick,
            severity,
            code: Cow::Borrowed(code),
            context,
        });
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn warn(&mut self, tick: u64, code: &'static str, context: String) {
        tracing::warn!(tick, code, %context, "behavior diagnostic");
        if let Some(sink) = self.forward.as_mut() {
            sink.warn(tick, code, context.clone());
        }
        self.record(tick, Severity::Warning, code, context);
    }

    fn error(&mut self, tick: u64, code: &'static str, context: String) {
        tracing::error!(tick, code, %context, "behavior diagnostic");
        if let Some(sink) = self.forward.as_mut() {
            sink.error(tick, code, context.clone());
        }
        self.record(tick, Severity::Error, code, context);
    }
}
