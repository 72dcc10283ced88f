//! Scheduler event tracing.
//!
//! Events are plain data recorded during a tick and rendered or asserted on later.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One scheduler event: `tag` names it (`beh.admit`, `beh.select`, ...), `node` is the
/// raw handle of the node it concerns and `value` carries an event-specific number
/// such as a priority or candidate index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub node: u64,
    pub value: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            node: 0,
            value: 0,
        }
    }

    pub fn with_node(self, node: u64) -> Self {
        Self { node, ..self }
    }

    pub fn with_value(self, value: u64) -> Self {
        Self { value, ..self }
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Tags in emission order.
    pub fn tags(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.tag.as_ref()).collect()
    }
}

/// A [`TraceLog`] that can be handed to a runtime as a sink while the caller keeps a handle.
#[derive(Debug, Default, Clone)]
pub struct SharedTraceLog(pub Rc<RefCell<TraceLog>>);

impl SharedTraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TraceLog {
        TraceLog {
            events: self.0.borrow().events.clone(),
        }
    }

    pub fn with_tag(&self, tag: &str) -> Vec<TraceEvent> {
        self.0
            .borrow()
            .events
            .iter()
            .filter(|e| e.tag == tag)
            .cloned()
            .collect()
    }
}

impl TraceSink for SharedTraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}
