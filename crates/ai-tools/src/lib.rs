//! Tooling primitives for deterministic behavior scheduling.
//!
//! This crate is intentionally lightweight and engine-agnostic. Higher-level integrations
//! (inspectors, debug overlays, etc.) should live in dedicated adapter crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod diag;
pub mod trace;

pub use diag::{Diagnostic, DiagnosticLog, DiagnosticSink, NullDiagnosticSink, Severity};
pub use trace::{NullTraceSink, SharedTraceLog, TraceEvent, TraceLog, TraceSink, VecTraceSink};
