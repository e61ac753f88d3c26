//! # cal-observability
//!
//! Structured tracing with span definitions and lifecycle events, run-record
//! reporters (in-memory and JSON lines), and the cross-seed experiment
//! summary.

pub mod reporter;
pub mod summary;
pub mod tracing_setup;

pub use reporter::{JsonlRunReporter, MemoryRunReporter};
pub use summary::{ExperimentSummary, RoundStats, SeedFailure, SeedResult};
pub use tracing_setup::{init_tracing, init_tracing_with_filter, init_tracing_from_config};
