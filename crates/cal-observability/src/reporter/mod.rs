//! Run-record sinks implementing [`IRunReporter`](cal_core::traits::IRunReporter).

pub mod jsonl;
pub mod memory;

pub use jsonl::{read_records, JsonlRunReporter};
pub use memory::MemoryRunReporter;

use cal_core::errors::CollaboratorError;

fn report_failed(reason: impl std::fmt::Display) -> CollaboratorError {
    CollaboratorError::ReportFailed {
        reason: reason.to_string(),
    }
}
