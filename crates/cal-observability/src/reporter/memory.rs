use std::sync::Mutex;

use cal_core::errors::CollaboratorError;
use cal_core::models::RunRecord;
use cal_core::traits::IRunReporter;

/// Keeps every record in memory. Shared across seeds.
#[derive(Debug, Default)]
pub struct MemoryRunReporter {
    records: Mutex<Vec<RunRecord>>,
}

impl MemoryRunReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record received so far, in arrival order.
    pub fn records(&self) -> Vec<RunRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Records of one seed, ordered by round.
    pub fn records_for_seed(&self, seed: u64) -> Vec<RunRecord> {
        let mut records: Vec<_> = self.records().into_iter().filter(|r| r.seed == seed).collect();
        records.sort_by_key(|r| r.round);
        records
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IRunReporter for MemoryRunReporter {
    fn record(&self, record: &RunRecord) -> Result<(), CollaboratorError> {
        self.records
            .lock()
            .map_err(|e| super::report_failed(e))?
            .push(record.clone());
        Ok(())
    }
}
