use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use cal_core::errors::CollaboratorError;
use cal_core::models::RunRecord;
use cal_core::traits::IRunReporter;

use super::report_failed;

/// Writes one JSON object per record, one record per line, flushing after
/// each so a crashed run leaves every committed round on disk.
pub struct JsonlRunReporter<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonlRunReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonlRunReporter<BufWriter<File>> {
    /// Append to `path`, creating it if needed.
    pub fn append_to(path: &Path) -> Result<Self, CollaboratorError> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| report_failed(format!("{}: {e}", path.display())))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> IRunReporter for JsonlRunReporter<W> {
    fn record(&self, record: &RunRecord) -> Result<(), CollaboratorError> {
        let line = serde_json::to_string(record).map_err(report_failed)?;
        let mut writer = self.writer.lock().map_err(report_failed)?;
        writeln!(writer, "{line}").map_err(report_failed)?;
        writer.flush().map_err(report_failed)
    }
}

/// Parse a JSON-lines record stream, skipping blank lines. Used to load the
/// history a resumed run replays.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<RunRecord>, CollaboratorError> {
    let mut records = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(report_failed)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|e| report_failed(format!("line {}: {e}", n + 1)))?;
        records.push(record);
    }
    Ok(records)
}
