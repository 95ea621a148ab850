use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::recorder::{CheckRecord, CheckRecorder, Summary};

/// Where the audit run writes its JSON report artifact.
pub const REPORT_PATH: &str = "safetalk-audit-report.json";

/// The report artifact: run summary plus every per-check record.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub checks: Vec<CheckRecord>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(recorder: &CheckRecorder) -> Self {
        Report {
            summary: recorder.summary(),
            checks: recorder.records().to_vec(),
            generated_at: Utc::now(),
        }
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("failed to serialize report to {}", path.display()))?;
        Ok(())
    }
}
