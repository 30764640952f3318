// src/report.rs

use crate::error::AppError;
use crate::fetch::{DownloadOutcome, OutcomeStatus};
use humansize::{format_size, BINARY};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Final tallies of a run, derived once after every task finished
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Fresh downloads plus entries already on disk
    pub succeeded: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
    pub total: usize,
    pub bytes_written: u64,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn average_seconds_per_success(&self) -> Option<f64> {
        if self.succeeded == 0 {
            None
        } else {
            Some(self.elapsed_seconds / self.succeeded as f64)
        }
    }
}

/// Count outcomes by status
pub fn summarize(outcomes: &[DownloadOutcome], elapsed: Duration) -> RunSummary {
    let mut summary = RunSummary {
        total: outcomes.len(),
        elapsed_seconds: elapsed.as_secs_f64(),
        ..RunSummary::default()
    };

    for outcome in outcomes {
        match outcome.status {
            OutcomeStatus::Success => {
                summary.downloaded += 1;
                summary.bytes_written += outcome.bytes_written.unwrap_or(0);
            }
            OutcomeStatus::AlreadyExists => summary.already_present += 1,
            OutcomeStatus::Failed { .. } => summary.failed += 1,
        }
    }
    summary.succeeded = summary.downloaded + summary.already_present;

    summary
}

/// Human-readable summary block
pub fn render_summary(summary: &RunSummary) -> String {
    let mut lines = vec![
        format!("Downloaded: {}/{} files", summary.succeeded, summary.total),
        format!(
            "  new: {} ({}), already present: {}, failed: {}",
            summary.downloaded,
            format_size(summary.bytes_written, BINARY),
            summary.already_present,
            summary.failed
        ),
        format!("Time: {:.1} seconds", summary.elapsed_seconds),
    ];
    if let Some(avg) = summary.average_seconds_per_success() {
        lines.push(format!("Average: {:.1}s per file", avg));
    }
    lines.join("\n")
}

/// Write the summary as pretty-printed JSON
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    info!("Run summary written to {}", path.display());
    Ok(())
}
