// src/console.rs
// Terminal progress: per-entry status lines plus an overall bar

use crate::coordinator::ProgressObserver;
use crate::fetch::{DownloadOutcome, OutcomeStatus};
use crate::playlist::Entry;
use colored::*;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

pub struct ConsoleReporter {
    pb: ProgressBar,
}

impl ConsoleReporter {
    pub fn new(total: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => debug!("Falling back to default progress style: {}", e),
        }
        Self { pb }
    }

    // Hidden bars (stdout not a terminal) swallow println, so print directly
    fn emit(&self, line: String) {
        if self.pb.is_hidden() {
            println!("{}", line);
        } else {
            self.pb.println(line);
        }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl ProgressObserver for ConsoleReporter {
    fn on_start(&self, entry: &Entry) {
        self.emit(format!("{} {}", "Downloading:".blue(), entry.title));
    }

    fn on_outcome(&self, outcome: &DownloadOutcome, completed: usize, total: usize) {
        let name = outcome
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| outcome.entry.title.clone());

        let line = match &outcome.status {
            OutcomeStatus::Success => format!(
                "{} {} ({})",
                "Downloaded:".green(),
                name,
                format_size(outcome.bytes_written.unwrap_or(0), BINARY)
            ),
            OutcomeStatus::AlreadyExists => {
                format!("{} {}", "Already exists:".yellow(), name)
            }
            OutcomeStatus::Failed { reason, .. } => format!(
                "{} {}: {}",
                "Failed:".red().bold(),
                outcome.entry.title,
                reason
            ),
        };
        self.emit(line);

        let pct = if total == 0 {
            100.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        self.emit(format!("{} {}/{} ({:.1}%)", "Progress:".cyan(), completed, total, pct));
        self.pb.set_position(completed as u64);
    }
}
