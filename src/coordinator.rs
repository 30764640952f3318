// src/coordinator.rs
// Bounded worker pool that fans a playlist out over fetch workers

use crate::config::{clamp_concurrency, DownloaderConfig};
use crate::error::AppError;
use crate::fetch::{fetch, DownloadOutcome, DownloadTask, HttpSource, MediaSource};
use crate::playlist::Entry;
use crate::report::{summarize, RunSummary};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Instant;

/// Receives progress events. `on_start` runs on worker threads, `on_outcome`
/// on the coordinating thread in completion order.
pub trait ProgressObserver: Sync {
    fn on_start(&self, _entry: &Entry) {}

    fn on_outcome(&self, _outcome: &DownloadOutcome, _completed: usize, _total: usize) {}
}

/// Observer that ignores every event
pub struct SilentObserver;

impl ProgressObserver for SilentObserver {}

/// Shared progress counters; `completed` never exceeds `total`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub completed: usize,
    pub total: usize,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// In completion order
    pub outcomes: Vec<DownloadOutcome>,
    pub counters: RunCounters,
    pub summary: RunSummary,
}

pub struct Coordinator {
    source: Arc<dyn MediaSource>,
    config: DownloaderConfig,
}

impl Coordinator {
    pub fn new(source: Arc<dyn MediaSource>, config: DownloaderConfig) -> Self {
        Self { source, config }
    }

    /// Coordinator backed by a single shared HTTP client
    pub fn with_http(config: DownloaderConfig) -> Result<Self, AppError> {
        let source = HttpSource::new(&config)?;
        Ok(Self::new(Arc::new(source), config))
    }

    /// Download every entry into `output_dir` with at most `concurrency`
    /// fetches in flight. Blocks until each task reached a terminal outcome.
    pub fn run(
        &self,
        entries: &[Entry],
        output_dir: &Path,
        concurrency: i64,
        observer: &dyn ProgressObserver,
    ) -> RunReport {
        let started = Instant::now();
        let total = entries.len();
        let counters = Mutex::new(RunCounters {
            completed: 0,
            total,
        });

        if entries.is_empty() {
            debug!("No entries, nothing to download");
            return RunReport {
                outcomes: Vec::new(),
                counters: *lock(&counters),
                summary: summarize(&[], started.elapsed()),
            };
        }

        let workers = clamp_concurrency(concurrency).min(total);
        let chunk_size = self.config.chunk_size;
        info!(
            "Downloading {} entries into {} with {} workers",
            total,
            output_dir.display(),
            workers
        );

        // Submission order follows playlist order
        let queue: Mutex<VecDeque<DownloadTask>> = Mutex::new(
            entries
                .iter()
                .map(|entry| DownloadTask {
                    entry: entry.clone(),
                    output_dir: output_dir.to_path_buf(),
                })
                .collect(),
        );

        let mut outcomes = Vec::with_capacity(total);
        let mut record = |outcome: DownloadOutcome| {
            let (completed, total) = {
                let mut c = lock(&counters);
                c.completed += 1;
                (c.completed, c.total)
            };
            observer.on_outcome(&outcome, completed, total);
            outcomes.push(outcome);
        };

        let source: &dyn MediaSource = self.source.as_ref();
        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<DownloadOutcome>();

            for id in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                let spawned = thread::Builder::new()
                    .name(format!("fetch-{}", id))
                    .spawn_scoped(scope, move || {
                        while let Some(task) = next_task(queue) {
                            observer.on_start(&task.entry);
                            let outcome = fetch(source, &task.entry, &task.output_dir, chunk_size);
                            if tx.send(outcome).is_err() {
                                break;
                            }
                        }
                    });
                if let Err(e) = spawned {
                    warn!("Could not spawn worker {}: {}", id, e);
                }
            }
            drop(tx);

            for outcome in rx {
                record(outcome);
            }
        });

        // Left over only when no worker thread could be spawned
        while let Some(task) = next_task(&queue) {
            observer.on_start(&task.entry);
            record(fetch(source, &task.entry, &task.output_dir, chunk_size));
        }

        let counters = *lock(&counters);
        let summary = summarize(&outcomes, started.elapsed());
        debug!(
            "Run finished: {}/{} completed, {} failed",
            counters.completed, counters.total, summary.failed
        );

        RunReport {
            outcomes,
            counters,
            summary,
        }
    }

    /// [`Coordinator::run`] with the worker count from the configuration
    pub fn run_configured(
        &self,
        entries: &[Entry],
        output_dir: &Path,
        observer: &dyn ProgressObserver,
    ) -> RunReport {
        let concurrency = i64::try_from(self.config.concurrency).unwrap_or(i64::MAX);
        self.run(entries, output_dir, concurrency, observer)
    }

    /// Like [`Coordinator::run`], keeping only the summary
    pub fn run_summary(
        &self,
        entries: &[Entry],
        output_dir: &Path,
        concurrency: i64,
        observer: &dyn ProgressObserver,
    ) -> RunSummary {
        self.run(entries, output_dir, concurrency, observer).summary
    }
}

fn next_task(queue: &Mutex<VecDeque<DownloadTask>>) -> Option<DownloadTask> {
    lock(queue).pop_front()
}

// The guarded data is valid after every statement, so a poisoned lock is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
