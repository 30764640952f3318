// src/lib.rs
// Expose m3uloader functionality as a library

pub mod cli;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod playlist;
pub mod report;
pub mod sanitize;

pub use config::DownloaderConfig;
pub use coordinator::{Coordinator, ProgressObserver, RunCounters, RunReport, SilentObserver};
pub use error::{AppError, FailureKind, FetchError};
pub use fetch::{fetch, DownloadOutcome, DownloadTask, HttpSource, MediaSource, OutcomeStatus};
pub use playlist::{parse, Entry};
pub use report::{summarize, RunSummary};
pub use sanitize::sanitize;
