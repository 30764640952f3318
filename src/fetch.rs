// src/fetch.rs
// Fetch worker: existence check, streaming GET, write-to-disk

use crate::config::DownloaderConfig;
use crate::error::{AppError, FailureKind, FetchError};
use crate::playlist::Entry;
use crate::sanitize::sanitize;
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const FILE_EXTENSION: &str = "mp3";

/// Source of media bodies. Implementations are shared read-only across workers.
pub trait MediaSource: Send + Sync {
    /// Start a transfer and hand back the body as a stream
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError>;
}

/// Blocking HTTP source backed by one reusable client
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &DownloaderConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
            AppError::ValidationError(format!("Invalid user agent: {}", config.user_agent))
        })?;
        headers.insert(USER_AGENT, agent);

        // Redirects follow the client default policy
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl MediaSource for HttpSource {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        debug!(
            "GET {} -> {} ({:?} bytes announced)",
            url,
            status,
            response.content_length()
        );
        Ok(Box::new(response))
    }
}

/// An entry bound to the directory it downloads into
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub entry: Entry,
    pub output_dir: PathBuf,
}

/// Terminal state of one fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    AlreadyExists,
    Failed { kind: FailureKind, reason: String },
}

/// Result of attempting one entry; never mutated after creation
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    pub entry: Entry,
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    pub bytes_written: Option<u64>,
    pub elapsed: Duration,
}

impl DownloadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

/// `<output_dir>/<sanitized title>.mp3`
pub fn target_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", sanitize(title), FILE_EXTENSION))
}

/// Fetch one entry into `output_dir`. Every failure, panics included, comes back
/// as a `Failed` outcome.
pub fn fetch(
    source: &dyn MediaSource,
    entry: &Entry,
    output_dir: &Path,
    chunk_size: usize,
) -> DownloadOutcome {
    let started = Instant::now();
    let path = target_path(output_dir, &entry.title);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        fetch_to_path(source, &entry.url, output_dir, &path, chunk_size)
    }))
    .unwrap_or_else(|payload| Err(FetchError::Unexpected(panic_message(payload.as_ref()))));

    let (status, bytes_written) = match result {
        Ok(Some(bytes)) => (OutcomeStatus::Success, Some(bytes)),
        Ok(None) => (OutcomeStatus::AlreadyExists, None),
        Err(e) => {
            warn!("Fetching {:?} from {} failed: {}", entry.title, entry.url, e);
            (
                OutcomeStatus::Failed {
                    kind: e.kind(),
                    reason: e.to_string(),
                },
                None,
            )
        }
    };

    DownloadOutcome {
        entry: entry.clone(),
        path,
        status,
        bytes_written,
        elapsed: started.elapsed(),
    }
}

/// `Ok(None)` when the target already exists, `Ok(Some(size))` after a download
fn fetch_to_path(
    source: &dyn MediaSource,
    url: &str,
    output_dir: &Path,
    path: &Path,
    chunk_size: usize,
) -> Result<Option<u64>, FetchError> {
    if path.exists() {
        debug!("{} exists, skipping", path.display());
        return Ok(None);
    }

    // Open the stream first so an HTTP error leaves nothing on disk
    let mut body = source.open(url)?;

    fs::create_dir_all(output_dir).map_err(FetchError::Filesystem)?;
    // Entries whose titles sanitize alike race for the same path; first creator wins
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            debug!("{} created by another entry, skipping", path.display());
            return Ok(None);
        }
        Err(e) => return Err(FetchError::Filesystem(e)),
    };
    let mut writer = BufWriter::with_capacity(chunk_size.max(1), file);

    let written = stream_body(&mut body, &mut writer, chunk_size.max(1))?;
    writer.flush().map_err(FetchError::Filesystem)?;
    Ok(Some(written))
}

/// Copy `body` into `writer` one chunk at a time
fn stream_body<R: Read + ?Sized, W: Write>(
    body: &mut R,
    writer: &mut W,
    chunk_size: usize,
) -> Result<u64, FetchError> {
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(classify_read_error(e)),
        };
        writer.write_all(&buf[..n]).map_err(FetchError::Filesystem)?;
        total += n as u64;
    }
    Ok(total)
}

// Body read errors from reqwest wrap the client error; timeouts surface as TimedOut
fn classify_read_error(e: io::Error) -> FetchError {
    if e.kind() == io::ErrorKind::TimedOut {
        return FetchError::Timeout;
    }
    let is_timeout = e
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
        .map(reqwest::Error::is_timeout)
        .unwrap_or(false);
    if is_timeout {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
