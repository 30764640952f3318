// src/error.rs

use reqwest::Error as ReqwestError;
use serde::Serialize;
use serde_json::Error as SerdeError;
use std::io;
use thiserror::Error;

/// Custom error types for the application
#[derive(Error, Debug)]
pub enum AppError {
    /// Error for invalid input validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Error for path operation failures
    #[error("Path error: {0}")]
    PathError(String),

    /// Playlist could not be read or written
    #[error("Playlist error: {0}")]
    PlaylistError(String),

    /// Playlist parsed but held no title/URL pairs
    #[error("No entries found in playlist")]
    EmptyPlaylist,

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    HttpError(#[from] ReqwestError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] SerdeError),

    /// General application errors
    #[error("Application error: {0}")]
    General(String),
}

/// Convert a string error to AppError::General
impl From<String> for AppError {
    fn from(error: String) -> Self {
        AppError::General(error)
    }
}

/// Convert a &str error to AppError::General
impl From<&str> for AppError {
    fn from(error: &str) -> Self {
        AppError::General(error.to_string())
    }
}

/// Coarse failure class reported for a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Filesystem,
    Unexpected,
}

/// Failure of a single fetch. Never escapes a worker except inside an outcome.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, DNS, TLS or mid-stream read failure
    #[error("network error: {0}")]
    Network(String),

    /// The whole-transfer timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// Server answered with a non-2xx status
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    /// Directory or file could not be created or written
    #[error("filesystem error: {0}")]
    Filesystem(#[source] io::Error),

    /// Anything else, including a panic inside the worker
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Network(_) | FetchError::Timeout | FetchError::HttpStatus(_) => {
                FailureKind::Network
            }
            FetchError::Filesystem(_) => FailureKind::Filesystem,
            FetchError::Unexpected(_) => FailureKind::Unexpected,
        }
    }
}

impl From<ReqwestError> for FetchError {
    fn from(error: ReqwestError) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = error.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}
