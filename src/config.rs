// src/config.rs
// Run configuration: worker count, chunk size, timeout and identifying header

use log::{debug, warn};
use std::env;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const MIN_CONCURRENCY: usize = 1;
pub const MAX_CONCURRENCY: usize = 16;
pub const DEFAULT_CHUNK_SIZE: usize = 8192;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const ENV_WORKERS: &str = "M3ULOADER_WORKERS";
pub const ENV_TIMEOUT_SECS: &str = "M3ULOADER_TIMEOUT_SECS";

/// Settings shared by every worker in a run
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Maximum number of simultaneously active fetches
    pub concurrency: usize,
    /// Size of each read/write chunk while streaming a body
    pub chunk_size: usize,
    /// Bound on a whole transfer, connect through last byte
    pub timeout: Duration,
    /// Value of the User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DownloaderConfig {
    /// Defaults overlaid with `M3ULOADER_WORKERS` / `M3ULOADER_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(workers) = env::var(ENV_WORKERS) {
            config.concurrency = parse_concurrency(&workers);
            debug!("{} set, using {} workers", ENV_WORKERS, config.concurrency);
        }

        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config = config.with_timeout(Duration::from_secs(secs)),
                Err(_) => warn!("Ignoring invalid {}: {:?}", ENV_TIMEOUT_SECS, secs),
            }
        }

        config
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        self
    }
}

/// Clamp a requested worker count into [1, 16]
pub fn clamp_concurrency(requested: i64) -> usize {
    requested.clamp(MIN_CONCURRENCY as i64, MAX_CONCURRENCY as i64) as usize
}

/// Parse operator input for the worker count. Blank or non-numeric input
/// yields the default; numbers are clamped.
pub fn parse_concurrency(input: &str) -> usize {
    parse_concurrency_or(input, DEFAULT_CONCURRENCY)
}

/// Like [`parse_concurrency`], but blank or non-numeric input keeps `current`
pub fn parse_concurrency_or(input: &str, current: usize) -> usize {
    let input = input.trim();
    if input.is_empty() {
        return current;
    }
    match input.parse::<i64>() {
        Ok(n) => clamp_concurrency(n),
        Err(_) => {
            warn!("Invalid worker count {:?}, using {}", input, current);
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    #[test]
    fn test_clamp_concurrency() {
        assert_eq!(clamp_concurrency(0), 1);
        assert_eq!(clamp_concurrency(-3), 1);
        assert_eq!(clamp_concurrency(1), 1);
        assert_eq!(clamp_concurrency(8), 8);
        assert_eq!(clamp_concurrency(16), 16);
        assert_eq!(clamp_concurrency(100), 16);
    }

    #[test]
    fn test_parse_concurrency() {
        assert_eq!(parse_concurrency(""), 4);
        assert_eq!(parse_concurrency("   "), 4);
        assert_eq!(parse_concurrency("abc"), 4);
        assert_eq!(parse_concurrency("2.5"), 4);
        assert_eq!(parse_concurrency(" 6 "), 6);
        assert_eq!(parse_concurrency("99"), 16);
        assert_eq!(parse_concurrency("0"), 1);
    }

    #[test]
    fn test_blank_answer_keeps_current_value() {
        assert_eq!(parse_concurrency_or("", 9), 9);
        assert_eq!(parse_concurrency_or("lots", 9), 9);
        assert_eq!(parse_concurrency_or("3", 9), 3);
        assert_eq!(parse_concurrency_or("40", 9), 16);
    }

    // The environment is process-wide; tests touching it take this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<F: FnOnce()>(workers: Option<&str>, timeout: Option<&str>, check: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in [(ENV_WORKERS, workers), (ENV_TIMEOUT_SECS, timeout)] {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
        check();
        env::remove_var(ENV_WORKERS);
        env::remove_var(ENV_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_env_without_variables() {
        with_env(None, None, || {
            let config = DownloaderConfig::from_env();
            assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
            assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        });
    }

    #[test]
    fn test_from_env_overlays_values() {
        with_env(Some("7"), Some("30"), || {
            let config = DownloaderConfig::from_env();
            assert_eq!(config.concurrency, 7);
            assert_eq!(config.timeout, Duration::from_secs(30));
            assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        });
    }

    #[test]
    fn test_from_env_clamps_workers() {
        with_env(Some("64"), None, || {
            assert_eq!(DownloaderConfig::from_env().concurrency, MAX_CONCURRENCY);
        });
        with_env(Some("-2"), None, || {
            assert_eq!(DownloaderConfig::from_env().concurrency, MIN_CONCURRENCY);
        });
        with_env(Some("many"), None, || {
            assert_eq!(DownloaderConfig::from_env().concurrency, DEFAULT_CONCURRENCY);
        });
    }

    #[test]
    fn test_from_env_bad_timeout_falls_back() {
        for bad in ["0", "soon", "-5", ""] {
            with_env(None, Some(bad), || {
                assert_eq!(DownloaderConfig::from_env().timeout, DEFAULT_TIMEOUT);
            });
        }
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let config = DownloaderConfig::default()
            .with_chunk_size(0)
            .with_timeout(Duration::ZERO);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
