// src/logging.rs

use env_logger::Builder;
use log::{debug, LevelFilter};
use std::env;
use std::io::Write;

/// Filter directives read ahead of `RUST_LOG`, so the downloader can be made
/// chatty without turning on every dependency's logging
pub const ENV_LOG: &str = "M3ULOADER_LOG";

/// Filter directives from the environment, `M3ULOADER_LOG` first
pub fn filter_override() -> Option<String> {
    [ENV_LOG, "RUST_LOG"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}

/// Initialize the logger with a custom format and configuration
pub fn init_logger() {
    let mut builder = Builder::new();

    // Dependencies stay at warn; the crate's own level depends on the build
    builder.filter_level(LevelFilter::Warn);
    if cfg!(debug_assertions) {
        builder.filter_module("m3uloader", LevelFilter::Debug);
    } else {
        builder.filter_module("m3uloader", LevelFilter::Info);
    }

    // Timestamp, level, module, message
    builder.format(|buf, record| {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        writeln!(
            buf,
            "[{} {} {}] {}",
            timestamp,
            record.level().to_string().to_uppercase(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(filters) = filter_override() {
        builder.parse_filters(&filters);
    }

    // try_init so tests and embedders that already installed a logger keep it
    if builder.try_init().is_ok() {
        debug!("Logger initialized with custom format");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_variable_wins_over_rust_log() {
        env::set_var(ENV_LOG, "m3uloader=trace");
        assert_eq!(filter_override().as_deref(), Some("m3uloader=trace"));
        env::remove_var(ENV_LOG);
    }

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_logger();
        init_logger();
        log::info!("still logging");
    }
}
