//! Utility functions and helpers

pub mod ports;

use crate::network::Protocol;
use std::time::Duration;

/// Logging utilities
pub struct Logger;

impl Logger {
    /// Initialize logger with specified level.
    ///
    /// `RUST_LOG` is still honoured for per-module filters.
    pub fn init(level: log::LevelFilter) {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp_secs()
            .init();
    }

    /// Map the number of `-v` flags to a level filter
    pub fn level_from_verbosity(verbosity: u8) -> log::LevelFilter {
        match verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }

    /// Log scan start
    pub fn log_scan_start(address: &str, ports: usize, protocols: &[Protocol]) {
        let protocols: Vec<&str> = protocols.iter().map(Protocol::as_str).collect();
        log::info!(
            "Starting scan of {} ({} ports, {})",
            address,
            ports,
            protocols.join("+")
        );
    }

    /// Log scan completion
    pub fn log_scan_complete(duration: Duration, lines: usize, probes: usize) {
        log::info!(
            "Scan completed in {:.2}s - {} result lines from {} probes",
            duration.as_secs_f64(),
            lines,
            probes
        );
    }
}
