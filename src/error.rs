//! Error handling for the luna scanner
//!
//! Probe-level network failures never show up here: every one of them is
//! translated into a port classification (or silence) inside the probes.
//! `ScanError` covers what can go wrong around a scan: bad configuration,
//! unusable output destinations and I/O.

use thiserror::Error;

/// Main error type for scanning operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Port range error: {0}")]
    PortRangeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// Whether the error only concerns user input and can be reported as a notice
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidTarget(_) | ScanError::PortRangeError(_) | ScanError::ConfigError(_)
        )
    }
}

impl From<toml::de::Error> for ScanError {
    fn from(e: toml::de::Error) -> Self {
        ScanError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(e: serde_json::Error) -> Self {
        ScanError::OutputError(e.to_string())
    }
}

impl From<std::num::ParseIntError> for ScanError {
    fn from(e: std::num::ParseIntError) -> Self {
        ScanError::ConfigError(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for ScanError {
    fn from(e: std::num::ParseFloatError) -> Self {
        ScanError::ConfigError(e.to_string())
    }
}
