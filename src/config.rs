//! Configuration module for the luna scanner

use crate::error::ScanError;
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user configuration file looked up in the home directory
pub const CONFIG_FILE_NAME: &str = ".lunascan.toml";

/// Main configuration structure for scanning operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Target host name or IP literal
    pub target: String,

    /// Raw port specification, e.g. `22,80,8000-8100`
    pub ports: String,

    /// Protocol keyword: TCP, UDP or BOTH
    pub protocol: String,

    /// Per-probe timeout in seconds
    pub timeout: f64,

    /// Maximum number of probes in flight
    pub concurrency: usize,

    /// Print results instead of writing the log file
    pub show: bool,

    /// Format of persisted or printed results
    pub output_format: OutputFormat,

    /// Colour console output
    pub colored: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            ports: String::new(),
            protocol: "TCP".to_string(),
            timeout: 1.0,
            concurrency: 50, // above 100 is not recommended
            show: false,
            output_format: OutputFormat::Text,
            colored: true,
        }
    }
}

impl ScanConfig {
    /// Create a new scan configuration
    pub fn new(target: String) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    /// Set the port specification
    pub fn with_ports(mut self, ports: &str) -> Self {
        self.ports = ports.to_string();
        self
    }

    /// Set the protocol keyword
    pub fn with_protocol(mut self, protocol: &str) -> Self {
        self.protocol = protocol.to_string();
        self
    }

    /// Set the timeout in seconds
    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the concurrency bound
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Get timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    /// Concurrency bound raised to at least 1
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency < 1 {
            log::warn!("Concurrency {} raised to 1", self.concurrency);
            return 1;
        }
        self.concurrency
    }

    /// Load configuration from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ScanError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: ScanConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path of the per-user config file, if a home directory is known
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from `~/.lunascan.toml`, falling back to defaults.
    ///
    /// A file that exists but does not parse is reported and ignored.
    pub fn load_default_config() -> Self {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                match Self::from_toml_file(&path) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
                }
            }
        }

        Self::default()
    }

    /// Apply `LUNASCAN_*` environment overrides. Unparsable values are ignored.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = lookup("LUNASCAN_TIMEOUT") {
            match timeout.trim().parse::<f64>() {
                Ok(timeout) => self.timeout = timeout,
                Err(e) => log::warn!("Ignoring LUNASCAN_TIMEOUT={}: {}", timeout, e),
            }
        }

        if let Some(concurrency) = lookup("LUNASCAN_CONCURRENCY") {
            match concurrency.trim().parse::<usize>() {
                Ok(concurrency) => self.concurrency = concurrency,
                Err(e) => log::warn!("Ignoring LUNASCAN_CONCURRENCY={}: {}", concurrency, e),
            }
        }

        if let Some(protocol) = lookup("LUNASCAN_PROTOCOL") {
            self.protocol = protocol;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.timeout <= 0.0 || Duration::try_from_secs_f64(self.timeout).is_err() {
            return Err(ScanError::ConfigError(format!(
                "Timeout must be a positive number of seconds, got {}",
                self.timeout
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.protocol, "TCP");
        assert_eq!(config.timeout_duration(), Duration::from_secs(1));
        assert_eq!(config.concurrency, 50);
        assert!(!config.show);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_fractional_timeout() {
        let config = ScanConfig::new("example.com".to_string())
            .with_ports("20-25")
            .with_protocol("both")
            .with_timeout(0.25)
            .with_concurrency(10);

        assert_eq!(config.target, "example.com");
        assert_eq!(config.ports, "20-25");
        assert_eq!(config.timeout_duration(), Duration::from_millis(250));
        assert_eq!(config.effective_concurrency(), 10);
    }

    #[test]
    fn test_concurrency_is_clamped() {
        let config = ScanConfig::default().with_concurrency(0);
        assert_eq!(config.effective_concurrency(), 1);
    }

    #[test]
    fn test_invalid_timeouts_are_rejected() {
        for timeout in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = ScanConfig::default().with_timeout(timeout);
            assert!(matches!(config.validate(), Err(ScanError::ConfigError(_))));
        }
    }

    #[test]
    fn test_partial_toml_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout = 2.5\nprotocol = \"UDP\"").unwrap();

        let config = ScanConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.timeout, 2.5);
        assert_eq!(config.protocol, "UDP");
        assert_eq!(config.concurrency, 50);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout = \"soon\"").unwrap();

        assert!(matches!(
            ScanConfig::from_toml_file(file.path()),
            Err(ScanError::ConfigError(_))
        ));
        assert!(ScanConfig::from_toml_file("/nonexistent/lunascan.toml").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("LUNASCAN_TIMEOUT", "0.5"),
            ("LUNASCAN_CONCURRENCY", "many"),
            ("LUNASCAN_PROTOCOL", "both"),
        ]
        .into_iter()
        .collect();

        let config = ScanConfig::default()
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.timeout, 0.5);
        assert_eq!(config.concurrency, 50);
        assert_eq!(config.protocol, "both");
    }
}
