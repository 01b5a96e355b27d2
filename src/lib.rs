//! Luna - a concurrent TCP/UDP port scanner
//!
//! Probes every requested (port, protocol) pair of a target under a bounded
//! concurrency limit and reports the results as sorted
//! `"<PROTOCOL> <port> <state>"` lines, one report per resolved address.

pub mod config;
pub mod error;
pub mod interactive;
pub mod network;
pub mod output;
pub mod scanner;
pub mod utils;

// Re-export commonly used types
pub use config::ScanConfig;
pub use error::{ScanError, ScanResult};
pub use network::{PortResult, PortState, Protocol};
pub use scanner::{ScanEngine, ScanJob, ScanReport, ScanSummary};

/// Version reported by the banner and `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product name and version, e.g. `Luna Port Scanner v4.1.0`
pub fn banner() -> String {
    format!("Luna Port Scanner v{}", VERSION)
}

pub type Result<T> = std::result::Result<T, ScanError>;
