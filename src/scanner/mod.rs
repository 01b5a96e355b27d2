//! Scanner module containing the scan engine and its result types

pub mod engine;

use crate::network::Protocol;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

pub use engine::ScanEngine;

/// One unit of probing work: a single (address, port, protocol) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanJob {
    pub address: IpAddr,
    pub port: u16,
    pub protocol: Protocol,
}

impl ScanJob {
    pub fn new(address: IpAddr, port: u16, protocol: Protocol) -> Self {
        Self {
            address,
            port,
            protocol,
        }
    }
}

/// Sorted result lines for one resolved address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Address that was scanned
    pub address: IpAddr,

    /// Result lines (`"<PROTOCOL> <port> <state>"`), lexicographically sorted
    pub results: Vec<String>,

    /// Wall-clock time spent scanning this address
    #[serde(skip)]
    pub duration: Duration,
}

impl ScanReport {
    pub fn new(address: IpAddr, results: Vec<String>) -> Self {
        Self {
            address,
            results,
            duration: Duration::from_secs(0),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Aggregate figures over all reports of one target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSummary {
    pub addresses: usize,
    pub result_lines: usize,
    pub elapsed: Duration,
}

impl ScanSummary {
    pub fn from_reports(reports: &[ScanReport]) -> Self {
        Self {
            addresses: reports.len(),
            result_lines: reports.iter().map(|r| r.results.len()).sum(),
            elapsed: reports.iter().map(|r| r.duration).sum(),
        }
    }
}
