//! Port specification parsing
//!
//! A specification is a comma separated list of single ports (`80`) and
//! inclusive ranges (`20-25`). Invalid tokens are dropped silently; only the
//! caller decides whether an empty result is a problem.

use crate::error::ScanError;
use std::collections::BTreeSet;

pub const MIN_PORT: u64 = 1;
pub const MAX_PORT: u64 = 65535;

/// Parse a port specification into an ascending, duplicate-free port list.
///
/// - empty tokens are skipped
/// - a range token must be exactly `start-end` with `start <= end`,
///   otherwise the whole token is discarded
/// - ports outside 1-65535 are dropped, including the parts of a range
///   that fall outside it
pub fn parse_ports(spec: &str) -> Vec<u16> {
    let mut ports = BTreeSet::new();

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if token.contains('-') {
            if let Some((start, end)) = parse_range(token) {
                let start = start.max(MIN_PORT);
                let end = end.min(MAX_PORT);
                ports.extend((start..=end).filter_map(|p| u16::try_from(p).ok()));
            }
        } else if let Some(port) = parse_port(token) {
            ports.insert(port);
        }
    }

    ports.into_iter().collect()
}

/// Like [`parse_ports`], but an empty result is an error.
pub fn require_ports(spec: &str) -> Result<Vec<u16>, ScanError> {
    let ports = parse_ports(spec);
    if ports.is_empty() {
        return Err(ScanError::PortRangeError(format!(
            "no valid ports in '{}'",
            spec.trim()
        )));
    }
    Ok(ports)
}

fn parse_range(token: &str) -> Option<(u64, u64)> {
    let parts: Vec<&str> = token.split('-').collect();
    if parts.len() != 2 {
        return None;
    }

    let start: u64 = parts[0].trim().parse().ok()?;
    let end: u64 = parts[1].trim().parse().ok()?;
    (start <= end).then_some((start, end))
}

fn parse_port(token: &str) -> Option<u16> {
    let port: u64 = token.parse().ok()?;
    if (MIN_PORT..=MAX_PORT).contains(&port) {
        u16::try_from(port).ok()
    } else {
        None
    }
}
