//! Target resolution

use std::collections::HashSet;
use std::net::IpAddr;

/// Resolve a hostname or IP literal to its addresses.
///
/// Addresses keep the order the system resolver returned them in, with
/// duplicates removed. Resolution failures are logged and produce an empty
/// list: a target that does not resolve is simply not scanned.
pub async fn resolve_target(target: &str) -> Vec<IpAddr> {
    let target = target.trim();
    if target.is_empty() {
        return Vec::new();
    }

    if let Ok(ip) = target.parse::<IpAddr>() {
        return vec![ip];
    }

    // Port is irrelevant here; lookup_host only needs a host:port pair.
    let addrs = match tokio::net::lookup_host((target, 0)).await {
        Ok(addrs) => addrs,
        Err(e) => {
            log::warn!("Could not resolve {}: {}", target, e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let addresses: Vec<IpAddr> = addrs
        .map(|addr| addr.ip())
        .filter(|ip| seen.insert(*ip))
        .collect();

    log::debug!("{} resolved to {:?}", target, addresses);
    addresses
}
