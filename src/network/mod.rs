//! Network module: protocol and port-state types plus the probes

pub mod resolver;
pub mod socket;

use serde::{Deserialize, Serialize};

/// Transport protocol probed for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }

    /// Map a protocol keyword to the ordered list of protocols to probe.
    ///
    /// The keyword is trimmed and compared case-insensitively. `TCP`, `UDP`
    /// and `BOTH` select what they say; anything else, including an empty
    /// string, falls back to TCP only.
    pub fn select(keyword: &str) -> Vec<Protocol> {
        match keyword.trim().to_uppercase().as_str() {
            "TCP" => vec![Protocol::Tcp],
            "UDP" => vec![Protocol::Udp],
            "BOTH" => vec![Protocol::Tcp, Protocol::Udp],
            _ => vec![Protocol::Tcp],
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortState {
    Open,
    Closed,
    OpenFiltered,
}

impl std::fmt::Display for PortState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortState::Open => write!(f, "Open"),
            PortState::Closed => write!(f, "Closed"),
            PortState::OpenFiltered => write!(f, "Open|Filtered"),
        }
    }
}

/// Classification of one (protocol, port) probe.
///
/// Renders as `"<PROTOCOL> <port> <state>"`, the line format every
/// report and transcript is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    pub port: u16,
    pub protocol: Protocol,
    pub state: PortState,
}

impl PortResult {
    pub fn new(port: u16, protocol: Protocol, state: PortState) -> Self {
        Self {
            port,
            protocol,
            state,
        }
    }
}

impl std::fmt::Display for PortResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.protocol, self.port, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_selection() {
        assert_eq!(Protocol::select("tcp"), vec![Protocol::Tcp]);
        assert_eq!(Protocol::select("UDP"), vec![Protocol::Udp]);
        assert_eq!(Protocol::select("Both"), vec![Protocol::Tcp, Protocol::Udp]);
        assert_eq!(Protocol::select("  both \n"), vec![Protocol::Tcp, Protocol::Udp]);
    }

    #[test]
    fn test_protocol_selection_falls_back_to_tcp() {
        assert_eq!(Protocol::select("xyz"), vec![Protocol::Tcp]);
        assert_eq!(Protocol::select(""), vec![Protocol::Tcp]);
        assert_eq!(Protocol::select("tcp/udp"), vec![Protocol::Tcp]);
    }

    #[test]
    fn test_result_line_format() {
        assert_eq!(
            PortResult::new(22, Protocol::Tcp, PortState::Open).to_string(),
            "TCP 22 Open"
        );
        assert_eq!(
            PortResult::new(53, Protocol::Udp, PortState::Closed).to_string(),
            "UDP 53 Closed"
        );
        assert_eq!(
            PortResult::new(161, Protocol::Udp, PortState::OpenFiltered).to_string(),
            "UDP 161 Open|Filtered"
        );
    }
}
