//! TCP and UDP connectivity probes
//!
//! Each probe owns its socket for the duration of a single attempt and
//! drops it on every exit path before returning. A probe never reports an
//! error: network failures are folded into a [`PortState`] (or, for TCP,
//! into silence).

use crate::network::{PortResult, PortState, Protocol};
use crate::scanner::ScanJob;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

/// Size of the UDP receive buffer; any reply at all counts as "open".
const UDP_RECV_BUFFER: usize = 2048;

/// Payload of the single UDP probe datagram.
const UDP_PROBE_PAYLOAD: [u8; 1] = [0x00];

/// A single-port connectivity test for one transport protocol.
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Probe `target:port` once. `None` means "nothing to report".
    async fn scan_port(&self, target: IpAddr, port: u16) -> Option<PortState>;

    fn protocol(&self) -> Protocol;
}

/// The capability the scan engine drives: classify one [`ScanJob`].
///
/// [`NetworkProber`] is the real implementation. Tests substitute their own
/// to control outcomes and timing.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, job: ScanJob) -> Option<PortResult>;
}

/// TCP connect scanner
#[derive(Debug, Clone)]
pub struct TcpConnectScanner {
    timeout: Duration,
}

impl TcpConnectScanner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl PortProbe for TcpConnectScanner {
    /// Only a completed handshake is reported. Refusals, timeouts and
    /// unreachable hosts all yield `None`.
    async fn scan_port(&self, target: IpAddr, port: u16) -> Option<PortState> {
        let addr = SocketAddr::new(target, port);

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                log::debug!("tcp {} open", addr);
                Some(PortState::Open)
            }
            Ok(Err(e)) => {
                log::debug!("tcp {} connect failed: {}", addr, e);
                None
            }
            Err(_) => {
                log::debug!("tcp {} timed out after {:?}", addr, self.timeout);
                None
            }
        }
    }

    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }
}

/// UDP scanner
#[derive(Debug, Clone)]
pub struct UdpScanner {
    timeout: Duration,
}

impl UdpScanner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Bind an ephemeral local socket of the target's family and connect it,
    /// so that ICMP port-unreachable surfaces as `ConnectionRefused` on read.
    async fn open(&self, target: SocketAddr) -> io::Result<UdpSocket> {
        let local: SocketAddr = match target {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(target).await?;
        Ok(socket)
    }
}

#[async_trait]
impl PortProbe for UdpScanner {
    /// Always reports exactly one state:
    /// - `Closed` if the socket cannot be opened or the read is refused
    /// - `Open` if any datagram comes back before the timeout
    /// - `OpenFiltered` otherwise
    async fn scan_port(&self, target: IpAddr, port: u16) -> Option<PortState> {
        let addr = SocketAddr::new(target, port);

        let socket = match timeout(self.timeout, self.open(addr)).await {
            Ok(Ok(socket)) => socket,
            Ok(Err(e)) => {
                log::debug!("udp {} open failed: {}", addr, e);
                return Some(PortState::Closed);
            }
            Err(_) => {
                log::debug!("udp {} open timed out", addr);
                return Some(PortState::Closed);
            }
        };

        if let Err(e) = socket.send(&UDP_PROBE_PAYLOAD).await {
            log::debug!("udp {} send failed: {}", addr, e);
        }

        let mut buf = [0u8; UDP_RECV_BUFFER];
        let state = match timeout(self.timeout, socket.recv(&mut buf)).await {
            Ok(Ok(_)) => PortState::Open,
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => PortState::Closed,
            Ok(Err(e)) => {
                log::debug!("udp {} read failed: {}", addr, e);
                PortState::OpenFiltered
            }
            Err(_) => PortState::OpenFiltered,
        };

        log::debug!("udp {} {}", addr, state);
        Some(state)
    }

    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }
}

/// Real-network prober dispatching each job to the probe for its protocol.
#[derive(Debug, Clone)]
pub struct NetworkProber {
    tcp: TcpConnectScanner,
    udp: UdpScanner,
}

impl NetworkProber {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tcp: TcpConnectScanner::new(timeout),
            udp: UdpScanner::new(timeout),
        }
    }

    fn probe_for(&self, protocol: Protocol) -> &dyn PortProbe {
        match protocol {
            Protocol::Tcp => &self.tcp,
            Protocol::Udp => &self.udp,
        }
    }
}

#[async_trait]
impl Prober for NetworkProber {
    async fn probe(&self, job: ScanJob) -> Option<PortResult> {
        let probe = self.probe_for(job.protocol);
        probe
            .scan_port(job.address, job.port)
            .await
            .map(|state| PortResult::new(job.port, probe.protocol(), state))
    }
}
