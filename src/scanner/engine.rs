//! Main scanning engine implementation
//!
//! One task is spawned per (port, protocol) pair. A semaphore caps how many
//! of them are probing at once, results flow back over a pre-sized mpsc
//! channel, and the collected lines are sorted once at the end so the report
//! does not depend on completion order.

use crate::config::ScanConfig;
use crate::network::resolver::resolve_target;
use crate::network::socket::{NetworkProber, Prober};
use crate::network::Protocol;
use crate::scanner::{ScanJob, ScanReport};
use crate::utils::{ports::require_ports, Logger};
use futures::future::join_all;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};

/// Main scanning engine
pub struct ScanEngine<P = NetworkProber> {
    prober: Arc<P>,
    concurrency: usize,
}

impl ScanEngine<NetworkProber> {
    /// Create an engine probing the real network with the given configuration
    pub fn new(config: &ScanConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self::with_prober(
            NetworkProber::new(config.timeout_duration()),
            config.effective_concurrency(),
        ))
    }
}

impl<P: Prober + 'static> ScanEngine<P> {
    /// Create an engine around any [`Prober`]. The bound is clamped to
    /// `1..=Semaphore::MAX_PERMITS`.
    pub fn with_prober(prober: P, concurrency: usize) -> Self {
        Self {
            prober: Arc::new(prober),
            concurrency: concurrency.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every (port, protocol) pair against one address and return the
    /// emitted lines in lexicographic order.
    ///
    /// The ordering is plain string ordering, so `"TCP 100 Open"` sorts
    /// before `"TCP 25 Open"`.
    pub async fn scan_address(
        &self,
        address: IpAddr,
        ports: &[u16],
        protocols: &[Protocol],
    ) -> Vec<String> {
        let job_count = ports.len() * protocols.len();
        if job_count == 0 {
            return Vec::new();
        }

        // Every job sends at most one line, so producers never wait on capacity.
        let (tx, mut rx) = mpsc::channel::<String>(job_count);
        let gate = Arc::new(Semaphore::new(self.concurrency));

        let mut handles = Vec::with_capacity(job_count);
        for &port in ports {
            for &protocol in protocols {
                let job = ScanJob::new(address, port, protocol);
                let prober = Arc::clone(&self.prober);
                let gate = Arc::clone(&gate);
                let tx = tx.clone();

                handles.push(tokio::spawn(async move {
                    let permit = match gate.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return,
                    };

                    if let Some(result) = prober.probe(job).await {
                        let _ = tx.send(result.to_string()).await;
                    }

                    drop(permit);
                }));
            }
        }

        // The supervisor holds the last sender and drops it once every probe
        // task has finished, which ends the drain loop below.
        let supervisor = tokio::spawn(async move {
            for outcome in join_all(handles).await {
                if let Err(e) = outcome {
                    log::error!("Probe task for {} failed: {}", address, e);
                }
            }
            drop(tx);
        });

        let mut results = Vec::with_capacity(job_count);
        while let Some(line) = rx.recv().await {
            results.push(line);
        }

        if let Err(e) = supervisor.await {
            log::error!("Scan supervisor for {} failed: {}", address, e);
        }

        results.sort();
        results
    }

    /// Resolve `target` and scan each of its addresses in turn.
    ///
    /// An unresolvable target yields no reports.
    pub async fn scan_target(
        &self,
        target: &str,
        ports: &[u16],
        protocols: &[Protocol],
    ) -> Vec<ScanReport> {
        let addresses = resolve_target(target).await;
        if addresses.is_empty() {
            log::info!("{} did not resolve to any address", target);
        }

        let mut reports = Vec::with_capacity(addresses.len());
        for address in addresses {
            reports.push(self.scan_single_host(address, ports, protocols).await);
        }
        reports
    }

    async fn scan_single_host(
        &self,
        address: IpAddr,
        ports: &[u16],
        protocols: &[Protocol],
    ) -> ScanReport {
        let start_time = Instant::now();
        Logger::log_scan_start(&address.to_string(), ports.len(), protocols);

        let results = self.scan_address(address, ports, protocols).await;

        let duration = start_time.elapsed();
        Logger::log_scan_complete(duration, results.len(), ports.len() * protocols.len());
        ScanReport::new(address, results).with_duration(duration)
    }
}

/// Scan the target described by `config` over the real network.
///
/// Fails only on unusable input: an invalid timeout or a port
/// specification with no valid ports.
pub async fn run(config: &ScanConfig) -> crate::Result<Vec<ScanReport>> {
    let ports = require_ports(&config.ports)?;
    let protocols = Protocol::select(&config.protocol);
    let engine = ScanEngine::new(config)?;

    Ok(engine.scan_target(&config.target, &ports, &protocols).await)
}
