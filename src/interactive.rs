//! Interactive prompt loop
//!
//! Asks for a target, ports and protocol, scans, prints the transcript and
//! offers another round. Reading is async so the loop can share the runtime
//! with the scan it drives; any reader/writer pair works, which is how the
//! tests script a session.

use crate::network::socket::Prober;
use crate::network::Protocol;
use crate::output::write_text_report;
use crate::scanner::ScanEngine;
use crate::utils::ports::parse_ports;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const TARGET_PROMPT: &str = "Enter domain or IP: ";
pub const PORTS_PROMPT: &str = "Enter port(s): ";
pub const PROTOCOL_PROMPT: &str = "Enter protocol (TCP/UDP/BOTH) [default TCP]: ";
pub const AGAIN_PROMPT: &str = "\nScan another target? (y/n): ";
pub const INVALID_PORTS: &str = "[!] Invalid ports";

/// Run prompt rounds until the user declines another scan or input ends.
pub async fn run_interactive<P, R, W>(
    engine: &ScanEngine<P>,
    mut reader: R,
    writer: &mut W,
    colored: bool,
) -> io::Result<()>
where
    P: Prober + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(writer, "{}", crate::banner())?;

    loop {
        let target = match prompt(&mut reader, writer, TARGET_PROMPT).await? {
            Some(target) => target,
            None => return Ok(()),
        };
        if target.is_empty() {
            continue;
        }

        let port_spec = match prompt(&mut reader, writer, PORTS_PROMPT).await? {
            Some(spec) => spec,
            None => return Ok(()),
        };
        let ports = parse_ports(&port_spec);
        if ports.is_empty() {
            writeln!(writer, "{}", INVALID_PORTS)?;
            continue;
        }

        let keyword = match prompt(&mut reader, writer, PROTOCOL_PROMPT).await? {
            Some(keyword) => keyword,
            None => return Ok(()),
        };
        let protocols = Protocol::select(&keyword);

        let reports = engine.scan_target(&target, &ports, &protocols).await;
        for report in &reports {
            write_text_report(writer, report, colored)?;
        }

        match prompt(&mut reader, writer, AGAIN_PROMPT).await? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
            _ => return Ok(()),
        }
    }
}

/// Print `message` and read one trimmed line. `None` at end of input.
async fn prompt<R, W>(reader: &mut R, writer: &mut W, message: &str) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(writer, "{}", message)?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{PortResult, PortState};
    use crate::scanner::ScanJob;
    use async_trait::async_trait;

    struct OnlySsh;

    #[async_trait]
    impl Prober for OnlySsh {
        async fn probe(&self, job: ScanJob) -> Option<PortResult> {
            (job.protocol == Protocol::Tcp && job.port == 22)
                .then(|| PortResult::new(job.port, job.protocol, PortState::Open))
        }
    }

    async fn session(input: &str) -> String {
        let engine = ScanEngine::with_prober(OnlySsh, 4);
        let mut out = Vec::new();
        run_interactive(&engine, input.as_bytes(), &mut out, false)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_single_round() {
        let out = session("127.0.0.1\n20-22\n\nn\n").await;
        assert!(out.starts_with(&format!("{}\n", crate::banner())));
        assert!(out.contains("--- Scanning 127.0.0.1 ---\n   TCP 22 Open\n"));
        assert!(out.ends_with(AGAIN_PROMPT));
    }

    #[tokio::test]
    async fn test_invalid_ports_restart_the_round() {
        let out = session("127.0.0.1\n0,abc\n127.0.0.1\n80\nudp\nN\n").await;
        assert!(out.contains(INVALID_PORTS));
        assert!(out.contains("   No open ports found"));
    }

    #[tokio::test]
    async fn test_blank_target_and_eof_end_cleanly() {
        let out = session("\n\n").await;
        assert_eq!(out.matches(TARGET_PROMPT).count(), 3);
        assert!(!out.contains("Scanning"));
    }

    #[tokio::test]
    async fn test_yes_starts_another_round() {
        let out = session("127.0.0.1\n22\ntcp\nY\n127.0.0.1\n23\ntcp\nn\n").await;
        assert_eq!(out.matches("--- Scanning 127.0.0.1 ---").count(), 2);
    }
}
