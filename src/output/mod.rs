//! Output formatting and management

use crate::error::ScanError;
use crate::scanner::ScanReport;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Line printed for an address that produced no result lines
pub const NO_RESULTS_LINE: &str = "No open ports found";

const INDENT: &str = "   ";

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "log",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Destination file; stdout when `None`
    pub file: Option<PathBuf>,
    pub colored: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            file: None,
            colored: true,
        }
    }
}

/// Main output manager
pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Write reports to the configured file, or to stdout.
    ///
    /// Files are never coloured.
    pub fn write_results(&self, reports: &[ScanReport]) -> crate::Result<()> {
        match &self.config.file {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    ScanError::OutputError(format!("Cannot create {}: {}", path.display(), e))
                })?;
                let mut writer = BufWriter::new(file);
                self.render(&mut writer, reports, false)?;
                writer.flush()?;
                log::info!("Results written to {}", path.display());
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                self.render(&mut handle, reports, self.config.colored)?;
                handle.flush()?;
            }
        }
        Ok(())
    }

    /// Render reports in the configured format
    pub fn render<W: Write>(
        &self,
        writer: &mut W,
        reports: &[ScanReport],
        colored: bool,
    ) -> crate::Result<()> {
        match self.config.format {
            OutputFormat::Text => {
                for report in reports {
                    write_text_report(writer, report, colored)?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, reports)?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }
}

/// Write one address's transcript block: header, then indented lines.
pub fn write_text_report<W: Write>(
    writer: &mut W,
    report: &ScanReport,
    colored: bool,
) -> io::Result<()> {
    let header = format!("--- Scanning {} ---", report.address);
    writeln!(writer)?;
    if colored {
        writeln!(writer, "{}", header.bright_magenta().bold())?;
    } else {
        writeln!(writer, "{}", header)?;
    }

    if report.results.is_empty() {
        if colored {
            writeln!(writer, "{}{}", INDENT, NO_RESULTS_LINE.red())?;
        } else {
            writeln!(writer, "{}{}", INDENT, NO_RESULTS_LINE)?;
        }
        return Ok(());
    }

    for line in &report.results {
        if colored {
            writeln!(writer, "{}{}", INDENT, colorize_line(line))?;
        } else {
            writeln!(writer, "{}{}", INDENT, line)?;
        }
    }
    Ok(())
}

fn colorize_line(line: &str) -> ColoredString {
    if line.ends_with("Open|Filtered") {
        line.yellow()
    } else if line.ends_with("Open") {
        line.green()
    } else {
        line.red()
    }
}

/// File name results for `target` are persisted under, e.g. `scan-example.com.log`.
///
/// Path separators in the target are replaced so the file always lands in
/// the working directory.
pub fn log_file_path(target: &str, format: OutputFormat) -> crate::Result<PathBuf> {
    let target = target.trim();
    if target.is_empty() {
        return Err(ScanError::InvalidTarget(
            "cannot name a log file after an empty target".to_string(),
        ));
    }

    let name: String = target
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    Ok(PathBuf::from(format!("scan-{}.{}", name, format.extension())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn report(results: &[&str]) -> ScanReport {
        ScanReport::new(
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            results.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn render_plain(reports: &[ScanReport], format: OutputFormat) -> String {
        let manager = OutputManager::new(OutputConfig {
            format,
            file: None,
            colored: false,
        });
        let mut buf = Vec::new();
        manager.render(&mut buf, reports, false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_transcript() {
        let text = render_plain(&[report(&["TCP 22 Open", "UDP 53 Open|Filtered"])], OutputFormat::Text);
        assert_eq!(
            text,
            "\n--- Scanning 127.0.0.1 ---\n   TCP 22 Open\n   UDP 53 Open|Filtered\n"
        );
    }

    #[test]
    fn test_empty_report_prints_fallback_line() {
        let text = render_plain(&[report(&[])], OutputFormat::Text);
        assert_eq!(text, "\n--- Scanning 127.0.0.1 ---\n   No open ports found\n");
    }

    #[test]
    fn test_json_output() {
        let json = render_plain(&[report(&["TCP 80 Open"])], OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["address"], "127.0.0.1");
        assert_eq!(value[0]["results"][0], "TCP 80 Open");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_log_file_names() {
        assert_eq!(
            log_file_path("example.com", OutputFormat::Text).unwrap(),
            PathBuf::from("scan-example.com.log")
        );
        assert_eq!(
            log_file_path("10.0.0.0/8", OutputFormat::Json).unwrap(),
            PathBuf::from("scan-10.0.0.0_8.json")
        );
        assert!(log_file_path("  ", OutputFormat::Text).is_err());
    }

    #[test]
    fn test_write_results_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan-test.log");
        let manager = OutputManager::new(OutputConfig {
            format: OutputFormat::Text,
            file: Some(path.clone()),
            colored: true,
        });

        manager.write_results(&[report(&["TCP 22 Open"])]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "\n--- Scanning 127.0.0.1 ---\n   TCP 22 Open\n");
    }
}
