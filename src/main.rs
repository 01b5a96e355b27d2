use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use std::process;

use lunascan::{
    config::ScanConfig,
    interactive::run_interactive,
    output::{log_file_path, OutputConfig, OutputFormat, OutputManager},
    scanner::{engine, ScanEngine, ScanSummary},
    utils::Logger,
    banner, ScanError,
};

fn build_cli() -> Command {
    Command::new("lunascan")
        .about("Luna Port Scanner: concurrent TCP/UDP port scanning")
        .disable_version_flag(true)
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .value_name("HOST")
                .help("Target host (domain or IP). Without it, an interactive session starts"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORTS")
                .help("Ports: 80,443 or 20-25")
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("protocol")
                .long("protocol")
                .value_name("PROTOCOL")
                .help("TCP | UDP | BOTH (anything else means TCP)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("Timeout per probe in seconds")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("concurrency")
                .short('c')
                .long("concurrency")
                .value_name("COUNT")
                .help("Concurrency level (above 100 is not recommended)")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("show")
                .long("show")
                .help("Show results on screen instead of saving to a log file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-format")
                .short('o')
                .long("output-format")
                .value_name("FORMAT")
                .help("Result format")
                .value_parser(["text", "json"]),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Read settings from this TOML file instead of ~/.lunascan.toml"),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Show version")
                .action(ArgAction::SetTrue),
        )
}

/// Command-line flags win over the config file and the environment
fn apply_cli_overrides(config: &mut ScanConfig, matches: &ArgMatches) -> anyhow::Result<()> {
    if let Some(target) = matches.get_one::<String>("target") {
        config.target = target.clone();
    }
    if let Some(ports) = matches.get_one::<String>("port") {
        config.ports = ports.clone();
    }
    if let Some(protocol) = matches.get_one::<String>("protocol") {
        config.protocol = protocol.clone();
    }
    if let Some(&timeout) = matches.get_one::<f64>("timeout") {
        config.timeout = timeout;
    }
    if let Some(&concurrency) = matches.get_one::<i64>("concurrency") {
        config.concurrency = usize::try_from(concurrency.max(1)).unwrap_or(usize::MAX);
    }
    if matches.get_flag("show") {
        config.show = true;
    }
    if let Some(format) = matches.get_one::<String>("output-format") {
        config.output_format = format
            .parse::<OutputFormat>()
            .map_err(anyhow::Error::msg)?;
    }
    if matches.get_flag("no-color") {
        config.colored = false;
    }
    Ok(())
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<ScanConfig> {
    let config = match matches.get_one::<String>("config") {
        Some(path) => ScanConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config file {}", path))?,
        None => ScanConfig::load_default_config(),
    };
    Ok(config.apply_env())
}

async fn run_once(config: &ScanConfig) -> anyhow::Result<()> {
    if config.ports.trim().is_empty() {
        eprintln!("{}", "[!] No ports provided.".bright_red());
        return Ok(());
    }

    let reports = match engine::run(config).await {
        Ok(reports) => reports,
        Err(ScanError::PortRangeError(_)) => {
            eprintln!("{}", "[!] No valid ports specified.".bright_red());
            return Ok(());
        }
        Err(e) if e.is_user_error() => {
            eprintln!("{} {}", "[!]".bright_red(), e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let file = if config.show {
        None
    } else {
        Some(log_file_path(&config.target, config.output_format)?)
    };

    let output = OutputManager::new(OutputConfig {
        format: config.output_format,
        file,
        colored: config.colored,
    });
    output
        .write_results(&reports)
        .context("Failed to write scan results")?;

    let summary = ScanSummary::from_reports(&reports);
    log::info!(
        "{}: {} address(es), {} result line(s) in {:.2}s",
        config.target,
        summary.addresses,
        summary.result_lines,
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        println!("{}", banner());
        return Ok(());
    }

    Logger::init(Logger::level_from_verbosity(matches.get_count("verbose")));

    let mut config = load_config(&matches)?;
    apply_cli_overrides(&mut config, &matches)?;

    if !config.colored {
        colored::control::set_override(false);
    }

    if let Err(e) = config.validate() {
        eprintln!("{} {}", "[!]".bright_red(), e);
        process::exit(2);
    }

    if config.target.trim().is_empty() {
        let engine = ScanEngine::new(&config)?;
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        run_interactive(&engine, stdin, &mut stdout, config.colored)
            .await
            .context("Interactive session failed")?;
        return Ok(());
    }

    run_once(&config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> ArgMatches {
        build_cli().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = ScanConfig::default();
        let m = matches(&[
            "lunascan", "-t", "example.com", "-p", "20-25", "--protocol", "both",
            "--timeout", "0.5", "-c", "-3", "--show", "-o", "json",
        ]);
        apply_cli_overrides(&mut config, &m).unwrap();

        assert_eq!(config.target, "example.com");
        assert_eq!(config.ports, "20-25");
        assert_eq!(config.protocol, "both");
        assert_eq!(config.timeout, 0.5);
        assert_eq!(config.concurrency, 1);
        assert!(config.show);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_version_text_matches_banner() {
        assert_eq!(banner(), format!("Luna Port Scanner v{}", lunascan::VERSION));
    }

    #[test]
    fn test_absent_flags_keep_config_values() {
        let mut config = ScanConfig::default().with_concurrency(80).with_protocol("UDP");
        apply_cli_overrides(&mut config, &matches(&["lunascan"])).unwrap();

        assert_eq!(config.concurrency, 80);
        assert_eq!(config.protocol, "UDP");
        assert!(config.target.is_empty());
    }
}
