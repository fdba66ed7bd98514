use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use argus_config::{
    format_validation_errors, parse_window, ArgusConfig, ConfigError, MonitoringConfigPatch,
};
use argus_core::address::shorten_address;
use argus_detection::MonitorSnapshot;
use argus_engine::{run_monitor_mode, run_simulation_mode, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "argus", version, about = "Rate-based tripwire for contract event streams")]
pub struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Monitor a contract against synthetic traffic
    Run(RunArgs),
    /// Replay a scenario file and print its state hash
    Simulate(SimulateArgs),
    /// Load and validate configuration
    CheckConfig(CheckConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Contract address to watch (0x + 40 hex)
    #[arg(long)]
    pub target: String,
    /// Topic0 filter (0x + 64 hex)
    #[arg(long)]
    pub topic: Option<String>,
    /// Burst threshold (events per window)
    #[arg(long)]
    pub threshold: Option<u32>,
    /// Window length, e.g. `12`, `12s` or `2m`
    #[arg(long, value_parser = parse_window)]
    pub window: Option<u64>,
    /// Stop after this many seconds; runs until Ctrl-C when omitted
    #[arg(long)]
    pub duration_secs: Option<u64>,
    /// Inject a burst demo right after start
    #[arg(long)]
    pub burst_demo: bool,
    /// Configuration file; layered defaults are used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Scenario file to replay
    #[arg(short, long)]
    pub scenario: PathBuf,
    /// Expected state hash; overrides the one in the scenario
    #[arg(long)]
    pub validate_hash: Option<String>,
    /// Directory for mismatch reports
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckConfigArgs {
    /// Configuration file; layered defaults are used when omitted
    #[arg(long)]
    pub path: Option<PathBuf>,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Simulate(args) => simulate(args),
        Commands::CheckConfig(args) => check_config(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ArgusConfig, ConfigError> {
    match path {
        Some(path) => ArgusConfig::load_from_path(path),
        None => ArgusConfig::load(),
    }
}

/// Applies command-line overrides on top of the loaded configuration and enables monitoring.
pub fn build_config(args: &RunArgs, mut config: ArgusConfig) -> anyhow::Result<ArgusConfig> {
    let patch = MonitoringConfigPatch {
        enabled: Some(true),
        target_identifier: Some(args.target.clone()),
        topic_filter: args.topic.clone().map(Some),
        burst_threshold: args.threshold,
        window_seconds: args.window,
    };
    config.monitoring = config.monitoring.patched(&patch);
    if let Err(errors) = validator::Validate::validate(&config.monitoring) {
        bail!("Invalid monitoring options:\n{}", format_validation_errors(&errors));
    }
    Ok(config)
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref()).context("Failed to load configuration")?;
    let config = build_config(&args, config)?;
    info!(
        contract = %shorten_address(&config.monitoring.target_identifier),
        topic = config.monitoring.topic_label(),
        profile = %config.monitoring.risk_profile(),
        "Starting monitor"
    );

    let options = RunOptions {
        duration: args.duration_secs.map(Duration::from_secs),
        burst_demo: args.burst_demo,
        ..RunOptions::default()
    };
    let summary = run_monitor_mode(config, options).await?;

    print_snapshot(&summary.snapshot);
    println!("Processed events: {}", summary.processed);
    println!("Alerts ({}):", summary.alerts.len());
    for entry in &summary.alerts {
        println!("  {} {}", entry.raised_at.format("%H:%M:%S"), entry.alert);
    }
    Ok(())
}

fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let report = run_simulation_mode(&args.scenario, args.validate_hash, args.report_dir)
        .with_context(|| format!("Scenario {} failed", args.scenario.display()))?;
    print_snapshot(&report.final_snapshot);
    println!(
        "Transitions: {}  Alerts: {}  Incidents: {}",
        report.transitions.len(),
        report.alerts.len(),
        report.incidents.len()
    );
    println!("State hash: {}", report.hash);
    Ok(())
}

fn check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    match load_config(args.path.as_ref()) {
        Ok(config) => {
            println!("Configuration OK");
            println!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
        Err(ConfigError::Validation(errors)) => {
            bail!("Configuration invalid:\n{}", format_validation_errors(&errors))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_snapshot(snapshot: &MonitorSnapshot) {
    println!("Status: {} ({})", snapshot.status, snapshot.status.description());
    println!(
        "Window: {} events (warning at {}, burst at {}, {}s window)",
        snapshot.window_count,
        snapshot.warning_threshold,
        snapshot.burst_threshold,
        snapshot.window_seconds
    );
    if let Some(incident) = &snapshot.incident {
        println!(
            "Incident: {} events at {} on {}",
            incident.event_count_at_detection,
            incident.detected_at.to_rfc3339(),
            shorten_address(&incident.target_identifier)
        );
    }
}
