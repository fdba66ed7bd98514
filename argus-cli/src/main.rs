//! ## argus-cli
//! **Operator interface for the Argus burst tripwire**
//!
//! - `run`: monitor a contract against synthetic traffic, optionally with a burst demo
//! - `simulate`: replay a scenario file deterministically and print its state hash
//! - `check-config`: load and validate the layered configuration

use clap::Parser;
use argus_telemetry::logging::EventLogger;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    EventLogger::init(&cli.log_level);
    commands::run_command(cli).await
}
