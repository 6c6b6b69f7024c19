//! # pact CLI entry point
//!
//! Parses command-line arguments, loads the optional config file, sets up
//! tracing, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pact_cli::config::{LogFormat, PactConfig};
use pact_cli::graph::{run_graph, GraphArgs};
use pact_cli::run::{run_scenario, RunArgs};

/// Pact contract state machine tooling.
///
/// Replays YAML contract scenarios against the contract lifecycle
/// (UNSIGNED → SIGNED → BREACHED | CLOSED_OUT) and prints the transition graph.
#[derive(Parser, Debug)]
#[command(name = "pact", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a contract scenario and report each step.
    Run(RunArgs),

    /// Print the contract transition graph.
    Graph(GraphArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = load_config(&cli);
    let log_format = config
        .as_ref()
        .map(|c| c.log_format)
        .unwrap_or_default();
    init_tracing(cli.verbose, log_format);

    tracing::debug!("pact CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = config.and_then(|config| match &cli.command {
        Commands::Run(args) => run_scenario(args, &config),
        Commands::Graph(args) => run_graph(args),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<PactConfig> {
    match &cli.config {
        Some(path) => PactConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PactConfig::default()),
    }
}

fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
