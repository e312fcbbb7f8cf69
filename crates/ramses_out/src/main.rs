//! Ramses Out - preview delivery for review
//!
//! Scans a project tree for rendered previews, reports which ones still
//! need to go out, collects a selection into a package folder and records
//! deliveries in sidecar markers plus a personal history log.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "ramses-out", about = "Deliver rendered previews for review", version)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List previews and their send-status
    Scan(cli::scan::ScanArgs),
    /// Copy a selection into a review package folder
    Collect(cli::collect::CollectArgs),
    /// Mark previews as delivered without copying
    Send(cli::send::SendArgs),
    /// Show the personal delivery history
    History(cli::history::HistoryArgs),
    /// Show or edit the configuration
    Config(cli::config::ConfigArgs),
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Scan(args) => cli::scan::run(args),
        Commands::Collect(args) => cli::collect::run(args),
        Commands::Send(args) => cli::send::run(args),
        Commands::History(args) => cli::history::run(args),
        Commands::Config(args) => cli::config::run(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so table and JSON output stay clean on stdout
    let default_filter = if cli.verbose {
        "ramses_out=debug"
    } else {
        "ramses_out=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}
