//! Send command - mark previews as delivered

use super::{resolve_context, scan_project, FilterArgs, StatusArg};
use clap::Args;
use ramses_out::config::default_history_path;
use ramses_out::review::{HistoryLog, Tracker};
use ramses_out::OutConfig;
use std::path::PathBuf;

/// Arguments for the send command
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Project root (overrides the configured one)
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Where the previews went (a review site, a drive, "Local")
    #[arg(long, default_value = "Local")]
    pub destination: String,

    /// Package name recorded in markers and history
    #[arg(long)]
    pub package: Option<String>,

    /// Free-form note stored in the markers
    #[arg(long)]
    pub notes: Option<String>,
}

/// Execute the send command
pub fn run(mut args: SendArgs) -> anyhow::Result<()> {
    // Without an explicit status, re-marking already-sent previews makes
    // no sense, so restrict to ready ones.
    if args.filters.status.is_none() {
        args.filters.status = Some(StatusArg::Ready);
    }

    let config = OutConfig::load();
    let context = resolve_context(args.root.clone(), &config)?;

    let outcome = scan_project(&context)?;
    let selection = args.filters.apply(outcome.records);
    if selection.is_empty() {
        println!("Nothing to mark as sent.");
        return Ok(());
    }

    let package = args
        .package
        .clone()
        .unwrap_or_else(|| context.code.clone());
    let tracker = Tracker::new(HistoryLog::new(default_history_path()?));
    let tracked = tracker.mark_as_sent(
        &selection,
        &args.destination,
        &context.user,
        &package,
        args.notes.as_deref(),
    );

    for marker in &tracked.markers {
        println!("  sent: {}", marker.file_name);
    }
    for failure in &tracked.failures {
        eprintln!(
            "  failed: {} {} ({})",
            failure.shot_id, failure.step, failure.reason
        );
    }
    if tracked.failures.is_empty() {
        println!("Marked {} previews as sent.", tracked.markers.len());
    } else {
        println!(
            "Marked {} previews as sent with {} failures.",
            tracked.markers.len(),
            tracked.failures.len()
        );
    }

    Ok(())
}
