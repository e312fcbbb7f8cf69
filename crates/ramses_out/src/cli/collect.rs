//! Collect command - copy a selection into a review package folder

use super::{resolve_context, scan_project, FilterArgs, StatusArg};
use anyhow::bail;
use clap::Args;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use ramses_out::review::{
    CollectCancelToken, CollectProgress, Collector, HistoryLog, PreviewRecord, Tracker,
};
use ramses_out::{config::default_history_path, OutConfig};
use std::path::PathBuf;

/// Arguments for the collect command
#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Project root (overrides the configured one)
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Destination folder; defaults to
    /// <root>/<default_collection_path>/<package>
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Package name; defaults to <project>_<timestamp>
    #[arg(long)]
    pub package: Option<String>,

    /// Free-form note recorded with --send
    #[arg(long)]
    pub notes: Option<String>,

    /// Mark the collected previews as sent afterwards
    #[arg(long)]
    pub send: bool,
}

/// Execute the collect command
pub fn run(mut args: CollectArgs) -> anyhow::Result<()> {
    // Previews already sent stay out of packages unless asked for
    if args.filters.status.is_none() {
        args.filters.status = Some(StatusArg::Ready);
    }

    let config = OutConfig::load();
    let context = resolve_context(args.root.clone(), &config)?;

    let outcome = scan_project(&context)?;
    let selection = args.filters.apply(outcome.records);
    if selection.is_empty() {
        println!("Nothing to collect.");
        return Ok(());
    }

    let package = args.package.clone().unwrap_or_else(|| {
        format!("{}_{}", context.code, Local::now().format("%Y%m%d_%H%M%S"))
    });
    let dest = match args.dest.clone() {
        Some(dest) => dest,
        None => {
            let relative = &config.review.default_collection_path;
            if relative.is_empty() {
                bail!("no destination: pass --dest or configure default_collection_path");
            }
            context.root.join(relative).join(&package)
        }
    };

    // Ctrl-C requests cooperative cancellation between file copies
    let cancel = CollectCancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel())?;
    }

    let bar = ProgressBar::new(selection.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} {msg}",
    )?);
    let mut on_progress = |p: CollectProgress| {
        bar.set_position(p.current as u64);
        bar.set_message(p.file_name);
    };

    let result = Collector::new(&context.code).collect(
        &selection,
        &dest,
        Some(&mut on_progress),
        &cancel,
    )?;
    bar.finish_and_clear();

    for failure in &result.failures {
        eprintln!("  failed: {} ({})", failure.source.display(), failure.reason);
    }
    match (result.cancelled, result.failures.len()) {
        (true, _) => println!(
            "Cancelled after {} of {} previews -> {}",
            result.copied.len(),
            selection.len(),
            dest.display()
        ),
        (false, 0) => println!(
            "Collected {} previews -> {}",
            result.copied.len(),
            dest.display()
        ),
        (false, n) => println!(
            "Collected {} previews with {} failures -> {}",
            result.copied.len(),
            n,
            dest.display()
        ),
    }

    if args.send && !result.copied.is_empty() {
        let copied: Vec<PreviewRecord> = selection
            .iter()
            .filter(|record| result.copied.iter().any(|(src, _)| src == &record.path))
            .cloned()
            .collect();
        let tracker = Tracker::new(HistoryLog::new(default_history_path()?));
        let tracked = tracker.mark_as_sent(
            &copied,
            "Local",
            &context.user,
            &package,
            args.notes.as_deref(),
        );
        for failure in &tracked.failures {
            eprintln!(
                "  not marked: {} {} ({})",
                failure.shot_id, failure.step, failure.reason
            );
        }
        println!(
            "Marked {} previews as sent ({} failures)",
            tracked.markers.len(),
            tracked.failures.len()
        );
    }

    Ok(())
}
