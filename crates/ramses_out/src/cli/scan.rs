//! Scan command - list previews and their send-status

use super::output::{format_size, new_table, status_cell};
use super::{resolve_context, scan_project, FilterArgs};
use clap::Args;
use comfy_table::Cell;
use ramses_out::OutConfig;
use std::path::PathBuf;

/// Arguments for the scan command
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Project root (overrides the configured one)
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Emit records as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Execute the scan command
pub fn run(args: ScanArgs) -> anyhow::Result<()> {
    let config = OutConfig::load();
    let context = resolve_context(args.root.clone(), &config)?;

    let outcome = scan_project(&context)?;
    let records = args.filters.apply(outcome.records);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No previews found under {}", context.root.display());
        return Ok(());
    }

    let mut table = new_table(&[
        "Shot", "Sequence", "Step", "Format", "Size", "Modified", "Status",
    ]);
    for record in &records {
        table.add_row(vec![
            Cell::new(&record.shot),
            Cell::new(record.sequence.as_deref().unwrap_or("-")),
            Cell::new(&record.step),
            Cell::new(record.format.label()),
            Cell::new(format_size(record.size_bytes)),
            Cell::new(record.modified_at.format("%Y-%m-%d %H:%M").to_string()),
            status_cell(record.status),
        ]);
    }
    println!("{table}");
    println!("{} previews", records.len());
    Ok(())
}
