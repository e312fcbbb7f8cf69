//! History command - inspect the personal delivery log

use super::output::new_table;
use clap::Args;
use ramses_out::config::default_history_path;
use ramses_out::review::HistoryLog;

/// Arguments for the history command
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Restrict to one shot id (e.g. PRJ_S_010)
    #[arg(long)]
    pub shot: Option<String>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Execute the history command
pub fn run(args: HistoryArgs) -> anyhow::Result<()> {
    let log = HistoryLog::new(default_history_path()?);
    let entries = match &args.shot {
        Some(shot) => log.entries_for_shot(shot)?,
        None => log.entries()?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No deliveries recorded.");
        return Ok(());
    }

    let mut table = new_table(&[
        "When", "Shot", "Step", "Destination", "User", "Package",
    ]);
    for entry in &entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            entry.shot_id.clone(),
            entry.step.clone(),
            entry.destination.clone(),
            entry.user.clone(),
            entry.package_name.clone(),
        ]);
    }
    println!("{table}");
    println!("{} deliveries", entries.len());

    Ok(())
}
