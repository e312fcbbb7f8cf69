//! Output formatting utilities for CLI commands
//!
//! Consistent tables, human-readable sizes and status colors for the
//! terminal surface.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use ramses_out::review::SendStatus;

/// Format a file size in human-readable form
///
/// Examples:
/// - 500 -> "500 B"
/// - 1536000 -> "1.5 MB"
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Build a table with the house preset and a header row
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());
    table
}

/// Status cell with the usual traffic-light coloring
pub fn status_cell(status: SendStatus) -> Cell {
    let cell = Cell::new(status.to_string());
    match status {
        SendStatus::Ready => cell.fg(Color::Green),
        SendStatus::ReadyUpdated => cell.fg(Color::Yellow),
        SendStatus::Sent => cell.fg(Color::DarkGrey),
    }
}
