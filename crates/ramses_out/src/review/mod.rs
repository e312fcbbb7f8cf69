//! Review delivery core
//!
//! Scans a project tree for rendered previews, derives their send-status
//! from sidecar marker files, copies selections into review packages, and
//! records deliveries in markers plus a personal history log. Everything
//! here is filesystem-only: team visibility comes from marker files on
//! the shared drive.

pub mod collector;
pub mod error;
pub mod history;
pub mod markers;
pub mod naming;
pub mod scanner;
pub mod tracker;
pub mod types;

// Re-exports for CLI and embedding use
pub use collector::{generate_shot_list, CollectCancelToken, Collector, SHOT_LIST_NAME};
pub use error::{ParseError, ReviewError, Result};
pub use history::HistoryLog;
pub use markers::{latest_marker, list_markers, write_marker};
pub use naming::{parse_preview_name, ParsedName};
pub use scanner::{
    filter_by_date, filter_by_sequence, filter_by_step, DateRange, Scanner, PREVIEW_DIR_NAME,
    SHOTS_DIR_NAME,
};
pub use tracker::Tracker;
pub use types::{
    CollectFailure, CollectProgress, CollectionResult, HistoryEntry, Marker, MarkerMetadata,
    PreviewFormat, PreviewRecord, ScanOutcome, ScanSkip, SendStatus, TrackFailure, TrackOutcome,
};
