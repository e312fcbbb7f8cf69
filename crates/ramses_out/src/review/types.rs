//! Core types for the review delivery system
//!
//! A preview is a rendered video artifact living under the project's shot
//! tree. Markers are sidecar files recording past deliveries; a preview's
//! send-status is derived from its modification time and the most recent
//! marker in its folder, never stored.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// File extension category of a preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewFormat {
    Mp4,
    Mov,
    Avi,
    Other,
}

impl PreviewFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" => PreviewFormat::Mp4,
            "mov" => PreviewFormat::Mov,
            "avi" => PreviewFormat::Avi,
            _ => PreviewFormat::Other,
        }
    }

    /// True for the container formats the scanner picks up
    pub fn is_preview(&self) -> bool {
        !matches!(self, PreviewFormat::Other)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            PreviewFormat::Mp4 => "mp4",
            PreviewFormat::Mov => "mov",
            PreviewFormat::Avi => "avi",
            PreviewFormat::Other => "bin",
        }
    }

    /// Uppercase label used in the shot list manifest
    pub fn label(&self) -> &'static str {
        match self {
            PreviewFormat::Mp4 => "MP4",
            PreviewFormat::Mov => "MOV",
            PreviewFormat::Avi => "AVI",
            PreviewFormat::Other => "OTHER",
        }
    }
}

/// Send-status of a preview, derived at scan time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendStatus {
    /// Never delivered
    Ready,
    /// Delivered, but the preview changed since
    #[serde(rename = "ReadyUpdated")]
    ReadyUpdated,
    /// Delivered and unchanged since
    Sent,
}

impl SendStatus {
    /// Pure derivation: no marker means Ready; a preview modified strictly
    /// after the latest marker is Ready (Updated); otherwise Sent.
    pub fn derive(modified_at: NaiveDateTime, last_marker: Option<&Marker>) -> Self {
        match last_marker {
            None => SendStatus::Ready,
            Some(marker) if modified_at > marker.created_at => SendStatus::ReadyUpdated,
            Some(_) => SendStatus::Sent,
        }
    }

    /// True when the preview still needs (re)delivery
    pub fn is_ready(&self) -> bool {
        matches!(self, SendStatus::Ready | SendStatus::ReadyUpdated)
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendStatus::Ready => write!(f, "Ready"),
            SendStatus::ReadyUpdated => write!(f, "Ready (Updated)"),
            SendStatus::Sent => write!(f, "Sent"),
        }
    }
}

/// A sidecar file recording one past delivery of a preview folder.
///
/// Markers are written once and never mutated; several may coexist in a
/// folder, one per distinct send day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Location of the marker file
    pub path: PathBuf,
    /// Filename, kept for deterministic tie-breaking
    pub file_name: String,
    /// When the delivery happened (from the `Uploaded` line, or the
    /// filename date at midnight when the contents are unreadable)
    pub created_at: NaiveDateTime,
    pub destination: String,
    pub user: String,
    pub package_name: String,
    pub notes: Option<String>,
}

/// Metadata written into a new marker file
#[derive(Debug, Clone)]
pub struct MarkerMetadata {
    pub destination: String,
    pub user: String,
    pub package_name: String,
    pub notes: Option<String>,
}

/// One discovered preview file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRecord {
    pub project: String,
    pub sequence: Option<String>,
    pub shot: String,
    pub step: String,
    /// Absolute location of the media file
    pub path: PathBuf,
    pub format: PreviewFormat,
    pub size_bytes: u64,
    pub modified_at: NaiveDateTime,
    pub status: SendStatus,
    /// Most recent marker found next to the preview, if any
    pub last_marker: Option<Marker>,
}

impl PreviewRecord {
    /// Shot identifier as it appears in filenames, sequence prefix included
    pub fn shot_id(&self) -> String {
        match &self.sequence {
            Some(seq) => format!("{}_{}", seq, self.shot),
            None => self.shot.clone(),
        }
    }

    pub fn display_name(&self) -> String {
        format!(
            "{}_S_{}_{}.{}",
            self.project,
            self.shot_id(),
            self.step,
            self.format.extension()
        )
    }

    /// Size in binary megabytes
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// A file the scanner saw but could not turn into a record
#[derive(Debug, Clone, Serialize)]
pub struct ScanSkip {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything a scan produced: the ordered records plus skip diagnostics
#[derive(Debug, Default, Serialize)]
pub struct ScanOutcome {
    pub records: Vec<PreviewRecord>,
    pub skips: Vec<ScanSkip>,
}

/// Progress update during a collect operation
#[derive(Debug, Clone)]
pub struct CollectProgress {
    /// Files handled so far
    pub current: usize,
    pub total: usize,
    pub file_name: String,
}

/// A source that could not be copied
#[derive(Debug, Clone, Serialize)]
pub struct CollectFailure {
    pub source: PathBuf,
    pub reason: String,
}

/// Outcome of a collect operation
#[derive(Debug, Default, Serialize)]
pub struct CollectionResult {
    /// (source, destination) pairs successfully copied, in selection order
    pub copied: Vec<(PathBuf, PathBuf)>,
    pub failures: Vec<CollectFailure>,
    /// True when the operation stopped early on request
    pub cancelled: bool,
}

/// One line of the personal history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: NaiveDateTime,
    /// Category label, always "Review" for deliveries made by this tool
    pub category: String,
    pub shot_id: String,
    pub step: String,
    pub destination: String,
    pub user: String,
    pub package_name: String,
}

/// A selection item that could not be marked as sent
#[derive(Debug, Clone, Serialize)]
pub struct TrackFailure {
    pub shot_id: String,
    pub step: String,
    pub reason: String,
}

/// Outcome of marking a selection as sent. Earlier successes stand even
/// when later items fail; nothing is rolled back.
#[derive(Debug, Default)]
pub struct TrackOutcome {
    pub markers: Vec<Marker>,
    pub failures: Vec<TrackFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn marker_at(created_at: NaiveDateTime) -> Marker {
        Marker {
            path: PathBuf::from("/tmp/.review_sent_2026-01-10.txt"),
            file_name: ".review_sent_2026-01-10.txt".to_string(),
            created_at,
            destination: "Local".to_string(),
            user: "alice".to_string(),
            package_name: "PKG".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_status_no_marker_is_ready() {
        assert_eq!(
            SendStatus::derive(dt(2026, 1, 10, 12), None),
            SendStatus::Ready
        );
    }

    #[test]
    fn test_status_modified_after_marker_is_updated() {
        let marker = marker_at(dt(2026, 1, 10, 12));
        assert_eq!(
            SendStatus::derive(dt(2026, 1, 11, 12), Some(&marker)),
            SendStatus::ReadyUpdated
        );
    }

    #[test]
    fn test_status_modified_at_or_before_marker_is_sent() {
        let marker = marker_at(dt(2026, 1, 10, 12));
        // Strictly before
        assert_eq!(
            SendStatus::derive(dt(2026, 1, 9, 12), Some(&marker)),
            SendStatus::Sent
        );
        // Exactly equal counts as covered
        assert_eq!(
            SendStatus::derive(dt(2026, 1, 10, 12), Some(&marker)),
            SendStatus::Sent
        );
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(PreviewFormat::from_extension("MP4"), PreviewFormat::Mp4);
        assert_eq!(PreviewFormat::from_extension("mov"), PreviewFormat::Mov);
        assert_eq!(PreviewFormat::from_extension("avi"), PreviewFormat::Avi);
        assert_eq!(PreviewFormat::from_extension("exr"), PreviewFormat::Other);
        assert!(!PreviewFormat::Other.is_preview());
    }

    #[test]
    fn test_display_name_with_sequence() {
        let record = PreviewRecord {
            project: "PRJ".to_string(),
            sequence: Some("SEQ01".to_string()),
            shot: "SH010".to_string(),
            step: "COMP".to_string(),
            path: PathBuf::from("/p/PRJ_S_SEQ01_SH010_COMP.mp4"),
            format: PreviewFormat::Mp4,
            size_bytes: 3 * 1024 * 1024,
            modified_at: dt(2026, 1, 10, 12),
            status: SendStatus::Ready,
            last_marker: None,
        };
        assert_eq!(record.display_name(), "PRJ_S_SEQ01_SH010_COMP.mp4");
        assert_eq!(record.shot_id(), "SEQ01_SH010");
        assert!((record.size_mb() - 3.0).abs() < f64::EPSILON);
    }
}
