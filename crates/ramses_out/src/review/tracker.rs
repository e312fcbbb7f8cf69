//! Delivery tracking
//!
//! Marking a selection as sent writes one marker per preview folder and
//! appends one line per shot to the personal history log. The batch is not
//! atomic: a failure on item N is reported for that item and everything
//! before it stands. Free-form fields are sanitized before they reach the
//! log format.

use super::error::Result;
use super::history::{sanitize_field, HistoryLog};
use super::markers::write_marker;
use super::types::{HistoryEntry, MarkerMetadata, PreviewRecord, TrackFailure, TrackOutcome};
use chrono::Local;
use std::path::Path;
use tracing::{info, warn};

/// Orchestrates markers and history entries for sent previews
#[derive(Debug)]
pub struct Tracker {
    history: HistoryLog,
}

impl Tracker {
    pub fn new(history: HistoryLog) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Mark every preview in `selection` as sent.
    ///
    /// Per item: write the marker, then append the history line. Items
    /// whose marker cannot be written are collected as failures and the
    /// batch continues; a history append failure after a successful marker
    /// is reported the same way (the marker is not removed).
    pub fn mark_as_sent(
        &self,
        selection: &[PreviewRecord],
        destination: &str,
        user: &str,
        package_name: &str,
        notes: Option<&str>,
    ) -> TrackOutcome {
        let metadata = MarkerMetadata {
            destination: sanitize_field(destination),
            user: sanitize_field(user),
            package_name: sanitize_field(package_name),
            notes: notes.map(sanitize_field).filter(|n| !n.is_empty()),
        };

        let mut outcome = TrackOutcome::default();
        for record in selection {
            match self.mark_one(record, &metadata) {
                Ok(marker) => outcome.markers.push(marker),
                Err(e) => {
                    warn!(
                        shot = %record.shot_id(),
                        step = %record.step,
                        error = %e,
                        "Failed to mark preview as sent"
                    );
                    outcome.failures.push(TrackFailure {
                        shot_id: record.shot_id(),
                        step: record.step.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            sent = outcome.markers.len(),
            failed = outcome.failures.len(),
            package = %metadata.package_name,
            "Marked selection as sent"
        );
        outcome
    }

    fn mark_one(
        &self,
        record: &PreviewRecord,
        metadata: &MarkerMetadata,
    ) -> Result<super::types::Marker> {
        let dir = record.path.parent().unwrap_or(Path::new("."));
        let marker = write_marker(dir, metadata)?;

        self.history.append(&[HistoryEntry {
            timestamp: Local::now().naive_local(),
            category: "Review".to_string(),
            shot_id: record.shot_id(),
            step: record.step.clone(),
            destination: metadata.destination.clone(),
            user: metadata.user.clone(),
            package_name: metadata.package_name.clone(),
        }])?;

        Ok(marker)
    }
}
