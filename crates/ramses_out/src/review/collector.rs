//! Preview collection
//!
//! Copies a selection of previews into a destination folder, one file at a
//! time in selection order, and writes a `shot_list.txt` manifest covering
//! the files that actually made it. The copy loop is cooperative: it
//! invokes a progress callback after each file and polls a shared cancel
//! token before each one. Cancellation keeps everything already copied;
//! nothing is rolled back.

use super::error::{ReviewError, Result};
use super::types::{CollectFailure, CollectProgress, CollectionResult, PreviewRecord};
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Manifest filename written into the destination
pub const SHOT_LIST_NAME: &str = "shot_list.txt";

/// Shared request-cancel flag for a running collect.
///
/// Clones share the flag, so the caller keeps one clone and hands the
/// other to whatever drives the operation (a Ctrl-C handler, a UI button).
#[derive(Debug, Clone, Default)]
pub struct CollectCancelToken {
    flag: Arc<AtomicBool>,
}

impl CollectCancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Copies selected previews to a destination folder
#[derive(Debug)]
pub struct Collector {
    project_name: String,
}

impl Collector {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
        }
    }

    /// Collect `selection` into `dest`.
    ///
    /// The destination is created (parents included) if absent; failure to
    /// create it is the fatal case. A source that vanished or cannot be
    /// read is a per-file failure and the batch continues. The manifest is
    /// written on completion whether or not the run was cancelled, listing
    /// exactly the copied files.
    pub fn collect(
        &self,
        selection: &[PreviewRecord],
        dest: &Path,
        mut progress: Option<&mut dyn FnMut(CollectProgress)>,
        cancel: &CollectCancelToken,
    ) -> Result<CollectionResult> {
        fs::create_dir_all(dest).map_err(|source| ReviewError::DestinationUnwritable {
            path: dest.to_path_buf(),
            source,
        })?;

        let total = selection.len();
        let mut result = CollectionResult::default();
        let mut copied_records: Vec<&PreviewRecord> = Vec::new();

        for (idx, record) in selection.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(copied = result.copied.len(), total, "Collection cancelled");
                result.cancelled = true;
                break;
            }

            let file_name = record.path.file_name().map(|name| name.to_owned());
            match &file_name {
                None => {
                    result.failures.push(CollectFailure {
                        source: record.path.clone(),
                        reason: "source has no filename".to_string(),
                    });
                }
                Some(_) if !record.path.exists() => {
                    warn!(source = %record.path.display(), "Source vanished before copy");
                    result.failures.push(CollectFailure {
                        source: record.path.clone(),
                        reason: "file not found".to_string(),
                    });
                }
                Some(file_name) => {
                    let dest_file = dest.join(file_name);
                    match fs::copy(&record.path, &dest_file) {
                        Ok(_) => {
                            copied_records.push(record);
                            result.copied.push((record.path.clone(), dest_file));
                        }
                        Err(e) => {
                            warn!(source = %record.path.display(), error = %e, "Copy failed");
                            result.failures.push(CollectFailure {
                                source: record.path.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }

            // Failed items count toward progress too, so a consumer
            // tracking `current` against `total` reaches the end
            if let Some(report) = progress.as_mut() {
                report(CollectProgress {
                    current: idx + 1,
                    total,
                    file_name: file_name
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| record.display_name()),
                });
            }
        }

        let manifest =
            generate_shot_list(&self.project_name, &copied_records, Local::now().naive_local());
        fs::write(dest.join(SHOT_LIST_NAME), manifest).map_err(|source| {
            ReviewError::DestinationUnwritable {
                path: dest.join(SHOT_LIST_NAME),
                source,
            }
        })?;

        info!(
            copied = result.copied.len(),
            failed = result.failures.len(),
            cancelled = result.cancelled,
            dest = %dest.display(),
            "Collection finished"
        );
        Ok(result)
    }
}

/// Render the shot list manifest.
///
/// Shots are grouped under `# <SEQUENCE>` headings in first-appearance
/// order of the selection; shots without a sequence fall under
/// `# Ungrouped`. Line order inside a group follows the selection.
pub fn generate_shot_list(
    project_name: &str,
    records: &[&PreviewRecord],
    generated_at: NaiveDateTime,
) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Review Package - {}", project_name));
    lines.push(format!(
        "Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M")
    ));
    lines.push(String::new());

    let mut groups: Vec<(String, Vec<&PreviewRecord>)> = Vec::new();
    for record in records {
        let key = record
            .sequence
            .clone()
            .unwrap_or_else(|| "Ungrouped".to_string());
        match groups.iter_mut().find(|(name, _)| *name == key) {
            Some((_, members)) => members.push(record),
            None => groups.push((key, vec![record])),
        }
    }

    for (sequence, members) in &groups {
        lines.push(format!("# {}", sequence));
        lines.push(String::new());
        for record in members {
            lines.push(format!(
                "{} - {} - {} ({:.1} MB)",
                record.shot,
                record.step,
                record.format.label(),
                record.size_mb()
            ));
        }
        lines.push(String::new());
    }

    lines.push("─".repeat(60));
    lines.push(format!("Total: {} shots", records.len()));
    lines.push(String::new());

    lines.join("\n")
}
