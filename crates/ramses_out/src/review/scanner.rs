//! Preview scanner
//!
//! Walks the fixed shot/step convention under a project root:
//!
//! ```text
//! <root>/05-SHOTS/<PRJ>_S_<SHOT>/<PRJ>_S_<SHOT>_<STEP>/_preview/<file>
//! ```
//!
//! Every scan starts from scratch and reflects the on-disk state at that
//! moment. Files that fail to parse and directories that cannot be read
//! are recorded as diagnostics, never fatal. Filters run over the scanned
//! records in memory; they do not touch the disk again.

use super::error::{ReviewError, Result};
use super::markers::{latest_marker, list_markers};
use super::naming::{parse_preview_name, split_shot_id, ParsedName};
use super::types::{PreviewFormat, PreviewRecord, ScanOutcome, ScanSkip, SendStatus};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Shots folder under the project root, per the pipeline convention
pub const SHOTS_DIR_NAME: &str = "05-SHOTS";
/// Preview folder inside each step folder
pub const PREVIEW_DIR_NAME: &str = "_preview";

/// Date-range filter over preview modification times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    /// Current week, Monday through Sunday
    ThisWeek,
    ThisMonth,
    All,
}

/// Scans a project tree for preview files
#[derive(Debug)]
pub struct Scanner {
    project_root: PathBuf,
    shots_dir: PathBuf,
}

impl Scanner {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let shots_dir = project_root.join(SHOTS_DIR_NAME);
        Self {
            project_root,
            shots_dir,
        }
    }

    /// Scan the project for preview files.
    ///
    /// Records come back in a stable path order, so an unchanged tree
    /// scans to an identical outcome every time. The only fatal case is
    /// a project root that is not a readable directory; an absent shots
    /// folder is just an empty project.
    pub fn scan(&self) -> Result<ScanOutcome> {
        if !self.project_root.is_dir() {
            return Err(ReviewError::ProjectRootUnreadable(
                self.project_root.clone(),
            ));
        }

        let mut outcome = ScanOutcome::default();
        if !self.shots_dir.is_dir() {
            debug!(dir = %self.shots_dir.display(), "No shots folder, empty scan");
            return Ok(outcome);
        }

        // Depth 4 relative to the shots folder is exactly the preview files
        let walker = WalkDir::new(&self.shots_dir)
            .min_depth(4)
            .max_depth(4)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.shots_dir.clone());
                    warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    outcome.skips.push(ScanSkip {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path
                .parent()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str())
                != Some(PREVIEW_DIR_NAME)
            {
                continue;
            }

            let format = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(PreviewFormat::from_extension)
                .unwrap_or(PreviewFormat::Other);
            if !format.is_preview() {
                continue;
            }

            match self.build_record(path, format) {
                Ok(record) => outcome.records.push(record),
                Err(reason) => {
                    debug!(path = %path.display(), reason = %reason, "Skipping preview");
                    outcome.skips.push(ScanSkip {
                        path: path.to_path_buf(),
                        reason,
                    });
                }
            }
        }

        info!(
            root = %self.project_root.display(),
            previews = outcome.records.len(),
            skipped = outcome.skips.len(),
            "Scan complete"
        );
        Ok(outcome)
    }

    fn build_record(&self, path: &Path, format: PreviewFormat) -> std::result::Result<PreviewRecord, String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| "filename is not valid UTF-8".to_string())?;

        // Filename convention first, folder structure as fallback
        let parsed = match parse_preview_name(stem) {
            Ok(parsed) => parsed,
            Err(parse_err) => {
                parse_from_folders(path).ok_or_else(|| parse_err.to_string())?
            }
        };

        let metadata = path
            .metadata()
            .map_err(|e| format!("cannot stat file: {}", e))?;
        let modified_at = metadata
            .modified()
            .map(|t| DateTime::<Local>::from(t).naive_local())
            .map_err(|e| format!("no modification time: {}", e))?;

        // The preview folder belongs to one shot+step under the
        // convention, so directory scope is step scope for markers.
        let markers = path.parent().map(list_markers).unwrap_or_default();
        let last_marker = latest_marker(&markers).cloned();
        let status = SendStatus::derive(modified_at, last_marker.as_ref());

        Ok(PreviewRecord {
            project: parsed.project,
            sequence: parsed.sequence,
            shot: parsed.shot,
            step: parsed.step,
            path: path.to_path_buf(),
            format,
            size_bytes: metadata.len(),
            modified_at,
            status,
            last_marker,
        })
    }
}

/// Recover naming components from the folder structure when the filename
/// itself does not follow the convention. The shot folder is named
/// `<PRJ>_S_<SHOT>` and the step folder appends `_<STEP>` to it.
fn parse_from_folders(path: &Path) -> Option<ParsedName> {
    let preview_dir = path.parent()?;
    let step_dir = preview_dir.parent()?;
    let shot_dir = step_dir.parent()?;

    let shot_name = shot_dir.file_name()?.to_str()?;
    let (project, shot_id) = shot_name.split_once("_S_")?;
    if project.is_empty() || shot_id.is_empty() {
        return None;
    }

    let step_name = step_dir.file_name()?.to_str()?;
    let step = step_name
        .strip_prefix(shot_name)
        .and_then(|s| s.strip_prefix('_'))
        .unwrap_or(step_name);
    if step.is_empty() {
        return None;
    }

    let (sequence, shot) = split_shot_id(shot_id);
    Some(ParsedName {
        project: project.to_string(),
        sequence,
        shot,
        step: step.to_string(),
    })
}

/// Keep records whose modification date falls inside `range`, relative to
/// today's local date.
pub fn filter_by_date(records: Vec<PreviewRecord>, range: DateRange) -> Vec<PreviewRecord> {
    filter_by_date_from(records, range, Local::now().date_naive())
}

/// As [`filter_by_date`], with an explicit "today" for deterministic tests.
pub fn filter_by_date_from(
    records: Vec<PreviewRecord>,
    range: DateRange,
    today: NaiveDate,
) -> Vec<PreviewRecord> {
    if range == DateRange::All {
        return records;
    }
    records
        .into_iter()
        .filter(|record| {
            let date = record.modified_at.date();
            match range {
                DateRange::Today => date == today,
                DateRange::ThisWeek => {
                    let monday =
                        today - Days::new(u64::from(today.weekday().num_days_from_monday()));
                    date >= monday
                }
                DateRange::ThisMonth => {
                    date.year() == today.year() && date.month() == today.month()
                }
                DateRange::All => true,
            }
        })
        .collect()
}

/// Keep records belonging to the given sequence
pub fn filter_by_sequence(records: Vec<PreviewRecord>, sequence: &str) -> Vec<PreviewRecord> {
    records
        .into_iter()
        .filter(|record| record.sequence.as_deref() == Some(sequence))
        .collect()
}

/// Keep records belonging to the given step
pub fn filter_by_step(records: Vec<PreviewRecord>, step: &str) -> Vec<PreviewRecord> {
    records
        .into_iter()
        .filter(|record| record.step == step)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::markers::{write_marker_at, MARKER_PREFIX};
    use crate::review::types::MarkerMetadata;
    use chrono::NaiveDateTime;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use tempfile::TempDir;

    fn make_preview(root: &Path, shot_folder: &str, step: &str, file: &str) -> PathBuf {
        let preview_dir = root
            .join(SHOTS_DIR_NAME)
            .join(shot_folder)
            .join(format!("{}_{}", shot_folder, step))
            .join(PREVIEW_DIR_NAME);
        fs::create_dir_all(&preview_dir).unwrap();
        let path = preview_dir.join(file);
        fs::write(&path, b"fake video data").unwrap();
        path
    }

    fn set_mtime(path: &Path, dt: NaiveDateTime) {
        // The scanner reads mtimes back as naive local time, so convert
        // through the local timezone
        let secs = dt.and_local_timezone(Local).single().unwrap().timestamp();
        set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn meta() -> MarkerMetadata {
        MarkerMetadata {
            destination: "Local".to_string(),
            user: "alice".to_string(),
            package_name: "PKG".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_scan_empty_project() {
        let root = TempDir::new().unwrap();
        let outcome = Scanner::new(root.path()).scan().unwrap();
        assert!(outcome.records.is_empty());
        assert!(outcome.skips.is_empty());
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let root = TempDir::new().unwrap();
        let gone = root.path().join("nope");
        let err = Scanner::new(&gone).scan().unwrap_err();
        assert!(matches!(err, ReviewError::ProjectRootUnreadable(_)));
    }

    #[test]
    fn test_scan_finds_previews_with_status() {
        let root = TempDir::new().unwrap();
        let _ready = make_preview(root.path(), "TEST_S_SH010", "COMP", "TEST_S_SH010_COMP.mp4");

        // SH020 has a marker newer than the preview: Sent
        let sent = make_preview(root.path(), "TEST_S_SH020", "ANIM", "TEST_S_SH020_ANIM.mp4");
        set_mtime(&sent, at(2026, 3, 1, 10));
        write_marker_at(sent.parent().unwrap(), &meta(), at(2026, 3, 2, 10)).unwrap();

        // SH030 was re-rendered after its marker: Ready (Updated)
        let updated = make_preview(root.path(), "TEST_S_SH030", "COMP", "TEST_S_SH030_COMP.mp4");
        write_marker_at(updated.parent().unwrap(), &meta(), at(2026, 3, 1, 10)).unwrap();
        set_mtime(&updated, at(2026, 3, 2, 10));

        let outcome = Scanner::new(root.path()).scan().unwrap();
        assert_eq!(outcome.records.len(), 3);

        let by_shot = |shot: &str| {
            outcome
                .records
                .iter()
                .find(|r| r.shot == shot)
                .unwrap_or_else(|| panic!("missing shot {shot}"))
        };
        assert_eq!(by_shot("SH010").status, SendStatus::Ready);
        assert_eq!(by_shot("SH020").status, SendStatus::Sent);
        assert_eq!(by_shot("SH030").status, SendStatus::ReadyUpdated);
        assert_eq!(by_shot("SH010").step, "COMP");
        assert_eq!(by_shot("SH010").project, "TEST");
    }

    #[test]
    #[cfg(unix)]
    fn test_scan_skips_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        make_preview(root.path(), "TEST_S_SH010", "COMP", "TEST_S_SH010_COMP.mp4");
        make_preview(root.path(), "TEST_S_SH020", "COMP", "TEST_S_SH020_COMP.mp4");

        let locked = root
            .path()
            .join(SHOTS_DIR_NAME)
            .join("TEST_S_SH010")
            .join("TEST_S_SH010_COMP");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not bind root; nothing to exercise then
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let outcome = Scanner::new(root.path()).scan();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let outcome = outcome.unwrap();
        assert_eq!(outcome.skips.len(), 1);
        assert!(outcome.skips[0].path.starts_with(&locked));
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].shot, "SH020");
    }

    #[test]
    fn test_scan_skips_non_preview_files() {
        let root = TempDir::new().unwrap();
        make_preview(root.path(), "TEST_S_SH010", "COMP", "TEST_S_SH010_COMP.mp4");
        // Marker files and stray extensions in the preview folder are not previews
        let dir = root
            .path()
            .join(SHOTS_DIR_NAME)
            .join("TEST_S_SH010")
            .join("TEST_S_SH010_COMP")
            .join(PREVIEW_DIR_NAME);
        fs::write(dir.join(format!("{}2026-03-01.txt", MARKER_PREFIX)), b"x").unwrap();
        fs::write(dir.join("thumb.png"), b"x").unwrap();

        let outcome = Scanner::new(root.path()).scan().unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.skips.is_empty());
    }

    #[test]
    fn test_scan_falls_back_to_folder_structure() {
        let root = TempDir::new().unwrap();
        make_preview(root.path(), "TEST_S_SH040", "LAYOUT", "render_final_v2.mp4");

        let outcome = Scanner::new(root.path()).scan().unwrap();
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.project, "TEST");
        assert_eq!(record.shot, "SH040");
        assert_eq!(record.step, "LAYOUT");
    }

    #[test]
    fn test_scan_records_skip_for_unparseable_file() {
        let root = TempDir::new().unwrap();
        // Neither the filename nor the folder structure parses
        let preview_dir = root
            .path()
            .join(SHOTS_DIR_NAME)
            .join("junk")
            .join("more_junk")
            .join(PREVIEW_DIR_NAME);
        fs::create_dir_all(&preview_dir).unwrap();
        fs::write(preview_dir.join("clip.mp4"), b"x").unwrap();

        let outcome = Scanner::new(root.path()).scan().unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skips.len(), 1);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let root = TempDir::new().unwrap();
        make_preview(root.path(), "TEST_S_SH010", "COMP", "TEST_S_SH010_COMP.mp4");
        make_preview(root.path(), "TEST_S_SH020", "ANIM", "TEST_S_SH020_ANIM.mp4");

        let scanner = Scanner::new(root.path());
        let first = scanner.scan().unwrap();
        let second = scanner.scan().unwrap();
        let summary = |o: &ScanOutcome| {
            o.records
                .iter()
                .map(|r| (r.path.clone(), r.status))
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&first), summary(&second));
    }

    #[test]
    fn test_filter_composition_is_order_independent() {
        let root = TempDir::new().unwrap();
        make_preview(
            root.path(),
            "PRJ_S_SEQ01_SH010",
            "COMP",
            "PRJ_S_SEQ01_SH010_COMP.mp4",
        );
        make_preview(
            root.path(),
            "PRJ_S_SEQ01_SH020",
            "ANIM",
            "PRJ_S_SEQ01_SH020_ANIM.mp4",
        );
        make_preview(
            root.path(),
            "PRJ_S_SEQ02_SH030",
            "COMP",
            "PRJ_S_SEQ02_SH030_COMP.mp4",
        );

        let records = Scanner::new(root.path()).scan().unwrap().records;

        let seq_then_step =
            filter_by_step(filter_by_sequence(records.clone(), "SEQ01"), "COMP");
        let step_then_seq =
            filter_by_sequence(filter_by_step(records, "COMP"), "SEQ01");

        assert_eq!(seq_then_step.len(), 1);
        assert_eq!(seq_then_step[0].shot, "SH010");
        assert_eq!(
            seq_then_step.iter().map(|r| &r.path).collect::<Vec<_>>(),
            step_then_seq.iter().map(|r| &r.path).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_filter_by_date_ranges() {
        let root = TempDir::new().unwrap();
        let today_file =
            make_preview(root.path(), "TEST_S_SH010", "COMP", "TEST_S_SH010_COMP.mp4");
        let last_week =
            make_preview(root.path(), "TEST_S_SH020", "COMP", "TEST_S_SH020_COMP.mp4");
        let last_year =
            make_preview(root.path(), "TEST_S_SH030", "COMP", "TEST_S_SH030_COMP.mp4");

        // Wednesday 2026-03-18 as "today"
        let today = NaiveDate::from_ymd_opt(2026, 3, 18).unwrap();
        set_mtime(&today_file, at(2026, 3, 18, 9));
        set_mtime(&last_week, at(2026, 3, 11, 9)); // previous Wednesday
        set_mtime(&last_year, at(2025, 3, 18, 9));

        let records = Scanner::new(root.path()).scan().unwrap().records;
        assert_eq!(records.len(), 3);

        let shots = |records: &[PreviewRecord]| {
            records.iter().map(|r| r.shot.clone()).collect::<Vec<_>>()
        };

        let today_only = filter_by_date_from(records.clone(), DateRange::Today, today);
        assert_eq!(shots(&today_only), ["SH010"]);

        // Week of the 16th: the 11th is out, the 18th is in
        let this_week = filter_by_date_from(records.clone(), DateRange::ThisWeek, today);
        assert_eq!(shots(&this_week), ["SH010"]);

        let this_month = filter_by_date_from(records.clone(), DateRange::ThisMonth, today);
        assert_eq!(shots(&this_month), ["SH010", "SH020"]);

        let all = filter_by_date_from(records, DateRange::All, today);
        assert_eq!(all.len(), 3);
    }
}
