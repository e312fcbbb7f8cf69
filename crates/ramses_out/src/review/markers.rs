//! Marker file store
//!
//! Markers are hidden sidecar files (`.review_sent_YYYY-MM-DD.txt`) living
//! next to the previews they cover. They are the only team-visible send
//! state: no database, no server, just whole files on the shared drive.
//! Two sends on the same day collapse into one marker file (overwrite in
//! place), keeping the filenames compatible with the markers already out
//! there.

use super::error::{ReviewError, Result};
use super::types::{Marker, MarkerMetadata};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Marker filename prefix, dot included so the files stay hidden
pub const MARKER_PREFIX: &str = ".review_sent_";
/// Marker filename suffix
pub const MARKER_SUFFIX: &str = ".txt";

const UPLOADED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Enumerate all markers in a directory.
///
/// A missing or unreadable directory yields an empty list rather than an
/// error; the scanner must never die on one bad folder.
pub fn list_markers(dir: &Path) -> Vec<Marker> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Cannot enumerate markers");
            return Vec::new();
        }
    };

    let mut markers = Vec::new();
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(date) = parse_marker_name(name) {
            if let Some(marker) = read_marker(&entry.path(), date) {
                markers.push(marker);
            }
        }
    }
    markers
}

/// Extract the send date from a marker filename.
///
/// Accepts `.review_sent_YYYY-MM-DD.txt` and tolerates extra characters
/// between the date and the suffix (older tools appended a time tail).
fn parse_marker_name(name: &str) -> Option<NaiveDate> {
    let rest = name.strip_prefix(MARKER_PREFIX)?;
    if !name.ends_with(MARKER_SUFFIX) || rest.len() < 10 {
        return None;
    }
    NaiveDate::parse_from_str(rest.get(..10)?, DATE_FORMAT).ok()
}

/// Read a marker file's `Key: value` contents.
///
/// Lines without a `": "` separator continue the previous key's value, so
/// multi-line notes survive. `created_at` comes from the `Uploaded` line,
/// falling back to the filename date at midnight for markers whose body is
/// missing or damaged.
pub fn read_marker(path: &Path, file_date: NaiveDate) -> Option<Marker> {
    let file_name = path.file_name()?.to_str()?.to_string();
    let mut fields: Vec<(String, String)> = Vec::new();

    if let Ok(contents) = fs::read_to_string(path) {
        for line in contents.lines() {
            if let Some((key, value)) = line.split_once(": ") {
                fields.push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
            } else if let Some((_, value)) = fields.last_mut() {
                if !line.trim().is_empty() {
                    value.push('\n');
                    value.push_str(line.trim());
                }
            }
        }
    }

    let field = |key: &str| {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    let created_at = field("uploaded")
        .and_then(|v| NaiveDateTime::parse_from_str(&v, UPLOADED_FORMAT).ok())
        .unwrap_or_else(|| file_date.and_time(NaiveTime::MIN));

    Some(Marker {
        path: path.to_path_buf(),
        file_name,
        created_at,
        destination: field("destination").unwrap_or_default(),
        user: field("user").unwrap_or_default(),
        package_name: field("package").unwrap_or_default(),
        notes: field("notes"),
    })
}

/// Select the most recent marker.
///
/// Ordered by `created_at`, ties broken by the lexicographically greatest
/// filename, so repeated calls over the same set always agree.
pub fn latest_marker(markers: &[Marker]) -> Option<&Marker> {
    markers
        .iter()
        .max_by(|a, b| (a.created_at, &a.file_name).cmp(&(b.created_at, &b.file_name)))
}

/// Write a new marker into `dir`, named with today's date.
pub fn write_marker(dir: &Path, metadata: &MarkerMetadata) -> Result<Marker> {
    write_marker_at(dir, metadata, Local::now().naive_local())
}

/// As [`write_marker`], with an explicit timestamp. One whole-file write;
/// a same-day marker at the same path is overwritten in place.
pub fn write_marker_at(
    dir: &Path,
    metadata: &MarkerMetadata,
    now: NaiveDateTime,
) -> Result<Marker> {
    let file_name = format!(
        "{}{}{}",
        MARKER_PREFIX,
        now.format(DATE_FORMAT),
        MARKER_SUFFIX
    );
    let path = dir.join(&file_name);

    let mut contents = format!(
        "Uploaded: {}\nDestination: {}\nUser: {}\nPackage: {}\n",
        now.format(UPLOADED_FORMAT),
        metadata.destination,
        metadata.user,
        metadata.package_name,
    );
    if let Some(notes) = metadata.notes.as_deref().filter(|n| !n.is_empty()) {
        contents.push_str(&format!("Notes: {}\n", notes));
    }

    fs::write(&path, contents).map_err(|source| ReviewError::MarkerWrite {
        path: path.clone(),
        source,
    })?;

    Ok(Marker {
        path,
        file_name,
        created_at: now,
        destination: metadata.destination.clone(),
        user: metadata.user.clone(),
        package_name: metadata.package_name.clone(),
        notes: metadata.notes.clone(),
    })
}
