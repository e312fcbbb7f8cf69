//! Collection and shot-list manifest behaviour against real files.

use ramses_out::review::scanner::{Scanner, PREVIEW_DIR_NAME, SHOTS_DIR_NAME};
use ramses_out::review::{CollectCancelToken, Collector, SHOT_LIST_NAME};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn make_preview(root: &Path, shot_folder: &str, step: &str, contents: &[u8]) -> PathBuf {
    let preview_dir = root
        .join(SHOTS_DIR_NAME)
        .join(shot_folder)
        .join(format!("{}_{}", shot_folder, step))
        .join(PREVIEW_DIR_NAME);
    fs::create_dir_all(&preview_dir).unwrap();
    let path = preview_dir.join(format!("{}_{}.mp4", shot_folder, step));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn collect_copies_bytes_and_writes_manifest() {
    let project = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let dest = dest.path().join("package");

    make_preview(project.path(), "PRJ_S_SH010", "COMP", b"ten frames of comp");
    make_preview(project.path(), "PRJ_S_SH020", "ANIM", b"blocking pass");

    let records = Scanner::new(project.path()).scan().unwrap().records;
    assert_eq!(records.len(), 2);

    let cancel = CollectCancelToken::new();
    let result = Collector::new("PRJ")
        .collect(&records, &dest, None, &cancel)
        .unwrap();

    assert!(!result.cancelled);
    assert!(result.failures.is_empty());
    assert_eq!(result.copied.len(), 2);
    for (src, copied_to) in &result.copied {
        assert_eq!(fs::read(src).unwrap(), fs::read(copied_to).unwrap());
        assert_eq!(copied_to.parent().unwrap(), dest);
    }

    let manifest = fs::read_to_string(dest.join(SHOT_LIST_NAME)).unwrap();
    assert!(manifest.starts_with("Review Package - PRJ"));
    assert!(manifest.contains("SH010 - COMP"));
    assert!(manifest.contains("SH020 - ANIM"));
    assert!(manifest.contains("Total: 2 shots"));
}

#[test]
fn cancel_after_two_files_copies_exactly_two() {
    let project = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let dest = dest.path().join("package");

    for n in [10, 20, 30, 40] {
        make_preview(project.path(), &format!("PRJ_S_SH{:03}", n), "COMP", b"x");
    }
    let records = Scanner::new(project.path()).scan().unwrap().records;
    assert_eq!(records.len(), 4);

    // The progress callback runs synchronously after each copy, so
    // cancelling from it stops before the next file starts
    let cancel = CollectCancelToken::new();
    let handle = cancel.clone();
    let mut on_progress = |p: ramses_out::review::CollectProgress| {
        if p.current == 2 {
            handle.cancel();
        }
    };
    let result = Collector::new("PRJ")
        .collect(&records, &dest, Some(&mut on_progress), &cancel)
        .unwrap();

    assert!(result.cancelled);
    assert_eq!(result.copied.len(), 2);

    // The manifest lists exactly the copied files
    let manifest = fs::read_to_string(dest.join(SHOT_LIST_NAME)).unwrap();
    assert!(manifest.contains("SH010 - COMP"));
    assert!(manifest.contains("SH020 - COMP"));
    assert!(!manifest.contains("SH030"));
    assert!(manifest.contains("Total: 2 shots"));
}

#[test]
fn missing_source_is_a_per_file_failure() {
    let project = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let dest = dest.path().join("package");

    make_preview(project.path(), "PRJ_S_SH010", "COMP", b"a");
    let vanished = make_preview(project.path(), "PRJ_S_SH020", "COMP", b"b");
    make_preview(project.path(), "PRJ_S_SH030", "COMP", b"c");

    let records = Scanner::new(project.path()).scan().unwrap().records;
    assert_eq!(records.len(), 3);
    fs::remove_file(&vanished).unwrap();

    let cancel = CollectCancelToken::new();
    let result = Collector::new("PRJ")
        .collect(&records, &dest, None, &cancel)
        .unwrap();

    assert!(!result.cancelled);
    assert_eq!(result.copied.len(), 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].source, vanished);

    let manifest = fs::read_to_string(dest.join(SHOT_LIST_NAME)).unwrap();
    assert!(!manifest.contains("SH020"));
    assert!(manifest.contains("Total: 2 shots"));
}

#[test]
fn manifest_groups_by_sequence_in_first_seen_order() {
    let project = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let dest = dest.path().join("package");

    make_preview(project.path(), "PRJ_S_SEQ01_SH010", "COMP", b"a");
    make_preview(project.path(), "PRJ_S_SEQ01_SH020", "COMP", b"b");
    make_preview(project.path(), "PRJ_S_SEQ02_SH010", "ANIM", b"c");
    make_preview(project.path(), "PRJ_S_SH990", "COMP", b"d");

    let records = Scanner::new(project.path()).scan().unwrap().records;
    assert_eq!(records.len(), 4);

    let cancel = CollectCancelToken::new();
    let result = Collector::new("PRJ")
        .collect(&records, &dest, None, &cancel)
        .unwrap();
    assert_eq!(result.copied.len(), 4);

    let manifest = fs::read_to_string(dest.join(SHOT_LIST_NAME)).unwrap();
    let seq01 = manifest.find("# SEQ01").unwrap();
    let seq02 = manifest.find("# SEQ02").unwrap();
    let ungrouped = manifest.find("# Ungrouped").unwrap();
    assert!(seq01 < seq02);
    assert!(seq02 < ungrouped);
    assert!(manifest.contains("Total: 4 shots"));

    // Both SEQ01 shots sit under the SEQ01 heading
    let seq01_block = &manifest[seq01..seq02];
    assert!(seq01_block.contains("SH010 - COMP"));
    assert!(seq01_block.contains("SH020 - COMP"));
}
