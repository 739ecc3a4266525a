//! Tests for the real FileSystem implementation

use rstree::infrastructure::traits::{FileChooser, FileSystem, FixedChooser, RealFileSystem};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================
// ensure_parent tests
// ============================================================

#[test]
fn given_nested_missing_dirs_when_ensure_parent_then_creates_them() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("a/b/c/doc.txt");
    let fs = RealFileSystem;

    // Act
    fs.ensure_parent(&target).unwrap();

    // Assert
    assert!(temp.path().join("a/b/c").is_dir());
    assert!(!target.exists());
}

#[test]
fn given_bare_file_name_when_ensure_parent_then_nothing_to_create() {
    let fs = RealFileSystem;

    fs.ensure_parent(Path::new("doc.txt")).unwrap();
}

// ============================================================
// read / write tests
// ============================================================

#[test]
fn given_existing_file_when_write_then_content_is_replaced() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("doc.txt");
    fs::write(&target, "old content that is longer").unwrap();
    let fs = RealFileSystem;

    // Act
    fs.write(&target, b"new").unwrap();

    // Assert
    assert_eq!(fs.read(&target).unwrap(), b"new");
    assert!(fs.exists(&target));
}

#[test]
fn given_missing_file_when_read_then_not_found() {
    let temp = TempDir::new().unwrap();
    let fs = RealFileSystem;

    let err = fs.read(&temp.path().join("missing.txt")).unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

// ============================================================
// FixedChooser tests
// ============================================================

#[test]
fn given_fixed_chooser_with_save_override_when_asked_then_answers_differ() {
    let chooser = FixedChooser::new("in.txt").with_save("out.txt");

    assert_eq!(chooser.open_file().unwrap(), Path::new("in.txt"));
    assert_eq!(chooser.save_file().unwrap(), Path::new("out.txt"));
}

#[test]
fn given_cancelled_chooser_when_asked_then_no_paths() {
    let chooser = FixedChooser::cancelled();

    assert!(chooser.open_file().is_none());
    assert!(chooser.save_file().is_none());
}
