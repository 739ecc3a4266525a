//! Tests for DocumentService

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use rstree::application::services::{DocumentService, DEFAULT_DOCUMENT};
use rstree::application::ApplicationError;
use rstree::domain::{Address, ModelEvent, ModelOptions, Role, TreeModel};
use rstree::infrastructure::traits::{FileSystem, FixedChooser, RealFileSystem};
use rstree::util::testing;

// ============================================================
// Mock
// ============================================================

/// In-memory filesystem recording every write.
#[derive(Default)]
struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileSystem {
    fn with_file(path: &str, content: &str) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.as_bytes().to_vec());
        fs
    }

    fn content(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(Path::new(path))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn ensure_parent(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

fn setup(fs: MemoryFileSystem) -> (Arc<MemoryFileSystem>, DocumentService) {
    testing::init_test_setup();
    let fs = Arc::new(fs);
    let service = DocumentService::new(fs.clone(), "txt");
    (fs, service)
}

// ============================================================
// open
// ============================================================

#[test]
fn given_outline_file_when_opening_then_model_is_reset_to_it() {
    // Arrange
    let (_fs, service) = setup(MemoryFileSystem::with_file("doc.txt", "A\n    B\n"));
    let mut model = TreeModel::from_text("Old\n", ModelOptions::default());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    model.subscribe(move |event: &ModelEvent, _: &TreeModel| {
        sink.lock().unwrap().push(event.clone())
    });

    // Act
    let opened = service
        .open(&FixedChooser::new("doc.txt"), &mut model)
        .unwrap();

    // Assert
    assert!(opened);
    assert_eq!(model.to_text(), "A\n    B\n");
    assert_eq!(
        *events.lock().unwrap(),
        vec![ModelEvent::ModelAboutToBeReset, ModelEvent::ModelReset]
    );
}

#[test]
fn given_empty_file_when_opening_then_model_is_kept() {
    // Arrange
    let (_fs, service) = setup(MemoryFileSystem::with_file("empty.txt", ""));
    let mut model = TreeModel::from_text("Keep\n", ModelOptions::default());

    // Act
    let opened = service
        .open(&FixedChooser::new("empty.txt"), &mut model)
        .unwrap();

    // Assert
    assert!(!opened);
    assert_eq!(model.to_text(), "Keep\n");
}

#[test]
fn given_cancelled_chooser_when_opening_then_nothing_happens() {
    let (_fs, service) = setup(MemoryFileSystem::default());
    let mut model = TreeModel::from_text("Keep\n", ModelOptions::default());

    let opened = service.open(&FixedChooser::cancelled(), &mut model).unwrap();

    assert!(!opened);
    assert_eq!(model.to_text(), "Keep\n");
}

#[test]
fn given_missing_file_when_opening_then_error_names_path() {
    let (_fs, service) = setup(MemoryFileSystem::default());
    let mut model = TreeModel::default();

    let result = service.open(&FixedChooser::new("missing.txt"), &mut model);

    match result {
        Err(ApplicationError::OperationFailed { context, .. }) => {
            assert!(context.contains("missing.txt"), "context was: {}", context);
        }
        other => panic!("expected OperationFailed, got {:?}", other),
    }
}

#[test]
fn given_invalid_utf8_when_opening_then_bytes_are_replaced_not_rejected() {
    let fs = MemoryFileSystem::default();
    fs.write(Path::new("bin.txt"), b"A\n    \xffB\n").unwrap();
    let (_fs, service) = setup(fs);
    let mut model = TreeModel::default();

    assert!(service.open(&FixedChooser::new("bin.txt"), &mut model).unwrap());

    let a = model.index(0, 0, &Address::invalid());
    let b = model.index(0, 0, &a);
    assert_eq!(model.data(&b, Role::Display), Some("\u{fffd}B"));
}

// ============================================================
// save
// ============================================================

#[test]
fn given_name_without_extension_when_saving_then_txt_is_appended() {
    // Arrange
    let (fs, service) = setup(MemoryFileSystem::default());
    let model = TreeModel::from_text("A\n  B\n", ModelOptions::default());

    // Act
    let written = service.save(&FixedChooser::new("outline"), &model).unwrap();

    // Assert
    assert_eq!(written, Some(PathBuf::from("outline.txt")));
    assert_eq!(fs.content("outline.txt").as_deref(), Some("A\n    B\n"));
    assert!(!fs.exists(Path::new("outline")));
}

#[test]
fn given_cancelled_chooser_when_saving_then_nothing_is_written() {
    let (fs, service) = setup(MemoryFileSystem::default());
    let model = TreeModel::from_text("A\n", ModelOptions::default());

    let written = service.save(&FixedChooser::cancelled(), &model).unwrap();

    assert_eq!(written, None);
    assert!(fs.files.lock().unwrap().is_empty());
}

#[test]
fn given_real_filesystem_when_saving_then_reopening_yields_same_document() {
    // Arrange
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let service = DocumentService::new(Arc::new(RealFileSystem), "txt");
    let model = service.default_document(ModelOptions::default());
    let target = temp.path().join("nested/dir/default");

    // Act
    let written = service
        .save(&FixedChooser::new(&target), &model)
        .unwrap()
        .unwrap();
    let mut reopened = TreeModel::default();
    let opened = service
        .open(&FixedChooser::new(&written), &mut reopened)
        .unwrap();

    // Assert
    assert!(opened);
    assert_eq!(written, temp.path().join("nested/dir/default.txt"));
    assert_eq!(fs::read_to_string(&written).unwrap(), DEFAULT_DOCUMENT);
    assert_eq!(reopened.to_text(), model.to_text());
}

#[test]
fn given_custom_indent_width_when_saving_then_file_uses_it() {
    let (fs, service) = setup(MemoryFileSystem::default());
    let options = ModelOptions {
        indent_width: 2,
        ..ModelOptions::default()
    };
    let model = TreeModel::from_text("A\n    B\n        C\n", options);

    service.save(&FixedChooser::new("two.txt"), &model).unwrap();

    assert_eq!(fs.content("two.txt").as_deref(), Some("A\n  B\n    C\n"));
}
