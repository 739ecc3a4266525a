//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read the whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write bytes to file, replacing its content.
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// File chooser abstraction (open/save dialogs, command line arguments).
pub trait FileChooser: Send + Sync {
    /// Path of the document to open.
    /// Returns None if user cancels.
    fn open_file(&self) -> Option<PathBuf>;

    /// Path to save the document to.
    /// Returns None if user cancels.
    fn save_file(&self) -> Option<PathBuf>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Chooser answering every dialog with paths fixed up front (e.g. from the command line).
#[derive(Debug, Clone, Default)]
pub struct FixedChooser {
    open: Option<PathBuf>,
    save: Option<PathBuf>,
}

impl FixedChooser {
    /// Same path for opening and saving.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            open: Some(path.clone()),
            save: Some(path),
        }
    }

    pub fn with_save(mut self, path: impl Into<PathBuf>) -> Self {
        self.save = Some(path.into());
        self
    }

    /// Chooser that behaves like a cancelled dialog.
    pub fn cancelled() -> Self {
        Self::default()
    }
}

impl FileChooser for FixedChooser {
    fn open_file(&self) -> Option<PathBuf> {
        self.open.clone()
    }

    fn save_file(&self) -> Option<PathBuf> {
        self.save.clone()
    }
}
