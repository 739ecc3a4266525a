//! Document service
//!
//! Loads and saves tree documents through the file chooser and filesystem boundaries.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{ModelOptions, TreeModel};
use crate::infrastructure::traits::{FileChooser, FileSystem};

/// Outline used for new documents.
pub const DEFAULT_DOCUMENT: &str = include_str!("../../../resources/default.txt");

/// Service for reading and writing outline documents.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
    extension: String,
}

impl DocumentService {
    /// Create a new document service saving with the given file extension (without dot).
    pub fn new(fs: Arc<dyn FileSystem>, extension: impl Into<String>) -> Self {
        Self {
            fs,
            extension: extension.into(),
        }
    }

    /// Appends the document extension unless the file name already ends with it.
    pub fn with_extension(&self, path: &Path) -> PathBuf {
        let has_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension.as_str()));
        if has_extension || self.extension.is_empty() {
            return path.to_path_buf();
        }
        let mut name = OsString::from(path.as_os_str());
        name.push(".");
        name.push(&self.extension);
        PathBuf::from(name)
    }

    /// Replace the model's content with the chosen document.
    ///
    /// Returns `Ok(false)` without touching the model if the chooser was
    /// cancelled or the file is empty.
    #[instrument(level = "debug", skip(self, chooser, model))]
    pub fn open(&self, chooser: &dyn FileChooser, model: &mut TreeModel) -> ApplicationResult<bool> {
        let Some(path) = chooser.open_file() else {
            debug!("open cancelled");
            return Ok(false);
        };
        let bytes = self.fs.read(&path).with_path_context("read document", &path)?;
        if bytes.is_empty() {
            info!("{} is empty, keeping current document", path.display());
            return Ok(false);
        }
        model.reset_from_text(&String::from_utf8_lossy(&bytes));
        debug!("opened {} ({} nodes)", path.display(), model.tree().len());
        Ok(true)
    }

    /// Write the serialized model to the chosen path.
    ///
    /// Returns the path actually written, or `None` if the chooser was cancelled.
    #[instrument(level = "debug", skip(self, chooser, model))]
    pub fn save(&self, chooser: &dyn FileChooser, model: &TreeModel) -> ApplicationResult<Option<PathBuf>> {
        let Some(chosen) = chooser.save_file() else {
            debug!("save cancelled");
            return Ok(None);
        };
        let path = self.with_extension(&chosen);
        self.fs
            .ensure_parent(&path)
            .with_path_context("create directory for", &path)?;
        self.fs
            .write(&path, model.to_text().as_bytes())
            .with_path_context("write document", &path)?;
        debug!("saved {}", path.display());
        Ok(Some(path))
    }

    /// Model holding the bundled default outline.
    pub fn default_document(&self, options: ModelOptions) -> TreeModel {
        TreeModel::from_text(DEFAULT_DOCUMENT, options)
    }
}
