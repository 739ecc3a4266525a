//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <file>` or `$XDG_CONFIG_HOME/rstree/rstree.toml`
//! 3. Environment variables: `RSTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::codec::{self, DEFAULT_INDENT_WIDTH};
use crate::domain::ModelOptions;

/// Unified configuration for rstree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root value, shown as the column header (default: "TreeView")
    pub root_title: String,
    /// Value of freshly inserted rows (default: "New Item")
    pub placeholder: String,
    /// Value of rows created by insert-row/insert-child (default: "[No data]")
    pub empty_item: String,
    /// Header label used when a column has none (default: "[No header]")
    pub empty_header: String,
    /// Spaces per nesting level when saving (default: 4)
    pub indent_width: usize,
    /// Extension appended to saved documents lacking it (default: "txt")
    pub extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        let model = ModelOptions::default();
        Self {
            root_title: model.root_title,
            placeholder: model.placeholder,
            empty_item: model.empty_item,
            empty_header: model.empty_header,
            indent_width: DEFAULT_INDENT_WIDTH,
            extension: "txt".into(),
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_title: Option<String>,
    pub placeholder: Option<String>,
    pub empty_item: Option<String>,
    pub empty_header: Option<String>,
    pub indent_width: Option<usize>,
    pub extension: Option<String>,
}

/// Get the XDG config directory for rstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rstree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// An explicit `config_file` must exist and takes the place of the
    /// global config file.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        let file = match config_file {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => global_config_path().filter(|p| p.exists()),
        };
        if let Some(path) = file {
            debug!("loading config from {}", path.display());
            let raw = load_raw_settings(&path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_title: overlay
                .root_title
                .clone()
                .unwrap_or_else(|| self.root_title.clone()),
            placeholder: overlay
                .placeholder
                .clone()
                .unwrap_or_else(|| self.placeholder.clone()),
            empty_item: overlay
                .empty_item
                .clone()
                .unwrap_or_else(|| self.empty_item.clone()),
            empty_header: overlay
                .empty_header
                .clone()
                .unwrap_or_else(|| self.empty_header.clone()),
            indent_width: overlay.indent_width.unwrap_or(self.indent_width),
            extension: overlay
                .extension
                .clone()
                .unwrap_or_else(|| self.extension.clone()),
        }
    }

    /// Apply RSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RSTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_title") {
            settings.root_title = val;
        }
        if let Ok(val) = config.get_string("placeholder") {
            settings.placeholder = val;
        }
        if let Ok(val) = config.get_string("empty_item") {
            settings.empty_item = val;
        }
        if let Ok(val) = config.get_string("empty_header") {
            settings.empty_header = val;
        }
        if let Ok(val) = config.get_int("indent_width") {
            settings.indent_width = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("indent_width must not be negative: {}", val),
            })?;
        }
        if let Ok(val) = config.get_string("extension") {
            settings.extension = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.indent_width == 0 {
            return Err(ApplicationError::Config {
                message: "indent_width must be at least 1".into(),
            });
        }
        if self.extension.starts_with('.') {
            return Err(ApplicationError::Config {
                message: format!("extension must not start with a dot: {}", self.extension),
            });
        }
        for (key, value) in [
            ("placeholder", &self.placeholder),
            ("empty_item", &self.empty_item),
        ] {
            if codec::line_value(value) != Some(value.as_str()) {
                return Err(ApplicationError::Config {
                    message: format!(
                        "{} must be a non-blank single line without surrounding spaces: {:?}",
                        key, value
                    ),
                });
            }
        }
        Ok(())
    }

    /// Values handed to every model built with these settings.
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            root_title: self.root_title.clone(),
            placeholder: self.placeholder.clone(),
            empty_item: self.empty_item.clone(),
            empty_header: self.empty_header.clone(),
            indent_width: self.indent_width,
        }
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            indent_width: Some(2),
            ..RawSettings::default()
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.indent_width, 2);
        assert_eq!(merged.root_title, "TreeView");
    }

    #[test]
    fn test_validate_rejects_zero_indent() {
        let settings = Settings {
            indent_width: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_model_options_follow_settings() {
        let settings = Settings {
            placeholder: "item".into(),
            ..Settings::default()
        };
        assert_eq!(settings.model_options().placeholder, "item");
    }
}
