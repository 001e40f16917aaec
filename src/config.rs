use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}};

use crate::error::{RecommendError, Result};

pub const DEFAULT_MODEL_PATH: &str = "classifier.pt";
pub const DEFAULT_META_PATH: &str = "fertilizer.json";

/// Optional JSON settings file. Anything set here is overridden by flags and
/// environment variables.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub model_path: Option<PathBuf>,
    pub meta_path: Option<PathBuf>,
    pub fertilizer_info_path: Option<PathBuf>,
    pub log_pred: Option<bool>,
}

impl SettingsFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            RecommendError::Config(format!("config file {} not readable: {e}", path.display()))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            RecommendError::Config(format!("invalid config JSON in {}: {e}", path.display()))
        })
    }
}

/// Resolved startup settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model_path: PathBuf,
    pub meta_path: PathBuf,
    pub fertilizer_info_path: Option<PathBuf>,
    pub log_pred: bool,
}

impl Settings {
    /// `explicit` holds values from flags or environment; the file fills gaps.
    pub fn resolve(explicit: SettingsFile, file: Option<SettingsFile>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            model_path: explicit
                .model_path
                .or(file.model_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            meta_path: explicit
                .meta_path
                .or(file.meta_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_META_PATH)),
            fertilizer_info_path: explicit.fertilizer_info_path.or(file.fertilizer_info_path),
            log_pred: explicit.log_pred.or(file.log_pred).unwrap_or(false),
        }
    }
}
