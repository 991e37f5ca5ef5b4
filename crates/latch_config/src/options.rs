//! Storage layout and runtime options

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where config assets live on disk.
///
/// Everything under `<root>/<resources_dir>` is scanned. Assets are expected
/// in the `<collection>` folder below that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageLayout {
    pub root: PathBuf,
    pub resources_dir: String,
    pub collection: String,
    pub extension: String,
}

impl StorageLayout {
    /// Layout with default folder names under `root`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn scan_root(&self) -> PathBuf {
        self.root.join(&self.resources_dir)
    }

    pub fn conventional_folder(&self) -> PathBuf {
        self.scan_root().join(&self.collection)
    }

    /// Path an asset named `name` is stored at when created by tooling.
    pub fn asset_path(&self, name: &str) -> PathBuf {
        self.conventional_folder()
            .join(format!("{}.{}", name, self.extension))
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            resources_dir: "resources".to_string(),
            collection: "config".to_string(),
            extension: "json".to_string(),
        }
    }
}

/// Options for opening a config asset context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOptions {
    /// Running inside authoring tooling. Enables auto-creation of missing assets.
    pub authoring: bool,
    pub layout: StorageLayout,
}

impl ConfigOptions {
    pub const AUTHORING_ENV: &'static str = "LATCH_AUTHORING";

    /// Read options from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Options {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `LATCH_AUTHORING` if it is set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(Self::AUTHORING_ENV) {
            self.authoring = parse_flag(&value);
            tracing::debug!(authoring = self.authoring, "authoring mode set from environment");
        }
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
