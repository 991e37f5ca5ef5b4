use crate::AssetTag;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while registering, persisting, or configuring config assets.
///
/// Lookups never fail: a missing asset is reported as `None`, not as an error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("asset tag {tag} is already registered to '{existing}', cannot register '{requested}'")]
    TagConflict {
        tag: AssetTag,
        existing: String,
        requested: String,
    },

    #[error("asset type '{name}' is registered under tag {existing}, not {requested}")]
    NameConflict {
        name: String,
        existing: AssetTag,
        requested: AssetTag,
    },

    #[error("i/o error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode config asset '{name}'")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse options file {}", .path.display())]
    Options {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("refusing to overwrite {} while creating '{name}'", .path.display())]
    CreateConflict { name: String, path: PathBuf },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
