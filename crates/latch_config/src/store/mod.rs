//! Storage collaborators: the bulk loader and the authoring-time writer.

mod envelope;
mod fs;

pub use envelope::{encode_asset, Envelope};
pub use fs::FsStore;

use crate::types::ErasedAsset;
use crate::{AssetMeta, AssetTypeTable, ConfigAsset, ConfigError, ConfigHandle};
use std::path::Path;
use std::sync::Arc;

/// A persisted asset found by the last scan.
///
/// Assets whose type was not registered at scan time, or whose payload failed
/// to decode, keep their metadata but carry no value.
#[derive(Clone)]
pub struct LoadedAsset {
    meta: Arc<AssetMeta>,
    value: Option<ErasedAsset>,
}

impl LoadedAsset {
    pub fn new<T: ConfigAsset>(meta: AssetMeta, value: T) -> Self {
        Self::from_erased(meta, Arc::new(value))
    }

    pub fn undecoded(meta: AssetMeta) -> Self {
        Self {
            meta: Arc::new(meta),
            value: None,
        }
    }

    pub(crate) fn from_erased(meta: AssetMeta, value: ErasedAsset) -> Self {
        Self {
            meta: Arc::new(meta),
            value: Some(value),
        }
    }

    pub fn meta(&self) -> &AssetMeta {
        &self.meta
    }

    pub fn is_decoded(&self) -> bool {
        self.value.is_some()
    }

    /// Typed handle to this asset, or `None` if it is not a decoded `T`.
    pub fn handle<T: ConfigAsset>(&self) -> Option<ConfigHandle<T>> {
        if self.meta.tag != T::TAG {
            return None;
        }
        let value = Arc::clone(self.value.as_ref()?).downcast::<T>().ok()?;
        Some(ConfigHandle::new(value, Arc::clone(&self.meta)))
    }
}

/// Bulk load primitive: every asset under the scan root.
///
/// Never fails. A missing root yields an empty list. Unreadable entries are
/// skipped and entries that cannot be decoded are returned undecoded.
pub trait AssetSource {
    fn load_all(&self, types: &AssetTypeTable) -> Vec<LoadedAsset>;
}

/// Authoring-time persistence. Only available inside tooling.
pub trait AuthoringStore {
    fn exists(&self, path: &Path) -> bool;

    fn ensure_folder(&mut self, folder: &Path) -> Result<(), ConfigError>;

    /// Stage `contents` for `path`. Not visible until [`AuthoringStore::commit`].
    fn write_asset(&mut self, path: &Path, contents: Vec<u8>) -> Result<(), ConfigError>;

    fn commit(&mut self) -> Result<(), ConfigError>;
}
