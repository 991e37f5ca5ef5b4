// asset.rs - Config asset identity and handles
//
// Config assets are identified by u32 tags, not Rust TypeIds.
// The tag is what gets persisted, so it must stay stable across builds.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type AssetTag = u32;

/// Trait for designer-authored configuration assets.
///
/// `Default` is the value an authoring session persists when no asset of the
/// type exists yet.
pub trait ConfigAsset: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Persisted type tag, unique per asset type.
    const TAG: AssetTag;

    /// Type name. Auto-created assets are named and stored after it.
    const NAME: &'static str;
}

/// Helper macro to implement the `ConfigAsset` trait.
///
/// # Example
/// ```ignore
/// #[derive(Default, Serialize, Deserialize)]
/// struct GameSettings { difficulty: u8 }
///
/// define_config_asset!(GameSettings, 1, "GameSettings");
/// ```
#[macro_export]
macro_rules! define_config_asset {
    ($ty:ty, $tag:expr, $name:expr) => {
        impl $crate::ConfigAsset for $ty {
            const TAG: $crate::AssetTag = $tag;
            const NAME: &'static str = $name;
        }
    };
}

/// Identity of a persisted asset: its name, type tag, and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMeta {
    pub name: String,
    pub tag: AssetTag,
    pub path: PathBuf,
}

/// Shared handle to a resolved config asset.
///
/// Cloning is cheap; every clone points at the same decoded value.
pub struct ConfigHandle<T> {
    value: Arc<T>,
    meta: Arc<AssetMeta>,
}

impl<T> ConfigHandle<T> {
    pub(crate) fn new(value: Arc<T>, meta: Arc<AssetMeta>) -> Self {
        Self { value, meta }
    }

    pub fn meta(&self) -> &AssetMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn path(&self) -> &Path {
        &self.meta.path
    }

    /// True if both handles refer to the same loaded instance.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<T> Clone for ConfigHandle<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            meta: Arc::clone(&self.meta),
        }
    }
}

impl<T> Deref for ConfigHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for ConfigHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigHandle")
            .field("name", &self.meta.name)
            .field("path", &self.meta.path)
            .field("value", &self.value)
            .finish()
    }
}
