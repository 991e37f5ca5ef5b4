//! Registration table mapping asset tags to their decoders.

use crate::{AssetTag, ConfigAsset, ConfigError};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A decoded asset with its concrete type erased.
pub(crate) type ErasedAsset = Arc<dyn Any + Send + Sync>;

type DecodeFn = fn(serde_json::Value) -> Result<ErasedAsset, serde_json::Error>;

/// Describes one registered asset type.
#[derive(Clone, Copy)]
pub struct AssetTypeInfo {
    pub tag: AssetTag,
    pub name: &'static str,
    decode: DecodeFn,
}

impl AssetTypeInfo {
    pub(crate) fn decode(&self, data: serde_json::Value) -> Result<ErasedAsset, serde_json::Error> {
        (self.decode)(data)
    }
}

fn decode_erased<T: ConfigAsset>(
    data: serde_json::Value,
) -> Result<ErasedAsset, serde_json::Error> {
    let value: T = serde_json::from_value(data)?;
    Ok(Arc::new(value))
}

/// Asset types the bulk loader knows how to decode, keyed by tag.
#[derive(Default)]
pub struct AssetTypeTable {
    entries: HashMap<AssetTag, AssetTypeInfo>,
}

impl AssetTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`. Returns `Ok(true)` if the type was not known before.
    ///
    /// Re-registering the same type is a no-op. A tag or name already claimed
    /// by a different type is rejected.
    pub fn register<T: ConfigAsset>(&mut self) -> Result<bool, ConfigError> {
        if let Some(existing) = self.entries.get(&T::TAG) {
            if existing.name == T::NAME {
                return Ok(false);
            }
            return Err(ConfigError::TagConflict {
                tag: T::TAG,
                existing: existing.name.to_string(),
                requested: T::NAME.to_string(),
            });
        }

        if let Some(existing) = self.entries.values().find(|info| info.name == T::NAME) {
            return Err(ConfigError::NameConflict {
                name: T::NAME.to_string(),
                existing: existing.tag,
                requested: T::TAG,
            });
        }

        self.entries.insert(
            T::TAG,
            AssetTypeInfo {
                tag: T::TAG,
                name: T::NAME,
                decode: decode_erased::<T>,
            },
        );
        Ok(true)
    }

    pub fn get(&self, tag: AssetTag) -> Option<&AssetTypeInfo> {
        self.entries.get(&tag)
    }

    pub fn contains(&self, tag: AssetTag) -> bool {
        self.entries.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetTypeInfo> {
        self.entries.values()
    }
}
