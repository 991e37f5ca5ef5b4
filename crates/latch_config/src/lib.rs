//! Latch Config Assets
//!
//! Designer-authored configuration assets, accessed as one instance per type:
//! - Tagged asset types and shared handles
//! - Instance registry over a bulk-scanned resources folder
//! - Singleton accessor with authoring-time auto-creation
//! - Placement validation for tooling

mod asset;
mod error;
mod options;
mod registry;
mod singleton;
mod store;
mod types;
mod validation;

#[cfg(test)]
mod testing;

pub use asset::{AssetMeta, AssetTag, ConfigAsset, ConfigHandle};
pub use error::ConfigError;
pub use options::{ConfigOptions, StorageLayout};
pub use registry::InstanceRegistry;
pub use singleton::{ConfigSingletons, ConfigSingletonsBuilder};
pub use store::{encode_asset, AssetSource, AuthoringStore, Envelope, FsStore, LoadedAsset};
pub use types::{AssetTypeInfo, AssetTypeTable};
pub use validation::{check_placement, Placement};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
