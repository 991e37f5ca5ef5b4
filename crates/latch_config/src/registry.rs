//! Instance registry
//!
//! Holds the snapshot of every config asset found by the last bulk scan and
//! answers "give me the instance of type T" queries against it.

use crate::{
    AssetSource, AssetTag, AssetTypeTable, ConfigAsset, ConfigError, ConfigHandle, LoadedAsset,
};
use std::collections::HashMap;

pub struct InstanceRegistry {
    source: Box<dyn AssetSource>,
    types: AssetTypeTable,
    snapshot: Vec<LoadedAsset>,
    stale: bool,
    scans: u64,
}

impl InstanceRegistry {
    /// Create a registry over `source`. The snapshot starts empty and stale.
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self::with_types(source, AssetTypeTable::new())
    }

    /// Create a registry whose first scan already decodes `types`.
    pub fn with_types(source: impl AssetSource + 'static, types: AssetTypeTable) -> Self {
        Self {
            source: Box::new(source),
            types,
            snapshot: Vec::new(),
            stale: true,
            scans: 0,
        }
    }

    pub fn types(&self) -> &AssetTypeTable {
        &self.types
    }

    /// Make `T` decodable by the next scan.
    ///
    /// A newly registered type marks the snapshot stale, since earlier scans
    /// left assets of that type undecoded.
    pub fn register_type<T: ConfigAsset>(&mut self) -> Result<(), ConfigError> {
        if self.types.register::<T>()? {
            self.stale = true;
        }
        Ok(())
    }

    /// Rebuild the snapshot from a full scan of the source.
    pub fn refresh_instances(&mut self) {
        self.snapshot = self.source.load_all(&self.types);
        self.stale = false;
        self.scans += 1;

        tracing::debug!(
            assets = self.snapshot.len(),
            scan = self.scans,
            "refreshed config asset snapshot"
        );
        self.report_duplicates();
    }

    /// Find the instance of `T`, rescanning once on a miss.
    ///
    /// The rescan picks up assets written after the last scan, such as ones
    /// created by tooling earlier in the same session.
    pub fn try_get_from_instances<T: ConfigAsset>(
        &mut self,
    ) -> Result<Option<ConfigHandle<T>>, ConfigError> {
        self.register_type::<T>()?;

        if let Some(handle) = self.find::<T>() {
            return Ok(Some(handle));
        }

        self.refresh_instances();
        Ok(self.find::<T>())
    }

    /// First asset of type `T` in scan order.
    pub fn find<T: ConfigAsset>(&self) -> Option<ConfigHandle<T>> {
        self.snapshot.iter().find_map(LoadedAsset::handle::<T>)
    }

    /// Add an asset that was persisted after the last scan.
    pub fn insert(&mut self, asset: LoadedAsset) {
        self.snapshot.push(asset);
    }

    /// Drop the snapshot. The next lookup miss rescans.
    pub fn invalidate(&mut self) {
        self.snapshot.clear();
        self.stale = true;
    }

    pub fn snapshot(&self) -> &[LoadedAsset] {
        &self.snapshot
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of bulk scans performed so far.
    pub fn scan_count(&self) -> u64 {
        self.scans
    }

    fn report_duplicates(&self) {
        let mut by_tag: HashMap<AssetTag, Vec<&LoadedAsset>> = HashMap::new();
        for asset in self.snapshot.iter().filter(|asset| asset.is_decoded()) {
            by_tag.entry(asset.meta().tag).or_default().push(asset);
        }

        for assets in by_tag.values().filter(|assets| assets.len() > 1) {
            let paths: Vec<_> = assets
                .iter()
                .map(|asset| asset.meta().path.display().to_string())
                .collect();
            tracing::warn!(
                tag = assets[0].meta().tag,
                using = %paths[0],
                candidates = ?paths,
                "multiple config assets share a type, using the first in scan order"
            );
        }
    }
}
