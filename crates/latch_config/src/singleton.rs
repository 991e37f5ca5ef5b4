//! Typed singleton access to config assets.
//!
//! [`ConfigSingletons`] resolves at most one instance per asset type and keeps
//! it for the rest of the session. Resolution order:
//!
//! 1. the cached handle, if `T` was resolved before;
//! 2. the instance registry, with its single rescan on a miss;
//! 3. in authoring mode only, a new `T::default()` persisted into the
//!    conventional folder under `T::NAME`.
//!
//! Outside authoring mode a type with no persisted asset resolves to `None`.

use crate::store::encode_asset;
use crate::{
    check_placement, AssetMeta, AssetSource, AssetTag, AssetTypeTable, AuthoringStore, ConfigAsset,
    ConfigError, ConfigHandle, ConfigOptions, FsStore, InstanceRegistry, LoadedAsset, Placement,
    StorageLayout,
};
use std::collections::HashMap;

pub struct ConfigSingletons {
    registry: InstanceRegistry,
    layout: StorageLayout,
    authoring: Option<Box<dyn AuthoringStore>>,
    resolved: HashMap<AssetTag, LoadedAsset>,
}

/// Registers asset types ahead of the initial scan, so that scan decodes them.
#[derive(Default)]
pub struct ConfigSingletonsBuilder {
    types: AssetTypeTable,
}

impl ConfigSingletonsBuilder {
    pub fn register<T: ConfigAsset>(mut self) -> Result<Self, ConfigError> {
        self.types.register::<T>()?;
        Ok(self)
    }

    /// Create the accessor and run the initial scan.
    ///
    /// Passing an authoring store enables auto-creation of missing assets.
    pub fn build(
        self,
        source: impl AssetSource + 'static,
        layout: StorageLayout,
        authoring: Option<Box<dyn AuthoringStore>>,
    ) -> ConfigSingletons {
        let mut registry = InstanceRegistry::with_types(source, self.types);
        registry.refresh_instances();

        tracing::debug!(
            root = %layout.scan_root().display(),
            types = registry.types().len(),
            assets = registry.snapshot().len(),
            authoring = authoring.is_some(),
            "config singletons ready"
        );

        ConfigSingletons {
            registry,
            layout,
            authoring,
            resolved: HashMap::new(),
        }
    }

    /// Filesystem-backed accessor. `options.authoring` decides whether
    /// missing assets are created.
    pub fn open(self, options: &ConfigOptions) -> ConfigSingletons {
        let source = FsStore::new(options.layout.clone());
        let authoring = options.authoring.then(|| {
            Box::new(FsStore::new(options.layout.clone())) as Box<dyn AuthoringStore>
        });
        self.build(source, options.layout.clone(), authoring)
    }
}

impl ConfigSingletons {
    pub fn builder() -> ConfigSingletonsBuilder {
        ConfigSingletonsBuilder::default()
    }

    /// Accessor with no types registered up front. See [`ConfigSingletonsBuilder::build`].
    pub fn new(
        source: impl AssetSource + 'static,
        layout: StorageLayout,
        authoring: Option<Box<dyn AuthoringStore>>,
    ) -> Self {
        Self::builder().build(source, layout, authoring)
    }

    /// Deployed configuration: lookups only, never writes.
    pub fn runtime(source: impl AssetSource + 'static, layout: StorageLayout) -> Self {
        Self::new(source, layout, None)
    }

    /// See [`ConfigSingletonsBuilder::open`].
    pub fn open(options: &ConfigOptions) -> Self {
        Self::builder().open(options)
    }

    pub fn is_authoring(&self) -> bool {
        self.authoring.is_some()
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut InstanceRegistry {
        &mut self.registry
    }

    /// The single instance of `T`, if one exists or can be created.
    pub fn instance<T: ConfigAsset>(&mut self) -> Result<Option<ConfigHandle<T>>, ConfigError> {
        if let Some(handle) = self.cached::<T>() {
            return Ok(Some(handle));
        }

        if let Some(handle) = self.registry.try_get_from_instances::<T>()? {
            self.remember(&handle);
            return Ok(Some(handle));
        }

        let Some(store) = self.authoring.as_deref_mut() else {
            tracing::debug!(asset = T::NAME, "no config asset available");
            return Ok(None);
        };

        let asset = create_asset::<T>(store, &self.layout)?;
        self.registry.insert(asset.clone());
        self.resolved.insert(T::TAG, asset.clone());
        Ok(asset.handle::<T>())
    }

    /// Handle previously resolved for `T`, without any lookup.
    pub fn cached<T: ConfigAsset>(&self) -> Option<ConfigHandle<T>> {
        self.resolved.get(&T::TAG)?.handle::<T>()
    }

    /// Validation hook for the resolved instance of `T`.
    ///
    /// Returns `None` if `T` has not been resolved.
    pub fn on_validate<T: ConfigAsset>(&self) -> Option<Placement> {
        let asset = self.resolved.get(&T::TAG)?;
        Some(check_placement(asset.meta(), &self.layout))
    }

    /// Check every asset in the current snapshot. Returns the misplaced ones.
    pub fn validate_all(&self) -> Vec<(AssetMeta, Placement)> {
        self.registry
            .snapshot()
            .iter()
            .filter_map(|asset| {
                let placement = check_placement(asset.meta(), &self.layout);
                placement
                    .is_misplaced()
                    .then(|| (asset.meta().clone(), placement))
            })
            .collect()
    }

    /// Forget every resolved instance and invalidate the snapshot.
    pub fn reset(&mut self) {
        self.resolved.clear();
        self.registry.invalidate();
    }

    fn remember<T: ConfigAsset>(&mut self, handle: &ConfigHandle<T>) {
        let asset = self
            .registry
            .snapshot()
            .iter()
            .find(|asset| asset.handle::<T>().is_some_and(|h| h.ptr_eq(handle)))
            .cloned();
        if let Some(asset) = asset {
            self.resolved.insert(T::TAG, asset);
        }
    }
}

fn create_asset<T: ConfigAsset>(
    store: &mut dyn AuthoringStore,
    layout: &StorageLayout,
) -> Result<LoadedAsset, ConfigError> {
    let path = layout.asset_path(T::NAME);
    if store.exists(&path) {
        return Err(ConfigError::CreateConflict {
            name: T::NAME.to_string(),
            path,
        });
    }

    let value = T::default();
    let contents = encode_asset(T::NAME, &value)?;

    store.ensure_folder(&layout.conventional_folder())?;
    store.write_asset(&path, contents)?;
    store.commit()?;

    tracing::info!(asset = T::NAME, path = %path.display(), "created missing config asset");

    let meta = AssetMeta {
        name: T::NAME.to_string(),
        tag: T::TAG,
        path,
    };
    Ok(LoadedAsset::new(meta, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{AudioMix, GameSettings};
    use std::path::Path;

    fn persist<T: ConfigAsset>(layout: &StorageLayout, relative: &str, value: &T) {
        let path = layout.scan_root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, encode_asset(T::NAME, value).unwrap()).unwrap();
    }

    fn options(root: &Path, authoring: bool) -> ConfigOptions {
        ConfigOptions {
            authoring,
            layout: StorageLayout::at(root),
        }
    }

    fn asset_files(layout: &StorageLayout) -> Vec<std::path::PathBuf> {
        FsStore::new(layout.clone()).scan_paths()
    }

    #[test]
    fn initial_scan_runs_on_start() {
        let dir = tempfile::tempdir().unwrap();
        let singletons = ConfigSingletons::open(&options(dir.path(), false));
        assert_eq!(singletons.registry().scan_count(), 1);
        assert!(!singletons.is_authoring());
    }

    #[test]
    fn initial_scan_captures_every_asset_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), false);
        persist(&opts.layout, "levels/GameSettings.json", &GameSettings::default());
        persist(&opts.layout, "config/AudioMix.json", &AudioMix::default());

        let singletons = ConfigSingletons::open(&opts);
        assert_eq!(singletons.registry().snapshot().len(), 2);

        let misplaced = singletons.validate_all();
        assert_eq!(misplaced.len(), 1);
        assert_eq!(misplaced[0].0.name, "GameSettings");
        assert!(misplaced[0].1.is_misplaced());
    }

    #[test]
    fn registered_types_resolve_without_a_second_scan() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), false);
        let settings = GameSettings {
            difficulty: 6,
            fullscreen: true,
        };
        persist(&opts.layout, "levels/GameSettings.json", &settings);

        let mut singletons = ConfigSingletons::builder()
            .register::<GameSettings>()
            .unwrap()
            .register::<AudioMix>()
            .unwrap()
            .open(&opts);
        assert_eq!(singletons.registry().snapshot().len(), 1);
        assert!(singletons.registry().snapshot()[0].is_decoded());
        assert_eq!(singletons.validate_all().len(), 1);

        let found = singletons.instance::<GameSettings>().unwrap().unwrap();
        assert_eq!(*found, settings);
        assert_eq!(singletons.registry().scan_count(), 1);
    }

    #[test]
    fn builder_rejects_conflicting_types() {
        #[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
        struct Clash;
        crate::define_config_asset!(Clash, 1, "Clash");

        let result = ConfigSingletons::builder()
            .register::<GameSettings>()
            .unwrap()
            .register::<Clash>();
        assert!(matches!(result, Err(ConfigError::TagConflict { tag: 1, .. })));
    }

    #[test]
    fn single_asset_resolves_and_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), false);
        let settings = GameSettings {
            difficulty: 3,
            fullscreen: true,
        };
        persist(&opts.layout, "config/GameSettings.json", &settings);

        let mut singletons = ConfigSingletons::open(&opts);
        let first = singletons.instance::<GameSettings>().unwrap().unwrap();
        let scans = singletons.registry().scan_count();
        let second = singletons.instance::<GameSettings>().unwrap().unwrap();

        assert_eq!(*first, settings);
        assert!(first.ptr_eq(&second));
        assert_eq!(singletons.registry().scan_count(), scans);
        assert!(singletons.cached::<GameSettings>().unwrap().ptr_eq(&first));
    }

    #[test]
    fn authoring_creates_exactly_one_asset() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), true);

        let mut singletons = ConfigSingletons::open(&opts);
        let created = singletons.instance::<GameSettings>().unwrap().unwrap();
        let again = singletons.instance::<GameSettings>().unwrap().unwrap();

        assert!(created.ptr_eq(&again));
        assert_eq!(*created, GameSettings::default());
        assert_eq!(created.name(), "GameSettings");
        assert_eq!(created.path(), opts.layout.asset_path("GameSettings"));
        assert_eq!(asset_files(&opts.layout), vec![opts.layout.asset_path("GameSettings")]);
        assert_eq!(singletons.registry().snapshot().len(), 1);
    }

    #[test]
    fn created_asset_is_found_by_a_later_session() {
        let dir = tempfile::tempdir().unwrap();
        ConfigSingletons::open(&options(dir.path(), true))
            .instance::<AudioMix>()
            .unwrap()
            .unwrap();

        let mut runtime = ConfigSingletons::open(&options(dir.path(), false));
        let mix = runtime.instance::<AudioMix>().unwrap().unwrap();
        assert_eq!(*mix, AudioMix::default());
    }

    #[test]
    fn runtime_without_asset_returns_none_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), false);

        let mut singletons = ConfigSingletons::open(&opts);
        assert!(singletons.instance::<GameSettings>().unwrap().is_none());
        assert!(singletons.instance::<GameSettings>().unwrap().is_none());

        assert!(!opts.layout.scan_root().exists());
        assert!(singletons.cached::<GameSettings>().is_none());
    }

    #[test]
    fn asset_written_after_start_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), false);
        let mut singletons = ConfigSingletons::open(&opts);
        singletons.registry_mut().register_type::<GameSettings>().unwrap();
        singletons.registry_mut().refresh_instances();
        assert!(singletons.registry().find::<GameSettings>().is_none());

        persist(&opts.layout, "config/GameSettings.json", &GameSettings::default());

        let scans = singletons.registry().scan_count();
        assert!(singletons.instance::<GameSettings>().unwrap().is_some());
        assert_eq!(singletons.registry().scan_count(), scans + 1);
    }

    #[test]
    fn duplicate_assets_resolve_to_one_of_them() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), false);
        let primary = GameSettings {
            difficulty: 1,
            fullscreen: false,
        };
        let secondary = GameSettings {
            difficulty: 2,
            ..primary.clone()
        };
        persist(&opts.layout, "config/Primary.json", &primary);
        persist(&opts.layout, "config/Secondary.json", &secondary);

        let mut singletons = ConfigSingletons::open(&opts);
        let found = singletons.instance::<GameSettings>().unwrap().unwrap();
        assert!([1, 2].contains(&found.difficulty));
        assert!(singletons.instance::<GameSettings>().unwrap().unwrap().ptr_eq(&found));
    }

    #[test]
    fn misplaced_asset_warns_but_still_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), true);
        let settings = GameSettings {
            difficulty: 5,
            fullscreen: false,
        };
        persist(&opts.layout, "levels/GameSettings.json", &settings);

        let mut singletons = ConfigSingletons::open(&opts);
        let found = singletons.instance::<GameSettings>().unwrap().unwrap();
        assert_eq!(found.difficulty, 5);

        let placement = singletons.on_validate::<GameSettings>().unwrap();
        assert!(placement.is_misplaced());
        let misplaced = singletons.validate_all();
        assert_eq!(misplaced.len(), 1);
        assert_eq!(misplaced[0].0.name, "GameSettings");

        // Still resolves to the misplaced asset; nothing new was created.
        assert!(singletons.instance::<GameSettings>().unwrap().unwrap().ptr_eq(&found));
        assert!(!opts.layout.conventional_folder().exists());
    }

    #[test]
    fn on_validate_before_resolution_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let singletons = ConfigSingletons::open(&options(dir.path(), false));
        assert!(singletons.on_validate::<GameSettings>().is_none());
    }

    #[test]
    fn reset_forgets_resolved_instances() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), false);
        persist(&opts.layout, "config/GameSettings.json", &GameSettings::default());

        let mut singletons = ConfigSingletons::open(&opts);
        let before = singletons.instance::<GameSettings>().unwrap().unwrap();
        singletons.reset();
        assert!(singletons.cached::<GameSettings>().is_none());

        let after = singletons.instance::<GameSettings>().unwrap().unwrap();
        assert!(!before.ptr_eq(&after));
        assert_eq!(*before, *after);
    }

    #[test]
    fn unreadable_file_at_target_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), true);
        let target = opts.layout.asset_path("GameSettings");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"{ corrupted").unwrap();

        let mut singletons = ConfigSingletons::open(&opts);
        let err = singletons.instance::<GameSettings>().unwrap_err();
        assert!(matches!(err, ConfigError::CreateConflict { .. }));
        assert_eq!(std::fs::read(&target).unwrap(), b"{ corrupted");
    }
}
