//! Authoring-time placement check for config assets.

use crate::{AssetMeta, StorageLayout};
use std::path::PathBuf;

/// Where an asset sits relative to the conventional folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Conventional,
    Misplaced { expected: PathBuf },
}

impl Placement {
    pub fn is_misplaced(&self) -> bool {
        matches!(self, Placement::Misplaced { .. })
    }
}

/// Check that `meta` lives in the layout's conventional folder.
///
/// Misplaced assets get a warning only. They keep resolving as long as the
/// bulk scan still finds them.
pub fn check_placement(meta: &AssetMeta, layout: &StorageLayout) -> Placement {
    let expected = layout.conventional_folder();
    if meta.path.starts_with(&expected) {
        return Placement::Conventional;
    }

    tracing::warn!(
        asset = %meta.name,
        path = %meta.path.display(),
        expected = %expected.display(),
        "config asset '{}' is outside the config folder and may not be found in builds",
        meta.name
    );
    Placement::Misplaced { expected }
}
