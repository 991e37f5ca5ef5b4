//! Filesystem-backed asset store.
//!
//! Reads every envelope under the layout's scan root and stages authoring
//! writes next to their target until they are committed. Entries whose type
//! is not registered stay in the result undecoded.

use super::{AssetSource, AuthoringStore, Envelope, LoadedAsset};
use crate::{AssetMeta, AssetTypeTable, ConfigError, StorageLayout};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PENDING_SUFFIX: &str = "pending";

struct PendingWrite {
    staged: PathBuf,
    target: PathBuf,
}

pub struct FsStore {
    layout: StorageLayout,
    pending: Vec<PendingWrite>,
}

impl FsStore {
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            layout,
            pending: Vec::new(),
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Asset files under the scan root, in lexical path order.
    ///
    /// Symlinks are not followed.
    pub fn scan_paths(&self) -> Vec<PathBuf> {
        let root = self.layout.scan_root();
        let mut paths = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 && is_not_found(&e) => break,
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "config asset scan error");
                    continue;
                }
            };
            if entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == self.layout.extension.as_str())
            {
                paths.push(entry.into_path());
            }
        }
        paths
    }

    /// Headers of every readable envelope, without decoding payloads.
    pub fn manifest(&self) -> Vec<AssetMeta> {
        self.scan_paths()
            .into_iter()
            .filter_map(|path| {
                let envelope = read_envelope(&path)?;
                Some(AssetMeta {
                    name: envelope.name,
                    tag: envelope.tag,
                    path,
                })
            })
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl AssetSource for FsStore {
    fn load_all(&self, types: &AssetTypeTable) -> Vec<LoadedAsset> {
        let mut loaded = Vec::new();
        for path in self.scan_paths() {
            let Some(envelope) = read_envelope(&path) else {
                continue;
            };
            let meta = AssetMeta {
                name: envelope.name,
                tag: envelope.tag,
                path,
            };

            let Some(info) = types.get(meta.tag) else {
                tracing::debug!(
                    path = %meta.path.display(),
                    tag = meta.tag,
                    "keeping asset of unregistered type undecoded"
                );
                loaded.push(LoadedAsset::undecoded(meta));
                continue;
            };
            if info.name != envelope.type_name {
                tracing::warn!(
                    path = %meta.path.display(),
                    tag = meta.tag,
                    found = %envelope.type_name,
                    expected = info.name,
                    "asset type name does not match its tag"
                );
                loaded.push(LoadedAsset::undecoded(meta));
                continue;
            }

            match info.decode(envelope.data) {
                Ok(value) => loaded.push(LoadedAsset::from_erased(meta, value)),
                Err(e) => {
                    tracing::warn!(
                        path = %meta.path.display(),
                        error = %e,
                        "failed to decode config asset"
                    );
                    loaded.push(LoadedAsset::undecoded(meta));
                }
            }
        }
        loaded
    }
}

impl AuthoringStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_folder(&mut self, folder: &Path) -> Result<(), ConfigError> {
        if !folder.is_dir() {
            tracing::debug!(folder = %folder.display(), "creating config asset folder");
        }
        fs::create_dir_all(folder).map_err(|e| ConfigError::io(folder, e))
    }

    fn write_asset(&mut self, path: &Path, contents: Vec<u8>) -> Result<(), ConfigError> {
        let staged = staged_path(path);
        if let Err(e) = fs::write(&staged, contents) {
            discard(&staged);
            return Err(ConfigError::io(&staged, e));
        }
        self.pending.push(PendingWrite {
            staged,
            target: path.to_path_buf(),
        });
        Ok(())
    }

    /// Move every staged write into place.
    ///
    /// On the first failed rename, that write and all writes after it are
    /// discarded along with their staged files.
    fn commit(&mut self) -> Result<(), ConfigError> {
        let mut pending = std::mem::take(&mut self.pending).into_iter();
        while let Some(write) = pending.next() {
            if let Err(e) = fs::rename(&write.staged, &write.target) {
                discard(&write.staged);
                for rest in pending {
                    discard(&rest.staged);
                }
                return Err(ConfigError::io(&write.target, e));
            }
        }
        Ok(())
    }
}

fn staged_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".");
    staged.push(PENDING_SUFFIX);
    PathBuf::from(staged)
}

fn discard(staged: &Path) {
    match fs::remove_file(staged) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %staged.display(), error = %e, "failed to remove staged asset");
        }
    }
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

fn read_envelope(path: &Path) -> Option<Envelope> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read config asset");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "malformed config asset envelope");
            None
        }
    }
}
