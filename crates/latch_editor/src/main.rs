//! Latch Config Tool
//!
//! Authoring-side inspection of a project's config assets.
//!
//! ```text
//! latch-config [list|validate] [options.json]
//! ```

use anyhow::{bail, Context, Result};
use latch_config::{check_placement, ConfigOptions, FsStore};
use std::path::Path;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "list".to_string());
    let options = match args.next() {
        Some(path) => ConfigOptions::load(Path::new(&path))
            .with_context(|| format!("loading options from {path}"))?,
        None => ConfigOptions::default(),
    }
    .with_env_overrides();

    tracing::info!("Latch Config v{}", latch_config::VERSION);
    tracing::info!(
        root = %options.layout.scan_root().display(),
        authoring = options.authoring,
        "scanning config assets"
    );

    let store = FsStore::new(options.layout.clone());
    match command.as_str() {
        "list" => list(&store),
        "validate" => validate(&store),
        other => bail!("unknown command '{other}', expected 'list' or 'validate'"),
    }

    Ok(())
}

fn list(store: &FsStore) {
    let manifest = store.manifest();
    for meta in &manifest {
        println!("{:>6}  {:<28} {}", meta.tag, meta.name, meta.path.display());
    }
    tracing::info!("{} config asset(s)", manifest.len());
}

fn validate(store: &FsStore) {
    let manifest = store.manifest();
    let misplaced = manifest
        .iter()
        .filter(|meta| check_placement(meta, store.layout()).is_misplaced())
        .count();

    if misplaced == 0 {
        tracing::info!("all {} config asset(s) are in place", manifest.len());
    } else {
        tracing::warn!(
            "{misplaced} of {} config asset(s) are outside {}",
            manifest.len(),
            store.layout().conventional_folder().display()
        );
    }
}
