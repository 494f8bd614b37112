use anyhow::Result;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::scan::scan_root;

/// One discovered package, keyed in the catalog by its source directory.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    /// Directory containing the package sources.
    pub dir: PathBuf,
    /// Slash-separated path of `dir` relative to its source root; empty for
    /// files sitting directly in the root.
    pub import_path: String,
    /// Package name declared in the sources, independent of the directory
    /// basename.
    pub name: String,
}

/// Catalog of importable packages, one record per source directory.
pub type Catalog = HashMap<PathBuf, Package>;

/// Walks every source root in order and assembles the package catalog.
///
/// Work within a root runs on the walker's thread pool (`threads`, 0 picks
/// automatically). The first record written for a directory wins, including
/// across roots that reach the same directory path. Any walk error aborts
/// the whole build; no partial catalog is returned.
pub fn build_catalog(roots: &[PathBuf], threads: usize) -> Result<Catalog> {
    let catalog = Mutex::new(Catalog::new());
    for root in roots {
        debug!("scanning source root: {}", root.display());
        scan_root(root, &catalog, threads)?;
    }
    Ok(catalog.into_inner().unwrap_or_else(|p| p.into_inner()))
}

/// Discovers every importable package under the environment's source roots
/// (`$GOROOT/src` and the `src` directory of each GOPATH entry).
pub fn packages() -> Result<Catalog> {
    build_catalog(&crate::config::env_source_roots(), 0)
}
