use anyhow::{Context, Result};
use ignore::{DirEntry, WalkBuilder, WalkState};
use log::debug;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::Mutex;

use crate::catalog::{Catalog, Package};
use crate::decl::DeclScanner;

/// Reserved name for executable packages; never recorded in the catalog.
const ENTRY_POINT_PACKAGE: &str = "main";

/// Walks one source root in parallel and records every importable package
/// found below it into `catalog`.
///
/// Returns an error as soon as the walker surfaces one; the caller is
/// expected to discard the catalog in that case.
pub fn scan_root(root: &Path, catalog: &Mutex<Catalog>, threads: usize) -> Result<()> {
    let failure: Mutex<Option<ignore::Error>> = Mutex::new(None);

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .threads(threads)
        .build_parallel();

    walker.run(|| {
        let mut scanner = DeclScanner::new();
        let failure = &failure;
        Box::new(move |entry| match entry {
            Ok(entry) => visit(root, &entry, &mut scanner, catalog),
            Err(err) => {
                let mut slot = failure.lock().unwrap_or_else(|p| p.into_inner());
                slot.get_or_insert(err);
                WalkState::Quit
            }
        })
    });

    match failure.into_inner().unwrap_or_else(|p| p.into_inner()) {
        Some(err) => {
            Err(err).with_context(|| format!("walk failed under source root: {}", root.display()))
        }
        None => Ok(()),
    }
}

fn visit(
    root: &Path,
    entry: &DirEntry,
    scanner: &mut DeclScanner,
    catalog: &Mutex<Catalog>,
) -> WalkState {
    let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
    let name = entry.file_name().to_string_lossy();

    // Package lists never look at dot or underscore prefixed entries.
    if name.starts_with('.') || name.starts_with('_') {
        return if is_dir {
            WalkState::Skip
        } else {
            WalkState::Continue
        };
    }

    if is_dir {
        return if name == "testdata" {
            WalkState::Skip
        } else {
            WalkState::Continue
        };
    }

    if name.ends_with("_test.go") || !name.ends_with(".go") {
        return WalkState::Continue;
    }

    // Unparseable files are routine; they never abort the walk.
    let Some(pkg_name) = scanner.scan(entry.path()) else {
        return WalkState::Continue;
    };
    if pkg_name == ENTRY_POINT_PACKAGE {
        return WalkState::Continue;
    }

    let Some(dir) = entry.path().parent() else {
        return WalkState::Continue;
    };
    let Ok(rel) = dir.strip_prefix(root) else {
        return WalkState::Continue;
    };
    let import_path = slash_path(rel);

    let mut catalog = catalog.lock().unwrap_or_else(|p| p.into_inner());
    match catalog.entry(dir.to_path_buf()) {
        Entry::Occupied(existing) => {
            // First writer wins; a later file in the same directory never
            // replaces the record, even with a different declared name.
            if existing.get().name != pkg_name {
                debug!(
                    "conflicting package name {} in {} (keeping {})",
                    pkg_name,
                    dir.display(),
                    existing.get().name
                );
            }
        }
        Entry::Vacant(slot) => {
            slot.insert(Package {
                dir: dir.to_path_buf(),
                import_path,
                name: pkg_name,
            });
        }
    }

    WalkState::Continue
}

/// Joins path components with forward slashes regardless of the host
/// separator. Empty for the root directory itself.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
