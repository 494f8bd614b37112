use anyhow::{Context, Result};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Resolves the ordered list of source roots to scan.
///
/// Explicit `--src-dir` roots win and are used verbatim (absolutized).
/// Otherwise roots come from the build environment: `$GOROOT/src` first,
/// then `<entry>/src` for each GOPATH entry, with GOPATH defaulting to
/// `$HOME/go`.
pub fn resolve_source_roots(cli: &Cli) -> Result<Vec<PathBuf>> {
    if !cli.src_dirs.is_empty() {
        return cli
            .src_dirs
            .iter()
            .map(|dir| {
                std::path::absolute(dir)
                    .with_context(|| format!("invalid source root: {}", dir.display()))
            })
            .collect();
    }

    Ok(env_source_roots_with(
        cli.goroot
            .clone()
            .or_else(|| env::var_os("GOROOT").map(PathBuf::from)),
        cli.gopath.clone().or_else(|| env::var_os("GOPATH")),
    ))
}

/// Source roots from the environment alone, without CLI overrides.
pub fn env_source_roots() -> Vec<PathBuf> {
    env_source_roots_with(
        env::var_os("GOROOT").map(PathBuf::from),
        env::var_os("GOPATH"),
    )
}

fn env_source_roots_with(goroot: Option<PathBuf>, gopath: Option<OsString>) -> Vec<PathBuf> {
    let gopath = gopath.unwrap_or_else(default_gopath);
    source_roots(goroot.as_deref(), &gopath)
}

fn default_gopath() -> OsString {
    dirs::home_dir()
        .map(|home| home.join("go").into_os_string())
        .unwrap_or_default()
}

/// Collects the `src` directories that exist under GOROOT and the GOPATH
/// entries, in that order. Empty and relative GOPATH entries are skipped, as
/// is an entry equal to GOROOT.
pub fn source_roots(goroot: Option<&Path>, gopath: &OsStr) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(goroot) = goroot {
        push_src_dir(&mut roots, goroot);
    }
    for entry in env::split_paths(gopath) {
        if entry.as_os_str().is_empty() || entry.is_relative() {
            continue;
        }
        if Some(entry.as_path()) == goroot {
            continue;
        }
        push_src_dir(&mut roots, &entry);
    }
    roots
}

fn push_src_dir(roots: &mut Vec<PathBuf>, base: &Path) {
    let src = base.join("src");
    if src.is_dir() {
        roots.push(src);
    }
}
