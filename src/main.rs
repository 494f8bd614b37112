use anyhow::Result;
use clap::Parser;
use gopkg_finder::catalog::{Catalog, Package, build_catalog};
use gopkg_finder::cli::{Cli, Commands, OutputFormat};
use gopkg_finder::config::resolve_source_roots;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.clone() {
        Commands::Roots => {
            for root in resolve_source_roots(&cli)? {
                println!("{}", root.display());
            }
        }
        Commands::List {
            format,
            prefix,
            output,
        } => {
            let roots = resolve_source_roots(&cli)?;
            let start = Instant::now();
            let catalog = build_catalog(&roots, cli.workers.unwrap_or(0))?;
            let packages = select_packages(catalog, prefix.as_deref());
            let result = ListResult {
                scanned_roots: roots.iter().map(|r| r.display().to_string()).collect(),
                package_count: packages.len(),
                duration_ms: start.elapsed().as_millis() as u64,
                packages,
            };
            write_list_output(&result, format, output.as_deref())?;
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ListResult {
    scanned_roots: Vec<String>,
    package_count: usize,
    duration_ms: u64,
    packages: Vec<Package>,
}

/// Applies the prefix filter and orders records for stable output. Which
/// file named a directory's package stays first-writer-wins; only the record
/// order is deterministic.
fn select_packages(catalog: Catalog, prefix: Option<&str>) -> Vec<Package> {
    let mut packages: Vec<Package> = catalog
        .into_values()
        .filter(|pkg| prefix.is_none_or(|p| pkg.import_path.starts_with(p)))
        .collect();
    packages.sort_by(|a, b| {
        a.import_path
            .cmp(&b.import_path)
            .then_with(|| a.dir.cmp(&b.dir))
    });
    packages
}

fn write_list_output(result: &ListResult, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("packages: {}\n", result.package_count));
            out.push_str(&format!("duration_ms: {}\n", result.duration_ms));
            for pkg in &result.packages {
                out.push_str(&format!(
                    "- import_path: {}, name: {}, dir: {}\n",
                    pkg.import_path,
                    pkg.name,
                    pkg.dir.display()
                ));
            }
            out
        }
    };

    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
