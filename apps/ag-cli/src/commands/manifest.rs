// manifest.rs — Manifest subcommands: list, show, check.

use std::path::Path;

use anyhow::Context;
use clap::Subcommand;

use ag_manifest::ManifestStore;

use super::load_registry;

#[derive(Subcommand)]
pub enum ManifestCommands {
    /// List registered platforms and their supported access item types.
    List,
    /// Print one platform manifest as YAML.
    Show {
        /// Platform key (e.g., "ga4").
        platform: String,
    },
    /// Integrity-check every manifest file in the directory.
    Check,
}

pub fn execute(cmd: &ManifestCommands, manifest_dir: &Path) -> anyhow::Result<()> {
    match cmd {
        ManifestCommands::List => list(manifest_dir),
        ManifestCommands::Show { platform } => show(manifest_dir, platform),
        ManifestCommands::Check => check(manifest_dir),
    }
}

fn list(manifest_dir: &Path) -> anyhow::Result<()> {
    let registry = load_registry(manifest_dir)?;
    if registry.is_empty() {
        println!("No manifests found in {}", manifest_dir.display());
        return Ok(());
    }
    for key in registry.platform_keys() {
        let manifest = registry
            .get(key)
            .context("platform key listed but not resolvable")?;
        let types: Vec<&str> = manifest
            .supported_access_item_types
            .iter()
            .map(|def| def.item_type.as_str())
            .collect();
        println!("{key:20} {}", types.join(", "));
    }
    Ok(())
}

fn show(manifest_dir: &Path, platform: &str) -> anyhow::Result<()> {
    let registry = load_registry(manifest_dir)?;
    let manifest = registry
        .get(platform)
        .with_context(|| format!("no manifest for platform '{platform}'"))?;
    print!("{}", serde_yaml::to_string(manifest)?);
    Ok(())
}

fn check(manifest_dir: &Path) -> anyhow::Result<()> {
    let mut paths: Vec<_> = std::fs::read_dir(manifest_dir)
        .with_context(|| format!("reading {}", manifest_dir.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();

    let mut failures = 0usize;
    for path in &paths {
        match ManifestStore::load_file(path) {
            Ok(manifest) => println!("ok   {} ({})", path.display(), manifest.platform_key),
            Err(err) => {
                failures += 1;
                println!("FAIL {}: {err}", path.display());
            }
        }
    }
    println!("{} manifest(s), {} failure(s)", paths.len(), failures);
    if failures > 0 {
        anyhow::bail!("{failures} manifest(s) failed integrity checks");
    }
    Ok(())
}
