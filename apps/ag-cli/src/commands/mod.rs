pub mod capability;
pub mod identity;
pub mod item;
pub mod manifest;

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

use ag_manifest::{ManifestRegistry, ManifestStore};

/// Load the manifest registry used by every manifest-dependent command.
pub fn load_registry(manifest_dir: &Path) -> anyhow::Result<ManifestRegistry> {
    let registry = ManifestStore::new(manifest_dir.to_path_buf())
        .load_all()
        .with_context(|| format!("loading manifests from {}", manifest_dir.display()))?;
    tracing::debug!(platforms = registry.len(), "manifest registry loaded");
    Ok(registry)
}

/// Parse one enum token the way it appears on the wire (e.g.
/// `SHARED_ACCOUNT`, `AGENCY_OWNED`).
pub fn parse_token<T: DeserializeOwned>(value: &str) -> anyhow::Result<T> {
    serde_yaml::from_str(value).with_context(|| format!("unrecognized value '{value}'"))
}
