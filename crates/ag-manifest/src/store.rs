// store.rs — Manifest loading and the immutable registry.
//
// Manifests are authored as YAML, one file per platform, in a manifests
// directory. `ManifestStore` reads and integrity-checks them into a
// `ManifestRegistry` — an explicitly constructed, read-only lookup
// object that is passed into the engine at call time. There is no
// process-wide registry singleton.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::manifest::PlatformManifest;

/// Reads platform manifest YAML files from a directory.
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Load every `*.yaml`/`*.yml` file in the directory into a registry.
    ///
    /// Every manifest is integrity-checked; any failure aborts the load —
    /// a malformed manifest is a deployment bug, not something to skip.
    pub fn load_all(&self) -> Result<ManifestRegistry, ManifestError> {
        let mut manifests = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|source| ManifestError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        for path in paths {
            manifests.push(Self::load_file(&path)?);
        }
        ManifestRegistry::from_manifests(manifests)
    }

    /// Load and integrity-check a single manifest file.
    pub fn load_file(path: &Path) -> Result<PlatformManifest, ManifestError> {
        let data = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: PlatformManifest =
            serde_yaml::from_str(&data).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.check_integrity()?;
        tracing::debug!(platform = %manifest.platform_key, path = %path.display(), "loaded manifest");
        Ok(manifest)
    }
}

/// The read-only manifest lookup the engine consumes.
///
/// Built once at startup; safe to share across request-handling threads
/// because it is never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct ManifestRegistry {
    manifests: HashMap<String, PlatformManifest>,
}

impl ManifestRegistry {
    /// Build a registry from already-parsed manifests.
    ///
    /// Each manifest is integrity-checked and duplicate platform keys
    /// are rejected.
    pub fn from_manifests(
        manifests: Vec<PlatformManifest>,
    ) -> Result<ManifestRegistry, ManifestError> {
        let mut map = HashMap::new();
        for manifest in manifests {
            manifest.check_integrity()?;
            let key = manifest.platform_key.clone();
            if map.insert(key.clone(), manifest).is_some() {
                return Err(ManifestError::DuplicatePlatform { platform_key: key });
            }
        }
        Ok(ManifestRegistry { manifests: map })
    }

    /// The engine's read accessor: one manifest per platform key.
    pub fn get(&self, platform_key: &str) -> Option<&PlatformManifest> {
        self.manifests.get(platform_key)
    }

    /// All registered platform keys, sorted.
    pub fn platform_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.manifests.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{AccessItemTypeDef, RoleTemplate, SecurityCapabilities};
    use crate::types::{AccessType, PamRecommendation};

    fn manifest(platform_key: &str) -> PlatformManifest {
        PlatformManifest {
            platform_key: platform_key.to_string(),
            supported_access_item_types: vec![AccessItemTypeDef {
                item_type: AccessType::NamedInvite,
                label: "User invite".to_string(),
                description: String::new(),
                role_templates: vec![RoleTemplate {
                    key: "viewer".to_string(),
                    label: "Viewer".to_string(),
                    description: String::new(),
                }],
            }],
            security_capabilities: SecurityCapabilities {
                supports_delegation: false,
                supports_group_access: false,
                supports_oauth: false,
                supports_credential_login: false,
                pam_recommendation: PamRecommendation::Recommended,
                pam_rationale: String::new(),
            },
            access_type_capabilities: Default::default(),
            allowed_ownership_models: vec![],
            allowed_identity_strategies: vec![],
            allowed_access_types: vec![AccessType::NamedInvite],
            allowed_verification_modes: vec![],
            required_agency_fields: vec![],
        }
    }

    #[test]
    fn registry_lookup_by_platform_key() {
        let registry =
            ManifestRegistry::from_manifests(vec![manifest("ga4"), manifest("google-ads")])
                .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("ga4").is_some());
        assert!(registry.get("meta").is_none());
        assert_eq!(registry.platform_keys(), vec!["ga4", "google-ads"]);
    }

    #[test]
    fn duplicate_platform_key_rejected() {
        let result = ManifestRegistry::from_manifests(vec![manifest("ga4"), manifest("ga4")]);
        match result {
            Err(ManifestError::DuplicatePlatform { platform_key }) => {
                assert_eq!(platform_key, "ga4");
            }
            other => panic!("expected DuplicatePlatform, got {:?}", other),
        }
    }

    #[test]
    fn load_all_reads_yaml_directory() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = serde_yaml::to_string(&manifest("ga4")).unwrap();
        fs::write(dir.path().join("ga4.yaml"), yaml).unwrap();
        // Non-YAML files are ignored.
        fs::write(dir.path().join("README.md"), "not a manifest").unwrap();

        let store = ManifestStore::new(dir.path().to_path_buf());
        let registry = store.load_all().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("ga4").is_some());
    }

    #[test]
    fn load_all_rejects_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.yaml"), "platform_key: [").unwrap();

        let store = ManifestStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.load_all(),
            Err(ManifestError::Parse { .. })
        ));
    }

    #[test]
    fn load_all_missing_dir_is_io_error() {
        let store = ManifestStore::new(PathBuf::from("/nonexistent/manifests"));
        assert!(matches!(store.load_all(), Err(ManifestError::Io { .. })));
    }

    #[test]
    fn load_all_enforces_integrity() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = manifest("ga4");
        bad.supported_access_item_types[0].role_templates.clear();
        let yaml = serde_yaml::to_string(&bad).unwrap();
        fs::write(dir.path().join("ga4.yaml"), yaml).unwrap();

        let store = ManifestStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.load_all(),
            Err(ManifestError::EmptyRoleTemplates { .. })
        ));
    }
}
