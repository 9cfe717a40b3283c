// error.rs — Error types for manifest loading and integrity checking.
//
// These are hard errors: a manifest that fails integrity checks is a
// deployment/configuration bug, not a user-facing validation failure.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or checking platform manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A manifest file failed to parse as YAML.
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Two manifests declare the same platform key.
    #[error("duplicate platform key '{platform_key}'")]
    DuplicatePlatform { platform_key: String },

    /// The same access item type is declared twice in one manifest.
    #[error("platform '{platform_key}' declares access type {item_type} more than once")]
    DuplicateAccessType {
        platform_key: String,
        item_type: String,
    },

    /// accessTypeCapabilities references a type the manifest does not support.
    #[error(
        "platform '{platform_key}' maps capabilities for {item_type}, \
         which is not in its supported access item types"
    )]
    UnsupportedCapabilityType {
        platform_key: String,
        item_type: String,
    },

    /// An allow-listed access type is not declared as supported.
    #[error(
        "platform '{platform_key}' allows access type {item_type} \
         but does not declare it as supported"
    )]
    UndeclaredAllowedType {
        platform_key: String,
        item_type: String,
    },

    /// A role-template key appears twice within one access item type.
    #[error("platform '{platform_key}' has duplicate role key '{role_key}' for {item_type}")]
    DuplicateRoleKey {
        platform_key: String,
        item_type: String,
        role_key: String,
    },

    /// An access item type declares no role templates at all.
    #[error("platform '{platform_key}' declares no role templates for {item_type}")]
    EmptyRoleTemplates {
        platform_key: String,
        item_type: String,
    },
}
