// manifest.rs — The per-platform manifest: static, declarative data
// describing supported access item types, role templates, security
// posture, capability rules, and governance allow-lists.
//
// Manifests carry no logic beyond integrity checking. They are loaded
// once at process start and treated as read-only thereafter.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::capability::CapabilitySpec;
use crate::error::ManifestError;
use crate::types::{
    AccessType, IdentityStrategy, OwnershipModel, PamRecommendation, VerificationMode,
};

/// A role legal for one access item type on one platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleTemplate {
    /// Stable key (e.g., "ga4_editor"). Unique within its item type.
    pub key: String,
    /// Human-readable label shown in the UI.
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// One supported access item type and its legal roles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessItemTypeDef {
    #[serde(rename = "type")]
    pub item_type: AccessType,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// The only roles legal for this item type on this platform.
    pub role_templates: Vec<RoleTemplate>,
}

/// The platform's security posture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityCapabilities {
    #[serde(default)]
    pub supports_delegation: bool,
    #[serde(default)]
    pub supports_group_access: bool,
    #[serde(default)]
    pub supports_oauth: bool,
    #[serde(default)]
    pub supports_credential_login: bool,
    /// Whether shared (PAM) credentials are acceptable on this platform.
    pub pam_recommendation: PamRecommendation,
    /// Why — surfaced to operators in confirmation prompts.
    #[serde(default)]
    pub pam_rationale: String,
}

/// A platform-specific mandatory agency configuration field.
///
/// Example: ad-network delegation patterns require a Manager Account ID
/// before any link invitation can be issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequiredAgencyField {
    /// The `agencyConfig` key that must be present and non-empty.
    pub key: String,
    /// Platform-specific, user-facing message shown when it is missing.
    pub message: String,
}

/// The static descriptor for one platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformManifest {
    /// Unique stable identifier (e.g., "ga4", "google-ads").
    pub platform_key: String,

    /// Ordered set of supported access item types with their roles.
    pub supported_access_item_types: Vec<AccessItemTypeDef>,

    pub security_capabilities: SecurityCapabilities,

    /// Capability record (flat or rule-based) per access item type.
    /// Types absent here resolve to the conservative default.
    #[serde(default)]
    pub access_type_capabilities: BTreeMap<AccessType, CapabilitySpec>,

    // Governance allow-lists, checked by the validator.
    #[serde(default)]
    pub allowed_ownership_models: Vec<OwnershipModel>,
    #[serde(default)]
    pub allowed_identity_strategies: Vec<IdentityStrategy>,
    pub allowed_access_types: Vec<AccessType>,
    #[serde(default)]
    pub allowed_verification_modes: Vec<VerificationMode>,

    /// Platform-specific mandatory agency fields.
    #[serde(default)]
    pub required_agency_fields: Vec<RequiredAgencyField>,
}

impl PlatformManifest {
    /// Look up the definition for a supported access item type.
    pub fn supported_type(&self, item_type: AccessType) -> Option<&AccessItemTypeDef> {
        self.supported_access_item_types
            .iter()
            .find(|def| def.item_type == item_type)
    }

    /// Look up a role template by key within one item type.
    pub fn role_template(&self, item_type: AccessType, role_key: &str) -> Option<&RoleTemplate> {
        self.supported_type(item_type)?
            .role_templates
            .iter()
            .find(|role| role.key == role_key)
    }

    /// Check structural invariants. Violations are deployment bugs and
    /// surface as hard errors, never as user-facing validation failures.
    ///
    /// Enforced:
    /// - supported access item types are unique
    /// - every type has at least one role template
    /// - role-template keys are unique within their type
    /// - every capability-mapped type is declared as supported
    /// - every allow-listed access type is declared as supported
    pub fn check_integrity(&self) -> Result<(), ManifestError> {
        let mut supported = BTreeSet::new();
        for def in &self.supported_access_item_types {
            if !supported.insert(def.item_type) {
                return Err(ManifestError::DuplicateAccessType {
                    platform_key: self.platform_key.clone(),
                    item_type: def.item_type.to_string(),
                });
            }
            if def.role_templates.is_empty() {
                return Err(ManifestError::EmptyRoleTemplates {
                    platform_key: self.platform_key.clone(),
                    item_type: def.item_type.to_string(),
                });
            }
            let mut role_keys = BTreeSet::new();
            for role in &def.role_templates {
                if !role_keys.insert(role.key.as_str()) {
                    return Err(ManifestError::DuplicateRoleKey {
                        platform_key: self.platform_key.clone(),
                        item_type: def.item_type.to_string(),
                        role_key: role.key.clone(),
                    });
                }
            }
        }

        for item_type in self.access_type_capabilities.keys() {
            if !supported.contains(item_type) {
                return Err(ManifestError::UnsupportedCapabilityType {
                    platform_key: self.platform_key.clone(),
                    item_type: item_type.to_string(),
                });
            }
        }

        for item_type in &self.allowed_access_types {
            if !supported.contains(item_type) {
                return Err(ManifestError::UndeclaredAllowedType {
                    platform_key: self.platform_key.clone(),
                    item_type: item_type.to_string(),
                });
            }
        }

        Ok(())
    }
}
