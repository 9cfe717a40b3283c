// capability.rs — Capability records and conditional capability rules.
//
// A Capability says which operations are legal for one (platform, access
// item type) pair: OAuth connect, programmatic grant/verify/revoke, and
// whether evidence upload is required. Manifests map each access type to
// either a flat Capability or a rule-based spec (a default plus ordered
// conditional overrides evaluated against the runtime ConfigContext).
//
// The precedence invariant: rules are evaluated in manifest-declared
// order, each match shallow-merges its overrides onto the accumulator,
// and later matches win per field.

use serde::{Deserialize, Serialize};

use crate::types::{ConfigContext, IdentityPurpose, IdentityStrategy, OwnershipModel, VerificationMode};

/// The operation-gating record for one (platform, access-item type) pair.
///
/// Serializes in the camelCase wire spelling (it travels inside enriched
/// item payloads); the snake_case manifest-YAML spelling is accepted on
/// deserialization via aliases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Capability {
    /// The client can authorize access through an OAuth flow.
    #[serde(default, rename = "clientOAuthSupported", alias = "client_oauth_supported")]
    pub client_oauth_supported: bool,
    /// The platform API can grant access programmatically.
    #[serde(default, alias = "can_grant_access")]
    pub can_grant_access: bool,
    /// The platform API can verify access programmatically.
    #[serde(default, alias = "can_verify_access")]
    pub can_verify_access: bool,
    /// The platform API can revoke access programmatically.
    #[serde(default, alias = "can_revoke_access")]
    pub can_revoke_access: bool,
    /// Whether evidence (screenshots, exports) must be uploaded.
    #[serde(default = "default_true", alias = "requires_evidence_upload")]
    pub requires_evidence_upload: bool,
    /// Overrides the platform's default verification mode, if set.
    #[serde(
        default,
        alias = "verification_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub verification_mode: Option<VerificationMode>,
}

fn default_true() -> bool {
    true
}

impl Capability {
    /// The global conservative default: nothing is supported
    /// programmatically and evidence is required.
    ///
    /// Any (item type, context) pair not covered by a manifest resolves
    /// to this — fail-closed, never an error.
    pub fn conservative() -> Self {
        Self {
            client_oauth_supported: false,
            can_grant_access: false,
            can_verify_access: false,
            can_revoke_access: false,
            requires_evidence_upload: true,
            verification_mode: None,
        }
    }
}

impl Default for Capability {
    fn default() -> Self {
        Self::conservative()
    }
}

/// A partial Capability — the `set` half of a conditional rule.
///
/// Only the fields present override the accumulator; absent fields leave
/// earlier values (or the default) intact.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CapabilityOverride {
    #[serde(
        default,
        rename = "clientOAuthSupported",
        alias = "client_oauth_supported",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_oauth_supported: Option<bool>,
    #[serde(default, alias = "can_grant_access", skip_serializing_if = "Option::is_none")]
    pub can_grant_access: Option<bool>,
    #[serde(default, alias = "can_verify_access", skip_serializing_if = "Option::is_none")]
    pub can_verify_access: Option<bool>,
    #[serde(default, alias = "can_revoke_access", skip_serializing_if = "Option::is_none")]
    pub can_revoke_access: Option<bool>,
    #[serde(
        default,
        alias = "requires_evidence_upload",
        skip_serializing_if = "Option::is_none"
    )]
    pub requires_evidence_upload: Option<bool>,
    #[serde(default, alias = "verification_mode", skip_serializing_if = "Option::is_none")]
    pub verification_mode: Option<VerificationMode>,
}

impl CapabilityOverride {
    /// Shallow-merge this override onto an accumulating capability.
    pub fn apply_to(&self, capability: &mut Capability) {
        if let Some(value) = self.client_oauth_supported {
            capability.client_oauth_supported = value;
        }
        if let Some(value) = self.can_grant_access {
            capability.can_grant_access = value;
        }
        if let Some(value) = self.can_verify_access {
            capability.can_verify_access = value;
        }
        if let Some(value) = self.can_revoke_access {
            capability.can_revoke_access = value;
        }
        if let Some(value) = self.requires_evidence_upload {
            capability.requires_evidence_upload = value;
        }
        if let Some(mode) = self.verification_mode {
            capability.verification_mode = Some(mode);
        }
    }
}

/// The `when` half of a conditional rule.
///
/// A condition matches when every *specified* field equals the context's
/// corresponding field. Unspecified fields are wildcards. A specified
/// field never matches a context that left that field unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CapabilityCondition {
    #[serde(default, alias = "pam_ownership", skip_serializing_if = "Option::is_none")]
    pub pam_ownership: Option<OwnershipModel>,
    #[serde(default, alias = "identity_purpose", skip_serializing_if = "Option::is_none")]
    pub identity_purpose: Option<IdentityPurpose>,
    #[serde(default, alias = "identity_strategy", skip_serializing_if = "Option::is_none")]
    pub identity_strategy: Option<IdentityStrategy>,
}

impl CapabilityCondition {
    /// Exact-equality matching, no coercion across enum variants.
    pub fn matches(&self, context: &ConfigContext) -> bool {
        field_matches(self.pam_ownership, context.pam_ownership)
            && field_matches(self.identity_purpose, context.identity_purpose)
            && field_matches(self.identity_strategy, context.identity_strategy)
    }
}

/// A condition field that is unset always matches; a set field requires
/// the context to carry the same value.
fn field_matches<T: PartialEq + Copy>(condition: Option<T>, context: Option<T>) -> bool {
    match condition {
        None => true,
        Some(wanted) => context == Some(wanted),
    }
}

/// One conditional override: when the context matches, merge `set`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConditionalRule {
    pub when: CapabilityCondition,
    pub set: CapabilityOverride,
}

/// What a manifest maps an access type to: either a flat capability
/// (context-independent) or a default plus ordered conditional rules.
///
/// Modeled as a sum type instead of the duck-typed `'default' in obj`
/// check the original data used. Untagged over YAML/JSON; `RuleBased`
/// is tried first because its shape is strictly more specific.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CapabilitySpec {
    /// A default capability refined by ordered conditional overrides.
    RuleBased {
        default: Capability,
        rules: Vec<ConditionalRule>,
    },
    /// Context is irrelevant; the record applies as-is.
    Flat(Capability),
}

impl CapabilitySpec {
    /// Compute the effective capability for a runtime context.
    ///
    /// Rule-based specs start from their default and apply every matching
    /// rule in declared order; later matches win on a per-field basis.
    pub fn resolve(&self, context: &ConfigContext) -> Capability {
        match self {
            CapabilitySpec::Flat(capability) => capability.clone(),
            CapabilitySpec::RuleBased { default, rules } => {
                let mut effective = default.clone();
                for (index, rule) in rules.iter().enumerate() {
                    if rule.when.matches(context) {
                        tracing::debug!(rule = index, "capability rule matched");
                        rule.set.apply_to(&mut effective);
                    }
                }
                effective
            }
        }
    }
}
