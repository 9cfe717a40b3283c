// item.rs — Access items and their client-facing instantiations.
//
// An AccessItem is one unit of access being configured by an agency
// operator against a platform. The raw web payload arrives in camelCase
// JSON with two legacy spellings for the identity strategy field
// (`identityStrategy` and `pamIdentityStrategy`); normalization folds
// them into one canonical field before anything downstream runs.
//
// An AccessRequestItem is the per-client instantiation: it copies the
// item (copy-on-use — the source item is never mutated once referenced),
// carries the resolved identity computed at creation, and only ever
// accumulates client-provided target/evidence data afterwards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ag_manifest::{
    AccessType, Capability, ConfigContext, IdentityPurpose, IdentityStrategy, OwnershipModel,
    PamIdentityType, VerificationMode,
};

use crate::governance::{IssueCode, ValidationIssue};
use crate::identity::ResolvedIdentity;

/// Checkout policy for a PAM credential (MAILBOX dedicated identities only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_checkout_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_approval: Option<bool>,
}

/// Break-glass justification for BREAK_GLASS_ONLY platforms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BreakGlassJustification {
    /// One of the governance policy's accepted reason codes.
    pub reason_code: String,
    /// Free-text justification, minimum length set by policy.
    pub justification: String,
}

/// The raw payload submitted by the UI/API for a proposed access item.
///
/// Mirrors the frontend wire format. Both legacy identity-strategy
/// spellings are accepted here and folded together by [`RawAccessItem::normalize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccessItem {
    pub item_type: AccessType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pam_ownership: Option<OwnershipModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_purpose: Option<IdentityPurpose>,
    /// Human-flow spelling of the identity strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_strategy: Option<IdentityStrategy>,
    /// PAM-flow spelling of the identity strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pam_identity_strategy: Option<IdentityStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pam_identity_type: Option<PamIdentityType>,
    /// Naming template for human CLIENT_DEDICATED identities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_template: Option<String>,
    /// Naming template for PAM CLIENT_DEDICATED_IDENTITY identities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pam_naming_template: Option<String>,
    /// The literal static identity for STATIC_AGENCY_IDENTITY items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pam_agency_identity_email: Option<String>,
    /// Reference to a managed agency identity record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_identity_id: Option<String>,
    /// Reference to an integration identity record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_identity_id: Option<String>,
    /// The agency group address granted access under AGENCY_GROUP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_group_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_policy: Option<CheckoutPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pam_confirmation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_glass: Option<BreakGlassJustification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_mode: Option<VerificationMode>,
    /// Invitee addresses for INDIVIDUAL_USERS, supplied at request time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invitees: Vec<String>,
    /// Free-form agency-side configuration. Must never contain
    /// client-side asset identifiers (enforced by the validator).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub agency_config: BTreeMap<String, serde_json::Value>,
}

impl RawAccessItem {
    /// An empty payload for the given item type; callers fill in the
    /// relevant fields with struct-update syntax.
    pub fn new(item_type: AccessType) -> Self {
        Self {
            item_type,
            role: None,
            pam_ownership: None,
            identity_purpose: None,
            identity_strategy: None,
            pam_identity_strategy: None,
            pam_identity_type: None,
            naming_template: None,
            pam_naming_template: None,
            pam_agency_identity_email: None,
            agency_identity_id: None,
            integration_identity_id: None,
            agency_group_email: None,
            checkout_policy: None,
            pam_confirmation: None,
            break_glass: None,
            verification_mode: None,
            invitees: Vec::new(),
            agency_config: BTreeMap::new(),
        }
    }

    /// Fold the two legacy identity-strategy spellings into the canonical
    /// field. Both present with *different* values is a validation error —
    /// never silently prefer one spelling.
    pub fn normalize(self) -> Result<AccessItem, ValidationIssue> {
        let identity_strategy = match (self.identity_strategy, self.pam_identity_strategy) {
            (Some(a), Some(b)) if a != b => {
                return Err(ValidationIssue::new(
                    IssueCode::ConflictingIdentityStrategy,
                    format!(
                        "identityStrategy ({a}) and pamIdentityStrategy ({b}) disagree; \
                         supply one value"
                    ),
                ));
            }
            (Some(a), _) => Some(a),
            (None, b) => b,
        };

        Ok(AccessItem {
            item_id: Uuid::new_v4(),
            created_at: Utc::now(),
            item_type: self.item_type,
            role: self.role,
            pam_ownership: self.pam_ownership,
            identity_purpose: self.identity_purpose,
            identity_strategy,
            pam_identity_type: self.pam_identity_type,
            naming_template: self.naming_template,
            pam_naming_template: self.pam_naming_template,
            pam_agency_identity_email: self.pam_agency_identity_email,
            agency_identity_id: self.agency_identity_id,
            integration_identity_id: self.integration_identity_id,
            agency_group_email: self.agency_group_email,
            checkout_policy: self.checkout_policy,
            pam_confirmation: self.pam_confirmation,
            break_glass: self.break_glass,
            verification_mode: self.verification_mode,
            invitees: self.invitees,
            agency_config: self.agency_config,
        })
    }
}

/// The canonical, alias-normalized access item the engine operates on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessItem {
    pub item_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub item_type: AccessType,
    pub role: Option<String>,
    pub pam_ownership: Option<OwnershipModel>,
    pub identity_purpose: Option<IdentityPurpose>,
    /// The single canonical identity strategy (aliases already folded).
    pub identity_strategy: Option<IdentityStrategy>,
    pub pam_identity_type: Option<PamIdentityType>,
    pub naming_template: Option<String>,
    pub pam_naming_template: Option<String>,
    pub pam_agency_identity_email: Option<String>,
    pub agency_identity_id: Option<String>,
    pub integration_identity_id: Option<String>,
    pub agency_group_email: Option<String>,
    pub checkout_policy: Option<CheckoutPolicy>,
    pub pam_confirmation: Option<bool>,
    pub break_glass: Option<BreakGlassJustification>,
    pub verification_mode: Option<VerificationMode>,
    pub invitees: Vec<String>,
    pub agency_config: BTreeMap<String, serde_json::Value>,
}

impl AccessItem {
    /// The runtime context capability rules are matched against.
    pub fn config_context(&self) -> ConfigContext {
        ConfigContext {
            pam_ownership: self.pam_ownership,
            identity_purpose: self.identity_purpose,
            identity_strategy: self.identity_strategy,
        }
    }

    /// The naming template relevant to the selected strategy.
    pub fn effective_naming_template(&self) -> Option<&str> {
        match self.identity_strategy {
            Some(IdentityStrategy::ClientDedicated) => self.naming_template.as_deref(),
            Some(IdentityStrategy::ClientDedicatedIdentity) => self.pam_naming_template.as_deref(),
            _ => None,
        }
    }
}

/// A piece of evidence submitted during client onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    pub submitted_at: DateTime<Utc>,
    /// Opaque reference to the stored artifact (upload key, URL).
    pub reference: String,
}

/// A client-facing instantiation of an AccessItem for one client.
///
/// The identity is resolved at creation and immutable thereafter (unless
/// the whole request is regenerated). Client onboarding actions only add
/// target/evidence data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequestItem {
    pub request_item_id: Uuid,
    pub client_id: String,
    pub created_at: DateTime<Utc>,
    /// Copy-on-use snapshot of the source item.
    pub item: AccessItem,
    /// Effective capability computed at creation.
    pub capability: Capability,
    /// The identity that must actually be granted access.
    pub resolved_identity: Option<ResolvedIdentity>,
    /// Platform-specific asset reference supplied by the client during
    /// onboarding. Kept strictly separate from agency configuration.
    pub client_provided_target: Option<String>,
    #[serde(default)]
    pub evidence: Vec<EvidenceRecord>,
}

impl AccessRequestItem {
    pub fn new(
        client_id: impl Into<String>,
        item: AccessItem,
        capability: Capability,
        resolved_identity: Option<ResolvedIdentity>,
    ) -> Self {
        Self {
            request_item_id: Uuid::new_v4(),
            client_id: client_id.into(),
            created_at: Utc::now(),
            item,
            capability,
            resolved_identity,
            client_provided_target: None,
            evidence: Vec::new(),
        }
    }

    /// Record the client-side asset reference supplied during onboarding.
    pub fn attach_target(&mut self, target: impl Into<String>) {
        self.client_provided_target = Some(target.into());
    }

    /// Append an evidence artifact reference.
    pub fn attach_evidence(&mut self, reference: impl Into<String>) {
        self.evidence.push(EvidenceRecord {
            submitted_at: Utc::now(),
            reference: reference.into(),
        });
    }
}
