// types.rs — Shared vocabulary enums for manifests and runtime configuration.
//
// These are the wire-format enums exchanged with the web frontend (camelCase
// payloads with SCREAMING_SNAKE_CASE enum values) and embedded in platform
// manifest YAML. They live in ag-manifest so the manifest model and the
// engine share one definition.

use serde::{Deserialize, Serialize};

/// The kinds of access items a platform can offer.
///
/// Each platform manifest declares which of these it supports and which
/// role templates are legal for each.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    /// An individual user is invited by email address.
    NamedInvite,
    /// A shared credential (PAM-governed) account.
    SharedAccount,
    /// Access via membership in an agency-managed group.
    GroupAccess,
    /// A client-authorized OAuth connection.
    OauthConnection,
    /// Manager/partner delegation (e.g., ad-network MCC linking).
    DelegatedAccess,
}

impl AccessType {
    /// Wire spelling, used verbatim in validation messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::NamedInvite => "NAMED_INVITE",
            AccessType::SharedAccount => "SHARED_ACCOUNT",
            AccessType::GroupAccess => "GROUP_ACCESS",
            AccessType::OauthConnection => "OAUTH_CONNECTION",
            AccessType::DelegatedAccess => "DELEGATED_ACCESS",
        }
    }

    /// Whether this item type is a shared-credential (PAM) type.
    ///
    /// The PAM confirmation gate only applies to these.
    pub fn is_shared_credential(&self) -> bool {
        matches!(self, AccessType::SharedAccount)
    }
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who owns a shared credential: the client or the agency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnershipModel {
    /// The client provisions and controls the credential. The agency must
    /// never attach identity-generation fields to these items.
    ClientOwned,
    /// The agency provisions and controls the credential.
    AgencyOwned,
}

impl OwnershipModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnershipModel::ClientOwned => "CLIENT_OWNED",
            OwnershipModel::AgencyOwned => "AGENCY_OWNED",
        }
    }
}

impl std::fmt::Display for OwnershipModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the identity behind an access item is a human operator or a
/// non-human integration (service account).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityPurpose {
    HumanInteractive,
    IntegrationNonHuman,
}

impl IdentityPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityPurpose::HumanInteractive => "HUMAN_INTERACTIVE",
            IdentityPurpose::IntegrationNonHuman => "INTEGRATION_NON_HUMAN",
        }
    }
}

impl std::fmt::Display for IdentityPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the concrete identity granted access is determined.
///
/// The first three are human-interactive strategies; the rest are
/// PAM/integration strategies. `STATIC` is a legacy spelling of
/// `STATIC_AGENCY_IDENTITY` and is accepted on deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityStrategy {
    /// A pre-configured agency group address gets access.
    AgencyGroup,
    /// Specific invitees, supplied at access-request time.
    IndividualUsers,
    /// A per-client identity generated from a naming template.
    ClientDedicated,
    /// A fixed agency identity, referenced by `agencyIdentityId`.
    #[serde(alias = "STATIC")]
    StaticAgencyIdentity,
    /// A per-client PAM identity generated from `pamNamingTemplate`.
    ClientDedicatedIdentity,
    /// A non-human integration identity, referenced by `integrationIdentityId`.
    IntegrationNonHuman,
}

impl IdentityStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityStrategy::AgencyGroup => "AGENCY_GROUP",
            IdentityStrategy::IndividualUsers => "INDIVIDUAL_USERS",
            IdentityStrategy::ClientDedicated => "CLIENT_DEDICATED",
            IdentityStrategy::StaticAgencyIdentity => "STATIC_AGENCY_IDENTITY",
            IdentityStrategy::ClientDedicatedIdentity => "CLIENT_DEDICATED_IDENTITY",
            IdentityStrategy::IntegrationNonHuman => "INTEGRATION_NON_HUMAN",
        }
    }

    /// Whether this strategy generates or references an agency-side identity.
    ///
    /// These are the strategies forbidden on CLIENT_OWNED items.
    pub fn is_identity_generating(&self) -> bool {
        matches!(
            self,
            IdentityStrategy::StaticAgencyIdentity
                | IdentityStrategy::ClientDedicatedIdentity
                | IdentityStrategy::IntegrationNonHuman
        )
    }

    /// Whether resolving this strategy needs a client context (for slug
    /// substitution into a naming template).
    pub fn needs_client_context(&self) -> bool {
        matches!(
            self,
            IdentityStrategy::ClientDedicated | IdentityStrategy::ClientDedicatedIdentity
        )
    }
}

impl std::fmt::Display for IdentityStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How granted access is verified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationMode {
    /// Programmatic verification through the vendor API.
    Api,
    /// The agency uploads evidence (screenshots, exports).
    EvidenceUpload,
    /// The client attests that access was granted.
    ClientAttestation,
}

impl VerificationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMode::Api => "API",
            VerificationMode::EvidenceUpload => "EVIDENCE_UPLOAD",
            VerificationMode::ClientAttestation => "CLIENT_ATTESTATION",
        }
    }
}

impl std::fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape of a client-dedicated PAM identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PamIdentityType {
    /// A dedicated mailbox — can be checked out.
    Mailbox,
    /// A dedicated group — membership-based, no checkout.
    Group,
}

impl PamIdentityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PamIdentityType::Mailbox => "MAILBOX",
            PamIdentityType::Group => "GROUP",
        }
    }
}

impl std::fmt::Display for PamIdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The platform's security posture on sharing credentials at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PamRecommendation {
    /// Shared credentials are an acceptable pattern on this platform.
    Recommended,
    /// Discouraged — requires explicit operator confirmation.
    NotRecommended,
    /// Emergency-only — requires a justification with a reason code.
    BreakGlassOnly,
}

impl PamRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PamRecommendation::Recommended => "RECOMMENDED",
            PamRecommendation::NotRecommended => "NOT_RECOMMENDED",
            PamRecommendation::BreakGlassOnly => "BREAK_GLASS_ONLY",
        }
    }
}

impl std::fmt::Display for PamRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration values for one access item, matched against
/// capability rule conditions.
///
/// All fields are optional: an item being configured may not have chosen
/// an ownership model or strategy yet. A rule condition on a field the
/// context did not set never matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pam_ownership: Option<OwnershipModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_purpose: Option<IdentityPurpose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_strategy: Option<IdentityStrategy>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_type_wire_spelling() {
        let json = serde_json::to_string(&AccessType::NamedInvite).unwrap();
        assert_eq!(json, "\"NAMED_INVITE\"");
        let restored: AccessType = serde_json::from_str("\"SHARED_ACCOUNT\"").unwrap();
        assert_eq!(restored, AccessType::SharedAccount);
    }

    #[test]
    fn static_legacy_alias_accepted() {
        let strategy: IdentityStrategy = serde_json::from_str("\"STATIC\"").unwrap();
        assert_eq!(strategy, IdentityStrategy::StaticAgencyIdentity);
        // Always serialized under the canonical spelling.
        let json = serde_json::to_string(&strategy).unwrap();
        assert_eq!(json, "\"STATIC_AGENCY_IDENTITY\"");
    }

    #[test]
    fn shared_account_is_shared_credential() {
        assert!(AccessType::SharedAccount.is_shared_credential());
        assert!(!AccessType::NamedInvite.is_shared_credential());
        assert!(!AccessType::OauthConnection.is_shared_credential());
    }

    #[test]
    fn identity_generating_strategies() {
        assert!(IdentityStrategy::StaticAgencyIdentity.is_identity_generating());
        assert!(IdentityStrategy::ClientDedicatedIdentity.is_identity_generating());
        assert!(IdentityStrategy::IntegrationNonHuman.is_identity_generating());
        assert!(!IdentityStrategy::AgencyGroup.is_identity_generating());
        assert!(!IdentityStrategy::IndividualUsers.is_identity_generating());
        assert!(!IdentityStrategy::ClientDedicated.is_identity_generating());
    }

    #[test]
    fn client_dedicated_needs_client_context() {
        assert!(IdentityStrategy::ClientDedicated.needs_client_context());
        assert!(IdentityStrategy::ClientDedicatedIdentity.needs_client_context());
        assert!(!IdentityStrategy::AgencyGroup.needs_client_context());
    }

    #[test]
    fn config_context_camel_case() {
        let context = ConfigContext {
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            identity_strategy: None,
        };
        let json = serde_json::to_string(&context).unwrap();
        assert!(json.contains("\"pamOwnership\":\"AGENCY_OWNED\""));
        assert!(json.contains("\"identityPurpose\":\"HUMAN_INTERACTIVE\""));
        assert!(!json.contains("identityStrategy"));
    }

    #[test]
    fn display_matches_wire_spelling() {
        assert_eq!(AccessType::DelegatedAccess.to_string(), "DELEGATED_ACCESS");
        assert_eq!(OwnershipModel::ClientOwned.to_string(), "CLIENT_OWNED");
        assert_eq!(
            PamRecommendation::BreakGlassOnly.to_string(),
            "BREAK_GLASS_ONLY"
        );
        assert_eq!(PamIdentityType::Mailbox.to_string(), "MAILBOX");
        assert_eq!(VerificationMode::EvidenceUpload.to_string(), "EVIDENCE_UPLOAD");
    }
}
