// governance.rs — The Governance Validator.
//
// Runs an ordered set of independent checks against a proposed access
// item and accumulates *all* failures, so a caller sees the complete
// problem list in one round trip. Business-rule violations never raise;
// they come back as user-facing messages with stable machine-readable
// codes. Only malformed manifests raise hard errors, and those are
// caught earlier at registry build time.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use ag_manifest::{
    AccessType, IdentityPurpose, IdentityStrategy, OwnershipModel, PamIdentityType,
    PamRecommendation, PlatformManifest,
};

use crate::identity::CLIENT_SLUG_PLACEHOLDER;
use crate::item::AccessItem;

/// Stable machine-readable code attached to every validation failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    AccessTypeNotAllowed,
    RoleNotAllowed,
    OwnershipModelNotAllowed,
    IdentityStrategyNotAllowed,
    VerificationModeNotAllowed,
    NamedInviteStrategyRestricted,
    MissingGroupEmail,
    MissingNamingTemplate,
    MissingIdentityPurpose,
    ForbiddenIdentityField,
    PamStrategyRequired,
    MissingIntegrationIdentity,
    MissingAgencyIdentity,
    MissingPamIdentityType,
    ForbiddenNamingTemplate,
    ForbiddenCheckoutPolicy,
    PamConfirmationRequired,
    BreakGlassJustificationRequired,
    BreakGlassJustificationTooShort,
    BreakGlassReasonUnknown,
    ClientAssetInAgencyConfig,
    MissingAgencyField,
    ConflictingIdentityStrategy,
    IntegrationIdentityNotFound,
    IntegrationIdentityInactive,
    IdentityResolutionFailed,
}

/// One validation failure: a stable code plus a user-facing message.
///
/// Callers surface the messages verbatim; machine consumers key on the code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The accumulated result of validating one proposed item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// Likely-misconfiguration diagnostics that do not block the item.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// The flat, human-readable error list of the minimal contract.
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.message.clone()).collect()
    }

    fn reject(&mut self, code: IssueCode, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(code, message));
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Cross-cutting security policy knobs.
///
/// The break-glass thresholds are deliberately configuration, not
/// constants: deployments differ on how much justification they demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GovernancePolicy {
    /// Minimum length of a break-glass justification string.
    pub break_glass_min_justification: usize,
    /// Accepted break-glass reason codes.
    pub break_glass_reason_codes: Vec<String>,
}

impl Default for GovernancePolicy {
    fn default() -> Self {
        Self {
            break_glass_min_justification: 20,
            break_glass_reason_codes: vec![
                "INCIDENT_RESPONSE".to_string(),
                "VENDOR_LIMITATION".to_string(),
                "MIGRATION".to_string(),
            ],
        }
    }
}

/// Validate a proposed access item against a platform manifest and the
/// cross-cutting governance policy.
///
/// Checks run in a fixed order and never short-circuit; every check sees
/// the same item and appends its own failures.
pub fn validate(
    manifest: &PlatformManifest,
    item: &AccessItem,
    policy: &GovernancePolicy,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_allow_lists(manifest, item, &mut report);
    check_named_invite_restriction(item, &mut report);
    check_human_strategy_fields(item, &mut report);
    check_pam_ownership_branches(item, &mut report);
    check_pam_confirmation_gate(manifest, item, policy, &mut report);
    check_asset_separation(item, &mut report);
    check_required_agency_fields(manifest, item, &mut report);

    if !report.valid() {
        tracing::debug!(
            platform = %manifest.platform_key,
            item_type = %item.item_type,
            rejections = report.issues.len(),
            "item failed governance validation"
        );
    }
    report
}

fn join_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check 1: manifest allow-lists. Each failure names the offending value
/// and the allowed set.
fn check_allow_lists(manifest: &PlatformManifest, item: &AccessItem, report: &mut ValidationReport) {
    if !manifest.allowed_access_types.contains(&item.item_type) {
        report.reject(
            IssueCode::AccessTypeNotAllowed,
            format!(
                "access type {} is not allowed on platform '{}'; allowed: {}",
                item.item_type,
                manifest.platform_key,
                join_list(&manifest.allowed_access_types)
            ),
        );
    }

    // Role assignment may happen later in the flow; only a supplied role
    // is checked against the item type's templates.
    if let Some(role) = item.role.as_deref() {
        if let Some(def) = manifest.supported_type(item.item_type) {
            if manifest.role_template(item.item_type, role).is_none() {
                let allowed: Vec<&str> =
                    def.role_templates.iter().map(|r| r.key.as_str()).collect();
                report.reject(
                    IssueCode::RoleNotAllowed,
                    format!(
                        "role '{}' is not a valid {} role on platform '{}'; allowed: {}",
                        role,
                        item.item_type,
                        manifest.platform_key,
                        allowed.join(", ")
                    ),
                );
            }
        }
    }

    if let Some(ownership) = item.pam_ownership {
        if !manifest.allowed_ownership_models.contains(&ownership) {
            report.reject(
                IssueCode::OwnershipModelNotAllowed,
                format!(
                    "ownership model {} is not allowed on platform '{}'; allowed: {}",
                    ownership,
                    manifest.platform_key,
                    join_list(&manifest.allowed_ownership_models)
                ),
            );
        }
    }

    if let Some(strategy) = item.identity_strategy {
        if !manifest.allowed_identity_strategies.contains(&strategy) {
            report.reject(
                IssueCode::IdentityStrategyNotAllowed,
                format!(
                    "identity strategy {} is not allowed on platform '{}'; allowed: {}",
                    strategy,
                    manifest.platform_key,
                    join_list(&manifest.allowed_identity_strategies)
                ),
            );
        }
    }

    if let Some(mode) = item.verification_mode {
        if !manifest.allowed_verification_modes.contains(&mode) {
            report.reject(
                IssueCode::VerificationModeNotAllowed,
                format!(
                    "verification mode {} is not allowed on platform '{}'; allowed: {}",
                    mode,
                    manifest.platform_key,
                    join_list(&manifest.allowed_verification_modes)
                ),
            );
        }
    }
}

/// Check 2: CLIENT_DEDICATED is globally rejected for Named Invite items,
/// regardless of platform allow-lists.
fn check_named_invite_restriction(item: &AccessItem, report: &mut ValidationReport) {
    if item.item_type == AccessType::NamedInvite
        && item.identity_strategy == Some(IdentityStrategy::ClientDedicated)
    {
        report.reject(
            IssueCode::NamedInviteStrategyRestricted,
            "CLIENT_DEDICATED is not supported for Named Invite items; \
             use AGENCY_GROUP or INDIVIDUAL_USERS",
        );
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn warn_when_placeholder_missing(template: &str, report: &mut ValidationReport) {
    if !template.contains(CLIENT_SLUG_PLACEHOLDER) {
        report.warn(format!(
            "naming template '{}' does not contain {}; \
             every client would receive the same identity",
            template, CLIENT_SLUG_PLACEHOLDER
        ));
    }
}

/// Check 3: field requirements per human-interactive strategy.
fn check_human_strategy_fields(item: &AccessItem, report: &mut ValidationReport) {
    match item.identity_strategy {
        Some(IdentityStrategy::AgencyGroup) => {
            if is_blank(item.agency_group_email.as_deref()) {
                report.reject(
                    IssueCode::MissingGroupEmail,
                    "AGENCY_GROUP requires a non-empty agencyGroupEmail",
                );
            }
        }
        Some(IdentityStrategy::ClientDedicated) => {
            // Named Invite items are already rejected by check 2; the
            // template requirement still applies for other item types.
            match item.naming_template.as_deref() {
                Some(template) if !template.trim().is_empty() => {
                    warn_when_placeholder_missing(template, report);
                }
                _ => report.reject(
                    IssueCode::MissingNamingTemplate,
                    "CLIENT_DEDICATED requires a non-empty namingTemplate",
                ),
            }
        }
        // INDIVIDUAL_USERS has no required agency-side field; invitees
        // arrive at access-request time and may be empty.
        _ => {}
    }
}

/// Check 4: mutually exclusive ownership/strategy branches.
fn check_pam_ownership_branches(item: &AccessItem, report: &mut ValidationReport) {
    match item.pam_ownership {
        None => {}
        Some(OwnershipModel::ClientOwned) => check_client_owned(item, report),
        Some(OwnershipModel::AgencyOwned) => check_agency_owned(item, report),
    }
}

/// CLIENT_OWNED items must not carry any identity-generation fields —
/// fail-closed against agency-identity leakage into a client credential.
fn check_client_owned(item: &AccessItem, report: &mut ValidationReport) {
    let mut forbid = |present: bool, field: &str| {
        if present {
            report.issues.push(ValidationIssue::new(
                IssueCode::ForbiddenIdentityField,
                format!(
                    "{} must not be set on a CLIENT_OWNED item; \
                     client-owned credentials never carry agency identity fields",
                    field
                ),
            ));
        }
    };

    forbid(item.identity_purpose.is_some(), "identityPurpose");
    forbid(
        item.identity_strategy
            .is_some_and(|s| s.is_identity_generating()),
        "pamIdentityStrategy",
    );
    forbid(item.pam_identity_type.is_some(), "pamIdentityType");
    forbid(item.pam_naming_template.is_some(), "pamNamingTemplate");
    forbid(item.checkout_policy.is_some(), "checkoutPolicy");
    forbid(item.agency_identity_id.is_some(), "agencyIdentityId");
    forbid(
        item.integration_identity_id.is_some(),
        "integrationIdentityId",
    );
}

fn check_agency_owned(item: &AccessItem, report: &mut ValidationReport) {
    match item.identity_purpose {
        None => {
            report.reject(
                IssueCode::MissingIdentityPurpose,
                "AGENCY_OWNED items require an identityPurpose \
                 (HUMAN_INTERACTIVE or INTEGRATION_NON_HUMAN)",
            );
        }
        Some(IdentityPurpose::IntegrationNonHuman) => {
            if item.integration_identity_id.is_none() {
                report.reject(
                    IssueCode::MissingIntegrationIdentity,
                    "INTEGRATION_NON_HUMAN items require an integrationIdentityId",
                );
            }
            if item.pam_naming_template.is_some() {
                report.reject(
                    IssueCode::ForbiddenNamingTemplate,
                    "pamNamingTemplate is not applicable to INTEGRATION_NON_HUMAN items",
                );
            }
            if item.checkout_policy.is_some() {
                report.reject(
                    IssueCode::ForbiddenCheckoutPolicy,
                    "checkoutPolicy is not applicable to INTEGRATION_NON_HUMAN items",
                );
            }
        }
        Some(IdentityPurpose::HumanInteractive) => match item.identity_strategy {
            Some(IdentityStrategy::StaticAgencyIdentity) => {
                if item.agency_identity_id.is_none() {
                    report.reject(
                        IssueCode::MissingAgencyIdentity,
                        "STATIC_AGENCY_IDENTITY requires an agencyIdentityId",
                    );
                }
                if item.pam_naming_template.is_some() {
                    report.reject(
                        IssueCode::ForbiddenNamingTemplate,
                        "pamNamingTemplate is not applicable to STATIC_AGENCY_IDENTITY items",
                    );
                }
                if item.checkout_policy.is_some() {
                    report.reject(
                        IssueCode::ForbiddenCheckoutPolicy,
                        "checkoutPolicy is not applicable to STATIC_AGENCY_IDENTITY items",
                    );
                }
            }
            Some(IdentityStrategy::ClientDedicatedIdentity) => {
                if item.pam_identity_type.is_none() {
                    report.reject(
                        IssueCode::MissingPamIdentityType,
                        "CLIENT_DEDICATED_IDENTITY requires a pamIdentityType \
                         (MAILBOX or GROUP)",
                    );
                }
                match item.pam_naming_template.as_deref() {
                    Some(template) if !template.trim().is_empty() => {
                        warn_when_placeholder_missing(template, report);
                    }
                    _ => report.reject(
                        IssueCode::MissingNamingTemplate,
                        "CLIENT_DEDICATED_IDENTITY requires a non-empty pamNamingTemplate",
                    ),
                }
                // A GROUP dedicated identity cannot be checked out.
                if item.checkout_policy.is_some()
                    && item.pam_identity_type != Some(PamIdentityType::Mailbox)
                {
                    report.reject(
                        IssueCode::ForbiddenCheckoutPolicy,
                        "checkoutPolicy is only legal for MAILBOX dedicated identities",
                    );
                }
            }
            _ => {
                report.reject(
                    IssueCode::PamStrategyRequired,
                    "AGENCY_OWNED human-interactive items require pamIdentityStrategy \
                     STATIC_AGENCY_IDENTITY or CLIENT_DEDICATED_IDENTITY",
                );
            }
        },
    }
}

/// Check 5: explicit confirmation for risky PAM configurations.
fn check_pam_confirmation_gate(
    manifest: &PlatformManifest,
    item: &AccessItem,
    policy: &GovernancePolicy,
    report: &mut ValidationReport,
) {
    let gated = item.item_type.is_shared_credential()
        && item.pam_ownership == Some(OwnershipModel::AgencyOwned);
    if !gated {
        return;
    }

    match manifest.security_capabilities.pam_recommendation {
        PamRecommendation::Recommended => {}
        PamRecommendation::NotRecommended => {
            if item.pam_confirmation != Some(true) {
                report.reject(
                    IssueCode::PamConfirmationRequired,
                    format!(
                        "platform '{}' does not recommend shared credentials; \
                         set pamConfirmation to acknowledge the security implication ({})",
                        manifest.platform_key, manifest.security_capabilities.pam_rationale
                    ),
                );
            }
        }
        PamRecommendation::BreakGlassOnly => match item.break_glass.as_ref() {
            None => {
                report.reject(
                    IssueCode::BreakGlassJustificationRequired,
                    format!(
                        "platform '{}' allows shared credentials for break-glass only; \
                         provide a breakGlass justification with a reason code to \
                         acknowledge the security implication",
                        manifest.platform_key
                    ),
                );
            }
            Some(justification) => {
                if justification.justification.trim().len()
                    < policy.break_glass_min_justification
                {
                    report.reject(
                        IssueCode::BreakGlassJustificationTooShort,
                        format!(
                            "break-glass justification must be at least {} characters",
                            policy.break_glass_min_justification
                        ),
                    );
                }
                if !policy
                    .break_glass_reason_codes
                    .contains(&justification.reason_code)
                {
                    report.reject(
                        IssueCode::BreakGlassReasonUnknown,
                        format!(
                            "break-glass reason code '{}' is not recognized; allowed: {}",
                            justification.reason_code,
                            policy.break_glass_reason_codes.join(", ")
                        ),
                    );
                }
            }
        },
    }
}

fn client_asset_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `client` followed by an identifier-like suffix (clientAccountId,
    // client_property_id, ...). Plain words like "clientele" do not match.
    PATTERN.get_or_init(|| Regex::new(r"^client[A-Z0-9_]").expect("literal pattern is valid"))
}

/// Check 6: agency configuration must never contain client-side asset
/// identifiers. Client assets are collected during client onboarding only.
fn check_asset_separation(item: &AccessItem, report: &mut ValidationReport) {
    for key in item.agency_config.keys() {
        if client_asset_key_pattern().is_match(key) {
            report.reject(
                IssueCode::ClientAssetInAgencyConfig,
                format!(
                    "agencyConfig key '{}' looks like a client-side asset identifier; \
                     client assets are collected during client onboarding, \
                     never pre-filled by the agency",
                    key
                ),
            );
        }
    }
}

/// Check 7: manifest-declared platform-specific mandatory agency fields.
fn check_required_agency_fields(
    manifest: &PlatformManifest,
    item: &AccessItem,
    report: &mut ValidationReport,
) {
    for field in &manifest.required_agency_fields {
        let present = item.agency_config.get(&field.key).is_some_and(|value| {
            !value.is_null() && value.as_str().map_or(true, |s| !s.trim().is_empty())
        });
        if !present {
            report.reject(IssueCode::MissingAgencyField, field.message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_manifest::{
        AccessItemTypeDef, RequiredAgencyField, RoleTemplate, SecurityCapabilities,
        VerificationMode,
    };

    use crate::item::{BreakGlassJustification, CheckoutPolicy, RawAccessItem};

    fn role(key: &str) -> RoleTemplate {
        RoleTemplate {
            key: key.to_string(),
            label: key.to_string(),
            description: String::new(),
        }
    }

    fn manifest(pam: PamRecommendation) -> PlatformManifest {
        PlatformManifest {
            platform_key: "ga4".to_string(),
            supported_access_item_types: vec![
                AccessItemTypeDef {
                    item_type: AccessType::NamedInvite,
                    label: "User invite".to_string(),
                    description: String::new(),
                    role_templates: vec![role("viewer"), role("editor")],
                },
                AccessItemTypeDef {
                    item_type: AccessType::SharedAccount,
                    label: "Shared account".to_string(),
                    description: String::new(),
                    role_templates: vec![role("admin")],
                },
            ],
            security_capabilities: SecurityCapabilities {
                supports_delegation: false,
                supports_group_access: true,
                supports_oauth: true,
                supports_credential_login: true,
                pam_recommendation: pam,
                pam_rationale: "per-user invites are available".to_string(),
            },
            access_type_capabilities: Default::default(),
            allowed_ownership_models: vec![
                OwnershipModel::ClientOwned,
                OwnershipModel::AgencyOwned,
            ],
            allowed_identity_strategies: vec![
                IdentityStrategy::AgencyGroup,
                IdentityStrategy::IndividualUsers,
                IdentityStrategy::ClientDedicated,
                IdentityStrategy::StaticAgencyIdentity,
                IdentityStrategy::ClientDedicatedIdentity,
                IdentityStrategy::IntegrationNonHuman,
            ],
            allowed_access_types: vec![AccessType::NamedInvite, AccessType::SharedAccount],
            allowed_verification_modes: vec![
                VerificationMode::Api,
                VerificationMode::EvidenceUpload,
            ],
            required_agency_fields: vec![],
        }
    }

    fn item(raw: RawAccessItem) -> AccessItem {
        raw.normalize().unwrap()
    }

    fn codes(report: &ValidationReport) -> Vec<IssueCode> {
        report.issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn valid_named_invite_passes() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("viewer".to_string()),
            identity_strategy: Some(IdentityStrategy::IndividualUsers),
            ..RawAccessItem::new(AccessType::NamedInvite)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert!(report.valid(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn allow_list_failures_name_value_and_allowed_set() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("owner".to_string()),
            ..RawAccessItem::new(AccessType::GroupAccess)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert!(codes(&report).contains(&IssueCode::AccessTypeNotAllowed));
        let message = &report.issues[0].message;
        assert!(message.contains("GROUP_ACCESS"));
        assert!(message.contains("NAMED_INVITE, SHARED_ACCOUNT"));
    }

    #[test]
    fn unknown_role_rejected_with_allowed_roles() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("superadmin".to_string()),
            ..RawAccessItem::new(AccessType::NamedInvite)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::RoleNotAllowed]);
        assert!(report.issues[0].message.contains("viewer, editor"));
    }

    #[test]
    fn named_invite_client_dedicated_always_rejected() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("viewer".to_string()),
            identity_strategy: Some(IdentityStrategy::ClientDedicated),
            naming_template: Some("{clientSlug}-admin@agency.com".to_string()),
            ..RawAccessItem::new(AccessType::NamedInvite)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::NamedInviteStrategyRestricted]);
        assert!(report.issues[0].message.contains("CLIENT_DEDICATED"));
        assert!(report.issues[0].message.contains("Named Invite"));
    }

    #[test]
    fn agency_group_requires_group_email() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("viewer".to_string()),
            identity_strategy: Some(IdentityStrategy::AgencyGroup),
            ..RawAccessItem::new(AccessType::NamedInvite)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::MissingGroupEmail]);
    }

    #[test]
    fn individual_users_does_not_require_group_email() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("viewer".to_string()),
            identity_strategy: Some(IdentityStrategy::IndividualUsers),
            ..RawAccessItem::new(AccessType::NamedInvite)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert!(report.valid());
    }

    #[test]
    fn template_without_placeholder_warns_but_passes() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            identity_strategy: Some(IdentityStrategy::ClientDedicated),
            naming_template: Some("static-ops@agency.com".to_string()),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert!(report.valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("{clientSlug}"));
    }

    #[test]
    fn client_owned_rejects_identity_generation_fields() {
        let m = manifest(PamRecommendation::Recommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::ClientOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            pam_naming_template: Some("{clientSlug}@agency.com".to_string()),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        let issue_codes = codes(&report);
        assert_eq!(
            issue_codes,
            vec![
                IssueCode::ForbiddenIdentityField,
                IssueCode::ForbiddenIdentityField
            ]
        );
        assert!(report.issues[0].message.contains("identityPurpose"));
        assert!(report.issues[1].message.contains("pamNamingTemplate"));
    }

    #[test]
    fn agency_owned_requires_identity_purpose() {
        let m = manifest(PamRecommendation::Recommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::MissingIdentityPurpose]);
    }

    #[test]
    fn integration_branch_requires_reference_and_rejects_template() {
        let m = manifest(PamRecommendation::Recommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::IntegrationNonHuman),
            identity_strategy: Some(IdentityStrategy::IntegrationNonHuman),
            pam_naming_template: Some("{clientSlug}@agency.com".to_string()),
            checkout_policy: Some(CheckoutPolicy {
                max_checkout_minutes: Some(60),
                require_approval: None,
            }),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(
            codes(&report),
            vec![
                IssueCode::MissingIntegrationIdentity,
                IssueCode::ForbiddenNamingTemplate,
                IssueCode::ForbiddenCheckoutPolicy
            ]
        );
    }

    #[test]
    fn static_agency_identity_requires_reference() {
        let m = manifest(PamRecommendation::Recommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            pam_identity_strategy: Some(IdentityStrategy::StaticAgencyIdentity),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::MissingAgencyIdentity]);
    }

    #[test]
    fn dedicated_identity_requires_type_and_template() {
        let m = manifest(PamRecommendation::Recommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            pam_identity_strategy: Some(IdentityStrategy::ClientDedicatedIdentity),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(
            codes(&report),
            vec![
                IssueCode::MissingPamIdentityType,
                IssueCode::MissingNamingTemplate
            ]
        );
    }

    #[test]
    fn group_dedicated_identity_cannot_be_checked_out() {
        let m = manifest(PamRecommendation::Recommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            pam_identity_strategy: Some(IdentityStrategy::ClientDedicatedIdentity),
            pam_identity_type: Some(PamIdentityType::Group),
            pam_naming_template: Some("{clientSlug}-team@agency.com".to_string()),
            checkout_policy: Some(CheckoutPolicy {
                max_checkout_minutes: Some(30),
                require_approval: Some(true),
            }),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::ForbiddenCheckoutPolicy]);
    }

    #[test]
    fn mailbox_dedicated_identity_may_have_checkout_policy() {
        let m = manifest(PamRecommendation::Recommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            pam_identity_strategy: Some(IdentityStrategy::ClientDedicatedIdentity),
            pam_identity_type: Some(PamIdentityType::Mailbox),
            pam_naming_template: Some("{clientSlug}-ops@agency.com".to_string()),
            checkout_policy: Some(CheckoutPolicy {
                max_checkout_minutes: Some(30),
                require_approval: Some(true),
            }),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert!(report.valid(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn not_recommended_platform_requires_confirmation() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            pam_identity_strategy: Some(IdentityStrategy::StaticAgencyIdentity),
            agency_identity_id: Some("agency-identity-1".to_string()),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::PamConfirmationRequired]);
        assert!(report.issues[0].message.contains("acknowledge the security implication"));

        let mut confirmed = proposed.clone();
        confirmed.pam_confirmation = Some(true);
        assert!(validate(&m, &confirmed, &GovernancePolicy::default()).valid());
    }

    #[test]
    fn break_glass_platform_requires_justification() {
        let m = manifest(PamRecommendation::BreakGlassOnly);
        let base = RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            pam_identity_strategy: Some(IdentityStrategy::StaticAgencyIdentity),
            agency_identity_id: Some("agency-identity-1".to_string()),
            ..RawAccessItem::new(AccessType::SharedAccount)
        };

        let report = validate(&m, &item(base.clone()), &GovernancePolicy::default());
        assert_eq!(
            codes(&report),
            vec![IssueCode::BreakGlassJustificationRequired]
        );

        let short = item(RawAccessItem {
            break_glass: Some(BreakGlassJustification {
                reason_code: "SABOTAGE".to_string(),
                justification: "too short".to_string(),
            }),
            ..base.clone()
        });
        let report = validate(&m, &short, &GovernancePolicy::default());
        assert_eq!(
            codes(&report),
            vec![
                IssueCode::BreakGlassJustificationTooShort,
                IssueCode::BreakGlassReasonUnknown
            ]
        );

        let justified = item(RawAccessItem {
            break_glass: Some(BreakGlassJustification {
                reason_code: "INCIDENT_RESPONSE".to_string(),
                justification: "vendor has no per-user roles for this surface".to_string(),
            }),
            ..base
        });
        assert!(validate(&m, &justified, &GovernancePolicy::default()).valid());
    }

    #[test]
    fn break_glass_thresholds_are_configurable() {
        let m = manifest(PamRecommendation::BreakGlassOnly);
        let policy = GovernancePolicy {
            break_glass_min_justification: 4,
            break_glass_reason_codes: vec!["OTHER".to_string()],
        };
        let proposed = item(RawAccessItem {
            role: Some("admin".to_string()),
            pam_ownership: Some(OwnershipModel::AgencyOwned),
            identity_purpose: Some(IdentityPurpose::HumanInteractive),
            pam_identity_strategy: Some(IdentityStrategy::StaticAgencyIdentity),
            agency_identity_id: Some("agency-identity-1".to_string()),
            break_glass: Some(BreakGlassJustification {
                reason_code: "OTHER".to_string(),
                justification: "ok then".to_string(),
            }),
            ..RawAccessItem::new(AccessType::SharedAccount)
        });
        assert!(validate(&m, &proposed, &policy).valid());
    }

    #[test]
    fn client_asset_keys_rejected_in_agency_config() {
        let m = manifest(PamRecommendation::NotRecommended);
        let mut raw = RawAccessItem {
            role: Some("viewer".to_string()),
            ..RawAccessItem::new(AccessType::NamedInvite)
        };
        raw.agency_config.insert(
            "managerAccountId".to_string(),
            serde_json::json!("123-456-7890"),
        );
        raw.agency_config
            .insert("clientAccountId".to_string(), serde_json::json!("999"));
        let report = validate(&m, &item(raw), &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::ClientAssetInAgencyConfig]);
        assert!(report.issues[0].message.contains("clientAccountId"));
    }

    #[test]
    fn plain_words_starting_with_client_are_not_asset_keys() {
        let m = manifest(PamRecommendation::NotRecommended);
        let mut raw = RawAccessItem {
            role: Some("viewer".to_string()),
            ..RawAccessItem::new(AccessType::NamedInvite)
        };
        raw.agency_config
            .insert("clientele".to_string(), serde_json::json!("luxury"));
        let report = validate(&m, &item(raw), &GovernancePolicy::default());
        assert!(report.valid());
    }

    #[test]
    fn required_agency_fields_use_manifest_message() {
        let mut m = manifest(PamRecommendation::NotRecommended);
        m.required_agency_fields.push(RequiredAgencyField {
            key: "managerAccountId".to_string(),
            message: "A Manager Account ID is required to issue link invitations".to_string(),
        });
        let proposed = item(RawAccessItem {
            role: Some("viewer".to_string()),
            ..RawAccessItem::new(AccessType::NamedInvite)
        });
        let report = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::MissingAgencyField]);
        assert!(report.issues[0].message.contains("Manager Account ID"));

        let mut raw = RawAccessItem {
            role: Some("viewer".to_string()),
            ..RawAccessItem::new(AccessType::NamedInvite)
        };
        raw.agency_config
            .insert("managerAccountId".to_string(), serde_json::json!(""));
        let report = validate(&m, &item(raw), &GovernancePolicy::default());
        assert_eq!(codes(&report), vec![IssueCode::MissingAgencyField]);
    }

    #[test]
    fn checks_accumulate_without_short_circuiting() {
        let m = manifest(PamRecommendation::NotRecommended);
        let mut raw = RawAccessItem {
            role: Some("nope".to_string()),
            identity_strategy: Some(IdentityStrategy::AgencyGroup),
            ..RawAccessItem::new(AccessType::NamedInvite)
        };
        raw.agency_config
            .insert("clientPropertyId".to_string(), serde_json::json!("GA-1"));
        let report = validate(&m, &item(raw), &GovernancePolicy::default());
        assert_eq!(
            codes(&report),
            vec![
                IssueCode::RoleNotAllowed,
                IssueCode::MissingGroupEmail,
                IssueCode::ClientAssetInAgencyConfig
            ]
        );
    }

    #[test]
    fn revalidation_is_idempotent() {
        let m = manifest(PamRecommendation::NotRecommended);
        let proposed = item(RawAccessItem {
            role: Some("viewer".to_string()),
            identity_strategy: Some(IdentityStrategy::IndividualUsers),
            ..RawAccessItem::new(AccessType::NamedInvite)
        });
        let first = validate(&m, &proposed, &GovernancePolicy::default());
        let second = validate(&m, &proposed, &GovernancePolicy::default());
        assert_eq!(first, second);
        assert!(first.valid());
    }
}
