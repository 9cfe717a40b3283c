// resolver.rs — The Capability Resolver.
//
// Computes the effective capability set for one (manifest, access item
// type, runtime context) triple. Fail-closed: an item type the manifest
// does not map resolves to the conservative default; unknown inputs
// never raise an error here.

use ag_manifest::{AccessType, Capability, ConfigContext, PlatformManifest};

/// Resolve the effective capability for an access item type under a
/// runtime configuration context.
///
/// - No capability entry for the type → conservative default.
/// - Flat entry → returned unchanged (context is irrelevant).
/// - Rule-based entry → default plus ordered shallow merges of every
///   matching rule; later matches win per field.
pub fn resolve_capability(
    manifest: &PlatformManifest,
    item_type: AccessType,
    context: &ConfigContext,
) -> Capability {
    match manifest.access_type_capabilities.get(&item_type) {
        Some(spec) => spec.resolve(context),
        None => {
            tracing::debug!(
                platform = %manifest.platform_key,
                item_type = %item_type,
                "no capability mapping; using conservative default"
            );
            Capability::conservative()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_manifest::{
        AccessItemTypeDef, CapabilityCondition, CapabilityOverride, CapabilitySpec,
        ConditionalRule, IdentityPurpose, OwnershipModel, PamRecommendation, RoleTemplate,
        SecurityCapabilities,
    };

    fn manifest_with(spec: Option<(AccessType, CapabilitySpec)>) -> PlatformManifest {
        let mut manifest = PlatformManifest {
            platform_key: "ga4".to_string(),
            supported_access_item_types: vec![
                AccessItemTypeDef {
                    item_type: AccessType::SharedAccount,
                    label: "Shared account".to_string(),
                    description: String::new(),
                    role_templates: vec![RoleTemplate {
                        key: "admin".to_string(),
                        label: "Administrator".to_string(),
                        description: String::new(),
                    }],
                },
                AccessItemTypeDef {
                    item_type: AccessType::NamedInvite,
                    label: "User invite".to_string(),
                    description: String::new(),
                    role_templates: vec![RoleTemplate {
                        key: "viewer".to_string(),
                        label: "Viewer".to_string(),
                        description: String::new(),
                    }],
                },
            ],
            security_capabilities: SecurityCapabilities {
                supports_delegation: false,
                supports_group_access: true,
                supports_oauth: true,
                supports_credential_login: true,
                pam_recommendation: PamRecommendation::NotRecommended,
                pam_rationale: String::new(),
            },
            access_type_capabilities: Default::default(),
            allowed_ownership_models: vec![],
            allowed_identity_strategies: vec![],
            allowed_access_types: vec![AccessType::SharedAccount, AccessType::NamedInvite],
            allowed_verification_modes: vec![],
            required_agency_fields: vec![],
        };
        if let Some((item_type, capability_spec)) = spec {
            manifest
                .access_type_capabilities
                .insert(item_type, capability_spec);
        }
        manifest
    }

    #[test]
    fn unmapped_type_resolves_to_conservative_default() {
        let manifest = manifest_with(None);
        let resolved = resolve_capability(
            &manifest,
            AccessType::NamedInvite,
            &ConfigContext::default(),
        );
        assert_eq!(resolved, Capability::conservative());
    }

    #[test]
    fn flat_entry_returned_unchanged() {
        let mut flat = Capability::conservative();
        flat.client_oauth_supported = true;
        flat.can_verify_access = true;
        let manifest = manifest_with(Some((
            AccessType::NamedInvite,
            CapabilitySpec::Flat(flat.clone()),
        )));

        let resolved = resolve_capability(
            &manifest,
            AccessType::NamedInvite,
            &ConfigContext {
                pam_ownership: Some(OwnershipModel::ClientOwned),
                ..Default::default()
            },
        );
        assert_eq!(resolved, flat);
    }

    #[test]
    fn rule_based_entry_merges_matches_in_order() {
        let spec = CapabilitySpec::RuleBased {
            default: Capability::conservative(),
            rules: vec![ConditionalRule {
                when: CapabilityCondition {
                    pam_ownership: Some(OwnershipModel::AgencyOwned),
                    identity_purpose: Some(IdentityPurpose::HumanInteractive),
                    ..Default::default()
                },
                set: CapabilityOverride {
                    can_verify_access: Some(true),
                    ..Default::default()
                },
            }],
        };
        let manifest = manifest_with(Some((AccessType::SharedAccount, spec)));

        let resolved = resolve_capability(
            &manifest,
            AccessType::SharedAccount,
            &ConfigContext {
                pam_ownership: Some(OwnershipModel::AgencyOwned),
                identity_purpose: Some(IdentityPurpose::HumanInteractive),
                identity_strategy: None,
            },
        );
        assert!(!resolved.can_grant_access);
        assert!(resolved.can_verify_access);
        assert!(resolved.requires_evidence_upload);
    }

    #[test]
    fn context_without_rule_fields_keeps_default() {
        let spec = CapabilitySpec::RuleBased {
            default: Capability::conservative(),
            rules: vec![ConditionalRule {
                when: CapabilityCondition {
                    pam_ownership: Some(OwnershipModel::AgencyOwned),
                    ..Default::default()
                },
                set: CapabilityOverride {
                    can_grant_access: Some(true),
                    ..Default::default()
                },
            }],
        };
        let manifest = manifest_with(Some((AccessType::SharedAccount, spec)));

        let resolved = resolve_capability(
            &manifest,
            AccessType::SharedAccount,
            &ConfigContext::default(),
        );
        assert_eq!(resolved, Capability::conservative());
    }
}
