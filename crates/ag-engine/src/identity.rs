// identity.rs — The Identity Resolver.
//
// Given an identity strategy and its parameters, produces the concrete
// identity string(s) that must actually be granted access. Resolution is
// deterministic and side-effect-free: the same (strategy, params, client)
// tuple always yields the same identity, so re-running resolution never
// silently changes a previously-granted identity.
//
// Every legal strategy maps to exactly one branch. An unknown strategy is
// rejected upstream by the validator, never silently defaulted here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ag_manifest::IdentityStrategy;

use crate::item::AccessItem;

/// The literal placeholder substituted with the client's slug.
pub const CLIENT_SLUG_PLACEHOLDER: &str = "{clientSlug}";

/// The concrete identity (or identities) to grant access to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResolvedIdentity {
    /// One identity string (most strategies).
    Single(String),
    /// A list of invitee addresses (INDIVIDUAL_USERS).
    Many(Vec<String>),
}

/// The client the identity is being resolved for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    pub client_id: String,
    /// Display name, slugified into naming templates.
    pub display_name: String,
}

/// An integration identity record from the external store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationIdentity {
    pub integration_identity_id: String,
    /// The stored identifier (e.g., a service-account email).
    pub resolved_identifier: String,
    pub active: bool,
}

/// Read accessor for the external integration-identity persistence.
///
/// Consumed only by the INTEGRATION_NON_HUMAN branch; the engine never
/// writes through this seam.
pub trait IntegrationIdentityStore {
    fn lookup(&self, integration_identity_id: &str) -> Option<IntegrationIdentity>;
}

/// In-memory store for tests and CLI use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIntegrationIdentityStore {
    identities: std::collections::HashMap<String, IntegrationIdentity>,
}

impl InMemoryIntegrationIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: IntegrationIdentity) {
        self.identities
            .insert(identity.integration_identity_id.clone(), identity);
    }
}

impl IntegrationIdentityStore for InMemoryIntegrationIdentityStore {
    fn lookup(&self, integration_identity_id: &str) -> Option<IntegrationIdentity> {
        self.identities.get(integration_identity_id).cloned()
    }
}

/// Errors from identity resolution.
///
/// All of these are validation failures from the caller's perspective —
/// the messages are user-facing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{strategy} requires a non-empty naming template")]
    MissingNamingTemplate { strategy: IdentityStrategy },

    #[error("{strategy} requires a pre-configured identity address")]
    MissingStaticIdentity { strategy: IdentityStrategy },

    #[error("{strategy} requires a client context to resolve against")]
    MissingClientContext { strategy: IdentityStrategy },

    #[error("INTEGRATION_NON_HUMAN requires an integrationIdentityId reference")]
    MissingIntegrationReference,

    #[error("integration identity '{integration_identity_id}' was not found")]
    IntegrationIdentityNotFound { integration_identity_id: String },

    #[error("integration identity '{integration_identity_id}' is inactive")]
    IntegrationIdentityInactive { integration_identity_id: String },
}

/// Parameters extracted from an access item for one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityParams {
    pub naming_template: Option<String>,
    pub static_identity: Option<String>,
    pub invitees: Vec<String>,
    pub integration_identity_id: Option<String>,
}

impl IdentityParams {
    /// Pull the strategy-relevant fields out of an access item.
    pub fn for_item(item: &AccessItem) -> Self {
        let static_identity = match item.identity_strategy {
            Some(IdentityStrategy::AgencyGroup) => item.agency_group_email.clone(),
            Some(IdentityStrategy::StaticAgencyIdentity) => {
                item.pam_agency_identity_email.clone()
            }
            _ => None,
        };
        Self {
            naming_template: item.effective_naming_template().map(str::to_string),
            static_identity,
            invitees: item.invitees.clone(),
            integration_identity_id: item.integration_identity_id.clone(),
        }
    }
}

/// Resolve the concrete identity for one strategy.
///
/// `client` is only needed by the CLIENT_DEDICATED strategies; the store
/// is only consulted by INTEGRATION_NON_HUMAN.
pub fn resolve_identity(
    strategy: IdentityStrategy,
    params: &IdentityParams,
    client: Option<&ClientContext>,
    store: &dyn IntegrationIdentityStore,
) -> Result<ResolvedIdentity, IdentityError> {
    match strategy {
        IdentityStrategy::ClientDedicated | IdentityStrategy::ClientDedicatedIdentity => {
            let template = params
                .naming_template
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .ok_or(IdentityError::MissingNamingTemplate { strategy })?;
            let client = client.ok_or(IdentityError::MissingClientContext { strategy })?;
            let slug = slugify(&client.display_name);
            Ok(ResolvedIdentity::Single(
                template.replace(CLIENT_SLUG_PLACEHOLDER, &slug),
            ))
        }
        IdentityStrategy::AgencyGroup | IdentityStrategy::StaticAgencyIdentity => {
            let identity = params
                .static_identity
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or(IdentityError::MissingStaticIdentity { strategy })?;
            Ok(ResolvedIdentity::Single(identity.to_string()))
        }
        IdentityStrategy::IndividualUsers => {
            // Zero or more invitees; the resolver never synthesizes addresses.
            Ok(ResolvedIdentity::Many(params.invitees.clone()))
        }
        IdentityStrategy::IntegrationNonHuman => {
            let id = params
                .integration_identity_id
                .as_deref()
                .ok_or(IdentityError::MissingIntegrationReference)?;
            let record =
                store
                    .lookup(id)
                    .ok_or_else(|| IdentityError::IntegrationIdentityNotFound {
                        integration_identity_id: id.to_string(),
                    })?;
            if !record.active {
                return Err(IdentityError::IntegrationIdentityInactive {
                    integration_identity_id: id.to_string(),
                });
            }
            Ok(ResolvedIdentity::Single(record.resolved_identifier))
        }
    }
}

/// Slugify a client display name: lowercase, non-alphanumeric runs
/// collapsed to single hyphens, leading/trailing hyphens trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}
