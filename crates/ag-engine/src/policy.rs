// policy.rs — The Field Policy Engine: the single entry point that
// normalizes a raw payload, runs governance validation, resolves the
// effective capability, and resolves the identity.
//
// Rejections carry the full accumulated report; rejected items never get
// a capability or identity attached. Identity resolution is skipped (not
// failed) when a client-dependent strategy has no client yet — the
// request-time instantiation supplies the client and resolves then.

use ag_manifest::{Capability, ManifestRegistry};

use crate::error::EngineError;
use crate::governance::{
    validate, GovernancePolicy, IssueCode, ValidationIssue, ValidationReport,
};
use crate::identity::{
    resolve_identity, ClientContext, IdentityError, IdentityParams, IntegrationIdentityStore,
    ResolvedIdentity,
};
use crate::item::{AccessItem, AccessRequestItem, RawAccessItem};
use crate::resolver::resolve_capability;

/// A validated item together with everything the engine computed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedAccessItem {
    pub item: AccessItem,
    /// Effective capability for this item's configuration context.
    pub capability: Capability,
    /// Resolved identity, or None when resolution is deferred to
    /// request time (client-dependent strategy, no client yet).
    pub resolved_identity: Option<ResolvedIdentity>,
    pub warnings: Vec<String>,
}

impl EnrichedAccessItem {
    /// Instantiate the per-client request item (copy-on-use snapshot).
    pub fn into_request_item(self, client_id: impl Into<String>) -> AccessRequestItem {
        AccessRequestItem::new(client_id, self.item, self.capability, self.resolved_identity)
    }
}

/// The outcome of processing one proposed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Accepted(EnrichedAccessItem),
    Rejected(ValidationReport),
}

impl ProcessOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ProcessOutcome::Accepted(_))
    }
}

/// The engine. Holds the immutable manifest registry, the integration
/// identity store seam, and the governance policy.
pub struct FieldPolicyEngine<'a> {
    registry: &'a ManifestRegistry,
    identities: &'a dyn IntegrationIdentityStore,
    policy: GovernancePolicy,
}

impl<'a> FieldPolicyEngine<'a> {
    pub fn new(registry: &'a ManifestRegistry, identities: &'a dyn IntegrationIdentityStore) -> Self {
        Self {
            registry,
            identities,
            policy: GovernancePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: GovernancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full pipeline for one proposed item.
    ///
    /// An unknown platform key is a caller bug and raises [`EngineError`];
    /// every business-rule failure comes back as a rejection instead.
    pub fn process(
        &self,
        platform_key: &str,
        raw: RawAccessItem,
        client: Option<&ClientContext>,
    ) -> Result<ProcessOutcome, EngineError> {
        let manifest = self
            .registry
            .get(platform_key)
            .ok_or_else(|| EngineError::UnknownPlatform {
                platform_key: platform_key.to_string(),
            })?;

        let item = match raw.normalize() {
            Ok(item) => item,
            Err(issue) => {
                return Ok(ProcessOutcome::Rejected(ValidationReport {
                    issues: vec![issue],
                    warnings: vec![],
                }));
            }
        };

        let mut report = validate(manifest, &item, &self.policy);
        if !report.valid() {
            return Ok(ProcessOutcome::Rejected(report));
        }

        let capability = resolve_capability(manifest, item.item_type, &item.config_context());

        let resolved_identity = match item.identity_strategy {
            // Client-dependent strategies resolve at request time.
            Some(strategy) if strategy.needs_client_context() && client.is_none() => None,
            Some(strategy) => {
                let params = IdentityParams::for_item(&item);
                match resolve_identity(strategy, &params, client, self.identities) {
                    Ok(identity) => Some(identity),
                    Err(err) => {
                        report
                            .issues
                            .push(ValidationIssue::new(identity_issue_code(&err), err.to_string()));
                        return Ok(ProcessOutcome::Rejected(report));
                    }
                }
            }
            None => None,
        };

        tracing::debug!(
            platform = %platform_key,
            item_type = %item.item_type,
            deferred_identity = resolved_identity.is_none(),
            "item accepted"
        );
        Ok(ProcessOutcome::Accepted(EnrichedAccessItem {
            item,
            capability,
            resolved_identity,
            warnings: report.warnings,
        }))
    }

    /// Process and, on acceptance, instantiate the per-client request item.
    pub fn instantiate(
        &self,
        platform_key: &str,
        raw: RawAccessItem,
        client: &ClientContext,
    ) -> Result<Result<AccessRequestItem, ValidationReport>, EngineError> {
        match self.process(platform_key, raw, Some(client))? {
            ProcessOutcome::Accepted(enriched) => {
                Ok(Ok(enriched.into_request_item(client.client_id.clone())))
            }
            ProcessOutcome::Rejected(report) => Ok(Err(report)),
        }
    }
}

fn identity_issue_code(err: &IdentityError) -> IssueCode {
    match err {
        IdentityError::MissingNamingTemplate { .. } => IssueCode::MissingNamingTemplate,
        IdentityError::MissingStaticIdentity { .. } => IssueCode::MissingAgencyIdentity,
        IdentityError::MissingClientContext { .. } => IssueCode::IdentityResolutionFailed,
        IdentityError::MissingIntegrationReference => IssueCode::MissingIntegrationIdentity,
        IdentityError::IntegrationIdentityNotFound { .. } => {
            IssueCode::IntegrationIdentityNotFound
        }
        IdentityError::IntegrationIdentityInactive { .. } => {
            IssueCode::IntegrationIdentityInactive
        }
    }
}
