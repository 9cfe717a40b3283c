//! Capability resolution, governance validation, and identity generation
//! for agency-to-client platform access provisioning.
//!
//! The engine consumes the static platform manifests from `ag-manifest`
//! and exposes one orchestrating entry point, [`FieldPolicyEngine`],
//! which takes a raw payload through normalization, governance
//! validation, capability resolution, and identity resolution.
//!
//! Design rules the whole crate follows:
//!
//! - **Fail closed.** Anything not explicitly granted by a manifest
//!   resolves to the conservative capability (manual evidence-based
//!   verification, no programmatic operations).
//! - **Accumulate, don't throw.** Business-rule violations come back as
//!   a [`ValidationReport`] with every failure listed; only caller bugs
//!   raise [`EngineError`].
//! - **Deterministic identity.** Resolving the same strategy against the
//!   same client always yields the same identity string.

pub mod error;
pub mod governance;
pub mod identity;
pub mod item;
pub mod policy;
pub mod resolver;

pub use error::EngineError;
pub use governance::{validate, GovernancePolicy, IssueCode, ValidationIssue, ValidationReport};
pub use identity::{
    resolve_identity, slugify, ClientContext, IdentityError, IdentityParams,
    InMemoryIntegrationIdentityStore, IntegrationIdentity, IntegrationIdentityStore,
    ResolvedIdentity, CLIENT_SLUG_PLACEHOLDER,
};
pub use item::{
    AccessItem, AccessRequestItem, BreakGlassJustification, CheckoutPolicy, EvidenceRecord,
    RawAccessItem,
};
pub use policy::{EnrichedAccessItem, FieldPolicyEngine, ProcessOutcome};
pub use resolver::resolve_capability;
