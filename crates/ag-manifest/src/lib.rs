//! # ag-manifest
//!
//! Platform manifests and capability rule definitions for AccessGov.
//!
//! A [`PlatformManifest`] is the static, declarative descriptor of one
//! third-party platform: which access item types it supports, which role
//! templates are legal for each, its security posture, and the capability
//! rules that decide which operations are legal for a given runtime
//! configuration.
//!
//! ## Key invariants
//!
//! - **Immutable at runtime**: manifests are loaded once into a
//!   [`ManifestRegistry`] and read-only thereafter.
//! - **Fail-closed**: access types without a capability mapping resolve
//!   to [`Capability::conservative`] — no OAuth, no programmatic
//!   grant/verify/revoke, evidence required.
//! - **Ordered rule precedence**: conditional rules merge in declared
//!   order; later matches win on a per-field basis.

pub mod capability;
pub mod error;
pub mod manifest;
pub mod store;
pub mod types;

pub use capability::{
    Capability, CapabilityCondition, CapabilityOverride, CapabilitySpec, ConditionalRule,
};
pub use error::ManifestError;
pub use manifest::{
    AccessItemTypeDef, PlatformManifest, RequiredAgencyField, RoleTemplate, SecurityCapabilities,
};
pub use store::{ManifestRegistry, ManifestStore};
pub use types::{
    AccessType, ConfigContext, IdentityPurpose, IdentityStrategy, OwnershipModel, PamIdentityType,
    PamRecommendation, VerificationMode,
};
