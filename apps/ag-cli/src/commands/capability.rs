// capability.rs — Resolve the effective capability for one
// (platform, item type, configuration context) triple.

use std::path::Path;

use clap::Subcommand;

use ag_engine::resolve_capability;
use ag_manifest::ConfigContext;

use super::{load_registry, parse_token};

#[derive(Subcommand)]
pub enum CapabilityCommands {
    /// Resolve and print the effective capability as JSON.
    Resolve {
        /// Platform key (e.g., "ga4").
        #[arg(long)]
        platform: String,
        /// Access item type (e.g., SHARED_ACCOUNT).
        #[arg(long)]
        item_type: String,
        /// Ownership model context (e.g., AGENCY_OWNED).
        #[arg(long)]
        ownership: Option<String>,
        /// Identity purpose context (e.g., HUMAN_INTERACTIVE).
        #[arg(long)]
        purpose: Option<String>,
        /// Identity strategy context (e.g., CLIENT_DEDICATED).
        #[arg(long)]
        strategy: Option<String>,
    },
}

pub fn execute(cmd: &CapabilityCommands, manifest_dir: &Path) -> anyhow::Result<()> {
    match cmd {
        CapabilityCommands::Resolve {
            platform,
            item_type,
            ownership,
            purpose,
            strategy,
        } => resolve(manifest_dir, platform, item_type, ownership, purpose, strategy),
    }
}

fn resolve(
    manifest_dir: &Path,
    platform: &str,
    item_type: &str,
    ownership: &Option<String>,
    purpose: &Option<String>,
    strategy: &Option<String>,
) -> anyhow::Result<()> {
    let registry = load_registry(manifest_dir)?;
    let manifest = registry
        .get(platform)
        .ok_or_else(|| anyhow::anyhow!("no manifest for platform '{platform}'"))?;

    let context = ConfigContext {
        pam_ownership: ownership.as_deref().map(parse_token).transpose()?,
        identity_purpose: purpose.as_deref().map(parse_token).transpose()?,
        identity_strategy: strategy.as_deref().map(parse_token).transpose()?,
    };

    let capability = resolve_capability(manifest, parse_token(item_type)?, &context);
    println!("{}", serde_json::to_string_pretty(&capability)?);
    Ok(())
}
