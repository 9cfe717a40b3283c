// item.rs — Run a raw access-item payload through the full pipeline:
// normalization, governance validation, capability resolution, identity
// resolution.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;

use ag_engine::{
    ClientContext, FieldPolicyEngine, InMemoryIntegrationIdentityStore, ProcessOutcome,
    RawAccessItem, ResolvedIdentity,
};

use super::load_registry;

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Validate a payload file (JSON or YAML) against a platform manifest.
    Validate {
        /// Path to the payload file.
        payload: PathBuf,
        /// Platform key to validate against.
        #[arg(long)]
        platform: String,
        /// Client display name; enables client-dependent identity
        /// resolution instead of deferring it.
        #[arg(long)]
        client_name: Option<String>,
    },
}

pub fn execute(cmd: &ItemCommands, manifest_dir: &Path) -> anyhow::Result<()> {
    match cmd {
        ItemCommands::Validate {
            payload,
            platform,
            client_name,
        } => validate(manifest_dir, payload, platform, client_name),
    }
}

fn read_payload(path: &Path) -> anyhow::Result<RawAccessItem> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading payload {}", path.display()))?;
    // serde_yaml parses JSON too; one reader covers both formats.
    serde_yaml::from_str(&text).with_context(|| format!("parsing payload {}", path.display()))
}

fn validate(
    manifest_dir: &Path,
    payload: &Path,
    platform: &str,
    client_name: &Option<String>,
) -> anyhow::Result<()> {
    let registry = load_registry(manifest_dir)?;
    let store = InMemoryIntegrationIdentityStore::new();
    let engine = FieldPolicyEngine::new(&registry, &store);

    let raw = read_payload(payload)?;
    let client = client_name.as_ref().map(|name| ClientContext {
        client_id: String::new(),
        display_name: name.clone(),
    });

    match engine.process(platform, raw, client.as_ref())? {
        ProcessOutcome::Accepted(enriched) => {
            println!("VALID");
            for warning in &enriched.warnings {
                println!("warning: {warning}");
            }
            println!("capability: {}", serde_json::to_string(&enriched.capability)?);
            match &enriched.resolved_identity {
                Some(ResolvedIdentity::Single(identity)) => println!("identity: {identity}"),
                Some(ResolvedIdentity::Many(identities)) => {
                    println!("identities: {}", identities.join(", "))
                }
                None => println!("identity: (deferred until a client is attached)"),
            }
            Ok(())
        }
        ProcessOutcome::Rejected(report) => {
            println!("INVALID");
            for error in report.errors() {
                println!("error: {error}");
            }
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
            anyhow::bail!("{} validation error(s)", report.issues.len());
        }
    }
}
