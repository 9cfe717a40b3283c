//! # ag-cli
//!
//! Command-line interface for the access-governance engine.
//!
//! - `ag manifest list/show/check` — inspect platform manifests
//! - `ag capability resolve` — resolve the effective capability for a
//!   (platform, item type, configuration context) triple
//! - `ag identity resolve` — resolve a concrete identity for a strategy
//! - `ag item validate` — run a raw access-item payload through the
//!   full policy pipeline

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Access governance CLI — manifests, capabilities, identities.
#[derive(Parser)]
#[command(name = "ag", version, about)]
struct Cli {
    /// Directory containing platform manifest YAML files.
    #[arg(long, default_value = "manifests")]
    manifest_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect platform manifests.
    Manifest {
        #[command(subcommand)]
        command: commands::manifest::ManifestCommands,
    },
    /// Resolve effective capabilities.
    Capability {
        #[command(subcommand)]
        command: commands::capability::CapabilityCommands,
    },
    /// Resolve identities for a strategy.
    Identity {
        #[command(subcommand)]
        command: commands::identity::IdentityCommands,
    },
    /// Validate access-item payloads.
    Item {
        #[command(subcommand)]
        command: commands::item::ItemCommands,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ag_manifest=info".parse()?)
                .add_directive("ag_engine=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Manifest { command } => commands::manifest::execute(command, &cli.manifest_dir),
        Commands::Capability { command } => {
            commands::capability::execute(command, &cli.manifest_dir)
        }
        Commands::Identity { command } => commands::identity::execute(command),
        Commands::Item { command } => commands::item::execute(command, &cli.manifest_dir),
    }
}
