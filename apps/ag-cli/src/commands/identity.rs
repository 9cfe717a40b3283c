// identity.rs — Resolve a concrete identity for one strategy, outside
// any manifest context. Useful for previewing naming-template output.

use clap::Subcommand;

use ag_engine::{
    resolve_identity, slugify, ClientContext, IdentityParams, InMemoryIntegrationIdentityStore,
    ResolvedIdentity,
};

use super::parse_token;

#[derive(Subcommand)]
pub enum IdentityCommands {
    /// Resolve an identity for a strategy and print it.
    Resolve {
        /// Identity strategy (e.g., CLIENT_DEDICATED).
        #[arg(long)]
        strategy: String,
        /// Naming template for client-dedicated strategies.
        #[arg(long)]
        template: Option<String>,
        /// Static identity for AGENCY_GROUP / STATIC_AGENCY_IDENTITY.
        #[arg(long)]
        static_identity: Option<String>,
        /// Invitee addresses for INDIVIDUAL_USERS (repeatable).
        #[arg(long)]
        invitee: Vec<String>,
        /// Client display name, slugified into the template.
        #[arg(long)]
        client_name: Option<String>,
    },
    /// Print the slug for a client display name.
    Slug {
        /// Client display name (e.g., "Acme Corporation").
        name: String,
    },
}

pub fn execute(cmd: &IdentityCommands) -> anyhow::Result<()> {
    match cmd {
        IdentityCommands::Resolve {
            strategy,
            template,
            static_identity,
            invitee,
            client_name,
        } => resolve(strategy, template, static_identity, invitee, client_name),
        IdentityCommands::Slug { name } => {
            println!("{}", slugify(name));
            Ok(())
        }
    }
}

fn resolve(
    strategy: &str,
    template: &Option<String>,
    static_identity: &Option<String>,
    invitees: &[String],
    client_name: &Option<String>,
) -> anyhow::Result<()> {
    let params = IdentityParams {
        naming_template: template.clone(),
        static_identity: static_identity.clone(),
        invitees: invitees.to_vec(),
        integration_identity_id: None,
    };
    let client = client_name.as_ref().map(|name| ClientContext {
        client_id: String::new(),
        display_name: name.clone(),
    });

    // The CLI previews template/static strategies only; integration
    // identities need the real store behind the engine.
    let store = InMemoryIntegrationIdentityStore::new();
    let resolved = resolve_identity(parse_token(strategy)?, &params, client.as_ref(), &store)?;
    match resolved {
        ResolvedIdentity::Single(identity) => println!("{identity}"),
        ResolvedIdentity::Many(identities) => {
            for identity in identities {
                println!("{identity}");
            }
        }
    }
    Ok(())
}
