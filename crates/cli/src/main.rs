//! Compliance Nexus CLI - Database migrations and directory provisioning.
//!
//! # Usage
//!
//! ```bash
//! # Run dashboard database migrations
//! cn-cli migrate
//!
//! # Register an organization
//! cn-cli org create -n "TechCorp Inc." -d techcorp.com
//!
//! # Provision an identity (password from CN_IDENTITY_PASSWORD or stdin)
//! cn-cli identity create -e orgadmin@techcorp.com -f Organization -l Admin -r org_admin
//!
//! # Hash a password for a seed file
//! echo 'correct horse battery' | cn-cli hash-password
//!
//! # Resolve credentials offline against a seed file
//! echo 'secret' | cn-cli resolve -e user@techcorp.com --directory directory.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `org create` / `org list` - Manage organizations
//! - `identity create` - Provision identities
//! - `hash-password` - Produce Argon2 PHC strings
//! - `resolve` - Dry-run a login

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use compliance_nexus_dashboard::config::DEFAULT_OPERATOR_EMAIL;

mod commands;

#[derive(Parser)]
#[command(name = "cn-cli")]
#[command(author, version, about = "Compliance Nexus CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage organizations
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },
    /// Manage identities
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },
    /// Hash a password read from stdin
    HashPassword,
    /// Resolve credentials offline (password read from stdin)
    Resolve {
        /// Email address to resolve
        #[arg(short, long)]
        email: String,

        /// Directory seed file (defaults to the built-in demo directory)
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Platform operator address
        #[arg(long, default_value = DEFAULT_OPERATOR_EMAIL)]
        operator: String,

        /// Also check access to this dashboard path
        #[arg(short, long)]
        path: Option<String>,
    },
}

#[derive(Subcommand)]
enum OrgAction {
    /// Register a new organization
    Create {
        /// Organization display name
        #[arg(short, long)]
        name: String,

        /// Whitelisted email domain (e.g. techcorp.com)
        #[arg(short, long)]
        domain: String,
    },
    /// List registered organizations
    List,
}

#[derive(Subcommand)]
enum IdentityAction {
    /// Provision a new identity
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Given name
        #[arg(short, long)]
        first_name: String,

        /// Family name
        #[arg(short, long)]
        last_name: String,

        /// Role (`super_admin`, `org_admin`, `regular_user`)
        #[arg(short, long, default_value = "regular_user")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Org { action } => match action {
            OrgAction::Create { name, domain } => {
                commands::directory::create_organization(&name, &domain).await?;
            }
            OrgAction::List => commands::directory::list_organizations().await?,
        },
        Commands::Identity { action } => match action {
            IdentityAction::Create {
                email,
                first_name,
                last_name,
                role,
            } => {
                commands::directory::create_identity(&email, &first_name, &last_name, &role)
                    .await?;
            }
        },
        Commands::HashPassword => commands::password::hash()?,
        Commands::Resolve {
            email,
            directory,
            operator,
            path,
        } => {
            commands::resolve::run(directory.as_deref(), &operator, &email, path.as_deref())
                .await?;
        }
    }
    Ok(())
}
