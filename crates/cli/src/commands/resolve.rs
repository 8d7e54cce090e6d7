//! Offline credential resolution.
//!
//! Runs the same resolution, session issuance and access checks the
//! dashboard performs, against a seed file (or the built-in demo
//! directory), without a server or database. Useful for checking a seed
//! before deploying it.
//!
//! # Usage
//!
//! ```bash
//! echo 'nexus-demo' | cn-cli resolve -e orgadmin@techcorp.com --path /users
//! echo 'secret' | cn-cli resolve -e user@acme.io --directory acme.json
//! ```
//!
//! # Environment Variables
//!
//! - `DASHBOARD_DEMO_PASSWORD` - Demo account password when no seed file is given

use std::path::Path;

use chrono::TimeDelta;
use secrecy::ExposeSecret;
use serde_json::json;

use compliance_nexus_core::{Email, RoleSet};
use compliance_nexus_dashboard::config::{DEFAULT_DEMO_PASSWORD, DEFAULT_SESSION_TTL_DAYS};
use compliance_nexus_dashboard::directory::{DirectorySeed, InMemoryDirectory, demo_seed};
use compliance_nexus_dashboard::middleware::auth::{AccessDecision, check_access};
use compliance_nexus_dashboard::routes::PROTECTED_PAGES;
use compliance_nexus_dashboard::services::identity::IdentityResolver;
use compliance_nexus_dashboard::services::session::{MemorySessionPersistence, SessionManager};

use super::CliError;
use super::password::read_password_line;

/// Resolve `email` with a password read from stdin and print the principal,
/// the session window and, optionally, the access decision for `path`.
///
/// # Errors
///
/// Returns `CliError::Seed` if the directory cannot be loaded, or
/// `CliError::Auth` if resolution fails.
pub async fn run(
    directory_file: Option<&Path>,
    operator: &str,
    email: &str,
    path: Option<&str>,
) -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let seed = match directory_file {
        Some(file) => DirectorySeed::from_file(file)?,
        None => {
            let demo_password = std::env::var("DASHBOARD_DEMO_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_DEMO_PASSWORD.to_owned());
            tracing::info!("No directory file given; using built-in demo accounts");
            demo_seed(&demo_password)?
        }
    };
    let directory = InMemoryDirectory::from_seed(seed)?;
    tracing::info!(
        "Loaded {} organizations and {} identities",
        directory.organization_count(),
        directory.identity_count()
    );

    let operator = Email::parse(operator).map_err(|e| CliError::InvalidEmail(e.to_string()))?;
    let password = read_password_line()?;

    let principal = IdentityResolver::new(&directory, &operator)
        .resolve(email, password.expose_secret())
        .await?;

    let sessions = SessionManager::new(TimeDelta::days(DEFAULT_SESSION_TTL_DAYS));
    let store = MemorySessionPersistence::new();
    let session = sessions.issue(&store, principal).await?;

    let access = path.map(|path| {
        let required = PROTECTED_PAGES
            .iter()
            .find(|(page, _)| *page == path)
            .map_or(RoleSet::ANY, |&(_, required)| required);
        let decision = match check_access(Some(&session), required, path) {
            AccessDecision::Permit => "permit",
            AccessDecision::RedirectToLogin { .. } => "redirect_to_login",
            AccessDecision::RedirectToForbidden => "redirect_to_forbidden",
        };
        json!({ "path": path, "decision": decision })
    });

    let output = json!({
        "user": session.principal(),
        "issuedAt": session.issued_at(),
        "expiresAt": session.expires_at(),
        "expired": SessionManager::is_expired(&session),
        "access": access,
    });

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
