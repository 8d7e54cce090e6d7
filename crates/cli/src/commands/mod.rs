//! CLI command implementations.

pub mod directory;
pub mod migrate;
pub mod password;
pub mod resolve;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use compliance_nexus_dashboard::db::{self, RepositoryError};
use compliance_nexus_dashboard::directory::SeedError;
use compliance_nexus_dashboard::middleware::session::SessionSetupError;
use compliance_nexus_dashboard::services::identity::AuthError;
use compliance_nexus_dashboard::services::password::PasswordError;
use compliance_nexus_dashboard::services::session::SessionStoreError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session table setup failed.
    #[error(transparent)]
    SessionSetup(#[from] SessionSetupError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, org_admin, regular_user")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Invalid domain.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// No organization whitelists the identity's domain.
    #[error("No organization whitelists {0}; create it first with `cn-cli org create`")]
    UnknownOrganization(String),

    /// Password rejected or hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Directory seed could not be loaded.
    #[error(transparent)]
    Seed(#[from] SeedError),

    /// Credential resolution failed.
    #[error("Resolution failed: {0}")]
    Auth(#[from] AuthError),

    /// Session could not be issued.
    #[error(transparent)]
    Session(#[from] SessionStoreError),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect to the dashboard database named by `DASHBOARD_DATABASE_URL`
/// (falling back to `DATABASE_URL`).
///
/// # Errors
///
/// Returns `CliError::MissingEnvVar` if neither variable is set, or
/// `CliError::Database` if the connection fails.
pub async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DASHBOARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("DASHBOARD_DATABASE_URL"))?;

    tracing::info!("Connecting to dashboard database...");
    Ok(db::create_pool(&SecretString::from(database_url)).await?)
}
