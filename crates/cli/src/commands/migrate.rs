//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! cn-cli migrate
//! ```
//!
//! Applies `crates/dashboard/migrations/` (the `directory` schema) and
//! creates the `dashboard.session` table used by the session store.

use compliance_nexus_dashboard::middleware::session::SessionBackend;

use super::{CliError, connect};

/// Run dashboard database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running directory migrations...");
    sqlx::query("CREATE SCHEMA IF NOT EXISTS dashboard")
        .execute(&pool)
        .await?;
    sqlx::migrate!("../dashboard/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    SessionBackend::postgres(&pool).await?;

    tracing::info!("Dashboard migrations complete!");
    Ok(())
}
