//! Session middleware configuration for the dashboard.
//!
//! Cookie sessions via tower-sessions, stored in `PostgreSQL` when a
//! database is configured and in process memory otherwise. The cookie only
//! carries the tower-sessions ID; the auth token and principal snapshot
//! live server-side and enforce their own absolute expiry.

use axum::Router;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::DashboardConfig;

/// Session cookie name for the dashboard.
pub const SESSION_COOKIE_NAME: &str = "cn_session";

/// Errors raised while preparing the session store.
#[derive(Debug, Error)]
pub enum SessionSetupError {
    /// Store configuration was rejected.
    #[error("invalid session store configuration: {0}")]
    Config(String),

    /// The session table could not be created.
    #[error("session store migration failed: {0}")]
    Migration(#[from] sqlx::Error),
}

/// Runtime-selected session store.
#[derive(Debug, Clone)]
pub enum SessionBackend {
    /// Process-local sessions; lost on restart.
    Memory(MemoryStore),
    /// `dashboard.session` table.
    Postgres(PostgresStore),
}

impl SessionBackend {
    /// In-memory store.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::default())
    }

    /// `PostgreSQL` store in the `dashboard` schema. Creates the session
    /// table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SessionSetupError` if the store cannot be configured or
    /// migrated.
    pub async fn postgres(pool: &PgPool) -> Result<Self, SessionSetupError> {
        let store = PostgresStore::new(pool.clone())
            .with_schema_name("dashboard")
            .map_err(|e| SessionSetupError::Config(e.to_string()))?
            .with_table_name("session")
            .map_err(|e| SessionSetupError::Config(e.to_string()))?;

        store.migrate().await?;

        Ok(Self::Postgres(store))
    }

    /// Short backend name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Wrap `router` in the session layer for this store.
    pub fn apply<S>(self, router: Router<S>, config: &DashboardConfig) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        match self {
            Self::Memory(store) => router.layer(session_layer(store, config)),
            Self::Postgres(store) => router.layer(session_layer(store, config)),
        }
    }
}

/// Create the session layer for `store`.
#[must_use]
pub fn session_layer<Store>(store: Store, config: &DashboardConfig) -> SessionManagerLayer<Store>
where
    Store: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(config.session_ttl.num_seconds()),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
