//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::{DashboardConfig, DirectorySource};
use crate::db::directory::PgDirectory;
use crate::directory::{Directory, DirectorySeed, InMemoryDirectory, SeedError, demo_seed};
use crate::services::identity::IdentityResolver;
use crate::services::session::SessionManager;

/// Errors raised while assembling application state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The directory seed could not be loaded.
    #[error(transparent)]
    Seed(#[from] SeedError),

    /// The `PostgreSQL` directory was selected without a pool.
    #[error("postgres directory selected but no database is configured")]
    MissingDatabase,
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    directory: Directory,
    sessions: SessionManager,
}

impl AppState {
    /// Create state from configuration and a directory backend.
    #[must_use]
    pub fn new(config: DashboardConfig, directory: Directory) -> Self {
        let sessions = SessionManager::new(config.session_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                directory,
                sessions,
            }),
        }
    }

    /// Dashboard configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Organization registry and credential store.
    #[must_use]
    pub fn directory(&self) -> &Directory {
        &self.inner.directory
    }

    /// Session manager.
    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    /// Identity resolver over the configured directory.
    #[must_use]
    pub fn resolver(&self) -> IdentityResolver<'_, Directory> {
        IdentityResolver::new(&self.inner.directory, &self.inner.config.operator_email)
    }
}

/// Build the directory backend selected by `config`.
///
/// # Errors
///
/// Returns `StateError::Seed` if a seed file or the demo data fails to load,
/// or `StateError::MissingDatabase` if `PostgreSQL` is selected without a
/// pool.
pub fn build_directory(
    config: &DashboardConfig,
    pool: Option<&PgPool>,
) -> Result<Directory, StateError> {
    let directory = match &config.directory {
        DirectorySource::Postgres => {
            let pool = pool.ok_or(StateError::MissingDatabase)?;
            Directory::Postgres(PgDirectory::new(pool.clone()))
        }
        DirectorySource::SeedFile(path) => {
            let seed = DirectorySeed::from_file(path)?;
            Directory::Memory(InMemoryDirectory::from_seed(seed)?)
        }
        DirectorySource::Demo => {
            tracing::warn!(
                "No database or directory file configured; using built-in demo accounts"
            );
            let seed = demo_seed(config.demo_password.expose_secret())?;
            Directory::Memory(InMemoryDirectory::from_seed(seed)?)
        }
    };

    tracing::info!(backend = directory.backend_name(), "Directory ready");

    Ok(directory)
}
