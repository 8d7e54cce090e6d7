//! Organization registry and credential store.
//!
//! The identity resolver depends on two narrow services:
//!
//! - [`OrganizationRegistry`] maps a whitelisted email domain to its
//!   organization. Lookups are exact matches on the canonical (lowercase)
//!   domain.
//! - [`CredentialStore`] finds a provisioned identity, either the platform
//!   operator or a member of a given organization, together with its
//!   password hash.
//!
//! Both are implemented by [`InMemoryDirectory`] (seed file or built-in
//! demo data) and by [`PgDirectory`](crate::db::directory::PgDirectory).
//! [`Directory`] dispatches between the two at runtime.

mod memory;
mod seed;

use std::future::Future;

use secrecy::SecretString;
use thiserror::Error;

use compliance_nexus_core::{Email, Organization, OrganizationId, Role, UserId};

use crate::db::RepositoryError;
use crate::db::directory::PgDirectory;

pub use memory::InMemoryDirectory;
pub use seed::{DirectorySeed, MemberSeed, OperatorSeed, OrganizationSeed, SeedError, demo_seed};

/// Errors surfaced by directory backends.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Database backend failed.
    #[error("directory database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A provisioned identity and its stored credential.
///
/// Never leaves the server: the password hash is only read by the resolver.
#[derive(Debug, Clone)]
pub struct StoredIdentity {
    /// User ID.
    pub id: UserId,
    /// Email address (domain canonicalized).
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Provisioned role.
    pub role: Role,
    /// Owning organization; `None` for the platform operator.
    pub organization_id: Option<OrganizationId>,
    /// Argon2 PHC string.
    pub password_hash: SecretString,
}

/// Maps whitelisted email domains to organizations.
pub trait OrganizationRegistry: Send + Sync {
    /// Find the organization whose whitelisted domain is exactly `domain`.
    fn lookup_by_domain(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Option<Organization>, DirectoryError>> + Send;

    /// All registered organizations, ordered by ID.
    fn list(&self) -> impl Future<Output = Result<Vec<Organization>, DirectoryError>> + Send;
}

/// Looks up provisioned identities and their password hashes.
pub trait CredentialStore: Send + Sync {
    /// Find the platform operator identity registered under `email`.
    fn find_operator(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<StoredIdentity>, DirectoryError>> + Send;

    /// Find the identity provisioned as `email` within `organization`.
    fn find_member(
        &self,
        organization: OrganizationId,
        email: &Email,
    ) -> impl Future<Output = Result<Option<StoredIdentity>, DirectoryError>> + Send;
}

/// Runtime-selected directory backend.
#[derive(Debug)]
pub enum Directory {
    /// Seed file or demo data held in memory.
    Memory(InMemoryDirectory),
    /// `PostgreSQL` `directory` schema.
    Postgres(PgDirectory),
}

impl Directory {
    /// Short backend name for logs.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl OrganizationRegistry for Directory {
    async fn lookup_by_domain(&self, domain: &str) -> Result<Option<Organization>, DirectoryError> {
        match self {
            Self::Memory(directory) => directory.lookup_by_domain(domain).await,
            Self::Postgres(directory) => directory.lookup_by_domain(domain).await,
        }
    }

    async fn list(&self) -> Result<Vec<Organization>, DirectoryError> {
        match self {
            Self::Memory(directory) => directory.list().await,
            Self::Postgres(directory) => directory.list().await,
        }
    }
}

impl CredentialStore for Directory {
    async fn find_operator(&self, email: &Email) -> Result<Option<StoredIdentity>, DirectoryError> {
        match self {
            Self::Memory(directory) => directory.find_operator(email).await,
            Self::Postgres(directory) => directory.find_operator(email).await,
        }
    }

    async fn find_member(
        &self,
        organization: OrganizationId,
        email: &Email,
    ) -> Result<Option<StoredIdentity>, DirectoryError> {
        match self {
            Self::Memory(directory) => directory.find_member(organization, email).await,
            Self::Postgres(directory) => directory.find_member(organization, email).await,
        }
    }
}
