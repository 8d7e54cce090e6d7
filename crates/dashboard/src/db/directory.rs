//! `PostgreSQL`-backed organization registry and credential store.

use secrecy::SecretString;
use sqlx::PgPool;

use compliance_nexus_core::{Domain, Email, Organization, OrganizationId, Role, UserId};

use super::{RepositoryError, conflict_or_database};
use crate::directory::{CredentialStore, DirectoryError, OrganizationRegistry, StoredIdentity};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for organization queries.
#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: i32,
    name: String,
    whitelisted_domain: String,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = RepositoryError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        let whitelisted_domain = Domain::parse(&row.whitelisted_domain).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid domain in database: {e}"))
        })?;

        Ok(Self {
            id: OrganizationId::new(row.id),
            name: row.name,
            whitelisted_domain,
        })
    }
}

/// Internal row type for identity queries.
#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    role: Role,
    organization_id: Option<i32>,
    password_hash: String,
}

impl TryFrom<IdentityRow> for StoredIdentity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        if row.role.is_organization_scoped() != row.organization_id.is_some() {
            return Err(RepositoryError::DataCorruption(format!(
                "identity {} has role {} but organization {:?}",
                row.id, row.role, row.organization_id
            )));
        }

        Ok(Self {
            id: UserId::new(row.id),
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            organization_id: row.organization_id.map(OrganizationId::new),
            password_hash: SecretString::from(row.password_hash),
        })
    }
}

/// Fields for provisioning a new identity.
#[derive(Debug)]
pub struct NewIdentity<'a> {
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
    pub password_hash: &'a str,
}

// =============================================================================
// Repository
// =============================================================================

/// Directory stored in the `directory` schema.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Create a directory over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get an organization by its whitelisted domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_organization_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<Organization>, RepositoryError> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r"
            SELECT id, name, whitelisted_domain
            FROM directory.organization
            WHERE whitelisted_domain = $1
            ",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all organizations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_organizations(&self) -> Result<Vec<Organization>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrganizationRow>(
            r"
            SELECT id, name, whitelisted_domain
            FROM directory.organization
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get the operator identity registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_operator(
        &self,
        email: &Email,
    ) -> Result<Option<StoredIdentity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            SELECT id, email, first_name, last_name, role,
                   organization_id, password_hash
            FROM directory.identity
            WHERE email = $1 AND role = 'super_admin' AND organization_id IS NULL
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the identity provisioned as `email` within `organization`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_member(
        &self,
        organization: OrganizationId,
        email: &Email,
    ) -> Result<Option<StoredIdentity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            SELECT id, email, first_name, last_name, role,
                   organization_id, password_hash
            FROM directory.identity
            WHERE email = $1 AND organization_id = $2
            ",
        )
        .bind(email.as_str())
        .bind(organization.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Register a new organization.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the domain is already whitelisted.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_organization(
        &self,
        name: &str,
        domain: &Domain,
    ) -> Result<Organization, RepositoryError> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r"
            INSERT INTO directory.organization (name, whitelisted_domain)
            VALUES ($1, $2)
            RETURNING id, name, whitelisted_domain
            ",
        )
        .bind(name)
        .bind(domain.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or_database)?;

        row.try_into()
    }

    /// Provision a new identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already provisioned.
    /// Returns `RepositoryError::Database` if the query fails (including the
    /// role/organization check constraint).
    pub async fn create_identity(
        &self,
        identity: NewIdentity<'_>,
    ) -> Result<UserId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO directory.identity
                (email, first_name, last_name, role, organization_id, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(identity.email.as_str())
        .bind(identity.first_name)
        .bind(identity.last_name)
        .bind(identity.role)
        .bind(identity.organization_id.map(|id| id.as_i32()))
        .bind(identity.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or_database)?;

        Ok(UserId::new(id))
    }
}

impl OrganizationRegistry for PgDirectory {
    async fn lookup_by_domain(&self, domain: &str) -> Result<Option<Organization>, DirectoryError> {
        Ok(self.get_organization_by_domain(domain).await?)
    }

    async fn list(&self) -> Result<Vec<Organization>, DirectoryError> {
        Ok(self.list_organizations().await?)
    }
}

impl CredentialStore for PgDirectory {
    async fn find_operator(&self, email: &Email) -> Result<Option<StoredIdentity>, DirectoryError> {
        Ok(self.get_operator(email).await?)
    }

    async fn find_member(
        &self,
        organization: OrganizationId,
        email: &Email,
    ) -> Result<Option<StoredIdentity>, DirectoryError> {
        Ok(self.get_member(organization, email).await?)
    }
}
