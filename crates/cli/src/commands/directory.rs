//! Directory provisioning commands.
//!
//! # Usage
//!
//! ```bash
//! # Register an organization and its whitelisted domain
//! cn-cli org create -n "TechCorp Inc." -d techcorp.com
//!
//! # List organizations
//! cn-cli org list
//!
//! # Provision an identity (the organization is found by email domain)
//! cn-cli identity create -e orgadmin@techcorp.com -f Organization -l Admin -r org_admin
//! ```
//!
//! # Environment Variables
//!
//! - `DASHBOARD_DATABASE_URL` - `PostgreSQL` connection string
//! - `CN_IDENTITY_PASSWORD` - Initial password (prompted on stdin if unset)

use secrecy::{ExposeSecret, SecretString};

use compliance_nexus_core::{Domain, Email, Role};
use compliance_nexus_dashboard::db::RepositoryError;
use compliance_nexus_dashboard::db::directory::{NewIdentity, PgDirectory};
use compliance_nexus_dashboard::services::password::{hash_password, validate_password};

use super::{CliError, connect};

/// Register a new organization.
///
/// # Returns
///
/// The ID of the created organization.
///
/// # Errors
///
/// Returns `CliError::InvalidDomain` if the domain is malformed, or
/// `CliError::Repository` if it is already whitelisted.
pub async fn create_organization(name: &str, domain: &str) -> Result<i32, CliError> {
    let domain = Domain::parse(domain).map_err(|e| CliError::InvalidDomain(e.to_string()))?;

    let directory = PgDirectory::new(connect().await?);

    tracing::info!("Creating organization: {} ({})", name, domain);
    let organization = directory.create_organization(name, &domain).await?;

    tracing::info!(
        "Organization created successfully! ID: {}, Domain: {}",
        organization.id,
        organization.whitelisted_domain
    );

    Ok(organization.id.as_i32())
}

/// List registered organizations.
///
/// # Errors
///
/// Returns `CliError` if the database cannot be read.
pub async fn list_organizations() -> Result<(), CliError> {
    let directory = PgDirectory::new(connect().await?);

    let organizations = directory.list_organizations().await?;
    if organizations.is_empty() {
        tracing::info!("No organizations registered");
    }
    for org in organizations {
        tracing::info!("{:>4}  {:<32} {}", org.id, org.name, org.whitelisted_domain);
    }

    Ok(())
}

/// Provision a new identity.
///
/// `super_admin` identities are never organization-scoped; every other role
/// is bound to the organization whitelisting the email's domain.
///
/// # Returns
///
/// The ID of the created identity.
///
/// # Errors
///
/// Returns `CliError::InvalidRole`, `CliError::InvalidEmail` or
/// `CliError::Password` for bad input, `CliError::UnknownOrganization` if
/// no organization whitelists the domain, or `CliError::Repository` if the
/// email is already provisioned.
pub async fn create_identity(
    email: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
) -> Result<i32, CliError> {
    let role: Role = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;

    let password = initial_password()?;
    validate_password(password.expose_secret())?;
    let password_hash = hash_password(password.expose_secret())?;

    let directory = PgDirectory::new(connect().await?);

    let organization_id = if role.is_organization_scoped() {
        let organization = directory
            .get_organization_by_domain(email.domain())
            .await?
            .ok_or_else(|| CliError::UnknownOrganization(email.domain().to_owned()))?;
        tracing::info!("Binding to organization: {}", organization.name);
        Some(organization.id)
    } else {
        None
    };

    tracing::info!("Creating identity: {} ({})", email, role);
    let user_id = directory
        .create_identity(NewIdentity {
            email: &email,
            first_name,
            last_name,
            role,
            organization_id,
            password_hash: &password_hash,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                CliError::InvalidEmail(format!("{email} is already provisioned"))
            }
            other => CliError::Repository(other),
        })?;

    tracing::info!(
        "Identity created successfully! ID: {}, Email: {}, Role: {}",
        user_id,
        email,
        role
    );

    Ok(user_id.as_i32())
}

fn initial_password() -> Result<SecretString, CliError> {
    if let Ok(password) = std::env::var("CN_IDENTITY_PASSWORD") {
        return Ok(SecretString::from(password));
    }
    super::password::read_password_line()
}
