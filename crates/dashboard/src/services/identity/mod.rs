//! Identity resolution.
//!
//! Turns submitted credentials into a [`Principal`]. The platform operator
//! address is the only credential that bypasses domain whitelisting; every
//! other email must belong to a registered organization and be provisioned
//! within it.
//!
//! Wrong passwords and unprovisioned emails both yield
//! [`AuthError::InvalidCredentials`] so callers cannot enumerate accounts.

mod error;

pub use error::AuthError;

use secrecy::ExposeSecret;

use compliance_nexus_core::{Email, EmailError, Principal, PrincipalError, Role};

use crate::directory::{CredentialStore, OrganizationRegistry, StoredIdentity};
use crate::services::password::{verify_decoy, verify_password};

/// Resolves credentials against a directory.
pub struct IdentityResolver<'a, D> {
    directory: &'a D,
    operator_email: &'a Email,
}

impl<'a, D> IdentityResolver<'a, D>
where
    D: OrganizationRegistry + CredentialStore,
{
    /// Create a resolver over `directory` with `operator_email` as the
    /// platform-operator address.
    #[must_use]
    pub const fn new(directory: &'a D, operator_email: &'a Email) -> Self {
        Self {
            directory,
            operator_email,
        }
    }

    /// Resolve `email` and `password` to a principal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if either field is empty, the
    /// email has no `@` or is otherwise malformed within a whitelisted
    /// domain, the identity is not provisioned, or the password does not
    /// match.
    /// Returns `AuthError::DomainNotWhitelisted` if no organization
    /// whitelists the text after the email's final `@`, including when it
    /// is empty.
    /// Returns `AuthError::DomainMismatch` if the resolved principal's domain
    /// differs from its organization's whitelisted domain.
    /// Returns `AuthError::Directory` if a backend lookup fails.
    pub async fn resolve(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let email = match Email::parse(email) {
            Ok(email) => email,
            Err(EmailError::Empty | EmailError::MissingAtSymbol) => {
                return Err(AuthError::InvalidCredentials);
            }
            Err(_) => return self.reject_malformed(email, password).await,
        };

        if &email == self.operator_email {
            return self.resolve_operator(&email, password).await;
        }

        let domain = email.domain();
        let Some(organization) = self.directory.lookup_by_domain(domain).await? else {
            tracing::info!(domain, "Login rejected: domain not whitelisted");
            return Err(AuthError::DomainNotWhitelisted {
                domain: domain.to_owned(),
            });
        };

        let Some(identity) = self.directory.find_member(organization.id, &email).await? else {
            verify_decoy(password);
            tracing::info!(domain, "Login rejected: identity not provisioned");
            return Err(AuthError::InvalidCredentials);
        };

        check_password(&identity, password)?;

        let principal = Principal::member(
            identity.id,
            identity.email,
            identity.first_name,
            identity.last_name,
            identity.role,
            &organization,
        )?;

        let email_domain = principal.email().domain();
        if !organization.owns_domain(email_domain) {
            tracing::error!(
                user_id = %principal.id(),
                organization_id = %organization.id,
                email_domain,
                whitelisted = %organization.whitelisted_domain,
                "Resolved principal is outside its organization's domain"
            );
            return Err(AuthError::DomainMismatch {
                email_domain: email_domain.to_owned(),
                whitelisted: organization.whitelisted_domain.to_string(),
            });
        }

        tracing::info!(
            user_id = %principal.id(),
            role = %principal.role(),
            organization_id = %organization.id,
            "Credentials resolved"
        );

        Ok(principal)
    }

    /// An address that has an `@` but fails validation still gets the
    /// whitelist verdict for whatever follows it.
    async fn reject_malformed(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let Some((_, domain)) = email.rsplit_once('@') else {
            return Err(AuthError::InvalidCredentials);
        };
        let domain = domain.trim().to_ascii_lowercase();

        if domain.is_empty() || self.directory.lookup_by_domain(&domain).await?.is_none() {
            tracing::info!(domain = %domain, "Login rejected: domain not whitelisted");
            return Err(AuthError::DomainNotWhitelisted { domain });
        }

        verify_decoy(password);
        tracing::info!(domain = %domain, "Login rejected: malformed email");
        Err(AuthError::InvalidCredentials)
    }

    async fn resolve_operator(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let Some(identity) = self.directory.find_operator(email).await? else {
            verify_decoy(password);
            tracing::warn!("Operator login attempted but no operator is provisioned");
            return Err(AuthError::InvalidCredentials);
        };

        if identity.role != Role::SuperAdmin || identity.organization_id.is_some() {
            return Err(AuthError::InvalidPrincipal(PrincipalError::ScopedSuperAdmin));
        }

        check_password(&identity, password)?;

        tracing::info!(user_id = %identity.id, "Operator credentials resolved");

        Ok(Principal::super_admin(
            identity.id,
            identity.email,
            identity.first_name,
            identity.last_name,
        ))
    }
}

fn check_password(identity: &StoredIdentity, password: &str) -> Result<(), AuthError> {
    if verify_password(password, identity.password_hash.expose_secret()) {
        Ok(())
    } else {
        tracing::info!(user_id = %identity.id, "Login rejected: wrong password");
        Err(AuthError::InvalidCredentials)
    }
}
