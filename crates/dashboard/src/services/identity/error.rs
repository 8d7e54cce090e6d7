//! Identity resolution error types.

use thiserror::Error;

use compliance_nexus_core::PrincipalError;

use crate::directory::DirectoryError;

/// Errors that can occur while resolving credentials to a principal.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (malformed email, wrong password or unprovisioned
    /// identity). Deliberately carries no detail.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No organization whitelists the email's domain.
    #[error("email domain {domain} is not registered with any organization")]
    DomainNotWhitelisted {
        /// Domain taken from the submitted email.
        domain: String,
    },

    /// A resolved principal's email domain differs from its organization's
    /// whitelisted domain. Directory data is inconsistent.
    #[error("principal domain {email_domain} does not match whitelisted domain {whitelisted}")]
    DomainMismatch {
        /// Domain of the provisioned email.
        email_domain: String,
        /// Organization's whitelisted domain.
        whitelisted: String,
    },

    /// Directory backend error.
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Provisioned data cannot form a valid principal.
    #[error("invalid principal: {0}")]
    InvalidPrincipal(#[from] PrincipalError),
}

impl AuthError {
    /// Whether the error indicates broken directory data or infrastructure
    /// rather than a user mistake.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DomainMismatch { .. } | Self::Directory(_) | Self::InvalidPrincipal(_)
        )
    }
}
