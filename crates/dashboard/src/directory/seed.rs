//! Directory seed documents.
//!
//! A seed is the out-of-band provisioning format for the in-memory
//! directory:
//!
//! ```json
//! {
//!   "operators": [
//!     {"id": 1, "email": "superadmin@compliance.com", "firstName": "Super",
//!      "lastName": "Admin", "passwordHash": "$argon2id$..."}
//!   ],
//!   "organizations": [
//!     {"id": 1, "name": "TechCorp Inc.", "whitelistedDomain": "techcorp.com",
//!      "members": [
//!        {"id": 2, "email": "orgadmin@techcorp.com", "firstName": "Organization",
//!         "lastName": "Admin", "role": "org_admin", "passwordHash": "$argon2id$..."}
//!      ]}
//!   ]
//! }
//! ```
//!
//! Password hashes are produced with `cn-cli hash-password`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use compliance_nexus_core::{Domain, Email, OrganizationId, Role, UserId};

use crate::services::password::{PasswordError, hash_password};

/// Errors raised while loading or validating a seed.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read directory seed {path}: {source}")]
    Read {
        /// Seed file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The seed is not valid JSON of the expected shape.
    #[error("invalid directory seed: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two organizations share an ID.
    #[error("duplicate organization id: {0}")]
    DuplicateOrganizationId(OrganizationId),

    /// Two organizations share a whitelisted domain.
    #[error("domain {0} is whitelisted by more than one organization")]
    DuplicateDomain(Domain),

    /// Two identities share a user ID.
    #[error("duplicate user id: {0}")]
    DuplicateUserId(UserId),

    /// Two identities share an email address.
    #[error("duplicate identity email: {0}")]
    DuplicateEmail(Email),

    /// A member's email domain is not the organization's whitelisted domain.
    #[error("{email} cannot belong to an organization whitelisting {domain}")]
    MemberDomainMismatch {
        /// Member email.
        email: Email,
        /// Organization's whitelisted domain.
        domain: Domain,
    },

    /// A member was provisioned with the `super_admin` role.
    #[error("{0} is provisioned as super_admin inside an organization")]
    ScopedOperator(Email),

    /// Demo credentials could not be hashed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// A password hash is not a PHC string.
    #[error("password hash for {0} is not a valid PHC string")]
    InvalidPasswordHash(Email),
}

/// Root seed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySeed {
    /// Platform operators (`SuperAdmin`, never organization-scoped).
    #[serde(default)]
    pub operators: Vec<OperatorSeed>,
    /// Organizations and their members.
    #[serde(default)]
    pub organizations: Vec<OrganizationSeed>,
}

/// A platform operator identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSeed {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub password_hash: String,
}

/// An organization and its provisioned members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSeed {
    pub id: OrganizationId,
    pub name: String,
    pub whitelisted_domain: Domain,
    #[serde(default)]
    pub members: Vec<MemberSeed>,
}

/// An identity provisioned within an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSeed {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub password_hash: String,
}

impl DirectorySeed {
    /// Parse a seed from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Read` or `SeedError::Parse`.
    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// One platform operator and three organizations with four members.
const DEMO_DIRECTORY: &str = r#"{
  "operators": [
    {"id": 1, "email": "superadmin@compliance.com", "firstName": "Super", "lastName": "Admin"}
  ],
  "organizations": [
    {"id": 1, "name": "TechCorp Inc.", "whitelistedDomain": "techcorp.com", "members": [
      {"id": 2, "email": "orgadmin@techcorp.com", "firstName": "Organization", "lastName": "Admin", "role": "org_admin"},
      {"id": 3, "email": "user@techcorp.com", "firstName": "Regular", "lastName": "User", "role": "regular_user"}
    ]},
    {"id": 2, "name": "HealthSystem LLC", "whitelistedDomain": "healthsystem.com", "members": [
      {"id": 4, "email": "user@healthsystem.com", "firstName": "Health", "lastName": "User", "role": "regular_user"}
    ]},
    {"id": 3, "name": "FinanceGroup", "whitelistedDomain": "financegroup.com", "members": [
      {"id": 5, "email": "user@financegroup.com", "firstName": "Finance", "lastName": "User", "role": "regular_user"}
    ]}
  ]
}"#;

/// Build the demonstration directory with every account using `password`.
///
/// # Errors
///
/// Returns `SeedError::Password` if hashing fails.
pub fn demo_seed(password: &str) -> Result<DirectorySeed, SeedError> {
    let hash = hash_password(password)?;
    let mut seed = DirectorySeed::from_json(DEMO_DIRECTORY)?;

    for operator in &mut seed.operators {
        operator.password_hash.clone_from(&hash);
    }
    for member in seed
        .organizations
        .iter_mut()
        .flat_map(|org| org.members.iter_mut())
    {
        member.password_hash.clone_from(&hash);
    }

    Ok(seed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults_missing_sections() {
        let seed = DirectorySeed::from_json("{}").unwrap();
        assert!(seed.operators.is_empty());
        assert!(seed.organizations.is_empty());
    }

    #[test]
    fn test_from_json_canonicalizes_domains() {
        let seed = DirectorySeed::from_json(
            r#"{"organizations": [{"id": 7, "name": "Acme", "whitelistedDomain": "ACME.io"}]}"#,
        )
        .unwrap();
        assert_eq!(seed.organizations[0].whitelisted_domain.as_str(), "acme.io");
    }

    #[test]
    fn test_from_json_rejects_bad_role() {
        let result = DirectorySeed::from_json(
            r#"{"organizations": [{"id": 7, "name": "Acme", "whitelistedDomain": "acme.io",
                "members": [{"id": 1, "email": "a@acme.io", "firstName": "A", "lastName": "B",
                             "role": "owner", "passwordHash": "x"}]}]}"#,
        );
        assert!(matches!(result, Err(SeedError::Parse(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = DirectorySeed::from_file(Path::new("/nonexistent/directory.json"));
        assert!(matches!(result, Err(SeedError::Read { .. })));
    }

    #[test]
    fn test_demo_seed_shape() {
        let seed = demo_seed("demo-password").unwrap();
        assert_eq!(seed.operators.len(), 1);
        assert_eq!(seed.organizations.len(), 3);

        let techcorp = &seed.organizations[0];
        assert_eq!(techcorp.name, "TechCorp Inc.");
        assert_eq!(techcorp.whitelisted_domain.as_str(), "techcorp.com");
        assert_eq!(techcorp.members.len(), 2);

        let members: usize = seed.organizations.iter().map(|o| o.members.len()).sum();
        assert_eq!(members, 4);
    }
}
