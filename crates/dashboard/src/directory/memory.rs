//! In-memory directory backend.

use std::collections::{HashMap, HashSet};

use secrecy::SecretString;

use compliance_nexus_core::{Email, Organization, OrganizationId, Role, UserId};

use super::seed::{DirectorySeed, SeedError};
use super::{CredentialStore, DirectoryError, OrganizationRegistry, StoredIdentity};
use crate::services::password::validate_hash;

/// Directory held entirely in memory.
///
/// Built once from a validated [`DirectorySeed`] and immutable afterwards,
/// so it can be shared across request handlers without locking.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    /// Organizations keyed by canonical whitelisted domain.
    organizations: HashMap<String, Organization>,
    /// Operators keyed by email.
    operators: HashMap<Email, StoredIdentity>,
    /// Members keyed by (organization, email).
    members: HashMap<(OrganizationId, Email), StoredIdentity>,
}

impl InMemoryDirectory {
    /// Validate a seed and build the directory from it.
    ///
    /// # Errors
    ///
    /// Returns a `SeedError` if organization IDs or domains are duplicated,
    /// an identity is duplicated, a member's domain does not match its
    /// organization, a member holds `super_admin`, or a password hash is
    /// not a PHC string.
    pub fn from_seed(seed: DirectorySeed) -> Result<Self, SeedError> {
        let mut directory = Self::default();
        let mut organization_ids = HashSet::new();
        let mut user_ids = HashSet::new();
        let mut emails = HashSet::new();

        let mut claim_identity = |id: UserId, email: &Email| -> Result<(), SeedError> {
            if !user_ids.insert(id) {
                return Err(SeedError::DuplicateUserId(id));
            }
            if !emails.insert(email.clone()) {
                return Err(SeedError::DuplicateEmail(email.clone()));
            }
            Ok(())
        };

        for operator in seed.operators {
            claim_identity(operator.id, &operator.email)?;
            let password_hash = checked_hash(&operator.email, operator.password_hash)?;

            directory.operators.insert(
                operator.email.clone(),
                StoredIdentity {
                    id: operator.id,
                    email: operator.email,
                    first_name: operator.first_name,
                    last_name: operator.last_name,
                    role: Role::SuperAdmin,
                    organization_id: None,
                    password_hash,
                },
            );
        }

        for org in seed.organizations {
            if !organization_ids.insert(org.id) {
                return Err(SeedError::DuplicateOrganizationId(org.id));
            }
            if directory
                .organizations
                .contains_key(org.whitelisted_domain.as_str())
            {
                return Err(SeedError::DuplicateDomain(org.whitelisted_domain));
            }

            for member in org.members {
                claim_identity(member.id, &member.email)?;
                if member.email.domain() != org.whitelisted_domain.as_str() {
                    return Err(SeedError::MemberDomainMismatch {
                        email: member.email,
                        domain: org.whitelisted_domain,
                    });
                }
                if !member.role.is_organization_scoped() {
                    return Err(SeedError::ScopedOperator(member.email));
                }
                let password_hash = checked_hash(&member.email, member.password_hash)?;

                directory.members.insert(
                    (org.id, member.email.clone()),
                    StoredIdentity {
                        id: member.id,
                        email: member.email,
                        first_name: member.first_name,
                        last_name: member.last_name,
                        role: member.role,
                        organization_id: Some(org.id),
                        password_hash,
                    },
                );
            }

            directory.organizations.insert(
                org.whitelisted_domain.as_str().to_owned(),
                Organization {
                    id: org.id,
                    name: org.name,
                    whitelisted_domain: org.whitelisted_domain,
                },
            );
        }

        Ok(directory)
    }

    /// Number of registered organizations.
    #[must_use]
    pub fn organization_count(&self) -> usize {
        self.organizations.len()
    }

    /// Number of provisioned identities (operators and members).
    #[must_use]
    pub fn identity_count(&self) -> usize {
        self.operators.len() + self.members.len()
    }
}

fn checked_hash(email: &Email, hash: String) -> Result<SecretString, SeedError> {
    validate_hash(&hash).map_err(|_| SeedError::InvalidPasswordHash(email.clone()))?;
    Ok(SecretString::from(hash))
}

impl OrganizationRegistry for InMemoryDirectory {
    async fn lookup_by_domain(&self, domain: &str) -> Result<Option<Organization>, DirectoryError> {
        Ok(self.organizations.get(domain).cloned())
    }

    async fn list(&self) -> Result<Vec<Organization>, DirectoryError> {
        let mut organizations: Vec<_> = self.organizations.values().cloned().collect();
        organizations.sort_by_key(|org| org.id);
        Ok(organizations)
    }
}

impl CredentialStore for InMemoryDirectory {
    async fn find_operator(&self, email: &Email) -> Result<Option<StoredIdentity>, DirectoryError> {
        Ok(self.operators.get(email).cloned())
    }

    async fn find_member(
        &self,
        organization: OrganizationId,
        email: &Email,
    ) -> Result<Option<StoredIdentity>, DirectoryError> {
        Ok(self.members.get(&(organization, email.clone())).cloned())
    }
}
