//! Authenticated principals.
//!
//! A [`Principal`] is the resolved identity of an authenticated user. The
//! organization binding is tied to the role: a `SuperAdmin` is never
//! organization-scoped, every other role always is. Both constructors and
//! deserialization enforce this, so a `Principal` value that exists is
//! always consistent.
//!
//! The serialized form is the camelCase user record consumed by the
//! presentation layer:
//!
//! ```json
//! {"id":2,"email":"orgadmin@techcorp.com","firstName":"Organization",
//!  "lastName":"Admin","role":"org_admin","organizationId":1,
//!  "organizationName":"TechCorp Inc."}
//! ```

use serde::{Deserialize, Serialize};

use super::{Email, Organization, OrganizationId, Role, UserId};

/// Errors raised when a principal would violate the role/organization invariant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    /// A `SuperAdmin` was given an organization binding.
    #[error("super admins cannot belong to an organization")]
    ScopedSuperAdmin,
    /// An organization role was given no organization binding.
    #[error("{0} principals must belong to an organization")]
    MissingOrganization(Role),
    /// Only one of `organizationId` / `organizationName` was present.
    #[error("organization id and name must be provided together")]
    PartialOrganization,
}

/// The organization a principal belongs to, copied at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationRef {
    /// Organization ID.
    pub id: OrganizationId,
    /// Organization display name.
    pub name: String,
}

impl From<&Organization> for OrganizationRef {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.clone(),
        }
    }
}

/// The resolved identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PrincipalRecord", into = "PrincipalRecord")]
pub struct Principal {
    id: UserId,
    email: Email,
    first_name: String,
    last_name: String,
    role: Role,
    organization: Option<OrganizationRef>,
}

impl Principal {
    /// Build the platform-operator principal. Never organization-scoped.
    #[must_use]
    pub const fn super_admin(
        id: UserId,
        email: Email,
        first_name: String,
        last_name: String,
    ) -> Self {
        Self {
            id,
            email,
            first_name,
            last_name,
            role: Role::SuperAdmin,
            organization: None,
        }
    }

    /// Build a principal that belongs to `organization`.
    ///
    /// # Errors
    ///
    /// Returns `PrincipalError::ScopedSuperAdmin` if `role` is `SuperAdmin`.
    pub fn member(
        id: UserId,
        email: Email,
        first_name: String,
        last_name: String,
        role: Role,
        organization: &Organization,
    ) -> Result<Self, PrincipalError> {
        if !role.is_organization_scoped() {
            return Err(PrincipalError::ScopedSuperAdmin);
        }

        Ok(Self {
            id,
            email,
            first_name,
            last_name,
            role,
            organization: Some(organization.into()),
        })
    }

    /// User ID.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Email address the principal authenticated with.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Given name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// "First Last", as shown in the dashboard chrome.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Role held by the principal.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Organization binding; `None` exactly when the role is `SuperAdmin`.
    #[must_use]
    pub const fn organization(&self) -> Option<&OrganizationRef> {
        self.organization.as_ref()
    }

    /// Organization ID, if organization-scoped.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization.as_ref().map(|org| org.id)
    }

    /// Organization name, if organization-scoped.
    #[must_use]
    pub fn organization_name(&self) -> Option<&str> {
        self.organization.as_ref().map(|org| org.name.as_str())
    }
}

/// Wire shape of a principal. Converted through `TryFrom` so that
/// deserialized snapshots are re-validated.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrincipalRecord {
    id: UserId,
    email: Email,
    first_name: String,
    last_name: String,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<OrganizationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_name: Option<String>,
}

impl TryFrom<PrincipalRecord> for Principal {
    type Error = PrincipalError;

    fn try_from(record: PrincipalRecord) -> Result<Self, Self::Error> {
        let organization = match (record.organization_id, record.organization_name) {
            (Some(id), Some(name)) => Some(OrganizationRef { id, name }),
            (None, None) => None,
            _ => return Err(PrincipalError::PartialOrganization),
        };

        match (record.role.is_organization_scoped(), organization.is_some()) {
            (false, true) => return Err(PrincipalError::ScopedSuperAdmin),
            (true, false) => return Err(PrincipalError::MissingOrganization(record.role)),
            _ => {}
        }

        Ok(Self {
            id: record.id,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            role: record.role,
            organization,
        })
    }
}

impl From<Principal> for PrincipalRecord {
    fn from(principal: Principal) -> Self {
        let (organization_id, organization_name) = principal
            .organization
            .map_or((None, None), |org| (Some(org.id), Some(org.name)));

        Self {
            id: principal.id,
            email: principal.email,
            first_name: principal.first_name,
            last_name: principal.last_name,
            role: principal.role,
            organization_id,
            organization_name,
        }
    }
}
