//! Roles and role sets.

use serde::{Deserialize, Serialize};

/// Role held by a principal.
///
/// Closed enumeration with no inheritance: a `SuperAdmin` is not implicitly
/// an `OrgAdmin`, and access rules must name every role they admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "directory.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator. Manages organizations and administrators; never
    /// bound to an organization.
    SuperAdmin,
    /// Administrator of a single organization.
    OrgAdmin,
    /// Member of a single organization.
    RegularUser,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 3] = [Self::SuperAdmin, Self::OrgAdmin, Self::RegularUser];

    /// Whether principals holding this role belong to an organization.
    #[must_use]
    pub const fn is_organization_scoped(self) -> bool {
        !matches!(self, Self::SuperAdmin)
    }

    /// Stable wire name (`super_admin`, `org_admin`, `regular_user`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::OrgAdmin => "org_admin",
            Self::RegularUser => "regular_user",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::SuperAdmin => 0b001,
            Self::OrgAdmin => 0b010,
            Self::RegularUser => 0b100,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected super_admin, org_admin or regular_user)")]
pub struct ParseRoleError(String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "org_admin" => Ok(Self::OrgAdmin),
            "regular_user" => Ok(Self::RegularUser),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

/// A set of roles, used as the requirement of a protected resource.
///
/// An empty set places no role requirement: any authenticated principal
/// satisfies it.
///
/// ```
/// use compliance_nexus_core::{Role, RoleSet};
///
/// const ADMINS: RoleSet = RoleSet::of(&[Role::SuperAdmin, Role::OrgAdmin]);
///
/// assert!(ADMINS.admits(Role::OrgAdmin));
/// assert!(!ADMINS.admits(Role::RegularUser));
/// assert!(RoleSet::ANY.admits(Role::RegularUser));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// No role requirement.
    pub const ANY: Self = Self(0);

    /// Build a set from a slice of roles.
    #[must_use]
    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut rest = roles;
        while let [role, tail @ ..] = rest {
            bits |= (*role).bit();
            rest = tail;
        }
        Self(bits)
    }

    /// A set holding exactly one role.
    #[must_use]
    pub const fn only(role: Role) -> Self {
        Self(role.bit())
    }

    /// Whether the set names no roles.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `role` is a member of the set.
    #[must_use]
    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Whether a principal holding `role` satisfies this requirement.
    #[must_use]
    pub const fn admits(self, role: Role) -> bool {
        self.is_empty() || self.contains(role)
    }

    /// Add a role to the set.
    #[must_use]
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    /// Iterate over the roles in the set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(Self::ANY, Self::with)
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self::only(role)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert!("admin".parse::<Role>().is_err());
        assert!("SuperAdmin".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_super_admin_is_unscoped() {
        assert!(!Role::SuperAdmin.is_organization_scoped());
        assert!(Role::OrgAdmin.is_organization_scoped());
        assert!(Role::RegularUser.is_organization_scoped());
    }

    #[test]
    fn test_empty_set_admits_every_role() {
        for role in Role::ALL {
            assert!(RoleSet::ANY.admits(role));
            assert!(!RoleSet::ANY.contains(role));
        }
    }

    #[test]
    fn test_no_role_inheritance() {
        let org_admins = RoleSet::only(Role::OrgAdmin);
        assert!(org_admins.admits(Role::OrgAdmin));
        assert!(!org_admins.admits(Role::SuperAdmin));
        assert!(!org_admins.admits(Role::RegularUser));
    }

    #[test]
    fn test_collect_and_iter() {
        let set: RoleSet = [Role::RegularUser, Role::SuperAdmin].into_iter().collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Role::SuperAdmin, Role::RegularUser]
        );
        assert_eq!(set, RoleSet::of(&[Role::SuperAdmin, Role::RegularUser]));
    }
}
