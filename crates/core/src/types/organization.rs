//! Organization records.

use serde::{Deserialize, Serialize};

use super::{Domain, OrganizationId};

/// A tenant organization.
///
/// Provisioned out-of-band and read-only to the identity core. The
/// whitelisted domain is authoritative for the organization's members: no
/// two organizations may share one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Unique organization ID.
    pub id: OrganizationId,
    /// Display name (e.g. "TechCorp Inc.").
    pub name: String,
    /// Email domain whose addresses belong to this organization.
    pub whitelisted_domain: Domain,
}

impl Organization {
    /// Whether `domain` is this organization's whitelisted domain.
    #[must_use]
    pub fn owns_domain(&self, domain: &str) -> bool {
        self.whitelisted_domain.as_str() == domain
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let org = Organization {
            id: OrganizationId::new(1),
            name: "TechCorp Inc.".to_string(),
            whitelisted_domain: Domain::parse("techcorp.com").unwrap(),
        };

        let json = serde_json::to_value(&org).unwrap();
        assert_eq!(json["whitelistedDomain"], "techcorp.com");
        assert_eq!(json["name"], "TechCorp Inc.");
    }

    #[test]
    fn test_owns_domain_is_exact() {
        let org = Organization {
            id: OrganizationId::new(2),
            name: "HealthSystem LLC".to_string(),
            whitelisted_domain: Domain::parse("healthsystem.com").unwrap(),
        };

        assert!(org.owns_domain("healthsystem.com"));
        assert!(!org.owns_domain("mail.healthsystem.com"));
    }
}
