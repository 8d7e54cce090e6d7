//! Whitelisted email domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Domain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The input string is empty.
    #[error("domain cannot be empty")]
    Empty,
    /// The input carries a URL scheme (`https://...`).
    #[error("domain must not include a scheme: {0}")]
    HasScheme(String),
    /// The input starts with an @ symbol.
    #[error("domain must not start with '@': {0}")]
    LeadingAt(String),
    /// The input contains characters that cannot appear in a hostname.
    #[error("domain contains invalid characters: {0}")]
    InvalidCharacters(String),
}

/// A bare email domain, such as `techcorp.com`.
///
/// Domains are canonicalized to lowercase when they are parsed, so that
/// registries can use exact string matching for lookups.
///
/// ```
/// use compliance_nexus_core::Domain;
///
/// let domain = Domain::parse("TechCorp.com").unwrap();
/// assert_eq!(domain.as_str(), "techcorp.com");
///
/// assert!(Domain::parse("@techcorp.com").is_err());
/// assert!(Domain::parse("https://techcorp.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// Parse and canonicalize a domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has a scheme or a leading `@`,
    /// or contains whitespace, `/` or `@`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(DomainError::Empty);
        }
        if trimmed.contains("://") {
            return Err(DomainError::HasScheme(trimmed.to_owned()));
        }
        if trimmed.starts_with('@') {
            return Err(DomainError::LeadingAt(trimmed.to_owned()));
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '@' | ':'))
        {
            return Err(DomainError::InvalidCharacters(trimmed.to_owned()));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Domain {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases() {
        assert_eq!(Domain::parse("HealthSystem.COM").unwrap().as_str(), "healthsystem.com");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(Domain::parse("  techcorp.com ").unwrap().as_str(), "techcorp.com");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(Domain::parse("   "), Err(DomainError::Empty));
    }

    #[test]
    fn test_parse_rejects_scheme() {
        assert!(matches!(
            Domain::parse("https://techcorp.com"),
            Err(DomainError::HasScheme(_))
        ));
    }

    #[test]
    fn test_parse_rejects_leading_at() {
        assert!(matches!(
            Domain::parse("@techcorp.com"),
            Err(DomainError::LeadingAt(_))
        ));
    }

    #[test]
    fn test_parse_rejects_embedded_at_and_paths() {
        assert!(Domain::parse("user@techcorp.com").is_err());
        assert!(Domain::parse("techcorp.com/login").is_err());
        assert!(Domain::parse("tech corp.com").is_err());
    }

    #[test]
    fn test_deserialize_canonicalizes() {
        let domain: Domain = serde_json::from_str("\"FinanceGroup.com\"").unwrap();
        assert_eq!(domain.as_str(), "financegroup.com");
    }
}
