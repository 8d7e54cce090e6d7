//! Email addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string is not an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// An email address split at its final `@`.
///
/// The domain half is lowercased at parse time so that whitelist lookups
/// are exact string comparisons. The local half is kept as typed and stays
/// case-sensitive.
///
/// ```
/// use compliance_nexus_core::Email;
///
/// let email = Email::parse("Jane@TechCorp.COM").unwrap();
/// assert_eq!(email.as_str(), "Jane@techcorp.com");
/// assert_eq!(email.domain(), "techcorp.com");
///
/// // Quoted local parts may themselves contain '@'
/// let odd = Email::parse("\"a@b\"@acme.io").unwrap();
/// assert_eq!(odd.domain(), "acme.io");
///
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("user@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email {
    address: String,
    /// Byte offset of the final `@` in `address`.
    at: usize,
}

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse an address, canonicalizing its domain.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first rule the input breaks.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        match s.len() {
            0 => return Err(EmailError::Empty),
            len if len > Self::MAX_LENGTH => {
                return Err(EmailError::TooLong {
                    max: Self::MAX_LENGTH,
                });
            }
            _ => {}
        }

        let (local, domain) = s.rsplit_once('@').ok_or(EmailError::MissingAtSymbol)?;
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        let mut address = String::with_capacity(s.len());
        address.push_str(local);
        address.push('@');
        address.push_str(&domain.to_ascii_lowercase());

        Ok(Self {
            address,
            at: local.len(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// Everything before the final `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.address.get(..self.at).unwrap_or_default()
    }

    /// Everything after the final `@`, lowercase.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.address.get(self.at + 1..).unwrap_or_default()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.address
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejections() {
        let cases = [
            ("", EmailError::Empty),
            ("no-at-symbol", EmailError::MissingAtSymbol),
            ("@techcorp.com", EmailError::EmptyLocalPart),
            ("user@", EmailError::EmptyDomain),
        ];
        for (input, expected) in cases {
            assert_eq!(Email::parse(input), Err(expected), "{input:?}");
        }
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@techcorp.com", "a".repeat(250));
        assert!(matches!(Email::parse(&long), Err(EmailError::TooLong { max: 254 })));
    }

    #[test]
    fn test_domain_is_after_final_at() {
        let email = Email::parse("\"odd@local\"@techcorp.com").unwrap();
        assert_eq!(email.domain(), "techcorp.com");
        assert_eq!(email.local_part(), "\"odd@local\"");
    }

    #[test]
    fn test_domain_is_lowercased_local_part_kept() {
        let email = Email::parse("Jane.Doe@TechCorp.Com").unwrap();
        assert_eq!(email.domain(), "techcorp.com");
        assert_eq!(email.local_part(), "Jane.Doe");
        assert_eq!(email.to_string(), "Jane.Doe@techcorp.com");
    }

    #[test]
    fn test_deserialize_validates() {
        let email: Email = serde_json::from_str("\"user@HealthSystem.com\"").unwrap();
        assert_eq!(email.domain(), "healthsystem.com");
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"user@healthsystem.com\"");
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
