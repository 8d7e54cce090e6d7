//! Password hashing and verification (Argon2id, PHC strings).

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use thiserror::Error;

/// Minimum password length for newly provisioned identities.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur while hashing or checking passwords.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    Weak(String),

    /// Stored value is not a PHC hash string.
    #[error("stored password hash is not a valid PHC string")]
    InvalidHash,

    /// Password hashing error.
    #[error("password hashing error")]
    Hash,
}

/// Hash of a random throwaway password, used to spend the same work on
/// unknown accounts as on known ones.
static DECOY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    let decoy: [u8; 16] = rand::random();
    hash_password(&STANDARD_NO_PAD.encode(decoy)).ok()
});

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `PasswordError::Weak` if the password is shorter than
/// [`MIN_PASSWORD_LENGTH`].
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::Weak(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Check that a stored hash is a well-formed PHC string.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` otherwise.
pub fn validate_hash(hash: &str) -> Result<(), PasswordError> {
    PasswordHash::new(hash)
        .map(|_| ())
        .map_err(|_| PasswordError::InvalidHash)
}

/// Verify a password against a stored hash.
///
/// Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Run a verification whose result is discarded.
pub fn verify_decoy(password: &str) {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "plaintext-password"));
        assert!(validate_hash("plaintext-password").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }
}
