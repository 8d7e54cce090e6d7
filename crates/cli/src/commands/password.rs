//! Password hashing for directory seed files.
//!
//! # Usage
//!
//! ```bash
//! echo 'correct horse battery' | cn-cli hash-password
//! ```
//!
//! Prints an Argon2id PHC string suitable for a seed's `passwordHash`.

use std::io::BufRead;

use secrecy::{ExposeSecret, SecretString};

use compliance_nexus_dashboard::services::password::{hash_password, validate_password};

use super::CliError;

/// Read one line from stdin as a password, without its line terminator.
///
/// # Errors
///
/// Returns `CliError::Io` if stdin cannot be read.
pub fn read_password_line() -> Result<SecretString, CliError> {
    tracing::info!("Reading password from stdin...");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']).to_owned();
    Ok(SecretString::from(trimmed))
}

/// Hash a password read from stdin and print the PHC string.
///
/// # Errors
///
/// Returns `CliError::Password` if the password is too short or hashing fails.
pub fn hash() -> Result<(), CliError> {
    let password = read_password_line()?;
    validate_password(password.expose_secret())?;
    let hash = hash_password(password.expose_secret())?;

    #[allow(clippy::print_stdout)]
    {
        println!("{hash}");
    }

    Ok(())
}
