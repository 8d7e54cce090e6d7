//! Session-related types for dashboard authentication.
//!
//! A signed-in session is persisted as two named values, the opaque token
//! and the principal snapshot. Each carries its own issue and expiry
//! timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted value together with its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredValue<T> {
    /// The stored payload.
    pub value: T,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// When the value stops being valid (inclusive).
    pub expires_at: DateTime<Utc>,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the opaque session token.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// Key for the serialized principal snapshot.
    pub const USER_DATA: &str = "user_data";
}
