//! Session issuance, restoration and revocation.
//!
//! A [`Session`] binds an opaque random token to a snapshot of the
//! [`Principal`] taken at sign-in. It is persisted through a
//! [`SessionPersistence`] as two named values (see
//! [`session_keys`](crate::models::session_keys)), both expiring at
//! `issued_at + ttl`.
//!
//! Persisted values are untrusted on read: anything malformed, mismatched or
//! expired is treated as absent and cleared.

mod store;

pub use store::{MemorySessionPersistence, SessionPersistence, SessionStoreError};

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use compliance_nexus_core::Principal;

use crate::models::{StoredValue, session_keys};

/// Number of random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// Errors from parsing a session token.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("malformed session token")]
pub struct InvalidToken;

/// Opaque session token. Carries no decodable claims.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Mint a fresh token from the OS-seeded CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::random();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionToken {
    type Error = InvalidToken;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match URL_SAFE_NO_PAD.decode(&s) {
            Ok(bytes) if bytes.len() == TOKEN_BYTES => Ok(Self(s)),
            _ => Err(InvalidToken),
        }
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// A time-bounded, revocable binding of a token to a principal snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: SessionToken,
    principal: Principal,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// The session token.
    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Principal snapshot taken at issuance.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Issue time.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Expiry time. The session is expired at this instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session is expired at `now` (`now >= expires_at`).
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Issues, restores and revokes sessions.
#[derive(Debug, Clone, Copy)]
pub struct SessionManager {
    ttl: TimeDelta,
}

impl SessionManager {
    /// Create a manager issuing sessions valid for `ttl`.
    #[must_use]
    pub const fn new(ttl: TimeDelta) -> Self {
        Self { ttl }
    }

    /// Issue a session for `principal` and persist it.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if persisting fails.
    pub async fn issue<P: SessionPersistence>(
        &self,
        store: &P,
        principal: Principal,
    ) -> Result<Session, SessionStoreError> {
        self.issue_at(store, principal, Utc::now()).await
    }

    /// Issue a session as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if persisting fails.
    pub async fn issue_at<P: SessionPersistence>(
        &self,
        store: &P,
        principal: Principal,
        now: DateTime<Utc>,
    ) -> Result<Session, SessionStoreError> {
        let session = Session {
            token: SessionToken::generate(),
            principal,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        let token = StoredValue {
            value: &session.token,
            issued_at: session.issued_at,
            expires_at: session.expires_at,
        };
        let user_data = StoredValue {
            value: &session.principal,
            issued_at: session.issued_at,
            expires_at: session.expires_at,
        };

        store
            .store(session_keys::USER_DATA, serde_json::to_value(user_data)?)
            .await?;
        store
            .store(session_keys::AUTH_TOKEN, serde_json::to_value(token)?)
            .await?;

        tracing::debug!(
            user_id = %session.principal.id(),
            expires_at = %session.expires_at,
            "Session issued"
        );

        Ok(session)
    }

    /// Restore the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the store cannot be read or cleared.
    /// Malformed or expired state is not an error: it is cleared and `None`
    /// is returned.
    pub async fn restore<P: SessionPersistence>(
        &self,
        store: &P,
    ) -> Result<Option<Session>, SessionStoreError> {
        self.restore_at(store, Utc::now()).await
    }

    /// Restore the persisted session as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the store cannot be read or cleared.
    pub async fn restore_at<P: SessionPersistence>(
        &self,
        store: &P,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, SessionStoreError> {
        let token = store.load(session_keys::AUTH_TOKEN).await?;
        let user_data = store.load(session_keys::USER_DATA).await?;

        if token.is_none() && user_data.is_none() {
            return Ok(None);
        }

        match parse_session(token, user_data) {
            Some(session) if !session.is_expired_at(now) => Ok(Some(session)),
            Some(session) => {
                tracing::debug!(user_id = %session.principal.id(), "Session expired");
                clear(store).await?;
                Ok(None)
            }
            None => {
                tracing::warn!("Discarding malformed persisted session");
                clear(store).await?;
                Ok(None)
            }
        }
    }

    /// Delete the persisted session. Idempotent.
    ///
    /// State belonging to a different token is left untouched; malformed
    /// state is cleared.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the store cannot be read or cleared.
    pub async fn revoke<P: SessionPersistence>(
        &self,
        store: &P,
        session: &Session,
    ) -> Result<(), SessionStoreError> {
        let stored = store
            .load(session_keys::AUTH_TOKEN)
            .await?
            .and_then(|value| serde_json::from_value::<StoredValue<SessionToken>>(value).ok());

        if stored.is_some_and(|stored| stored.value != session.token) {
            return Ok(());
        }

        clear(store).await?;
        tracing::debug!(user_id = %session.principal.id(), "Session revoked");
        Ok(())
    }

    /// Whether `session` is expired now.
    #[must_use]
    pub fn is_expired(session: &Session) -> bool {
        session.is_expired_at(Utc::now())
    }
}

/// Remove both persisted session values.
///
/// # Errors
///
/// Returns `SessionStoreError` if the store fails.
pub async fn clear<P: SessionPersistence>(store: &P) -> Result<(), SessionStoreError> {
    store.remove(session_keys::AUTH_TOKEN).await?;
    store.remove(session_keys::USER_DATA).await
}

fn parse_session(token: Option<Value>, user_data: Option<Value>) -> Option<Session> {
    let token: StoredValue<SessionToken> = serde_json::from_value(token?).ok()?;
    let user_data: StoredValue<Principal> = serde_json::from_value(user_data?).ok()?;

    let consistent = token.issued_at == user_data.issued_at
        && token.expires_at == user_data.expires_at
        && token.issued_at < token.expires_at;
    if !consistent {
        return None;
    }

    Some(Session {
        token: token.value,
        principal: user_data.value,
        issued_at: token.issued_at,
        expires_at: token.expires_at,
    })
}
