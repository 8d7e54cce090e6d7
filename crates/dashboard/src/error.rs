//! Unified error handling for the dashboard.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use compliance_nexus_core::Principal;

use crate::directory::DirectoryError;
use crate::services::identity::AuthError;
use crate::services::session::SessionStoreError;

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Credential resolution failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Directory backend failed.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionStoreError),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Auth(err) => err.is_internal(),
            Self::Directory(_) | Self::Session(_) => true,
            Self::Unauthorized(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidCredentials) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::DomainNotWhitelisted { .. }) => StatusCode::FORBIDDEN,
            Self::Auth(_) | Self::Directory(_) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Never exposes internal details.
    fn public_message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Auth(AuthError::DomainNotWhitelisted { domain }) => format!(
                "Your email domain ({domain}) is not registered with any organization. \
                 Contact your organization's administrator."
            ),
            Self::Auth(_) => "Invalid email or password".to_string(),
            Self::Unauthorized(msg) => msg.clone(),
            Self::Directory(_) | Self::Session(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Dashboard request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.public_message() }));

        (status, body).into_response()
    }
}

/// Set the Sentry user context from a principal.
pub fn set_sentry_user(principal: &Principal) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(principal.id().to_string()),
            email: Some(principal.email().to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Unauthorized("Not signed in".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Not signed in");
        assert_eq!(get_status(err), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(
                AuthError::DomainNotWhitelisted {
                    domain: "unknown-domain.com".to_string()
                }
                .into()
            ),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(
                AuthError::DomainMismatch {
                    email_domain: "a.com".to_string(),
                    whitelisted: "b.com".to_string()
                }
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_not_whitelisted_message_is_actionable() {
        let err: AppError = AuthError::DomainNotWhitelisted {
            domain: "unknown-domain.com".to_string(),
        }
        .into();
        let message = err.public_message();
        assert!(message.contains("unknown-domain.com"));
        assert!(message.contains("not registered"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: AppError = AuthError::DomainMismatch {
            email_domain: "evil.com".to_string(),
            whitelisted: "techcorp.com".to_string(),
        }
        .into();
        assert_eq!(err.public_message(), "Internal server error");

        let err: AppError = DirectoryError::Repository(crate::db::RepositoryError::DataCorruption(
            "bad row".to_string(),
        ))
        .into();
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        let err: AppError = AuthError::InvalidCredentials.into();
        assert_eq!(err.public_message(), "Invalid email or password");
    }
}
