//! Authentication route handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::LOGIN_PATH;
use crate::services::session;
use crate::state::AppState;

/// Where to land after login when no usable `next` is supplied.
pub const DEFAULT_LANDING: &str = "/dashboard";

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub next: Option<String>,
}

/// Pick a post-login destination. Only local absolute paths are honored.
#[must_use]
pub fn landing_path(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.contains(|c: char| c.is_ascii_control())
                && !path.starts_with(LOGIN_PATH) =>
        {
            path
        }
        _ => DEFAULT_LANDING,
    }
}

/// Describe the login page.
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> impl IntoResponse {
    Json(json!({
        "page": "login",
        "next": landing_path(query.next.as_deref()),
    }))
}

/// Describe the forbidden page.
pub async fn unauthorized_page() -> impl IntoResponse {
    Json(json!({
        "page": "unauthorized",
        "message": "You don't have permission to access this page.",
    }))
}

/// Handle login.
///
/// Resolves the credentials, rotates the session ID and issues a session.
/// No session is issued unless resolution succeeds.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let principal = state.resolver().resolve(&form.email, &form.password).await?;

    session
        .cycle_id()
        .await
        .map_err(session::SessionStoreError::from)?;
    let issued = state.sessions().issue(&session, principal).await?;

    set_sentry_user(issued.principal());

    Ok(Json(json!({
        "user": issued.principal(),
        "expiresAt": issued.expires_at(),
        "redirectTo": landing_path(form.next.as_deref()),
    }))
    .into_response())
}

/// Handle logout. Idempotent.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<StatusCode, AppError> {
    match state.sessions().restore(&session).await? {
        Some(current) => state.sessions().revoke(&session, &current).await?,
        None => session::clear(&session).await?,
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// Return the signed-in principal.
pub async fn me(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let current = state
        .sessions()
        .restore(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))?;

    Ok(Json(json!({
        "user": current.principal(),
        "issuedAt": current.issued_at(),
        "expiresAt": current.expires_at(),
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_path_accepts_local_paths() {
        assert_eq!(landing_path(Some("/users")), "/users");
        assert_eq!(landing_path(Some("/teams?page=2")), "/teams?page=2");
    }

    #[test]
    fn test_landing_path_rejects_external_targets() {
        assert_eq!(landing_path(None), DEFAULT_LANDING);
        assert_eq!(landing_path(Some("https://evil.example")), DEFAULT_LANDING);
        assert_eq!(landing_path(Some("//evil.example")), DEFAULT_LANDING);
        assert_eq!(landing_path(Some("/\\evil.example")), DEFAULT_LANDING);
        assert_eq!(landing_path(Some("/login?next=/x")), DEFAULT_LANDING);
    }

    #[test]
    fn test_landing_path_rejects_control_characters() {
        // Browsers drop tabs and newlines, turning these into `//evil.example`
        for next in ["/\t/evil.example", "/\n/evil.example", "/\r\n/evil.example", "/users\u{0}"] {
            assert_eq!(landing_path(Some(next)), DEFAULT_LANDING, "{next:?}");
        }
    }
}
