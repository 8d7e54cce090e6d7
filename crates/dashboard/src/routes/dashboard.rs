//! Role-gated page handlers.

use axum::{Json, extract::State, http::Uri, response::IntoResponse};
use serde_json::json;

use compliance_nexus_core::{Organization, Role};

use crate::directory::OrganizationRegistry;
use crate::error::AppError;
use crate::middleware::auth::AuthenticatedSession;
use crate::state::AppState;

/// Dashboard view shown to each role.
#[must_use]
pub const fn dashboard_kind(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "super_admin_dashboard",
        Role::OrgAdmin => "org_admin_dashboard",
        Role::RegularUser => "user_dashboard",
    }
}

/// Role-conditioned dashboard.
pub async fn dashboard(AuthenticatedSession(session): AuthenticatedSession) -> impl IntoResponse {
    let principal = session.principal();
    Json(json!({
        "page": "dashboard",
        "view": dashboard_kind(principal.role()),
        "user": principal,
    }))
}

/// Generic protected page. Content is rendered client-side; the server only
/// confirms access and returns the principal.
pub async fn page(
    uri: Uri,
    AuthenticatedSession(session): AuthenticatedSession,
) -> impl IntoResponse {
    Json(json!({
        "page": uri.path().trim_start_matches('/'),
        "user": session.principal(),
    }))
}

/// List all registered organizations.
pub async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Organization>>, AppError> {
    Ok(Json(state.directory().list().await?))
}
