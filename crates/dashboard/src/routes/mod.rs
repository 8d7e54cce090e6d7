//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /dashboard
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (directory reachable)
//!
//! # Auth
//! GET  /login                  - Login page descriptor (?next=)
//! GET  /unauthorized           - Forbidden page descriptor
//! POST /auth/login             - Resolve credentials and issue a session
//! POST /auth/logout            - Revoke the session
//! GET  /auth/me                - Current principal
//!
//! # Any signed-in role
//! GET  /dashboard, /settings, /profile
//!
//! # SuperAdmin
//! GET  /organizations, /administrators, /system-settings, /analytics
//! GET  /api/organizations      - Registered organizations (JSON)
//!
//! # OrgAdmin
//! GET  /users, /teams, /devices, /reports, /compliance
//!
//! # RegularUser
//! GET  /my-devices, /compliance-tasks, /evidence-upload
//! ```

pub mod auth;
pub mod dashboard;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};

use compliance_nexus_core::{Role, RoleSet};

use crate::directory::OrganizationRegistry;
use crate::middleware::auth::guarded;
use crate::state::AppState;

/// Protected pages and the roles admitted to each.
pub const PROTECTED_PAGES: &[(&str, RoleSet)] = &[
    ("/settings", RoleSet::ANY),
    ("/profile", RoleSet::ANY),
    ("/organizations", RoleSet::only(Role::SuperAdmin)),
    ("/administrators", RoleSet::only(Role::SuperAdmin)),
    ("/system-settings", RoleSet::only(Role::SuperAdmin)),
    ("/analytics", RoleSet::only(Role::SuperAdmin)),
    ("/users", RoleSet::only(Role::OrgAdmin)),
    ("/teams", RoleSet::only(Role::OrgAdmin)),
    ("/devices", RoleSet::only(Role::OrgAdmin)),
    ("/reports", RoleSet::only(Role::OrgAdmin)),
    ("/compliance", RoleSet::only(Role::OrgAdmin)),
    ("/my-devices", RoleSet::only(Role::RegularUser)),
    ("/compliance-tasks", RoleSet::only(Role::RegularUser)),
    ("/evidence-upload", RoleSet::only(Role::RegularUser)),
];

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the protected page router.
pub fn page_routes(state: &AppState) -> Router<AppState> {
    let dashboard = guarded(
        Router::new().route("/dashboard", get(dashboard::dashboard)),
        state,
        RoleSet::ANY,
    );

    PROTECTED_PAGES
        .iter()
        .fold(dashboard, |router, &(path, required)| {
            router.merge(guarded(
                Router::new().route(path, get(dashboard::page)),
                state,
                required,
            ))
        })
}

/// Create the JSON API router.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    guarded(
        Router::new().route("/organizations", get(dashboard::list_organizations)),
        state,
        RoleSet::only(Role::SuperAdmin),
    )
}

/// Build the complete application router.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/login", get(auth::login_page))
        .route("/unauthorized", get(auth::unauthorized_page))
        .nest("/auth", auth_routes())
        .nest("/api", api_routes(state))
        .merge(page_routes(state))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the directory cannot be read.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.directory().list().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Directory not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
