//! Access guard.
//!
//! Every protected route is wrapped in [`guarded`], which restores the
//! session for the request and decides among three outcomes:
//!
//! - [`AccessDecision::Permit`]: the principal's role is in the route's
//!   required set (an empty set admits any authenticated principal).
//! - [`AccessDecision::RedirectToLogin`]: no valid session. Carries the
//!   requested path so it can be resumed after login.
//! - [`AccessDecision::RedirectToForbidden`]: authenticated, but the role is
//!   not admitted.
//!
//! The guard never fails. An unreachable session store counts as
//! unauthenticated.

use axum::{
    Json, Router,
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{StatusCode, header, request::Parts},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;

use compliance_nexus_core::RoleSet;

use crate::error::set_sentry_user;
use crate::services::session::Session;
use crate::state::AppState;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Path of the forbidden page.
pub const FORBIDDEN_PATH: &str = "/unauthorized";

/// Outcome of a single access attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access is allowed.
    Permit,
    /// No valid session; authenticate, then resume at `destination`.
    RedirectToLogin {
        /// Originally requested path (with query).
        destination: String,
    },
    /// Authenticated but lacking privilege.
    RedirectToForbidden,
}

/// Session state observed by the guard.
#[derive(Debug, Clone)]
pub enum GuardState {
    /// Session restoration has not completed; no decision can be made.
    Loading,
    /// No valid session.
    Unauthenticated,
    /// A valid session.
    Authenticated(Session),
}

impl GuardState {
    /// Decide access to `destination` for principals in `required`.
    ///
    /// Returns `None` while `Loading`.
    #[must_use]
    pub fn decide(&self, required: RoleSet, destination: &str) -> Option<AccessDecision> {
        match self {
            Self::Loading => None,
            Self::Unauthenticated => Some(AccessDecision::RedirectToLogin {
                destination: destination.to_owned(),
            }),
            Self::Authenticated(session) => {
                if required.admits(session.principal().role()) {
                    Some(AccessDecision::Permit)
                } else {
                    Some(AccessDecision::RedirectToForbidden)
                }
            }
        }
    }
}

/// Decide access for an optional session as of now.
///
/// Expired sessions count as absent.
#[must_use]
pub fn check_access(
    session: Option<&Session>,
    required: RoleSet,
    destination: &str,
) -> AccessDecision {
    check_access_at(session, required, destination, Utc::now())
}

/// Decide access for an optional session as of `now`.
#[must_use]
pub fn check_access_at(
    session: Option<&Session>,
    required: RoleSet,
    destination: &str,
    now: DateTime<Utc>,
) -> AccessDecision {
    match session {
        Some(session) if !session.is_expired_at(now) => {
            if required.admits(session.principal().role()) {
                AccessDecision::Permit
            } else {
                AccessDecision::RedirectToForbidden
            }
        }
        _ => AccessDecision::RedirectToLogin {
            destination: destination.to_owned(),
        },
    }
}

/// Restore the request's session into a guard state.
async fn load_guard_state(state: &AppState, store: Option<tower_sessions::Session>) -> GuardState {
    let Some(store) = store else {
        return GuardState::Loading;
    };

    match state.sessions().restore(&store).await {
        Ok(Some(session)) => GuardState::Authenticated(session),
        Ok(None) => GuardState::Unauthenticated,
        Err(e) => {
            tracing::warn!(error = %e, "Session store unavailable; treating as signed out");
            GuardState::Unauthenticated
        }
    }
}

/// Guard middleware: admit principals in `required`, redirect everyone else.
///
/// On `Permit` the restored [`Session`] is placed in request extensions for
/// [`AuthenticatedSession`].
pub async fn require_roles(
    state: &AppState,
    required: RoleSet,
    mut request: Request,
    next: Next,
) -> Response {
    // Nested routers see a stripped URI; decide on the one the client sent.
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().clone(), |original| original.0.clone());
    let destination = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());
    let is_api = uri.path().starts_with("/api/");
    let store = request.extensions().get::<tower_sessions::Session>().cloned();

    let guard_state = load_guard_state(state, store).await;

    match guard_state.decide(required, &destination) {
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::RETRY_AFTER, "1")],
        )
            .into_response(),
        Some(AccessDecision::Permit) => {
            if let GuardState::Authenticated(session) = guard_state {
                set_sentry_user(session.principal());
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        Some(decision) => {
            tracing::debug!(%destination, ?decision, "Access denied");
            rejection(&decision, is_api)
        }
    }
}

fn rejection(decision: &AccessDecision, is_api: bool) -> Response {
    match (decision, is_api) {
        (AccessDecision::RedirectToLogin { .. }, true) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Authentication required" })),
        )
            .into_response(),
        (AccessDecision::RedirectToLogin { destination }, false) => {
            Redirect::to(&login_redirect(destination)).into_response()
        }
        (AccessDecision::RedirectToForbidden, true) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "You do not have access to this resource" })),
        )
            .into_response(),
        (AccessDecision::RedirectToForbidden, false) => {
            Redirect::to(FORBIDDEN_PATH).into_response()
        }
        (AccessDecision::Permit, _) => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Login URL that resumes at `destination`.
#[must_use]
pub fn login_redirect(destination: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(destination))
}

/// Wrap every route in `router` with the access guard for `required`.
pub fn guarded(router: Router<AppState>, state: &AppState, required: RoleSet) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        state.clone(),
        move |State(state): State<AppState>, request: Request, next: Next| async move {
            require_roles(&state, required, request, next).await
        },
    ))
}

/// Extractor for the session admitted by the guard.
///
/// Only valid on routes wrapped by [`guarded`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(AuthenticatedSession(session): AuthenticatedSession) -> impl IntoResponse {
///     format!("Hello, {}!", session.principal().display_name())
/// }
/// ```
pub struct AuthenticatedSession(pub Session);

impl<S> FromRequestParts<S> for AuthenticatedSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use compliance_nexus_core::{
        Domain, Email, Organization, OrganizationId, Principal, Role, UserId,
    };

    use super::*;
    use crate::services::session::{MemorySessionPersistence, SessionManager};

    fn principal(role: Role) -> Principal {
        if role == Role::SuperAdmin {
            return Principal::super_admin(
                UserId::new(1),
                Email::parse("superadmin@compliance.com").unwrap(),
                "Super".to_string(),
                "Admin".to_string(),
            );
        }
        let org = Organization {
            id: OrganizationId::new(1),
            name: "TechCorp Inc.".to_string(),
            whitelisted_domain: Domain::parse("techcorp.com").unwrap(),
        };
        Principal::member(
            UserId::new(3),
            Email::parse("user@techcorp.com").unwrap(),
            "Regular".to_string(),
            "User".to_string(),
            role,
            &org,
        )
        .unwrap()
    }

    async fn session(role: Role) -> Session {
        SessionManager::new(TimeDelta::days(7))
            .issue(&MemorySessionPersistence::new(), principal(role))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_regular_user_forbidden_from_org_admin_route() {
        let session = session(Role::RegularUser).await;
        let decision = check_access(Some(&session), RoleSet::only(Role::OrgAdmin), "/users");
        assert_eq!(decision, AccessDecision::RedirectToForbidden);
    }

    #[test]
    fn test_no_session_redirects_with_destination() {
        let decision = check_access(None, RoleSet::only(Role::SuperAdmin), "/organizations");
        assert_eq!(
            decision,
            AccessDecision::RedirectToLogin {
                destination: "/organizations".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_role_set_admits_any_authenticated_role() {
        for role in Role::ALL {
            let session = session(role).await;
            assert_eq!(
                check_access(Some(&session), RoleSet::ANY, "/dashboard"),
                AccessDecision::Permit
            );
        }
    }

    #[tokio::test]
    async fn test_matching_role_is_permitted() {
        let session = session(Role::OrgAdmin).await;
        let required = RoleSet::of(&[Role::SuperAdmin, Role::OrgAdmin]);
        assert_eq!(
            check_access(Some(&session), required, "/reports"),
            AccessDecision::Permit
        );
    }

    #[tokio::test]
    async fn test_expired_session_redirects_to_login() {
        let session = session(Role::SuperAdmin).await;
        let decision = check_access_at(
            Some(&session),
            RoleSet::ANY,
            "/dashboard",
            session.expires_at(),
        );
        assert!(matches!(decision, AccessDecision::RedirectToLogin { .. }));
    }

    #[test]
    fn test_loading_defers() {
        assert_eq!(GuardState::Loading.decide(RoleSet::ANY, "/dashboard"), None);
    }

    #[tokio::test]
    async fn test_guard_state_decisions() {
        let authenticated = GuardState::Authenticated(session(Role::RegularUser).await);
        assert_eq!(
            authenticated.decide(RoleSet::only(Role::RegularUser), "/my-devices"),
            Some(AccessDecision::Permit)
        );
        assert_eq!(
            authenticated.decide(RoleSet::only(Role::SuperAdmin), "/analytics"),
            Some(AccessDecision::RedirectToForbidden)
        );
        assert_eq!(
            GuardState::Unauthenticated.decide(RoleSet::ANY, "/teams?page=2"),
            Some(AccessDecision::RedirectToLogin {
                destination: "/teams?page=2".to_string()
            })
        );
    }

    #[test]
    fn test_login_redirect_encodes_destination() {
        assert_eq!(
            login_redirect("/teams?page=2"),
            "/login?next=%2Fteams%3Fpage%3D2"
        );
    }
}
