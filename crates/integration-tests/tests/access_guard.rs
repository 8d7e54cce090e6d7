//! Role-based access to dashboard pages and the JSON API.
//!
//! Run with: cargo test -p compliance-nexus-integration-tests

use reqwest::StatusCode;

use compliance_nexus_core::Role;
use compliance_nexus_dashboard::routes::PROTECTED_PAGES;
use compliance_nexus_integration_tests::{
    OPERATOR, ORG_ADMIN, TECHCORP_USER, TestApp, json_body, location,
};

fn account(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => OPERATOR,
        Role::OrgAdmin => ORG_ADMIN,
        Role::RegularUser => TECHCORP_USER,
    }
}

// ============================================================================
// Unauthenticated Tests
// ============================================================================

#[tokio::test]
async fn test_anonymous_page_redirects_to_login_with_destination() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.get(&client, "/users").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login?next=%2Fusers"));
}

#[tokio::test]
async fn test_anonymous_redirect_keeps_query_string() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.get(&client, "/reports?period=q3").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/login?next=%2Freports%3Fperiod%3Dq3")
    );
}

#[tokio::test]
async fn test_every_protected_page_requires_login() {
    let app = TestApp::spawn().await;
    let client = app.client();

    for &(path, _) in PROTECTED_PAGES {
        let response = app.get(&client, path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        let target = location(&response).unwrap_or_default();
        assert!(target.starts_with("/login?next="), "{path} -> {target}");
    }
}

#[tokio::test]
async fn test_root_redirects_to_dashboard() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.get(&client, "/").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/dashboard"));
}

#[tokio::test]
async fn test_public_pages_need_no_session() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let login = app.get(&client, "/login?next=%2Fteams").await;
    assert_eq!(login.status(), StatusCode::OK);

    let unauthorized = app.get(&client, "/unauthorized").await;
    assert_eq!(unauthorized.status(), StatusCode::OK);
}

// ============================================================================
// Role Matrix Tests
// ============================================================================

#[tokio::test]
async fn test_role_matrix_over_protected_pages() {
    let app = TestApp::spawn().await;

    for role in Role::ALL {
        let client = app.signed_in(account(role)).await;

        for &(path, required) in PROTECTED_PAGES {
            let response = app.get(&client, path).await;
            if required.admits(role) {
                assert_eq!(response.status(), StatusCode::OK, "{role} on {path}");
            } else {
                assert_eq!(response.status(), StatusCode::SEE_OTHER, "{role} on {path}");
                assert_eq!(
                    location(&response).as_deref(),
                    Some("/unauthorized"),
                    "{role} on {path}"
                );
            }
        }
    }
}

#[tokio::test]
async fn test_regular_user_is_sent_to_unauthorized_for_users_page() {
    let app = TestApp::spawn().await;
    let client = app.signed_in(TECHCORP_USER).await;

    let response = app.get(&client, "/users").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/unauthorized"));
}

#[tokio::test]
async fn test_dashboard_view_follows_role() {
    let app = TestApp::spawn().await;

    for (role, view) in [
        (Role::SuperAdmin, "super_admin_dashboard"),
        (Role::OrgAdmin, "org_admin_dashboard"),
        (Role::RegularUser, "user_dashboard"),
    ] {
        let client = app.signed_in(account(role)).await;
        let response = app.get(&client, "/dashboard").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["view"], view);
        assert_eq!(body["user"]["role"], role.as_str());
    }
}

#[tokio::test]
async fn test_page_body_carries_principal() {
    let app = TestApp::spawn().await;
    let client = app.signed_in(ORG_ADMIN).await;

    let body = json_body(app.get(&client, "/teams").await).await;
    assert_eq!(body["page"], "teams");
    assert_eq!(body["user"]["organizationName"], "TechCorp Inc.");
}

// ============================================================================
// API Tests
// ============================================================================

#[tokio::test]
async fn test_api_without_session_is_unauthorized() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.get(&client, "/api/organizations").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(location(&response).is_none());
}

#[tokio::test]
async fn test_api_for_wrong_role_is_forbidden() {
    let app = TestApp::spawn().await;
    let client = app.signed_in(ORG_ADMIN).await;

    let response = app.get(&client, "/api/organizations").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_operator_lists_organizations() {
    let app = TestApp::spawn().await;
    let client = app.signed_in(OPERATOR).await;

    let response = app.get(&client, "/api/organizations").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let domains: Vec<_> = body
        .as_array()
        .expect("organization list")
        .iter()
        .filter_map(|org| org["whitelistedDomain"].as_str())
        .collect();
    assert_eq!(
        domains,
        vec!["techcorp.com", "healthsystem.com", "financegroup.com"]
    );
}
