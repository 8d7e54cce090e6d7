//! Login, session and logout over HTTP.
//!
//! Run with: cargo test -p compliance-nexus-integration-tests

use reqwest::StatusCode;

use compliance_nexus_dashboard::middleware::session::SESSION_COOKIE_NAME;
use compliance_nexus_integration_tests::{
    DEMO_PASSWORD, HEALTH_USER, OPERATOR, ORG_ADMIN, TECHCORP_USER, TestApp, json_body,
};

// ============================================================================
// Resolution Tests
// ============================================================================

#[tokio::test]
async fn test_operator_login_resolves_super_admin() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.login(&client, OPERATOR, DEMO_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["role"], "super_admin");
    assert_eq!(body["user"]["email"], OPERATOR);
    assert!(body["user"].get("organizationId").is_none());
    assert_eq!(body["redirectTo"], "/dashboard");
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn test_org_admin_login_is_bound_to_organization() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.login(&client, ORG_ADMIN, DEMO_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["role"], "org_admin");
    assert_eq!(body["user"]["organizationId"], 1);
    assert_eq!(body["user"]["organizationName"], "TechCorp Inc.");
}

#[tokio::test]
async fn test_login_email_domain_is_case_insensitive() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app
        .login(&client, "user@HealthSystem.COM", DEMO_PASSWORD)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["email"], HEALTH_USER);
    assert_eq!(body["user"]["organizationName"], "HealthSystem LLC");
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.login(&client, TECHCORP_USER, DEMO_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE_NAME)
        .expect("login should set the session cookie");
    assert!(cookie.http_only());
    assert_eq!(cookie.path(), Some("/"));
}

#[tokio::test]
async fn test_login_honours_safe_next() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": ORG_ADMIN,
            "password": DEMO_PASSWORD,
            "next": "/users",
        }))
        .send()
        .await
        .expect("Failed to send login request");
    let body = json_body(response).await;
    assert_eq!(body["redirectTo"], "/users");
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": ORG_ADMIN,
            "password": DEMO_PASSWORD,
            "next": "//evil.example/phish",
        }))
        .send()
        .await
        .expect("Failed to send login request");
    let body = json_body(response).await;
    assert_eq!(body["redirectTo"], "/dashboard");
}

// ============================================================================
// Rejection Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_domain_is_forbidden_with_actionable_message() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app
        .login(&client, "someone@unknown-corp.com", DEMO_PASSWORD)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("unknown-corp.com"));
    assert!(message.contains("not registered"));
}

#[tokio::test]
async fn test_operator_domain_is_not_a_tenant() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app
        .login(&client, "someone@compliance.com", DEMO_PASSWORD)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_identical() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let wrong_password = app.login(&client, TECHCORP_USER, "not-the-password").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = json_body(wrong_password).await;

    let unknown_user = app
        .login(&client, "ghost@techcorp.com", DEMO_PASSWORD)
        .await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = json_body(unknown_user).await;

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_failed_login_issues_no_session() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.login(&client, ORG_ADMIN, "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let me = app.get(&client, "/auth/me").await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_email_is_invalid_credentials() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.login(&client, "not-an-email", DEMO_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_domain_is_forbidden() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.login(&client, "user@", DEMO_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_ignores_next_with_control_characters() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": ORG_ADMIN,
            "password": DEMO_PASSWORD,
            "next": "/\t/evil.example",
        }))
        .send()
        .await
        .expect("Failed to send login request");
    let body = json_body(response).await;
    assert_eq!(body["redirectTo"], "/dashboard");
}

// ============================================================================
// Session Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_me_returns_principal_while_signed_in() {
    let app = TestApp::spawn().await;
    let client = app.signed_in(ORG_ADMIN).await;

    let response = app.get(&client, "/auth/me").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["email"], ORG_ADMIN);
    assert!(body["issuedAt"].is_string());
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn test_me_without_session_is_unauthorized() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.get(&client, "/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn().await;
    let client = app.signed_in(TECHCORP_USER).await;

    let response = client
        .post(app.url("/auth/logout"))
        .send()
        .await
        .expect("Failed to send logout request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let me = app.get(&client, "/auth/me").await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let page = app.get(&client, "/my-devices").await;
    assert_eq!(page.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::spawn().await;
    let client = app.client();

    for _ in 0..2 {
        let response = client
            .post(app.url("/auth/logout"))
            .send()
            .await
            .expect("Failed to send logout request");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn test_relogin_replaces_principal() {
    let app = TestApp::spawn().await;
    let client = app.signed_in(TECHCORP_USER).await;

    let response = app.login(&client, ORG_ADMIN, DEMO_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(app.get(&client, "/auth/me").await).await;
    assert_eq!(body["user"]["email"], ORG_ADMIN);
}

#[tokio::test]
async fn test_sessions_are_per_client() {
    let app = TestApp::spawn().await;
    let _admin = app.signed_in(ORG_ADMIN).await;
    let anonymous = app.client();

    let response = app.get(&anonymous, "/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
