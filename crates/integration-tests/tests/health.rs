//! Liveness and readiness probes.

use reqwest::StatusCode;

use compliance_nexus_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.get(&client, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_readiness_with_memory_directory() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.get(&client, "/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}
