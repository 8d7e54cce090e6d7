//! End-to-end tests for the Compliance Nexus dashboard.
//!
//! Each test spawns the full router (sessions, access guard, tracing) on an
//! ephemeral port against the built-in demo directory and drives it over
//! HTTP with a cookie-aware client. No database is required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p compliance-nexus-integration-tests
//! ```
//!
//! # Demo Accounts
//!
//! All accounts share [`DEMO_PASSWORD`].
//!
//! - `superadmin@compliance.com` - platform operator
//! - `orgadmin@techcorp.com` - `TechCorp Inc.` administrator
//! - `user@techcorp.com`, `user@healthsystem.com`, `user@financegroup.com` - regular users

use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use compliance_nexus_dashboard::app;
use compliance_nexus_dashboard::config::DashboardConfig;
use compliance_nexus_dashboard::directory::{Directory, InMemoryDirectory, demo_seed};
use compliance_nexus_dashboard::middleware::session::SessionBackend;
use compliance_nexus_dashboard::state::AppState;

/// Password shared by every demo account in tests.
pub const DEMO_PASSWORD: &str = "integration-password";

pub const OPERATOR: &str = "superadmin@compliance.com";
pub const ORG_ADMIN: &str = "orgadmin@techcorp.com";
pub const TECHCORP_USER: &str = "user@techcorp.com";
pub const HEALTH_USER: &str = "user@healthsystem.com";

/// A dashboard running on a local ephemeral port.
pub struct TestApp {
    pub base_url: String,
}

impl TestApp {
    /// Spawn the dashboard with the demo directory and in-memory sessions.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or the demo directory fails
    /// to build.
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let base_url = format!("http://{addr}");

        let config = DashboardConfig::from_lookup(|key| match key {
            "DASHBOARD_BASE_URL" => Some(base_url.clone()),
            "DASHBOARD_DEMO_PASSWORD" => Some(DEMO_PASSWORD.to_owned()),
            _ => None,
        })
        .expect("Failed to build test config");

        let seed = demo_seed(DEMO_PASSWORD).expect("Failed to build demo seed");
        let directory = InMemoryDirectory::from_seed(seed).expect("Failed to load demo seed");
        let state = AppState::new(config, Directory::Memory(directory));
        let router = app(state, SessionBackend::memory());

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        Self { base_url }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh browser-like client: keeps cookies, never follows redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// POST credentials to `/auth/login`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn login(&self, client: &Client, email: &str, password: &str) -> Response {
        client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to send login request")
    }

    /// A client already signed in as `email` with the demo password.
    ///
    /// # Panics
    ///
    /// Panics if the login does not succeed.
    pub async fn signed_in(&self, email: &str) -> Client {
        let client = self.client();
        let response = self.login(&client, email, DEMO_PASSWORD).await;
        assert!(
            response.status().is_success(),
            "login as {email} failed with {}",
            response.status()
        );
        client
    }

    /// GET `path` with `client`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// The `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Read a JSON body.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn json_body(response: Response) -> Value {
    response.json().await.expect("Response body was not JSON")
}
