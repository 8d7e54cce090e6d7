//! Compliance Nexus dashboard library.
//!
//! Identity resolution, sessions and role-based access control for the
//! multi-tenant compliance dashboard, plus the axum HTTP surface that
//! exposes them. Provided as a library so the router can be driven from
//! integration tests and the CLI.
//!
//! # Security
//!
//! - Only the configured operator address resolves as `SuperAdmin`
//! - Every other email must belong to a whitelisted organization domain
//! - Wrong passwords and unknown accounts are indistinguishable to callers
//! - Session state lives server-side; the cookie carries only an ID

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use middleware::session::SessionBackend;
use state::AppState;

/// Build the application router with sessions and request tracing.
pub fn app(state: AppState, sessions: SessionBackend) -> Router {
    let config = state.config().clone();
    let router = routes::routes(&state).with_state(state);

    sessions.apply(router, &config).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    status = tracing::field::Empty,
                    latency_ms = tracing::field::Empty,
                )
            })
            .on_response(
                |response: &axum::http::Response<_>, latency: std::time::Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                },
            ),
    )
}
