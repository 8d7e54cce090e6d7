//! HTTP middleware for the dashboard.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, memory or `PostgreSQL` store)
//! 4. Access guard (per protected route, see [`auth::guarded`])

pub mod auth;
pub mod session;
