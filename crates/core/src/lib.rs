//! Compliance Nexus Core - Shared identity and access types.
//!
//! This crate provides the types every Compliance Nexus component agrees on:
//! - `dashboard` - Role-gated dashboard server (identity, sessions, access guard)
//! - `cli` - Command-line tools for migrations and provisioning
//!
//! # Architecture
//!
//! The core crate contains only types and invariants - no I/O, no database
//! access, no HTTP. Resolving credentials and persisting sessions live in
//! the dashboard crate, behind traits.
//!
//! # Modules
//!
//! - [`types`] - Emails, whitelisted domains, IDs, roles, organizations and principals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
