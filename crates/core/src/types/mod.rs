//! Core types for Compliance Nexus.
//!
//! This module provides type-safe wrappers for identity and access concepts.

pub mod domain;
pub mod email;
pub mod id;
pub mod organization;
pub mod principal;
pub mod role;

pub use domain::{Domain, DomainError};
pub use email::{Email, EmailError};
pub use id::*;
pub use organization::Organization;
pub use principal::{OrganizationRef, Principal, PrincipalError};
pub use role::{ParseRoleError, Role, RoleSet};
