//! Business logic services.

pub mod identity;
pub mod password;
pub mod session;
