//! Dashboard models.

pub mod session;

pub use session::StoredValue;
pub use session::keys as session_keys;
