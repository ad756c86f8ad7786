//! Request handlers, one module per resource

pub mod audit;
pub mod health;
pub mod permissions;
pub mod roles;
pub mod token;
pub mod users;

/// Fixed message for malformed ids, surfaced as a failed result
pub(crate) const INVALID_ID: &str = "value provided was invalid";
