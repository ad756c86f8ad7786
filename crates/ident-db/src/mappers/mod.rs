//! Entity ↔ model mappers

mod audit_trail;
mod role;
mod user;

pub use audit_trail::{parse_state_map, render_state_map};
