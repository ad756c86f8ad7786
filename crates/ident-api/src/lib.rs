//! # ident-api
//!
//! REST API for the identity/audit console: token issuance, role and
//! permission management, user CRUD, and the audit trail, all returning the
//! uniform `{succeeded, data, messages}` envelope.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;
