//! Route definitions
//!
//! All API routes organized by domain and mounted under /api.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{audit, health, permissions, roles, token, users};
use crate::state::AppState;

/// Create the main API router (health is exported separately so it bypasses
/// rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(token_routes())
        .nest("/identity", identity_routes())
        .nest("/lifecycle", lifecycle_routes())
}

/// Anonymous-accessible token exchange
fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(token::issue_token))
        .route("/token/refresh", post(token::refresh_token))
}

/// Users, roles, and permission assignment
fn identity_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/:id", get(users::get_user))
        .route("/users/:id", put(users::update_user))
        .route("/users/:id", delete(users::delete_user))
        // Roles
        .route("/roles", get(roles::list_roles))
        .route("/roles", post(roles::create_role))
        .route("/roles/:id", get(roles::get_role))
        .route("/roles/:id", put(roles::update_role))
        .route("/roles/:id", delete(roles::delete_role))
        // Role membership
        .route("/roles/:id/members", get(roles::list_members))
        .route("/roles/:id/members", post(roles::add_member))
        .route("/roles/:id/members/:user_id", delete(roles::remove_member))
        // Permissions
        .route("/permissions", get(permissions::list_registry))
        .route("/permissions/role/:role_id", get(permissions::role_permissions))
        .route(
            "/permissions/role/:role_id",
            put(permissions::update_role_permissions),
        )
        .route("/permissions/user/:user_id", get(permissions::user_permissions))
}

/// Audit trail listing, search, and purge
fn lifecycle_routes() -> Router<AppState> {
    Router::new()
        .route("/audit", get(audit::list_audit))
        .route("/audit", delete(audit::purge_audit))
        .route("/audit/paged", get(audit::list_audit_paged))
        .route("/audit/count", get(audit::audit_count))
        .route("/audit/search", get(audit::search_audit))
        .route("/audit/search/paged", get(audit::search_audit_paged))
        .route("/audit/by-actor/:user_id", get(audit::audit_by_actor))
        .route("/audit/by-record/:record_id", get(audit::audit_by_record))
        .route("/audit/:id", get(audit::get_audit))
}
