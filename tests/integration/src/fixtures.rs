//! Test fixtures and data generators
//!
//! Reusable request/response shapes and unique test data.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Credential exchange request
#[derive(Debug, Serialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

impl TokenRequest {
    /// Admin credentials, matching what the server seeds from the env
    pub fn admin() -> Self {
        Self {
            email: std::env::var("ADMIN_EMAIL").unwrap_or_default(),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or_default(),
        }
    }
}

/// Refresh-token exchange request
#[derive(Debug, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token response payload
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Create user request
#[derive(Debug, Serialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            email: format!("test{suffix}@example.com"),
            display_name: format!("Test User {suffix}"),
            password: "TestPass123".to_string(),
        }
    }
}

/// User response payload
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
}

/// Create role request
#[derive(Debug, Serialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateRoleRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            name: format!("Test Role {suffix}"),
            description: Some("Integration test role".to_string()),
        }
    }
}

/// Role response payload
#[derive(Debug, Deserialize)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub is_system: bool,
}

/// Role permission update request
#[derive(Debug, Serialize)]
pub struct UpdateRolePermissionsRequest {
    pub permissions: Vec<String>,
}

/// Audit record payload
#[derive(Debug, Deserialize)]
pub struct AuditTrailResponse {
    pub id: i64,
    pub table_name: String,
    pub record_id: String,
    pub changed_by: String,
    pub action: String,
    pub before: std::collections::BTreeMap<String, String>,
    pub after: std::collections::BTreeMap<String, String>,
}

/// Paginated payload
#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

/// Purge payload
#[derive(Debug, Deserialize)]
pub struct PurgeResponse {
    pub removed: u64,
}
