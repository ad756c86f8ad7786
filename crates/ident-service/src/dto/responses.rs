//! Response DTOs for API endpoints

use chrono::{DateTime, Utc};
use ident_core::StateMap;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// Common Response Types
// ============================================================================

/// Page of results with offset-based pagination metadata
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, size: i64, total_count: i64) -> Self {
        let total_pages = if size > 0 {
            (total_count + size - 1) / size
        } else {
            0
        };
        Self {
            data,
            page,
            size,
            total_count,
            total_pages,
        }
    }
}

// ============================================================================
// Token Responses
// ============================================================================

/// Token exchange response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// Identity Responses
// ============================================================================

/// User response
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Role response
#[derive(Debug, Clone, Serialize)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
}

/// Permission strings attached to a role, alongside the full registry
#[derive(Debug, Serialize)]
pub struct RolePermissionsResponse {
    pub role_id: Uuid,
    pub role_name: String,
    /// Permissions currently granted to the role
    pub granted: Vec<String>,
    /// Every registered permission string
    pub available: Vec<String>,
}

/// Effective permissions of a user (union over role memberships)
#[derive(Debug, Serialize)]
pub struct UserPermissionsResponse {
    pub user_id: Uuid,
    pub permissions: Vec<String>,
}

// ============================================================================
// Audit Responses
// ============================================================================

/// Audit trail record response
#[derive(Debug, Clone, Serialize)]
pub struct AuditTrailResponse {
    pub id: i64,
    pub table_name: String,
    pub record_id: Uuid,
    pub changed_by: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub action: String,
    pub before: StateMap,
    pub after: StateMap,
}

/// Result of an age-based purge
#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub removed: u64,
}
