//! Entity -> response DTO mappers

use ident_core::entities::{AuditTrail, Role, User};
use ident_common::TokenPair;

use super::responses::{AuditTrailResponse, RoleResponse, TokenResponse, UserResponse};

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

impl From<&Role> for RoleResponse {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
            description: role.description.clone(),
            is_system: role.is_system,
            created_at: role.created_at,
        }
    }
}

impl From<AuditTrail> for AuditTrailResponse {
    fn from(record: AuditTrail) -> Self {
        Self {
            id: record.id,
            table_name: record.table_name,
            record_id: record.record_id,
            changed_by: record.changed_by,
            occurred_at: record.occurred_at,
            action: record.action.to_string(),
            before: record.before,
            after: record.after,
        }
    }
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
        }
    }
}
