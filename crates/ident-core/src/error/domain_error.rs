//! Domain errors - error types for the domain layer

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Role not found: {0}")]
    RoleNotFound(Uuid),

    #[error("Audit record not found: {0}")]
    AuditTrailNotFound(i64),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Audit record requires a non-empty after-state")]
    EmptyAuditState,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Role name already in use: {0}")]
    RoleNameExists(String),

    #[error("User already has this role")]
    AlreadyMember,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Built-in roles cannot be deleted")]
    CannotDeleteSystemRole,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::RoleNotFound(_) => "UNKNOWN_ROLE",
            Self::AuditTrailNotFound(_) => "UNKNOWN_AUDIT_RECORD",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::UnknownPermission(_) => "UNKNOWN_PERMISSION",
            Self::EmptyAuditState => "EMPTY_AUDIT_STATE",

            Self::MissingPermission(_) => "MISSING_PERMISSIONS",

            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::RoleNameExists(_) => "ROLE_NAME_EXISTS",
            Self::AlreadyMember => "ALREADY_MEMBER",

            Self::CannotDeleteSystemRole => "CANNOT_DELETE_SYSTEM_ROLE",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::RoleNotFound(_) | Self::AuditTrailNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidEmail
                | Self::UnknownPermission(_)
                | Self::EmptyAuditState
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingPermission(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists | Self::RoleNameExists(_) | Self::AlreadyMember
        )
    }
}
