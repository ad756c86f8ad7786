//! # ident-service
//!
//! Application layer: use cases over the domain, behind a single dependency
//! container (`ServiceContext`).

pub mod dto;
pub mod services;

// Re-export commonly used types at crate root
pub use dto::{
    AuditTrailResponse, CreateRoleRequest, CreateUserRequest, PaginatedResponse, PurgeResponse,
    RefreshRequest, RolePermissionsResponse, RoleResponse, TokenRequest, TokenResponse,
    UpdateRolePermissionsRequest, UpdateRoleRequest, UpdateUserRequest, UserPermissionsResponse,
    UserResponse,
};
pub use services::{
    AccessDecision, AuditTrailService, DenyReason, PermissionEvaluator, PermissionService,
    RoleService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, TokenService,
    UserService,
};
