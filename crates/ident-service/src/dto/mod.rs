//! Data transfer objects for the API surface

mod mappers;
mod requests;
mod responses;

pub use requests::{
    CreateRoleRequest, CreateUserRequest, RefreshRequest, TokenRequest,
    UpdateRolePermissionsRequest, UpdateRoleRequest, UpdateUserRequest,
};
pub use responses::{
    AuditTrailResponse, PaginatedResponse, PurgeResponse, RolePermissionsResponse, RoleResponse,
    TokenResponse, UserPermissionsResponse, UserResponse,
};
