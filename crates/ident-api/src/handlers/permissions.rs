//! Permission handlers
//!
//! Registry listing and role/user permission assignment under
//! /api/identity/permissions.

use axum::extract::{Path, State};
use ident_service::{
    PermissionService, RolePermissionsResponse, UpdateRolePermissionsRequest,
    UserPermissionsResponse,
};
use uuid::Uuid;

use crate::extractors::CurrentUser;
use crate::response::{respond, ApiResult, Envelope};
use crate::state::AppState;

use super::INVALID_ID;

/// List every registered permission string
///
/// GET /api/identity/permissions
pub async fn list_registry(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<String>> {
    state.authorize(&user, "Permissions.RoleClaims.View").await?;

    let service = PermissionService::new(state.service_context());
    Ok(Envelope::success(service.registry()))
}

/// Permissions granted to a role
///
/// GET /api/identity/permissions/role/{role_id}
pub async fn role_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(role_id): Path<String>,
) -> ApiResult<RolePermissionsResponse> {
    state.authorize(&user, "Permissions.RoleClaims.View").await?;

    let Ok(role_id) = Uuid::parse_str(&role_id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = PermissionService::new(state.service_context());
    respond(service.role_permissions(role_id).await)
}

/// Replace the permissions granted to a role
///
/// PUT /api/identity/permissions/role/{role_id}
pub async fn update_role_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(role_id): Path<String>,
    axum::Json(request): axum::Json<UpdateRolePermissionsRequest>,
) -> ApiResult<RolePermissionsResponse> {
    state.authorize(&user, "Permissions.RoleClaims.Edit").await?;

    let Ok(role_id) = Uuid::parse_str(&role_id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = PermissionService::new(state.service_context());
    respond(
        service
            .update_role_permissions(role_id, request.permissions, user.user_id())
            .await,
    )
}

/// Effective permissions of a user
///
/// GET /api/identity/permissions/user/{user_id}
pub async fn user_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<String>,
) -> ApiResult<UserPermissionsResponse> {
    state.authorize(&user, "Permissions.RoleClaims.View").await?;

    let Ok(user_id) = Uuid::parse_str(&user_id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = PermissionService::new(state.service_context());
    respond(service.user_permissions(user_id).await)
}
