//! Role handlers
//!
//! Role CRUD and user membership under /api/identity/roles.

use axum::extract::{Path, State};
use ident_service::{
    CreateRoleRequest, RoleResponse, RoleService, UpdateRoleRequest, UserResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::extractors::{CurrentUser, ValidatedJson};
use crate::response::{respond, ApiResult, Envelope};
use crate::state::AppState;

use super::INVALID_ID;

/// List roles
///
/// GET /api/identity/roles
pub async fn list_roles(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<RoleResponse>> {
    state.authorize(&user, "Permissions.Roles.View").await?;

    let service = RoleService::new(state.service_context());
    respond(service.list().await)
}

/// Get role by id
///
/// GET /api/identity/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<RoleResponse> {
    state.authorize(&user, "Permissions.Roles.View").await?;

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = RoleService::new(state.service_context());
    respond(service.get(id).await)
}

/// Create role
///
/// POST /api/identity/roles
pub async fn create_role(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateRoleRequest>,
) -> ApiResult<RoleResponse> {
    state.authorize(&user, "Permissions.Roles.Create").await?;

    let service = RoleService::new(state.service_context());
    respond(service.create(request, user.user_id()).await)
}

/// Update role
///
/// PUT /api/identity/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<RoleResponse> {
    state.authorize(&user, "Permissions.Roles.Edit").await?;

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = RoleService::new(state.service_context());
    respond(service.update(id, request, user.user_id()).await)
}

/// Delete role
///
/// DELETE /api/identity/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.authorize(&user, "Permissions.Roles.Delete").await?;

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = RoleService::new(state.service_context());
    respond(service.delete(id, user.user_id()).await)
}

/// Membership change body
#[derive(Debug, Deserialize)]
pub struct MemberBody {
    pub user_id: Uuid,
}

/// List role members
///
/// GET /api/identity/roles/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<UserResponse>> {
    state.authorize(&user, "Permissions.Roles.View").await?;

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = RoleService::new(state.service_context());
    respond(service.members(id).await)
}

/// Grant the role to a user
///
/// POST /api/identity/roles/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<MemberBody>,
) -> ApiResult<()> {
    state.authorize(&user, "Permissions.Users.Edit").await?;

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = RoleService::new(state.service_context());
    respond(service.add_member(id, body.user_id, user.user_id()).await)
}

/// Remove the role from a user
///
/// DELETE /api/identity/roles/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, member_id)): Path<(String, String)>,
) -> ApiResult<()> {
    state.authorize(&user, "Permissions.Users.Edit").await?;

    let (Ok(id), Ok(member_id)) = (Uuid::parse_str(&id), Uuid::parse_str(&member_id)) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = RoleService::new(state.service_context());
    respond(service.remove_member(id, member_id, user.user_id()).await)
}
