//! User handlers
//!
//! CRUD over user accounts under /api/identity/users.

use axum::extract::{Path, State};
use ident_service::{CreateUserRequest, UpdateUserRequest, UserResponse, UserService};
use uuid::Uuid;

use crate::extractors::{CurrentUser, ValidatedJson};
use crate::response::{respond, ApiResult, Envelope};
use crate::state::AppState;

use super::INVALID_ID;

/// List users
///
/// GET /api/identity/users
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<UserResponse>> {
    state.authorize(&user, "Permissions.Users.View").await?;

    let service = UserService::new(state.service_context());
    respond(service.list().await)
}

/// Get user by id
///
/// GET /api/identity/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<UserResponse> {
    state.authorize(&user, "Permissions.Users.View").await?;

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = UserService::new(state.service_context());
    respond(service.get(id).await)
}

/// Create user
///
/// POST /api/identity/users
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<UserResponse> {
    state.authorize(&user, "Permissions.Users.Create").await?;

    let service = UserService::new(state.service_context());
    respond(service.create(request, user.user_id()).await)
}

/// Update user
///
/// PUT /api/identity/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    state.authorize(&user, "Permissions.Users.Edit").await?;

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = UserService::new(state.service_context());
    respond(service.update(id, request, user.user_id()).await)
}

/// Delete user
///
/// DELETE /api/identity/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.authorize(&user, "Permissions.Users.Delete").await?;

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = UserService::new(state.service_context());
    respond(service.delete(id, user.user_id()).await)
}
