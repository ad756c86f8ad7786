//! Role service
//!
//! Role CRUD and user membership, with every successful mutation recorded in
//! the audit trail.

use tracing::{info, instrument};
use uuid::Uuid;

use ident_core::entities::{AuditAction, Role};
use ident_core::StateMap;

use crate::dto::{CreateRoleRequest, RoleResponse, UpdateRoleRequest, UserResponse};

use super::audit::AuditTrailService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Table name recorded for membership changes
const USER_ROLES_TABLE: &str = "UserRoles";

/// Role management
pub struct RoleService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoleService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn audit(&self) -> AuditTrailService<'a> {
        AuditTrailService::new(self.ctx)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<RoleResponse>> {
        let roles = self.ctx.role_repo().list().await?;
        Ok(roles.iter().map(RoleResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, role_id: Uuid) -> ServiceResult<RoleResponse> {
        let role = self.find(role_id).await?;
        Ok(RoleResponse::from(&role))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateRoleRequest,
        actor: Uuid,
    ) -> ServiceResult<RoleResponse> {
        if self.ctx.role_repo().find_by_name(&request.name).await?.is_some() {
            return Err(ServiceError::conflict("Role name already in use"));
        }

        let role = Role::new(Uuid::new_v4(), request.name, request.description);
        self.ctx.role_repo().create(&role).await?;

        self.audit().record_created(role.id, &role, Some(actor)).await?;

        info!(role_id = %role.id, "Role created");
        Ok(RoleResponse::from(&role))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        role_id: Uuid,
        request: UpdateRoleRequest,
        actor: Uuid,
    ) -> ServiceResult<RoleResponse> {
        let before = self.find(role_id).await?;

        if let Some(existing) = self.ctx.role_repo().find_by_name(&request.name).await? {
            if existing.id != role_id {
                return Err(ServiceError::conflict("Role name already in use"));
            }
        }

        let mut role = before.clone();
        role.rename(request.name, request.description);
        self.ctx.role_repo().update(&role).await?;

        self.audit()
            .record_updated(role.id, &before, &role, Some(actor))
            .await?;

        Ok(RoleResponse::from(&role))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, role_id: Uuid, actor: Uuid) -> ServiceResult<()> {
        let role = self.find(role_id).await?;

        self.ctx.role_repo().delete(role_id).await?;

        self.audit().record_deleted(role_id, &role, Some(actor)).await?;

        info!(role_id = %role_id, "Role deleted");
        Ok(())
    }

    // === Membership ===

    #[instrument(skip(self))]
    pub async fn members(&self, role_id: Uuid) -> ServiceResult<Vec<UserResponse>> {
        // Ensure the role exists before listing
        self.find(role_id).await?;

        let member_ids = self.ctx.role_repo().members(role_id).await?;
        let mut members = Vec::with_capacity(member_ids.len());
        for user_id in member_ids {
            if let Some(user) = self.ctx.user_repo().find_by_id(user_id).await? {
                members.push(UserResponse::from(&user));
            }
        }
        Ok(members)
    }

    #[instrument(skip(self))]
    pub async fn add_member(&self, role_id: Uuid, user_id: Uuid, actor: Uuid) -> ServiceResult<()> {
        let role = self.find(role_id).await?;
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        self.ctx.role_repo().add_member(role_id, user_id).await?;

        self.audit()
            .record_association(
                USER_ROLES_TABLE,
                user_id,
                AuditAction::Create,
                StateMap::new(),
                membership_state(&role, user.id),
                Some(actor),
            )
            .await?;

        info!(role_id = %role_id, user_id = %user_id, "Role granted to user");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        role_id: Uuid,
        user_id: Uuid,
        actor: Uuid,
    ) -> ServiceResult<()> {
        let role = self.find(role_id).await?;

        self.ctx.role_repo().remove_member(role_id, user_id).await?;

        self.audit()
            .record_association(
                USER_ROLES_TABLE,
                user_id,
                AuditAction::Delete,
                StateMap::new(),
                membership_state(&role, user_id),
                Some(actor),
            )
            .await?;

        info!(role_id = %role_id, user_id = %user_id, "Role removed from user");
        Ok(())
    }

    async fn find(&self, role_id: Uuid) -> ServiceResult<Role> {
        self.ctx
            .role_repo()
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role", role_id.to_string()))
    }
}

fn membership_state(role: &Role, user_id: Uuid) -> StateMap {
    let mut state = StateMap::new();
    state.insert("role_id".to_string(), role.id.to_string());
    state.insert("role_name".to_string(), role.name.clone());
    state.insert("user_id".to_string(), user_id.to_string());
    state
}
