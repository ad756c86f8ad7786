//! Permission service
//!
//! Registry listing, role-permission assignment, and effective user
//! permissions. Assignment changes are validated against the registry and
//! recorded in the audit trail.

use tracing::{info, instrument};
use uuid::Uuid;

use ident_core::entities::AuditAction;
use ident_core::{DomainError, StateMap};

use crate::dto::{RolePermissionsResponse, UserPermissionsResponse};

use super::audit::AuditTrailService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Table name recorded for role-permission changes
const ROLE_PERMISSIONS_TABLE: &str = "RolePermissions";

/// Permission management
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Every registered permission string
    #[instrument(skip(self))]
    pub fn registry(&self) -> Vec<String> {
        self.ctx.registry().all().map(String::from).collect()
    }

    /// Permissions granted to a role, with the registry for the edit surface
    #[instrument(skip(self))]
    pub async fn role_permissions(&self, role_id: Uuid) -> ServiceResult<RolePermissionsResponse> {
        let role = self
            .ctx
            .role_repo()
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role", role_id.to_string()))?;

        let granted = self.ctx.permission_repo().permissions_of_role(role_id).await?;

        Ok(RolePermissionsResponse {
            role_id,
            role_name: role.name,
            granted,
            available: self.registry(),
        })
    }

    /// Replace a role's permission set
    ///
    /// Every submitted string must be registered; unknown strings reject the
    /// whole request. The change is audited as a before/after pair of the
    /// joined permission lists.
    #[instrument(skip(self, permissions))]
    pub async fn update_role_permissions(
        &self,
        role_id: Uuid,
        permissions: Vec<String>,
        actor: Uuid,
    ) -> ServiceResult<RolePermissionsResponse> {
        let role = self
            .ctx
            .role_repo()
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role", role_id.to_string()))?;

        for permission in &permissions {
            if !self.ctx.registry().contains(permission) {
                return Err(ServiceError::Domain(DomainError::UnknownPermission(
                    permission.clone(),
                )));
            }
        }

        let before = self.ctx.permission_repo().permissions_of_role(role_id).await?;

        let mut granted = permissions;
        granted.sort();
        granted.dedup();

        self.ctx
            .permission_repo()
            .set_role_permissions(role_id, &granted)
            .await?;

        if before != granted {
            self.audit()
                .record_association(
                    ROLE_PERMISSIONS_TABLE,
                    role_id,
                    AuditAction::Update,
                    permission_state(&role.name, &before),
                    permission_state(&role.name, &granted),
                    Some(actor),
                )
                .await?;
        }

        info!(role_id = %role_id, count = granted.len(), "Role permissions updated");

        Ok(RolePermissionsResponse {
            role_id,
            role_name: role.name,
            granted,
            available: self.registry(),
        })
    }

    /// A user's effective permissions, the union over their roles
    #[instrument(skip(self))]
    pub async fn user_permissions(&self, user_id: Uuid) -> ServiceResult<UserPermissionsResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        let permissions = self.ctx.permission_repo().permissions_of_user(user.id).await?;

        Ok(UserPermissionsResponse {
            user_id: user.id,
            permissions,
        })
    }

    fn audit(&self) -> AuditTrailService<'a> {
        AuditTrailService::new(self.ctx)
    }
}

fn permission_state(role_name: &str, permissions: &[String]) -> StateMap {
    let mut state = StateMap::new();
    state.insert("role".to_string(), role_name.to_string());
    state.insert("permissions".to_string(), permissions.join(", "));
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;
    use crate::services::RoleService;
    use crate::CreateRoleRequest;
    use ident_core::entities::SYSTEM_USER_ID;

    async fn seeded_role(ctx: &super::super::context::ServiceContext) -> Uuid {
        RoleService::new(ctx)
            .create(
                CreateRoleRequest {
                    name: "Auditor".to_string(),
                    description: None,
                },
                SYSTEM_USER_ID,
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_registry_lists_defaults() {
        let (ctx, _backend) = test_context();
        let service = PermissionService::new(&ctx);

        let registry = service.registry();
        assert!(registry.contains(&"Permissions.Users.Create".to_string()));
        assert!(registry.contains(&"Permissions.AuditTrails.View".to_string()));
    }

    #[tokio::test]
    async fn test_update_role_permissions_rejects_unknown() {
        let (ctx, _backend) = test_context();
        let role_id = seeded_role(&ctx).await;
        let service = PermissionService::new(&ctx);

        let result = service
            .update_role_permissions(
                role_id,
                vec!["Permissions.Nope.View".to_string()],
                SYSTEM_USER_ID,
            )
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Domain(DomainError::UnknownPermission(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_role_permissions_is_audited() {
        let (ctx, backend) = test_context();
        let role_id = seeded_role(&ctx).await;
        let service = PermissionService::new(&ctx);

        let response = service
            .update_role_permissions(
                role_id,
                vec![
                    "Permissions.Users.View".to_string(),
                    "Permissions.Users.View".to_string(),
                    "Permissions.AuditTrails.View".to_string(),
                ],
                SYSTEM_USER_ID,
            )
            .await
            .unwrap();

        // Deduplicated and sorted
        assert_eq!(
            response.granted,
            vec![
                "Permissions.AuditTrails.View".to_string(),
                "Permissions.Users.View".to_string(),
            ]
        );

        let records: Vec<_> = backend
            .audit
            .all()
            .into_iter()
            .filter(|r| r.table_name == ROLE_PERMISSIONS_TABLE)
            .collect();
        assert_eq!(records.len(), 1);
        assert!(records[0]
            .after
            .get("permissions")
            .unwrap()
            .contains("Permissions.Users.View"));
    }

    #[tokio::test]
    async fn test_unchanged_permission_set_skips_audit() {
        let (ctx, backend) = test_context();
        let role_id = seeded_role(&ctx).await;
        let service = PermissionService::new(&ctx);

        let grant = vec!["Permissions.Users.View".to_string()];
        service
            .update_role_permissions(role_id, grant.clone(), SYSTEM_USER_ID)
            .await
            .unwrap();
        service
            .update_role_permissions(role_id, grant, SYSTEM_USER_ID)
            .await
            .unwrap();

        let records: Vec<_> = backend
            .audit
            .all()
            .into_iter()
            .filter(|r| r.table_name == ROLE_PERMISSIONS_TABLE)
            .collect();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_user_permissions_for_missing_user() {
        let (ctx, _backend) = test_context();
        let service = PermissionService::new(&ctx);

        let result = service.user_permissions(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }
}
