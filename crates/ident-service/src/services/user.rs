//! User service
//!
//! Example CRUD module over user accounts. Mutations are audited; a
//! deactivation rotates the security stamp and revokes outstanding tokens so
//! every session of that user dies.

use tracing::{info, instrument};
use uuid::Uuid;

use ident_common::{hash_password, validate_password_strength};
use ident_core::entities::User;

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};

use super::audit::AuditTrailService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::token::TokenService;

/// User account management
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn audit(&self) -> AuditTrailService<'a> {
        AuditTrailService::new(self.ctx)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<UserResponse>> {
        let users = self.ctx.user_repo().list().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid) -> ServiceResult<UserResponse> {
        let user = self.find(user_id).await?;
        Ok(UserResponse::from(&user))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(
        &self,
        request: CreateUserRequest,
        actor: Uuid,
    ) -> ServiceResult<UserResponse> {
        validate_password_strength(&request.password).map_err(ServiceError::from)?;

        if self.ctx.user_repo().email_exists(&request.email).await? {
            return Err(ServiceError::conflict("Email already registered"));
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| ServiceError::internal(e.to_string()))?;

        let user = User::new(Uuid::new_v4(), request.email, request.display_name);
        self.ctx.user_repo().create(&user, &password_hash).await?;

        self.audit().record_created(user.id, &user, Some(actor)).await?;

        info!(user_id = %user.id, "User created");
        Ok(UserResponse::from(&user))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
        actor: Uuid,
    ) -> ServiceResult<UserResponse> {
        let before = self.find(user_id).await?;
        let mut user = before.clone();

        if let Some(email) = request.email {
            if !email.eq_ignore_ascii_case(&user.email)
                && self.ctx.user_repo().email_exists(&email).await?
            {
                return Err(ServiceError::conflict("Email already registered"));
            }
            user.set_email(email);
        }
        if let Some(display_name) = request.display_name {
            user.set_display_name(display_name);
        }

        let deactivated = match request.is_active {
            Some(false) if user.is_active => {
                user.deactivate();
                true
            }
            Some(active) => {
                user.is_active = active;
                false
            }
            None => false,
        };

        self.ctx.user_repo().update(&user).await?;

        if deactivated {
            // Kill every outstanding session
            TokenService::new(self.ctx).revoke_all(user.id).await?;
        }

        self.audit()
            .record_updated(user.id, &before, &user, Some(actor))
            .await?;

        Ok(UserResponse::from(&user))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, actor: Uuid) -> ServiceResult<()> {
        let user = self.find(user_id).await?;

        self.ctx.user_repo().delete(user_id).await?;
        TokenService::new(self.ctx).revoke_all(user_id).await?;

        self.audit().record_deleted(user_id, &user, Some(actor)).await?;

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;
    use ident_core::entities::{AuditAction, SYSTEM_USER_ID};

    fn create_request() -> CreateUserRequest {
        CreateUserRequest {
            email: "alice@example.com".to_string(),
            display_name: "Alice".to_string(),
            password: "SecurePass1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_writes_audit_record() {
        let (ctx, backend) = test_context();
        let service = UserService::new(&ctx);

        let response = service.create(create_request(), SYSTEM_USER_ID).await.unwrap();

        let records = backend.audit.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].table_name, "Users");
        assert_eq!(records[0].record_id, response.id);
        assert_eq!(records[0].action, AuditAction::Create);
        assert_eq!(
            records[0].after.get("email").map(String::as_str),
            Some("alice@example.com")
        );
        // Credentials never reach the trail
        assert!(!records[0].after.contains_key("security_stamp"));
    }

    #[tokio::test]
    async fn test_create_rejects_weak_password() {
        let (ctx, _backend) = test_context();
        let service = UserService::new(&ctx);

        let mut request = create_request();
        request.password = "weakpassword".to_string();
        let result = service.create(request, SYSTEM_USER_ID).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let (ctx, _backend) = test_context();
        let service = UserService::new(&ctx);

        service.create(create_request(), SYSTEM_USER_ID).await.unwrap();
        let result = service.create(create_request(), SYSTEM_USER_ID).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_display_name_records_single_field_diff() {
        let (ctx, backend) = test_context();
        let service = UserService::new(&ctx);

        let created = service.create(create_request(), SYSTEM_USER_ID).await.unwrap();
        service
            .update(
                created.id,
                UpdateUserRequest {
                    email: None,
                    display_name: Some("Alicia".to_string()),
                    is_active: None,
                },
                SYSTEM_USER_ID,
            )
            .await
            .unwrap();

        let update = backend
            .audit
            .all()
            .into_iter()
            .find(|r| r.action == AuditAction::Update)
            .unwrap();
        assert_eq!(update.before.len(), 1);
        assert_eq!(
            update.before.get("display_name").map(String::as_str),
            Some("Alice")
        );
        assert_eq!(
            update.after.get("display_name").map(String::as_str),
            Some("Alicia")
        );
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let (ctx, _backend) = test_context();
        let service = UserService::new(&ctx);

        let result = service.get(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }
}
