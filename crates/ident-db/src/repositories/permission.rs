//! PostgreSQL implementation of PermissionRepository
//!
//! Role permissions are rows of (role_id, permission string); a user's
//! effective permissions are the union over their role memberships.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use ident_core::traits::{PermissionRepository, RepoResult};

use super::error::map_db_error;

/// PostgreSQL implementation of PermissionRepository
#[derive(Clone)]
pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    #[instrument(skip(self))]
    async fn permissions_of_role(&self, role_id: Uuid) -> RepoResult<Vec<String>> {
        let permissions = sqlx::query_scalar::<_, String>(
            "SELECT permission FROM role_permissions WHERE role_id = $1 ORDER BY permission",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(permissions)
    }

    #[instrument(skip(self, permissions))]
    async fn set_role_permissions(&self, role_id: Uuid, permissions: &[String]) -> RepoResult<()> {
        // Replace the whole set atomically
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        for permission in permissions {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, permission)
                VALUES ($1, $2)
                ON CONFLICT (role_id, permission) DO NOTHING
                "#,
            )
            .bind(role_id)
            .bind(permission)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn grant(&self, role_id: Uuid, permission: &str) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke(&self, role_id: Uuid, permission: &str) -> RepoResult<()> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission = $2")
            .bind(role_id)
            .bind(permission)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn permissions_of_user(&self, user_id: Uuid) -> RepoResult<Vec<String>> {
        let permissions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT rp.permission
            FROM role_permissions rp
            JOIN user_roles ur ON ur.role_id = rp.role_id
            WHERE ur.user_id = $1
            ORDER BY rp.permission
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(permissions)
    }
}
