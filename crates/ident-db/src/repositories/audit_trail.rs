//! PostgreSQL implementation of AuditTrailRepository
//!
//! Rows are append-only: the only mutation besides insert is the age-based
//! bulk purge.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use ident_core::entities::AuditTrail;
use ident_core::traits::{AuditTrailRepository, RepoResult};

use super::error::map_db_error;
use crate::mappers::render_state_map;
use crate::models::AuditTrailModel;

const AUDIT_COLUMNS: &str =
    "id, table_name, record_id, changed_by, occurred_at, action, before_state, after_state";

/// PostgreSQL implementation of AuditTrailRepository
#[derive(Clone)]
pub struct PgAuditTrailRepository {
    pool: PgPool,
}

impl PgAuditTrailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditTrailRepository for PgAuditTrailRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<AuditTrail>> {
        let results = sqlx::query_as::<_, AuditTrailModel>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_trails ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(AuditTrail::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_page(&self, page: i64, size: i64) -> RepoResult<Vec<AuditTrail>> {
        let offset = (page.max(1) - 1) * size;
        let results = sqlx::query_as::<_, AuditTrailModel>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_trails ORDER BY id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(AuditTrail::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_trails")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<AuditTrail>> {
        let result = sqlx::query_as::<_, AuditTrailModel>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_trails WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(AuditTrail::from))
    }

    #[instrument(skip(self))]
    async fn find_by_changed_by(&self, actor: Uuid) -> RepoResult<Vec<AuditTrail>> {
        let results = sqlx::query_as::<_, AuditTrailModel>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_trails WHERE changed_by = $1 ORDER BY id DESC"
        ))
        .bind(actor)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(AuditTrail::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_record_id(&self, record_id: Uuid) -> RepoResult<Vec<AuditTrail>> {
        let results = sqlx::query_as::<_, AuditTrailModel>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_trails WHERE record_id = $1 ORDER BY id DESC"
        ))
        .bind(record_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(AuditTrail::from).collect())
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, record: &AuditTrail) -> RepoResult<i64> {
        let before_state = if record.before.is_empty() {
            None
        } else {
            Some(render_state_map(&record.before))
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO audit_trails (table_name, record_id, changed_by, occurred_at,
                                      action, before_state, after_state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&record.table_name)
        .bind(record.record_id)
        .bind(record.changed_by)
        .bind(record.occurred_at)
        .bind(record.action.as_str())
        .bind(before_state)
        .bind(render_state_map(&record.after))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn search(&self, text: &str) -> RepoResult<Vec<AuditTrail>> {
        let pattern = format!("%{text}%");
        let results = sqlx::query_as::<_, AuditTrailModel>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS} FROM audit_trails
            WHERE table_name ILIKE $1 OR action ILIKE $1
               OR before_state ILIKE $1 OR after_state ILIKE $1
            ORDER BY id DESC
            "#
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(AuditTrail::from).collect())
    }

    #[instrument(skip(self))]
    async fn search_page(&self, text: &str, page: i64, size: i64) -> RepoResult<Vec<AuditTrail>> {
        let pattern = format!("%{text}%");
        let offset = (page.max(1) - 1) * size;
        let results = sqlx::query_as::<_, AuditTrailModel>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS} FROM audit_trails
            WHERE table_name ILIKE $1 OR action ILIKE $1
               OR before_state ILIKE $1 OR after_state ILIKE $1
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(AuditTrail::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM audit_trails WHERE occurred_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgAuditTrailRepository>();
    }
}
