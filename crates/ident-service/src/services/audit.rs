//! Audit trail service
//!
//! Records tracked mutations and serves retrieval, search, pagination, and
//! the age-based purge. Timestamps come from the injected clock so tests can
//! pin time.

use tracing::{debug, info, instrument};
use uuid::Uuid;

use ident_core::entities::{AuditAction, AuditTrail, SYSTEM_USER_ID};
use ident_core::{compute_diff, snapshot, Auditable, CleanupTimeframe, FieldDiff, StateMap};

use crate::dto::{AuditTrailResponse, PaginatedResponse, PurgeResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Audit trail recording and retrieval
pub struct AuditTrailService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuditTrailService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // === Retrieval ===

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> ServiceResult<Vec<AuditTrailResponse>> {
        let records = self.ctx.audit_repo().find_all().await?;
        Ok(records.into_iter().map(AuditTrailResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_all_paginated(
        &self,
        page: i64,
        size: i64,
    ) -> ServiceResult<PaginatedResponse<AuditTrailResponse>> {
        let total = self.ctx.audit_repo().count().await?;
        let records = self.ctx.audit_repo().find_page(page, size).await?;
        let data = records.into_iter().map(AuditTrailResponse::from).collect();
        Ok(PaginatedResponse::new(data, page, size, total))
    }

    #[instrument(skip(self))]
    pub async fn get_count(&self) -> ServiceResult<i64> {
        Ok(self.ctx.audit_repo().count().await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> ServiceResult<AuditTrailResponse> {
        let record = self
            .ctx
            .audit_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Audit record", id.to_string()))?;
        Ok(AuditTrailResponse::from(record))
    }

    #[instrument(skip(self))]
    pub async fn get_by_changed_by(&self, actor: Uuid) -> ServiceResult<Vec<AuditTrailResponse>> {
        let records = self.ctx.audit_repo().find_by_changed_by(actor).await?;
        Ok(records.into_iter().map(AuditTrailResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_by_record_id(&self, record_id: Uuid) -> ServiceResult<Vec<AuditTrailResponse>> {
        let records = self.ctx.audit_repo().find_by_record_id(record_id).await?;
        Ok(records.into_iter().map(AuditTrailResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn search(&self, text: &str) -> ServiceResult<Vec<AuditTrailResponse>> {
        let records = self.ctx.audit_repo().search(text).await?;
        Ok(records.into_iter().map(AuditTrailResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn search_paginated(
        &self,
        text: &str,
        page: i64,
        size: i64,
    ) -> ServiceResult<PaginatedResponse<AuditTrailResponse>> {
        let matched = self.ctx.audit_repo().search(text).await?;
        let total = matched.len() as i64;
        let records = self.ctx.audit_repo().search_page(text, page, size).await?;
        let data = records.into_iter().map(AuditTrailResponse::from).collect();
        Ok(PaginatedResponse::new(data, page, size, total))
    }

    // === Recording ===

    /// Persist an audit record, returning the generated id
    ///
    /// When the incoming record's actor is the nil sentinel, it resolves to
    /// the authenticated actor, or the well-known system id when the actor is
    /// unknown or `is_system_update` is set. Records with an empty
    /// after-state are rejected.
    #[instrument(skip(self, record), fields(table = %record.table_name, action = %record.action))]
    pub async fn create(
        &self,
        mut record: AuditTrail,
        actor: Option<Uuid>,
        is_system_update: bool,
    ) -> ServiceResult<i64> {
        if record.after.is_empty() {
            return Err(ServiceError::Domain(ident_core::DomainError::EmptyAuditState));
        }

        if record.has_unresolved_actor() {
            record.changed_by = match actor {
                Some(actor) if !is_system_update => actor,
                _ => SYSTEM_USER_ID,
            };
        }

        record.occurred_at = self.ctx.clock().now();

        let id = self.ctx.audit_repo().insert(&record).await?;
        debug!(id, "Audit record persisted");
        Ok(id)
    }

    /// Record a creation from an entity snapshot
    pub async fn record_created<T: Auditable>(
        &self,
        record_id: Uuid,
        entity: &T,
        actor: Option<Uuid>,
    ) -> ServiceResult<i64> {
        let record = AuditTrail::created(T::TABLE_NAME, record_id, snapshot(entity));
        self.create(record, actor, false).await
    }

    /// Record an update; a no-op diff is skipped and returns `None`
    pub async fn record_updated<T: Auditable>(
        &self,
        record_id: Uuid,
        before: &T,
        after: &T,
        actor: Option<Uuid>,
    ) -> ServiceResult<Option<i64>> {
        let diff = compute_diff(Some(before), after);
        if diff.is_empty() {
            debug!(table = T::TABLE_NAME, "No tracked field changed; skipping audit record");
            return Ok(None);
        }
        let record = AuditTrail::updated(T::TABLE_NAME, record_id, diff);
        self.create(record, actor, false).await.map(Some)
    }

    /// Record a deletion from the entity's final snapshot
    pub async fn record_deleted<T: Auditable>(
        &self,
        record_id: Uuid,
        entity: &T,
        actor: Option<Uuid>,
    ) -> ServiceResult<i64> {
        let record = AuditTrail::deleted(T::TABLE_NAME, record_id, snapshot(entity));
        self.create(record, actor, false).await
    }

    /// Record a change on an association that has no entity of its own
    pub async fn record_association(
        &self,
        table_name: &str,
        record_id: Uuid,
        action: AuditAction,
        before: StateMap,
        after: StateMap,
        actor: Option<Uuid>,
    ) -> ServiceResult<i64> {
        let record = match action {
            AuditAction::Create => AuditTrail::created(table_name, record_id, after),
            AuditAction::Delete => AuditTrail::deleted(table_name, record_id, after),
            _ => AuditTrail::updated(table_name, record_id, FieldDiff { before, after }),
        };
        self.create(record, actor, false).await
    }

    // === Purge ===

    /// Bulk delete records older than the retention window
    #[instrument(skip(self))]
    pub async fn delete_older_than(&self, timeframe: CleanupTimeframe) -> ServiceResult<PurgeResponse> {
        let cutoff = timeframe.cutoff_from(self.ctx.clock().now());
        let removed = self.ctx.audit_repo().delete_older_than(cutoff).await?;
        info!(%timeframe, %cutoff, removed, "Purged audit records");
        Ok(PurgeResponse { removed })
    }
}
