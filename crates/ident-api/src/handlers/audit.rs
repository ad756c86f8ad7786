//! Audit trail handlers
//!
//! Listing, filtering, search, pagination, and the age-based purge under
//! /api/lifecycle/audit.

use axum::extract::{Path, Query, State};
use ident_core::CleanupTimeframe;
use ident_service::{AuditTrailResponse, AuditTrailService, PaginatedResponse, PurgeResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::extractors::{CurrentUser, Pagination};
use crate::response::{respond, ApiResult, Envelope};
use crate::state::AppState;

use super::INVALID_ID;

/// List every audit record, newest first
///
/// GET /api/lifecycle/audit
pub async fn list_audit(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<AuditTrailResponse>> {
    state.authorize(&user, "Permissions.AuditTrails.View").await?;

    let service = AuditTrailService::new(state.service_context());
    respond(service.get_all().await)
}

/// One page of audit records
///
/// GET /api/lifecycle/audit/paged?page=1&size=25
pub async fn list_audit_paged(
    State(state): State<AppState>,
    user: CurrentUser,
    pagination: Pagination,
) -> ApiResult<PaginatedResponse<AuditTrailResponse>> {
    state.authorize(&user, "Permissions.AuditTrails.View").await?;

    let service = AuditTrailService::new(state.service_context());
    respond(
        service
            .get_all_paginated(pagination.page, pagination.size)
            .await,
    )
}

/// Total audit record count
///
/// GET /api/lifecycle/audit/count
pub async fn audit_count(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i64> {
    state.authorize(&user, "Permissions.AuditTrails.View").await?;

    let service = AuditTrailService::new(state.service_context());
    respond(service.get_count().await)
}

/// Get one audit record
///
/// GET /api/lifecycle/audit/{id}
pub async fn get_audit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<AuditTrailResponse> {
    state.authorize(&user, "Permissions.AuditTrails.View").await?;

    let Ok(id) = id.parse::<i64>() else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = AuditTrailService::new(state.service_context());
    respond(service.get_by_id(id).await)
}

/// Records written by an actor
///
/// GET /api/lifecycle/audit/by-actor/{user_id}
pub async fn audit_by_actor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(actor): Path<String>,
) -> ApiResult<Vec<AuditTrailResponse>> {
    state.authorize(&user, "Permissions.AuditTrails.View").await?;

    let Ok(actor) = Uuid::parse_str(&actor) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = AuditTrailService::new(state.service_context());
    respond(service.get_by_changed_by(actor).await)
}

/// Records for a subject row
///
/// GET /api/lifecycle/audit/by-record/{record_id}
pub async fn audit_by_record(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(record_id): Path<String>,
) -> ApiResult<Vec<AuditTrailResponse>> {
    state.authorize(&user, "Permissions.AuditTrails.View").await?;

    let Ok(record_id) = Uuid::parse_str(&record_id) else {
        return Ok(Envelope::failure(INVALID_ID));
    };
    let service = AuditTrailService::new(state.service_context());
    respond(service.get_by_record_id(record_id).await)
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// Text search over the trail
///
/// GET /api/lifecycle/audit/search?query=alice
pub async fn search_audit(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<AuditTrailResponse>> {
    state.authorize(&user, "Permissions.AuditTrails.Search").await?;

    let service = AuditTrailService::new(state.service_context());
    respond(service.search(&params.query).await)
}

/// Paginated text search
///
/// GET /api/lifecycle/audit/search/paged?query=alice&page=1&size=25
pub async fn search_audit_paged(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<SearchParams>,
    pagination: Pagination,
) -> ApiResult<PaginatedResponse<AuditTrailResponse>> {
    state.authorize(&user, "Permissions.AuditTrails.Search").await?;

    let service = AuditTrailService::new(state.service_context());
    respond(
        service
            .search_paginated(&params.query, pagination.page, pagination.size)
            .await,
    )
}

/// Purge query parameters
#[derive(Debug, Deserialize)]
pub struct PurgeParams {
    pub timeframe: CleanupTimeframe,
}

/// Bulk purge of old records
///
/// DELETE /api/lifecycle/audit?timeframe=three_months
pub async fn purge_audit(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PurgeParams>,
) -> ApiResult<PurgeResponse> {
    state.authorize(&user, "Permissions.AuditTrails.Delete").await?;

    let service = AuditTrailService::new(state.service_context());
    respond(service.delete_older_than(params.timeframe).await)
}
