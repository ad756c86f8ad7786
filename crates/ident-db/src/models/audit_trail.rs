//! Audit trail database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the audit_trails table
///
/// Before/after state is persisted as JSON text; the mapper parses it
/// leniently so one malformed payload never fails a read.
#[derive(Debug, Clone, FromRow)]
pub struct AuditTrailModel {
    pub id: i64,
    pub table_name: String,
    pub record_id: Uuid,
    pub changed_by: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub action: String,
    pub before_state: Option<String>,
    pub after_state: String,
}
