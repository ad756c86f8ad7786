//! Audit trail record - immutable log entry for a tracked mutation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{FieldDiff, StateMap};

/// Well-known actor id recorded for system-initiated mutations
pub const SYSTEM_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

/// Kind of mutation an audit record captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Troubleshooting,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Troubleshooting => "Troubleshooting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Create" => Some(Self::Create),
            "Update" => Some(Self::Update),
            "Delete" => Some(Self::Delete),
            "Troubleshooting" => Some(Self::Troubleshooting),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit trail record
///
/// Created once at the moment of a tracked mutation and immutable thereafter;
/// rows leave the table only through the age-based bulk purge. A persisted
/// record always carries a non-empty after-state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTrail {
    /// Database-generated; zero until persisted
    pub id: i64,
    pub table_name: String,
    pub record_id: Uuid,
    pub changed_by: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub action: AuditAction,
    /// Empty for creates
    pub before: StateMap,
    pub after: StateMap,
}

impl AuditTrail {
    /// Record a creation: no before-state, full snapshot as the after-state
    pub fn created(table_name: impl Into<String>, record_id: Uuid, after: StateMap) -> Self {
        Self {
            id: 0,
            table_name: table_name.into(),
            record_id,
            changed_by: Uuid::nil(),
            occurred_at: DateTime::<Utc>::MIN_UTC,
            action: AuditAction::Create,
            before: StateMap::new(),
            after,
        }
    }

    /// Record an update from a computed field diff
    pub fn updated(table_name: impl Into<String>, record_id: Uuid, diff: FieldDiff) -> Self {
        Self {
            id: 0,
            table_name: table_name.into(),
            record_id,
            changed_by: Uuid::nil(),
            occurred_at: DateTime::<Utc>::MIN_UTC,
            action: AuditAction::Update,
            before: diff.before,
            after: diff.after,
        }
    }

    /// Record a deletion: the final snapshot fills both sides
    pub fn deleted(table_name: impl Into<String>, record_id: Uuid, state: StateMap) -> Self {
        Self {
            id: 0,
            table_name: table_name.into(),
            record_id,
            changed_by: Uuid::nil(),
            occurred_at: DateTime::<Utc>::MIN_UTC,
            action: AuditAction::Delete,
            before: state.clone(),
            after: state,
        }
    }

    pub fn with_actor(mut self, actor: Uuid) -> Self {
        self.changed_by = actor;
        self
    }

    /// Actor id is the nil sentinel until resolved by the audit service
    pub fn has_unresolved_actor(&self) -> bool {
        self.changed_by.is_nil()
    }
}
