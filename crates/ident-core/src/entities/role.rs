//! Role entity - a named bundle of permission grants

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audit::Auditable;

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Built-in roles (e.g. Administrator) cannot be deleted
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(id: Uuid, name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description,
            is_system: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The built-in administrator role, seeded at first startup
    pub fn administrator(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: "Administrator".to_string(),
            description: Some("Full access to every module".to_string()),
            is_system: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: String, description: Option<String>) {
        self.name = name;
        self.description = description;
        self.updated_at = Utc::now();
    }
}

impl Auditable for Role {
    const TABLE_NAME: &'static str = "Roles";
}
