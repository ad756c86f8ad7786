//! Audit trail entity <-> model mapper
//!
//! Persisted state payloads are parsed leniently: malformed JSON degrades to
//! an empty map with a warning rather than failing the read.

use ident_core::entities::{AuditAction, AuditTrail};
use ident_core::StateMap;
use tracing::warn;

use crate::models::AuditTrailModel;

impl From<AuditTrailModel> for AuditTrail {
    fn from(model: AuditTrailModel) -> Self {
        let action = AuditAction::parse(&model.action).unwrap_or_else(|| {
            warn!(id = model.id, action = %model.action, "Unknown audit action, treating as Troubleshooting");
            AuditAction::Troubleshooting
        });

        AuditTrail {
            id: model.id,
            table_name: model.table_name,
            record_id: model.record_id,
            changed_by: model.changed_by,
            occurred_at: model.occurred_at,
            action,
            before: parse_state_map(model.id, "before", model.before_state.as_deref()),
            after: parse_state_map(model.id, "after", Some(&model.after_state)),
        }
    }
}

/// Parse a persisted JSON state payload into a string map
///
/// `None` (a create's missing before-state) and malformed payloads both
/// yield an empty map; the latter logs a warning with the record id.
pub fn parse_state_map(id: i64, side: &str, payload: Option<&str>) -> StateMap {
    let Some(payload) = payload else {
        return StateMap::new();
    };

    match serde_json::from_str::<StateMap>(payload) {
        Ok(map) => map,
        Err(e) => {
            warn!(id, side, error = %e, "Malformed audit state payload, returning empty map");
            StateMap::new()
        }
    }
}

/// Render a state map as the JSON text persisted in the state columns
pub fn render_state_map(map: &StateMap) -> String {
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn model(before: Option<&str>, after: &str) -> AuditTrailModel {
        AuditTrailModel {
            id: 1,
            table_name: "Users".to_string(),
            record_id: Uuid::new_v4(),
            changed_by: Uuid::new_v4(),
            occurred_at: Utc::now(),
            action: "Update".to_string(),
            before_state: before.map(String::from),
            after_state: after.to_string(),
        }
    }

    #[test]
    fn test_round_trip_state_map() {
        let mut map = StateMap::new();
        map.insert("name".to_string(), "A".to_string());

        let rendered = render_state_map(&map);
        let parsed = parse_state_map(1, "after", Some(&rendered));
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_missing_before_state_is_empty() {
        let entity = AuditTrail::from(model(None, r#"{"name":"A"}"#));
        assert!(entity.before.is_empty());
        assert_eq!(entity.after.get("name").map(String::as_str), Some("A"));
    }

    #[test]
    fn test_malformed_after_state_degrades_to_empty() {
        let entity = AuditTrail::from(model(None, "{not json"));
        assert!(entity.after.is_empty());
    }

    #[test]
    fn test_unknown_action_maps_to_troubleshooting() {
        let mut m = model(None, "{}");
        m.action = "Upsert".to_string();
        let entity = AuditTrail::from(m);
        assert_eq!(entity.action, AuditAction::Troubleshooting);
    }
}
