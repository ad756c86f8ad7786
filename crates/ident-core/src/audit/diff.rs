//! Field-level diff engine for audit trails
//!
//! The diffable field set of an entity is its serde field list: serializing
//! both sides to JSON objects and walking the intersection of field names is
//! the explicit, compile-time stand-in for runtime property reflection.
//! Values compare by their canonical string rendering, so a change only
//! registers when the rendered strings differ.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// String-keyed state captured on either side of a mutation
pub type StateMap = BTreeMap<String, String>;

/// Field names excluded from every diff, regardless of entity
///
/// Credentials and bookkeeping columns change on most writes and would
/// otherwise drown the trail in noise.
pub const IGNORED_FIELDS: &[&str] = &[
    "refresh_token",
    "refresh_token_expiry",
    "password_hash",
    "security_stamp",
    "last_modified_by",
    "updated_at",
];

/// An entity whose mutations are recorded in the audit trail
pub trait Auditable: Serialize {
    /// Logical table name stored on the audit record
    const TABLE_NAME: &'static str;
}

/// Result of diffing two same-typed entities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDiff {
    pub before: StateMap,
    pub after: StateMap,
}

impl FieldDiff {
    /// True when no tracked field differs; update recording skips these
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// Diff two entities using the global ignore list
pub fn compute_diff<T: Auditable>(before: Option<&T>, after: &T) -> FieldDiff {
    compute_diff_with(before, after, &[])
}

/// Diff two entities, ignoring `extra_ignored` on top of [`IGNORED_FIELDS`]
///
/// A missing `before` (or one that does not serialize to an object with
/// fields) is a creation: both maps come back empty even though the after
/// side has state.
pub fn compute_diff_with<T: Auditable>(
    before: Option<&T>,
    after: &T,
    extra_ignored: &[&str],
) -> FieldDiff {
    let before_fields = match before.map(to_fields) {
        Some(fields) if !fields.is_empty() => fields,
        _ => return FieldDiff::default(),
    };
    let after_fields = to_fields(after);

    let mut diff = FieldDiff::default();
    for (name, after_value) in &after_fields {
        if is_ignored(name, extra_ignored) || after_value.is_null() {
            continue;
        }
        let Some(before_value) = before_fields.get(name) else {
            continue;
        };
        let rendered_before = render(before_value);
        let rendered_after = render(after_value);
        if rendered_before != rendered_after {
            diff.before.insert(name.clone(), rendered_before);
            diff.after.insert(name.clone(), rendered_after);
        }
    }
    diff
}

/// Full rendered state of an entity, minus ignored and null fields
///
/// Used as the after-state of creation records and the before-state of
/// deletion records, where there is no counterpart to diff against.
pub fn snapshot<T: Auditable>(entity: &T) -> StateMap {
    to_fields(entity)
        .iter()
        .filter(|(name, value)| !is_ignored(name, &[]) && !value.is_null())
        .map(|(name, value)| (name.clone(), render(value)))
        .collect()
}

fn is_ignored(name: &str, extra: &[&str]) -> bool {
    IGNORED_FIELDS.contains(&name) || extra.contains(&name)
}

fn to_fields<T: Serialize>(entity: &T) -> serde_json::Map<String, Value> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
