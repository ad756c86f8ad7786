//! Audit diffing - field-level before/after comparison for tracked entities

mod diff;

pub use diff::{compute_diff, compute_diff_with, snapshot, Auditable, FieldDiff, StateMap, IGNORED_FIELDS};
