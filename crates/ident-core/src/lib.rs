//! # ident-core
//!
//! Domain layer containing entities, value objects, repository traits, and the
//! audit diff engine. This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod audit;
pub mod clock;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use audit::{compute_diff, compute_diff_with, snapshot, FieldDiff, StateMap, Auditable};
pub use clock::{Clock, FixedClock, SystemClock};
pub use entities::{AuditAction, AuditTrail, Role, User, SYSTEM_USER_ID};
pub use error::DomainError;
pub use traits::{
    AuditTrailRepository, PermissionRepository, RepoResult, RoleRepository, UserRepository,
};
pub use value_objects::{Claim, CleanupTimeframe, PermissionRegistry, Principal, PERMISSION_CLAIM_TYPE};
