//! # ident-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers (lenient on persisted audit state payloads)
//! - Repository implementations

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, ping, DatabaseConfig, PgPool};
pub use repositories::{
    PgAuditTrailRepository, PgPermissionRepository, PgRoleRepository, PgUserRepository,
};
