//! Repository traits (ports)

mod repositories;

pub use repositories::{
    AuditTrailRepository, PermissionRepository, RepoResult, RoleRepository, UserRepository,
};
