//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs; the infrastructure layer provides
//! the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{AuditTrail, Role, User};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// List all users
    async fn list(&self) -> RepoResult<Vec<User>>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user with its credential hash
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Update an existing user
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Delete a user
    async fn delete(&self, id: Uuid) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Uuid) -> RepoResult<Option<String>>;

    /// Update password hash
    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepoResult<()>;

    /// Current security stamp, if the user exists
    async fn security_stamp(&self, id: Uuid) -> RepoResult<Option<Uuid>>;

    /// Record a successful login
    async fn update_last_login(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Role Repository
// ============================================================================

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find role by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Role>>;

    /// Find role by its unique name
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Role>>;

    /// List all roles ordered by name
    async fn list(&self) -> RepoResult<Vec<Role>>;

    /// Create a new role
    async fn create(&self, role: &Role) -> RepoResult<()>;

    /// Update an existing role
    async fn update(&self, role: &Role) -> RepoResult<()>;

    /// Delete a role and its associations
    async fn delete(&self, id: Uuid) -> RepoResult<()>;

    /// User ids holding this role
    async fn members(&self, role_id: Uuid) -> RepoResult<Vec<Uuid>>;

    /// Roles held by a user
    async fn roles_of_user(&self, user_id: Uuid) -> RepoResult<Vec<Role>>;

    /// Grant a role to a user
    async fn add_member(&self, role_id: Uuid, user_id: Uuid) -> RepoResult<()>;

    /// Remove a role from a user
    async fn remove_member(&self, role_id: Uuid, user_id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Permission Repository
// ============================================================================

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Permission strings granted to a role
    async fn permissions_of_role(&self, role_id: Uuid) -> RepoResult<Vec<String>>;

    /// Replace the full permission set of a role
    async fn set_role_permissions(&self, role_id: Uuid, permissions: &[String]) -> RepoResult<()>;

    /// Grant a single permission to a role; idempotent
    async fn grant(&self, role_id: Uuid, permission: &str) -> RepoResult<()>;

    /// Revoke a single permission from a role
    async fn revoke(&self, role_id: Uuid, permission: &str) -> RepoResult<()>;

    /// Union of permission strings over every role a user holds
    async fn permissions_of_user(&self, user_id: Uuid) -> RepoResult<Vec<String>>;
}

// ============================================================================
// Audit Trail Repository
// ============================================================================

#[async_trait]
pub trait AuditTrailRepository: Send + Sync {
    /// All records, newest first
    async fn find_all(&self) -> RepoResult<Vec<AuditTrail>>;

    /// One page of records, newest first; `page` is 1-based
    async fn find_page(&self, page: i64, size: i64) -> RepoResult<Vec<AuditTrail>>;

    /// Total record count
    async fn count(&self) -> RepoResult<i64>;

    /// Find record by ID
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<AuditTrail>>;

    /// Records written by an actor
    async fn find_by_changed_by(&self, actor: Uuid) -> RepoResult<Vec<AuditTrail>>;

    /// Records for a subject row
    async fn find_by_record_id(&self, record_id: Uuid) -> RepoResult<Vec<AuditTrail>>;

    /// Persist a record, returning the generated id
    async fn insert(&self, record: &AuditTrail) -> RepoResult<i64>;

    /// Case-insensitive text search over table name, action, and states
    async fn search(&self, text: &str) -> RepoResult<Vec<AuditTrail>>;

    /// Paginated variant of [`Self::search`]
    async fn search_page(&self, text: &str, page: i64, size: i64) -> RepoResult<Vec<AuditTrail>>;

    /// Bulk delete records strictly older than `cutoff`; returns rows removed
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}
