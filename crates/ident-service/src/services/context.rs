//! Service context - dependency container for services
//!
//! Holds the repositories, token store, JWT service, permission registry, and
//! clock every service needs. Built once at startup; everything inside is
//! read-only afterwards.

use std::sync::Arc;

use ident_cache::TokenStore;
use ident_common::JwtService;
use ident_core::traits::{
    AuditTrailRepository, PermissionRepository, RoleRepository, UserRepository,
};
use ident_core::{Clock, PermissionRegistry};
use ident_db::PgPool;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    pool: PgPool,

    user_repo: Arc<dyn UserRepository>,
    role_repo: Arc<dyn RoleRepository>,
    permission_repo: Arc<dyn PermissionRepository>,
    audit_repo: Arc<dyn AuditTrailRepository>,

    token_store: TokenStore,
    jwt_service: Arc<JwtService>,
    registry: Arc<PermissionRegistry>,
    clock: Arc<dyn Clock>,

    /// Seconds before expiry at which the session evaluator refreshes
    refresh_window: i64,
}

impl ServiceContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        user_repo: Arc<dyn UserRepository>,
        role_repo: Arc<dyn RoleRepository>,
        permission_repo: Arc<dyn PermissionRepository>,
        audit_repo: Arc<dyn AuditTrailRepository>,
        token_store: TokenStore,
        jwt_service: Arc<JwtService>,
        registry: Arc<PermissionRegistry>,
        clock: Arc<dyn Clock>,
        refresh_window: i64,
    ) -> Self {
        Self {
            pool,
            user_repo,
            role_repo,
            permission_repo,
            audit_repo,
            token_store,
            jwt_service,
            registry,
            clock,
            refresh_window,
        }
    }

    /// Get the PostgreSQL connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the role repository
    pub fn role_repo(&self) -> &dyn RoleRepository {
        self.role_repo.as_ref()
    }

    /// Get the permission repository
    pub fn permission_repo(&self) -> &dyn PermissionRepository {
        self.permission_repo.as_ref()
    }

    /// Get the audit trail repository
    pub fn audit_repo(&self) -> &dyn AuditTrailRepository {
        self.audit_repo.as_ref()
    }

    /// Get the token store
    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Get the permission registry
    pub fn registry(&self) -> &PermissionRegistry {
        self.registry.as_ref()
    }

    /// Get the clock
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Near-expiry window for the session evaluator, in seconds
    pub fn refresh_window(&self) -> i64 {
        self.refresh_window
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &"PgPool")
            .field("repositories", &"...")
            .field("registry_len", &self.registry.len())
            .finish()
    }
}

/// Builder for creating ServiceContext
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    role_repo: Option<Arc<dyn RoleRepository>>,
    permission_repo: Option<Arc<dyn PermissionRepository>>,
    audit_repo: Option<Arc<dyn AuditTrailRepository>>,
    token_store: Option<TokenStore>,
    jwt_service: Option<Arc<JwtService>>,
    registry: Option<Arc<PermissionRegistry>>,
    clock: Option<Arc<dyn Clock>>,
    refresh_window: i64,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            pool: None,
            user_repo: None,
            role_repo: None,
            permission_repo: None,
            audit_repo: None,
            token_store: None,
            jwt_service: None,
            registry: None,
            clock: None,
            refresh_window: 60,
        }
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn role_repo(mut self, repo: Arc<dyn RoleRepository>) -> Self {
        self.role_repo = Some(repo);
        self
    }

    pub fn permission_repo(mut self, repo: Arc<dyn PermissionRepository>) -> Self {
        self.permission_repo = Some(repo);
        self
    }

    pub fn audit_repo(mut self, repo: Arc<dyn AuditTrailRepository>) -> Self {
        self.audit_repo = Some(repo);
        self
    }

    pub fn token_store(mut self, store: TokenStore) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn registry(mut self, registry: Arc<PermissionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn refresh_window(mut self, seconds: i64) -> Self {
        self.refresh_window = seconds;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        Ok(ServiceContext::new(
            self.pool
                .ok_or_else(|| ServiceError::validation("pool is required"))?,
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.role_repo
                .ok_or_else(|| ServiceError::validation("role_repo is required"))?,
            self.permission_repo
                .ok_or_else(|| ServiceError::validation("permission_repo is required"))?,
            self.audit_repo
                .ok_or_else(|| ServiceError::validation("audit_repo is required"))?,
            self.token_store
                .ok_or_else(|| ServiceError::validation("token_store is required"))?,
            self.jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            self.registry
                .ok_or_else(|| ServiceError::validation("registry is required"))?,
            self.clock
                .ok_or_else(|| ServiceError::validation("clock is required"))?,
            self.refresh_window,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
