//! Server setup and initialization

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use ident_cache::{RedisPool, TokenStore};
use ident_common::{AppConfig, AppError, JwtService};
use ident_core::{PermissionRegistry, Role, SystemClock, SYSTEM_USER_ID};
use ident_db::{
    create_pool, PgAuditTrailRepository, PgPermissionRepository, PgRoleRepository,
    PgUserRepository,
};
use ident_service::{ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config().clone();
    let router = apply_middleware(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );
    // Health bypasses rate limiting
    let router = router.merge(health_routes());
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = ident_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    let token_store =
        TokenStore::with_ttl(redis_pool, config.jwt.refresh_token_expiry.unsigned_abs());
    info!("Redis connection established");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.issuer.clone(),
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));

    let registry = Arc::new(PermissionRegistry::defaults());

    let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let role_repo = Arc::new(PgRoleRepository::new(pool.clone()));
    let permission_repo = Arc::new(PgPermissionRepository::new(pool.clone()));
    let audit_repo = Arc::new(PgAuditTrailRepository::new(pool.clone()));

    let service_context = ServiceContextBuilder::new()
        .pool(pool)
        .user_repo(user_repo)
        .role_repo(role_repo)
        .permission_repo(permission_repo)
        .audit_repo(audit_repo)
        .token_store(token_store)
        .jwt_service(jwt_service)
        .registry(registry)
        .clock(Arc::new(SystemClock))
        .refresh_window(config.jwt.refresh_window)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    seed_defaults(&service_context).await?;

    Ok(AppState::new(service_context, config))
}

/// Ensure the built-in Administrator role (and, when configured, the initial
/// admin account) exists with every registered permission
async fn seed_defaults(ctx: &ServiceContext) -> Result<(), AppError> {
    let existing = ctx
        .role_repo()
        .find_by_name("Administrator")
        .await
        .map_err(AppError::Domain)?;

    let role_id = match existing {
        Some(role) => role.id,
        None => {
            let role = Role::administrator(Uuid::new_v4());
            ctx.role_repo().create(&role).await.map_err(AppError::Domain)?;

            let mut record = ident_core::AuditTrail::created(
                "Roles",
                role.id,
                ident_core::snapshot(&role),
            );
            record.changed_by = SYSTEM_USER_ID;
            record.occurred_at = ctx.clock().now();
            ctx.audit_repo()
                .insert(&record)
                .await
                .map_err(AppError::Domain)?;

            info!(role_id = %role.id, "Seeded Administrator role");
            role.id
        }
    };

    let all: Vec<String> = ctx.registry().all().map(String::from).collect();
    ctx.permission_repo()
        .set_role_permissions(role_id, &all)
        .await
        .map_err(AppError::Domain)?;

    seed_admin_account(ctx, role_id).await
}

/// Create the initial admin account from ADMIN_EMAIL / ADMIN_PASSWORD when
/// set and no such user exists yet
async fn seed_admin_account(ctx: &ServiceContext, admin_role: Uuid) -> Result<(), AppError> {
    let (Ok(email), Ok(password)) = (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
    else {
        return Ok(());
    };

    if ctx
        .user_repo()
        .find_by_email(&email)
        .await
        .map_err(AppError::Domain)?
        .is_some()
    {
        return Ok(());
    }

    let password_hash = ident_common::hash_password(&password)?;
    let user = ident_core::User::new(Uuid::new_v4(), email, "Administrator".to_string());
    ctx.user_repo()
        .create(&user, &password_hash)
        .await
        .map_err(AppError::Domain)?;
    ctx.role_repo()
        .add_member(admin_role, user.id)
        .await
        .map_err(AppError::Domain)?;

    let mut record =
        ident_core::AuditTrail::created("Users", user.id, ident_core::snapshot(&user));
    record.changed_by = SYSTEM_USER_ID;
    record.occurred_at = ctx.clock().now();
    ctx.audit_repo()
        .insert(&record)
        .await
        .map_err(AppError::Domain)?;

    info!(user_id = %user.id, "Seeded admin account");
    Ok(())
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
