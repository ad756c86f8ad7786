//! Application state
//!
//! Shared state for the Axum application: the service context, configuration,
//! and the permission gate handlers call before touching a service.

use std::sync::Arc;

use ident_common::{AppConfig, JwtService};
use ident_service::{AccessDecision, PermissionEvaluator, ServiceContext};

use crate::extractors::CurrentUser;
use crate::response::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the JWT service from the service context
    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }

    /// Run the session-aware permission check for a request
    ///
    /// Every denial becomes an `ApiError::AccessDenied` carrying the reason
    /// code, so a refresh-induced denial reaches the client as 401 with
    /// `RELOAD_REQUIRED` and the client retries with the new tokens.
    pub async fn authorize(&self, user: &CurrentUser, permission: &str) -> Result<(), ApiError> {
        let evaluator = PermissionEvaluator::new(&self.service_context);
        match evaluator.evaluate_session(user.token(), permission).await {
            AccessDecision::Granted => Ok(()),
            AccessDecision::Denied(reason) => Err(ApiError::AccessDenied(reason)),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .finish()
    }
}
