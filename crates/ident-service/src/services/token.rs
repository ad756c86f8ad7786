//! Token service
//!
//! Credential exchange, refresh-token rotation, and revocation. Issued access
//! tokens embed the user's effective permission strings so the evaluator can
//! check claims without a database round trip.

use ident_cache::RefreshTokenData;
use ident_common::{verify_password, AppError};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::{RefreshRequest, TokenRequest, TokenResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Token issuance and rotation
pub struct TokenService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TokenService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Exchange credentials for a token pair
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn issue(&self, request: TokenRequest) -> ServiceResult<TokenResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %request.email, "Token exchange failed: user not found");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !user.is_active {
            warn!(user_id = %user.id, "Token exchange failed: user deactivated");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| ServiceError::App(AppError::InvalidCredentials))?;

        let is_valid = verify_password(&request.password, &password_hash)
            .map_err(|e| ServiceError::internal(e.to_string()))?;
        if !is_valid {
            warn!(user_id = %user.id, "Token exchange failed: invalid password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        self.ctx.user_repo().update_last_login(user.id).await?;

        let pair = self.mint(user.id, user.security_stamp).await?;

        info!(user_id = %user.id, "Issued token pair");
        Ok(TokenResponse::from(pair))
    }

    /// Exchange a refresh token for a new pair, rotating the old one out
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshRequest) -> ServiceResult<TokenResponse> {
        let claims = self
            .ctx
            .jwt_service()
            .validate_refresh_token(&request.refresh_token)
            .map_err(ServiceError::from)?;
        let user_id = claims.user_id().map_err(ServiceError::from)?;

        // The token must still be registered server-side
        let registered = self
            .ctx
            .token_store()
            .validate_refresh_token(&request.refresh_token)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))?;
        if registered.is_none() {
            warn!(user_id = %user_id, "Refresh failed: token not registered or revoked");
            return Err(ServiceError::App(AppError::InvalidToken));
        }

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        // Deactivation or a rotated stamp kills the session
        let stamp_ok = claims.stamp.as_deref() == Some(user.security_stamp.to_string().as_str());
        if !user.is_active || !stamp_ok {
            self.revoke_all(user_id).await?;
            return Err(ServiceError::App(AppError::InvalidToken));
        }

        self.ctx
            .token_store()
            .revoke_refresh_token(&request.refresh_token)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        let pair = self.mint(user.id, user.security_stamp).await?;

        info!(user_id = %user.id, "Rotated token pair");
        Ok(TokenResponse::from(pair))
    }

    /// Drop every outstanding token for a user
    #[instrument(skip(self))]
    pub async fn revoke_all(&self, user_id: Uuid) -> ServiceResult<u32> {
        self.ctx
            .token_store()
            .revoke_all_for_user(user_id)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))
    }

    /// Mint, register, and cache a fresh pair for a user
    pub(crate) async fn mint(
        &self,
        user_id: Uuid,
        security_stamp: Uuid,
    ) -> ServiceResult<ident_common::TokenPair> {
        let permissions = self.ctx.permission_repo().permissions_of_user(user_id).await?;

        let pair = self
            .ctx
            .jwt_service()
            .issue_pair(user_id, security_stamp, permissions)
            .map_err(ServiceError::from)?;

        self.ctx
            .token_store()
            .store_refresh_token(&pair.refresh_token, &RefreshTokenData::new(user_id))
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))?;
        self.ctx
            .token_store()
            .cache_tokens(user_id, &pair)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        Ok(pair)
    }
}
