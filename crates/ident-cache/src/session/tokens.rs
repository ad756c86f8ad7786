//! Token storage in Redis
//!
//! Two keyspaces with automatic expiration:
//! - `refresh_token:{token}`: the server-side registry a refresh exchange is
//!   validated against; revocation here kills the session regardless of the
//!   JWT's own expiry.
//! - `session_tokens:{user_id}`: the most recently issued token pair per
//!   user. The session-aware permission evaluator writes this after a
//!   successful refresh and clears it when the exchange fails.

use crate::pool::{RedisPool, RedisResult};
use ident_common::TokenPair;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";
const SESSION_TOKENS_PREFIX: &str = "session_tokens:";
const USER_TOKENS_PREFIX: &str = "user_tokens:";

/// Default TTL for refresh tokens (7 days)
const DEFAULT_REFRESH_TOKEN_TTL: u64 = 7 * 24 * 60 * 60;

/// Server-side record for an outstanding refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenData {
    pub user_id: Uuid,
    /// Unix epoch seconds at issuance
    pub issued_at: i64,
}

impl RefreshTokenData {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            issued_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// The latest token pair issued to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix epoch seconds when cached
    pub cached_at: i64,
}

impl From<&TokenPair> for CachedTokens {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            cached_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Redis-backed token store
#[derive(Clone)]
pub struct TokenStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl TokenStore {
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL,
        }
    }

    pub fn with_ttl(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn refresh_key(token: &str) -> String {
        format!("{REFRESH_TOKEN_PREFIX}{token}")
    }

    fn session_key(user_id: Uuid) -> String {
        format!("{SESSION_TOKENS_PREFIX}{user_id}")
    }

    fn user_set_key(user_id: Uuid) -> String {
        format!("{USER_TOKENS_PREFIX}{user_id}")
    }

    // === Refresh-token registry ===

    /// Register a refresh token for later validation
    pub async fn store_refresh_token(&self, token: &str, data: &RefreshTokenData) -> RedisResult<()> {
        self.pool
            .set(&Self::refresh_key(token), data, Some(self.ttl_seconds))
            .await?;

        // Track per-user for bulk revocation
        let mut conn = self.pool.get().await?;
        let set_key = Self::user_set_key(data.user_id);
        conn.sadd::<_, _, ()>(&set_key, token).await?;
        conn.expire::<_, ()>(&set_key, self.ttl_seconds as i64).await?;

        tracing::debug!(user_id = %data.user_id, "Stored refresh token");
        Ok(())
    }

    /// Look up a refresh token; `None` means unknown, revoked, or expired
    pub async fn validate_refresh_token(&self, token: &str) -> RedisResult<Option<RefreshTokenData>> {
        self.pool.get_value(&Self::refresh_key(token)).await
    }

    /// Drop a single refresh token
    pub async fn revoke_refresh_token(&self, token: &str) -> RedisResult<bool> {
        if let Some(data) = self.validate_refresh_token(token).await? {
            let mut conn = self.pool.get().await?;
            conn.srem::<_, _, ()>(&Self::user_set_key(data.user_id), token)
                .await?;
        }

        self.pool.delete(&Self::refresh_key(token)).await
    }

    /// Drop every refresh token and the cached pair for a user
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> RedisResult<u32> {
        let set_key = Self::user_set_key(user_id);
        let mut conn = self.pool.get().await?;

        let tokens: Vec<String> = conn.smembers(&set_key).await?;
        let count = tokens.len() as u32;

        if !tokens.is_empty() {
            let keys: Vec<String> = tokens.iter().map(|t| Self::refresh_key(t)).collect();
            let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            self.pool.delete_many(&key_refs).await?;
        }
        conn.del::<_, ()>(&set_key).await?;
        self.pool.delete(&Self::session_key(user_id)).await?;

        tracing::info!(user_id = %user_id, count, "Revoked all tokens for user");
        Ok(count)
    }

    // === Cached session token pairs ===

    /// Cache the latest issued pair for a user
    pub async fn cache_tokens(&self, user_id: Uuid, pair: &TokenPair) -> RedisResult<()> {
        self.pool
            .set(
                &Self::session_key(user_id),
                &CachedTokens::from(pair),
                Some(self.ttl_seconds),
            )
            .await
    }

    /// The latest cached pair for a user, if any
    pub async fn cached_tokens(&self, user_id: Uuid) -> RedisResult<Option<CachedTokens>> {
        self.pool.get_value(&Self::session_key(user_id)).await
    }

    /// Clear the cached pair (failed refresh path)
    pub async fn clear_cached_tokens(&self, user_id: Uuid) -> RedisResult<bool> {
        self.pool.delete(&Self::session_key(user_id)).await
    }
}
