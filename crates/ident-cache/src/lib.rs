//! # ident-cache
//!
//! Redis-backed token storage: the server-side refresh-token registry and
//! the per-user cache of issued token pairs.

pub mod pool;
pub mod session;

pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool};
pub use session::{CachedTokens, RefreshTokenData, TokenStore};
