//! Session token storage

mod tokens;

pub use tokens::{CachedTokens, RefreshTokenData, TokenStore};
