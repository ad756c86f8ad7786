//! JWT utilities for authentication
//!
//! Token encoding, decoding, and validation using the `jsonwebtoken` crate.
//! Access tokens embed the principal's permission strings; the configured
//! issuer is both the `iss` claim and the trusted issuer permission claims
//! are evaluated against.

use chrono::{Duration, Utc};
use ident_core::{Claim, Principal};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Permission strings granted to the subject (access tokens only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    /// Security stamp at issuance; a mismatch against the stored stamp forces
    /// full re-authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp: Option<String>,
}

impl Claims {
    /// Get the user ID from the subject claim
    ///
    /// # Errors
    /// Returns an error if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Check if the token expires within the next `window` seconds
    pub fn expires_within(&self, window: i64) -> bool {
        self.exp - Utc::now().timestamp() <= window
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access
    }

    pub fn is_refresh_token(&self) -> bool {
        self.token_type == TokenType::Refresh
    }

    /// Build the domain principal these claims describe
    ///
    /// Each permission string becomes a `"Permission"` claim issued by the
    /// token's `iss`.
    pub fn to_principal(&self) -> Result<Principal, AppError> {
        let subject = self.user_id()?;
        let claims = self
            .permissions
            .iter()
            .map(|p| Claim::permission(p.clone(), self.iss.clone()))
            .collect();
        Ok(Principal::new(subject, claims))
    }
}

/// Token pair containing access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl JwtService {
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        access_token_expiry: i64,
        refresh_token_expiry: i64,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            access_token_expiry,
            refresh_token_expiry,
        }
    }

    /// The configured issuer, also the trusted issuer for permission claims
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Generate an access/refresh pair carrying the given permission strings
    /// and the user's current security stamp
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_pair(
        &self,
        user_id: Uuid,
        security_stamp: Uuid,
        permissions: Vec<String>,
    ) -> Result<TokenPair, AppError> {
        let access_token =
            self.encode_token(user_id, TokenType::Access, permissions, security_stamp)?;
        let refresh_token =
            self.encode_token(user_id, TokenType::Refresh, Vec::new(), security_stamp)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    fn encode_token(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        permissions: Vec<String>,
        security_stamp: Uuid,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expiry = match token_type {
            TokenType::Access => self.access_token_expiry,
            TokenType::Refresh => self.refresh_token_expiry,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
            token_type,
            permissions,
            stamp: Some(security_stamp.to_string()),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Decode and validate a JWT token (signature, expiry, and issuer)
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }

    /// Decode without expiry validation (signature and issuer still checked)
    ///
    /// The session evaluator needs the claim set of an expired access token
    /// to decide whether a refresh exchange is worth attempting.
    ///
    /// # Errors
    /// Returns an error if the signature or issuer is invalid
    pub fn decode_expired(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }

    /// Validate an access token and return the claims
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or not an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if !claims.is_access_token() {
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }

    /// Validate a refresh token and return the claims
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or not a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if !claims.is_refresh_token() {
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "ident-test";

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret-key-that-is-long-enough", ISSUER, 900, 604_800)
    }

    #[test]
    fn test_issue_pair() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let pair = service
            .issue_pair(user_id, Uuid::new_v4(), vec!["Permissions.Users.View".to_string()])
            .unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);
    }

    #[test]
    fn test_access_token_carries_permissions_and_issuer() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let pair = service
            .issue_pair(user_id, Uuid::new_v4(), vec!["Permissions.Users.View".to_string()])
            .unwrap();
        let claims = service.validate_access_token(&pair.access_token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.permissions, vec!["Permissions.Users.View"]);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_refresh_token_has_no_permissions() {
        let service = create_test_service();
        let pair = service
            .issue_pair(Uuid::new_v4(), Uuid::new_v4(), vec!["Permissions.Users.View".to_string()])
            .unwrap();

        let claims = service.validate_refresh_token(&pair.refresh_token).unwrap();
        assert!(claims.permissions.is_empty());
        assert!(claims.is_refresh_token());
    }

    #[test]
    fn test_token_type_enforcement() {
        let service = create_test_service();
        let pair = service.issue_pair(Uuid::new_v4(), Uuid::new_v4(), Vec::new()).unwrap();

        assert!(service.validate_access_token(&pair.refresh_token).is_err());
        assert!(service.validate_refresh_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let service = create_test_service();
        let other = JwtService::new("test-secret-key-that-is-long-enough", "other-issuer", 900, 900);

        let pair = other.issue_pair(Uuid::new_v4(), Uuid::new_v4(), Vec::new()).unwrap();
        let result = service.decode_token(&pair.access_token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        let result = service.decode_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_to_principal() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();
        let pair = service
            .issue_pair(user_id, Uuid::new_v4(), vec!["Permissions.Roles.View".to_string()])
            .unwrap();

        let claims = service.validate_access_token(&pair.access_token).unwrap();
        let principal = claims.to_principal().unwrap();

        assert_eq!(principal.subject, Some(user_id));
        assert!(principal.has_permission("Permissions.Roles.View", ISSUER));
        assert!(!principal.has_permission("Permissions.Roles.View", "other-issuer"));
    }

    #[test]
    fn test_expires_within() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iss: ISSUER.to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 30,
            token_type: TokenType::Access,
            permissions: Vec::new(),
            stamp: None,
        };
        assert!(claims.expires_within(60));
        assert!(!claims.expires_within(10));
    }

    #[test]
    fn test_decode_expired_reads_claims() {
        let service = create_test_service();
        // Past the default 60s leeway
        let expired = JwtService::new("test-secret-key-that-is-long-enough", ISSUER, -300, 900);

        let pair = expired.issue_pair(Uuid::new_v4(), Uuid::new_v4(), Vec::new()).unwrap();
        assert!(matches!(
            service.decode_token(&pair.access_token),
            Err(AppError::TokenExpired)
        ));
        assert!(service.decode_expired(&pair.access_token).is_ok());
    }
}
