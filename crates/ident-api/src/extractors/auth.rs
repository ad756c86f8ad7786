//! Authentication extractor
//!
//! Pulls the bearer token from the Authorization header and decodes it
//! leniently: signature and issuer are enforced here, expiry is left to the
//! session-aware evaluator so the refresh path can run.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use ident_core::Principal;
use uuid::Uuid;

use crate::response::ApiError;
use crate::state::AppState;

/// The authenticated caller of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    user_id: Uuid,
    principal: Principal,
    token: String,
}

impl CurrentUser {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Raw bearer token, for the session-aware evaluator
    pub fn token(&self) -> &str {
        &self.token
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        // Expiry is checked later by the evaluator; bad signatures stop here
        let claims = app_state
            .jwt_service()
            .decode_expired(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected bearer token");
                ApiError::InvalidAuthFormat
            })?;

        if !claims.is_access_token() {
            return Err(ApiError::InvalidAuthFormat);
        }

        let principal = claims.to_principal().map_err(|e| {
            tracing::warn!(error = %e, "Invalid subject in token");
            ApiError::InvalidAuthFormat
        })?;
        let user_id = principal.subject.ok_or(ApiError::InvalidAuthFormat)?;

        Ok(CurrentUser {
            user_id,
            principal,
            token: bearer.token().to_string(),
        })
    }
}
