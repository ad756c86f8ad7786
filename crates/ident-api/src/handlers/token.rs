//! Token handlers
//!
//! Anonymous-accessible credential and refresh-token exchange.

use axum::extract::State;
use ident_service::{RefreshRequest, TokenRequest, TokenResponse, TokenService};

use crate::extractors::ValidatedJson;
use crate::response::{respond, ApiResult};
use crate::state::AppState;

/// Exchange credentials for a token pair
///
/// POST /api/token
pub async fn issue_token(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TokenRequest>,
) -> ApiResult<TokenResponse> {
    let service = TokenService::new(state.service_context());
    respond(service.issue(request).await)
}

/// Exchange a refresh token for a new pair
///
/// POST /api/token/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    axum::Json(request): axum::Json<RefreshRequest>,
) -> ApiResult<TokenResponse> {
    let service = TokenService::new(state.service_context());
    respond(service.refresh(request).await)
}
