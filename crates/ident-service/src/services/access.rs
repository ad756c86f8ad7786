//! Permission evaluation
//!
//! Decides whether a principal holds a required permission. Two variants:
//! a pure claim-set check, and a session-aware check that re-validates the
//! user and attempts one refresh-token exchange before failing closed.
//!
//! The evaluator never returns an error: every failure condition, including
//! infrastructure trouble, resolves to a denial.

use tracing::{debug, instrument, warn};

use ident_core::Principal;

use super::context::ServiceContext;
use super::token::TokenService;

/// Why an access check was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Principal carries no claims
    Unauthenticated,
    /// The user must fully re-authenticate (deactivated, removed, or
    /// security stamp rotated)
    ReauthenticationRequired,
    /// A refresh succeeded; the caller must retry with the new tokens.
    /// The in-flight request is still denied.
    ReloadRequired,
    /// The refresh exchange failed; the session is over
    SessionExpired,
    /// Claims are valid but do not grant the required permission
    NotPermitted,
    /// The check itself could not be completed; denied fail-closed
    EvaluationFailed,
}

impl DenyReason {
    pub fn code(self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::ReauthenticationRequired => "REAUTHENTICATION_REQUIRED",
            Self::ReloadRequired => "RELOAD_REQUIRED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::NotPermitted => "NOT_PERMITTED",
            Self::EvaluationFailed => "EVALUATION_FAILED",
        }
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied(DenyReason),
}

impl AccessDecision {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Claims-based permission evaluator
pub struct PermissionEvaluator<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionEvaluator<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Simple variant: match the claim set against the requirement
    ///
    /// Grants iff the principal carries a `"Permission"` claim whose value
    /// equals `required` exactly and whose issuer is the trusted issuer.
    #[instrument(skip(self, principal))]
    pub fn evaluate(&self, principal: &Principal, required: &str) -> AccessDecision {
        if !principal.is_authenticated() {
            return AccessDecision::Denied(DenyReason::Unauthenticated);
        }

        if !self.ctx.registry().contains(required) {
            warn!(permission = required, "Requirement is not a registered permission");
            return AccessDecision::Denied(DenyReason::NotPermitted);
        }

        if principal.has_permission(required, self.ctx.jwt_service().issuer()) {
            AccessDecision::Granted
        } else {
            debug!(permission = required, "Claim set does not grant requirement");
            AccessDecision::Denied(DenyReason::NotPermitted)
        }
    }

    /// Session-aware variant: re-validate the session, refresh once if the
    /// access token is expired or about to expire, then check the claim
    ///
    /// A successful refresh caches the new pair and still denies the current
    /// check with [`DenyReason::ReloadRequired`]; the pass/fail of a refresh
    /// never retroactively validates the in-flight request.
    #[instrument(skip(self, access_token))]
    pub async fn evaluate_session(&self, access_token: &str, required: &str) -> AccessDecision {
        // Signature and issuer must hold even if the token is expired
        let claims = match self.ctx.jwt_service().decode_expired(access_token) {
            Ok(claims) if claims.is_access_token() => claims,
            _ => return AccessDecision::Denied(DenyReason::Unauthenticated),
        };

        let principal = match claims.to_principal() {
            Ok(principal) if principal.is_authenticated() => principal,
            _ => return AccessDecision::Denied(DenyReason::Unauthenticated),
        };
        let Some(user_id) = principal.subject else {
            return AccessDecision::Denied(DenyReason::Unauthenticated);
        };

        // Forced re-authentication: removed, deactivated, or stamp rotated
        let user = match self.ctx.user_repo().find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return AccessDecision::Denied(DenyReason::ReauthenticationRequired),
            Err(e) => {
                warn!(error = %e, "User lookup failed during access check");
                return AccessDecision::Denied(DenyReason::EvaluationFailed);
            }
        };
        let stamp_ok = claims.stamp.as_deref() == Some(user.security_stamp.to_string().as_str());
        if !user.is_active || !stamp_ok {
            return AccessDecision::Denied(DenyReason::ReauthenticationRequired);
        }

        // Expired or near-expiry: one refresh attempt, then deny either way
        if claims.is_expired() || claims.expires_within(self.ctx.refresh_window()) {
            return self.attempt_refresh(user_id).await;
        }

        self.evaluate(&principal, required)
    }

    /// Refresh-token exchange for the session's user
    ///
    /// Success caches the new pair and denies with `ReloadRequired`; failure
    /// clears the cached pair and denies with `SessionExpired`.
    async fn attempt_refresh(&self, user_id: uuid::Uuid) -> AccessDecision {
        let cached = match self.ctx.token_store().cached_tokens(user_id).await {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                debug!(user_id = %user_id, "No cached refresh token for expired session");
                return AccessDecision::Denied(DenyReason::SessionExpired);
            }
            Err(e) => {
                warn!(error = %e, "Token cache unavailable during refresh");
                return AccessDecision::Denied(DenyReason::EvaluationFailed);
            }
        };

        let token_service = TokenService::new(self.ctx);
        match token_service
            .refresh(crate::dto::RefreshRequest {
                refresh_token: cached.refresh_token,
            })
            .await
        {
            Ok(_) => {
                debug!(user_id = %user_id, "Session refreshed; caller must reload");
                AccessDecision::Denied(DenyReason::ReloadRequired)
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Refresh exchange failed");
                if let Err(e) = self.ctx.token_store().clear_cached_tokens(user_id).await {
                    warn!(error = %e, "Failed to clear cached tokens");
                }
                AccessDecision::Denied(DenyReason::SessionExpired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;
    use ident_core::{Claim, User};
    use uuid::Uuid;

    const ISSUER: &str = "ident-test";

    fn principal_with(permission: &str, issuer: &str) -> Principal {
        Principal::new(Uuid::new_v4(), vec![Claim::permission(permission, issuer)])
    }

    #[tokio::test]
    async fn test_exact_claim_is_granted() {
        let (ctx, _backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let principal = principal_with("Permissions.Users.Create", ISSUER);
        let decision = evaluator.evaluate(&principal, "Permissions.Users.Create");
        assert!(decision.is_granted());
    }

    #[tokio::test]
    async fn test_wrong_issuer_is_denied() {
        let (ctx, _backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let principal = principal_with("Permissions.Users.Create", "https://other.example");
        let decision = evaluator.evaluate(&principal, "Permissions.Users.Create");
        assert_eq!(decision, AccessDecision::Denied(DenyReason::NotPermitted));
    }

    #[tokio::test]
    async fn test_no_claims_is_unauthenticated() {
        let (ctx, _backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let decision = evaluator.evaluate(&Principal::anonymous(), "Permissions.Users.Create");
        assert_eq!(decision, AccessDecision::Denied(DenyReason::Unauthenticated));
    }

    #[tokio::test]
    async fn test_unregistered_permission_is_denied() {
        let (ctx, _backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let principal = principal_with("Permissions.Nonexistent.Op", ISSUER);
        let decision = evaluator.evaluate(&principal, "Permissions.Nonexistent.Op");
        assert_eq!(decision, AccessDecision::Denied(DenyReason::NotPermitted));
    }

    #[tokio::test]
    async fn test_different_permission_is_denied() {
        let (ctx, _backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let principal = principal_with("Permissions.Users.View", ISSUER);
        let decision = evaluator.evaluate(&principal, "Permissions.Users.Create");
        assert_eq!(decision, AccessDecision::Denied(DenyReason::NotPermitted));
    }

    #[tokio::test]
    async fn test_session_with_garbage_token_is_unauthenticated() {
        let (ctx, _backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let decision = evaluator
            .evaluate_session("not.a.jwt", "Permissions.Users.View")
            .await;
        assert_eq!(decision, AccessDecision::Denied(DenyReason::Unauthenticated));
    }

    #[tokio::test]
    async fn test_session_of_removed_user_requires_reauth() {
        let (ctx, _backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        // Token for a user the repository has never seen
        let pair = ctx
            .jwt_service()
            .issue_pair(
                Uuid::new_v4(),
                Uuid::new_v4(),
                vec!["Permissions.Users.View".to_string()],
            )
            .unwrap();

        let decision = evaluator
            .evaluate_session(&pair.access_token, "Permissions.Users.View")
            .await;
        assert_eq!(
            decision,
            AccessDecision::Denied(DenyReason::ReauthenticationRequired)
        );
    }

    #[tokio::test]
    async fn test_session_with_rotated_stamp_requires_reauth() {
        let (ctx, backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let user = User::new(Uuid::new_v4(), "a@example.com".into(), "Alice".into());
        let old_stamp = Uuid::new_v4();
        backend.users.insert(user.clone(), "hash");

        let pair = ctx
            .jwt_service()
            .issue_pair(user.id, old_stamp, vec!["Permissions.Users.View".to_string()])
            .unwrap();

        let decision = evaluator
            .evaluate_session(&pair.access_token, "Permissions.Users.View")
            .await;
        assert_eq!(
            decision,
            AccessDecision::Denied(DenyReason::ReauthenticationRequired)
        );
    }

    #[tokio::test]
    async fn test_session_of_deactivated_user_requires_reauth() {
        let (ctx, backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let mut user = User::new(Uuid::new_v4(), "a@example.com".into(), "Alice".into());
        user.is_active = false;
        backend.users.insert(user.clone(), "hash");

        let pair = ctx
            .jwt_service()
            .issue_pair(
                user.id,
                user.security_stamp,
                vec!["Permissions.Users.View".to_string()],
            )
            .unwrap();

        let decision = evaluator
            .evaluate_session(&pair.access_token, "Permissions.Users.View")
            .await;
        assert_eq!(
            decision,
            AccessDecision::Denied(DenyReason::ReauthenticationRequired)
        );
    }

    #[tokio::test]
    async fn test_valid_session_with_claim_is_granted() {
        let (ctx, backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let user = User::new(Uuid::new_v4(), "a@example.com".into(), "Alice".into());
        backend.users.insert(user.clone(), "hash");

        let pair = ctx
            .jwt_service()
            .issue_pair(
                user.id,
                user.security_stamp,
                vec!["Permissions.Users.View".to_string()],
            )
            .unwrap();

        let decision = evaluator
            .evaluate_session(&pair.access_token, "Permissions.Users.View")
            .await;
        assert!(decision.is_granted());
    }

    #[tokio::test]
    async fn test_valid_session_without_claim_is_not_permitted() {
        let (ctx, backend) = test_context();
        let evaluator = PermissionEvaluator::new(&ctx);

        let user = User::new(Uuid::new_v4(), "a@example.com".into(), "Alice".into());
        backend.users.insert(user.clone(), "hash");

        let pair = ctx
            .jwt_service()
            .issue_pair(
                user.id,
                user.security_stamp,
                vec!["Permissions.Users.View".to_string()],
            )
            .unwrap();

        let decision = evaluator
            .evaluate_session(&pair.access_token, "Permissions.Users.Delete")
            .await;
        assert_eq!(decision, AccessDecision::Denied(DenyReason::NotPermitted));
    }

    #[test]
    fn test_deny_reason_codes() {
        assert_eq!(DenyReason::ReloadRequired.code(), "RELOAD_REQUIRED");
        assert_eq!(DenyReason::SessionExpired.code(), "SESSION_EXPIRED");
        assert!(!AccessDecision::Denied(DenyReason::NotPermitted).is_granted());
    }
}
