//! Claims attached to an authenticated principal
//!
//! A claim is a (type, value, issuer) triple. Permission checks match on the
//! `"Permission"` claim type with exact string equality on the value; the
//! issuer must equal the configured trusted issuer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claim type carried by permission claims
pub const PERMISSION_CLAIM_TYPE: &str = "Permission";

/// A single claim on a principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
    pub issuer: String,
}

impl Claim {
    pub fn new(
        claim_type: impl Into<String>,
        value: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            issuer: issuer.into(),
        }
    }

    /// Build a permission claim for the given permission string
    pub fn permission(value: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self::new(PERMISSION_CLAIM_TYPE, value, issuer)
    }

    /// Whether this claim grants `permission` when issued by `trusted_issuer`
    ///
    /// Exact string match on the value; dot-delimited permission tokens are
    /// never prefix-matched.
    pub fn grants(&self, permission: &str, trusted_issuer: &str) -> bool {
        self.claim_type == PERMISSION_CLAIM_TYPE
            && self.value == permission
            && self.issuer == trusted_issuer
    }
}

/// An authenticated principal: optional subject id plus its claim set
#[derive(Debug, Clone, Default)]
pub struct Principal {
    pub subject: Option<Uuid>,
    pub claims: Vec<Claim>,
}

impl Principal {
    pub fn new(subject: Uuid, claims: Vec<Claim>) -> Self {
        Self {
            subject: Some(subject),
            claims,
        }
    }

    /// Principal with no claims; always denied by the evaluator
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A principal with zero claims is treated as unauthenticated
    pub fn is_authenticated(&self) -> bool {
        !self.claims.is_empty()
    }

    /// Whether the claim set grants `permission` from `trusted_issuer`
    pub fn has_permission(&self, permission: &str, trusted_issuer: &str) -> bool {
        self.claims.iter().any(|c| c.grants(permission, trusted_issuer))
    }

    /// All permission values carried by this principal, issuer-filtered
    pub fn permission_values(&self, trusted_issuer: &str) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|c| c.claim_type == PERMISSION_CLAIM_TYPE && c.issuer == trusted_issuer)
            .map(|c| c.value.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "https://ident.example";

    #[test]
    fn test_claim_grants_exact_match() {
        let claim = Claim::permission("Permissions.Users.Create", ISSUER);
        assert!(claim.grants("Permissions.Users.Create", ISSUER));
        assert!(!claim.grants("Permissions.Users.Delete", ISSUER));
    }

    #[test]
    fn test_claim_denies_prefix_match() {
        let claim = Claim::permission("Permissions.Users", ISSUER);
        assert!(!claim.grants("Permissions.Users.Create", ISSUER));
        let claim = Claim::permission("Permissions.Users.Create", ISSUER);
        assert!(!claim.grants("Permissions.Users", ISSUER));
    }

    #[test]
    fn test_claim_denies_wrong_issuer() {
        let claim = Claim::permission("Permissions.Users.Create", "https://other.example");
        assert!(!claim.grants("Permissions.Users.Create", ISSUER));
    }

    #[test]
    fn test_claim_denies_wrong_type() {
        let claim = Claim::new("Role", "Permissions.Users.Create", ISSUER);
        assert!(!claim.grants("Permissions.Users.Create", ISSUER));
    }

    #[test]
    fn test_principal_with_no_claims_is_unauthenticated() {
        let principal = Principal::anonymous();
        assert!(!principal.is_authenticated());
        assert!(!principal.has_permission("Permissions.Users.Create", ISSUER));
    }

    #[test]
    fn test_principal_permission_values_filters_issuer() {
        let principal = Principal::new(
            Uuid::new_v4(),
            vec![
                Claim::permission("Permissions.Users.View", ISSUER),
                Claim::permission("Permissions.Roles.View", "https://other.example"),
                Claim::new("Name", "alice", ISSUER),
            ],
        );
        assert_eq!(principal.permission_values(ISSUER), vec!["Permissions.Users.View"]);
    }
}
