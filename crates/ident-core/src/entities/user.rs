//! User entity - an identity console account

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audit::Auditable;

/// User account
///
/// The password hash lives at the repository layer only; it is never part of
/// the entity and therefore never reaches an audit snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
    /// Rotated to invalidate every outstanding session for this user
    pub security_stamp: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: Uuid, email: String, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            display_name,
            is_active: true,
            security_stamp: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    /// Force every session of this user to re-authenticate
    pub fn rotate_security_stamp(&mut self) {
        self.security_stamp = Uuid::new_v4();
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.rotate_security_stamp();
    }

    pub fn set_display_name(&mut self, display_name: String) {
        self.display_name = display_name;
        self.updated_at = Utc::now();
    }

    pub fn set_email(&mut self, email: String) {
        self.email = email;
        self.updated_at = Utc::now();
    }
}

impl Auditable for User {
    const TABLE_NAME: &'static str = "Users";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_active() {
        let user = User::new(Uuid::new_v4(), "a@example.com".into(), "Alice".into());
        assert!(user.is_active);
        assert!(user.last_login.is_none());
    }

    #[test]
    fn test_rotate_security_stamp_changes_stamp() {
        let mut user = User::new(Uuid::new_v4(), "a@example.com".into(), "Alice".into());
        let stamp = user.security_stamp;
        user.rotate_security_stamp();
        assert_ne!(user.security_stamp, stamp);
    }

    #[test]
    fn test_deactivate_rotates_stamp() {
        let mut user = User::new(Uuid::new_v4(), "a@example.com".into(), "Alice".into());
        let stamp = user.security_stamp;
        user.deactivate();
        assert!(!user.is_active);
        assert_ne!(user.security_stamp, stamp);
    }
}
