//! User entity <-> model mapper

use ident_core::entities::User;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            is_active: model.is_active,
            security_stamp: model.security_stamp,
            created_at: model.created_at,
            updated_at: model.updated_at,
            last_login: model.last_login,
        }
    }
}
