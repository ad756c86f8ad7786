//! Role entity <-> model mapper

use ident_core::entities::Role;

use crate::models::RoleModel;

impl From<RoleModel> for Role {
    fn from(model: RoleModel) -> Self {
        Role {
            id: model.id,
            name: model.name,
            description: model.description,
            is_system: model.is_system,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
