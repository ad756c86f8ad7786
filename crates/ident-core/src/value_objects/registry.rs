//! Permission registry
//!
//! Explicit registry of known permission strings, populated by registration
//! calls at startup and read-only afterwards (shared behind an `Arc`).

use std::collections::BTreeSet;

/// Registry of permission strings the system recognizes
#[derive(Debug, Clone, Default)]
pub struct PermissionRegistry {
    values: BTreeSet<String>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in module permissions
    pub fn defaults() -> Self {
        let mut registry = Self::new();
        for module in ["Users", "Roles"] {
            for op in ["View", "Create", "Edit", "Delete", "Search"] {
                registry.register(format!("Permissions.{module}.{op}"));
            }
        }
        for op in ["View", "Edit"] {
            registry.register(format!("Permissions.RoleClaims.{op}"));
        }
        for op in ["View", "Search", "Delete"] {
            registry.register(format!("Permissions.AuditTrails.{op}"));
        }
        registry
    }

    /// Register a permission string; idempotent
    pub fn register(&mut self, permission: impl Into<String>) {
        self.values.insert(permission.into());
    }

    /// Whether the registry knows this permission string (exact match)
    pub fn contains(&self, permission: &str) -> bool {
        self.values.contains(permission)
    }

    /// All registered permission strings, sorted
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_contain_module_permissions() {
        let registry = PermissionRegistry::defaults();
        assert!(registry.contains("Permissions.Users.Create"));
        assert!(registry.contains("Permissions.Roles.Delete"));
        assert!(registry.contains("Permissions.RoleClaims.Edit"));
        assert!(registry.contains("Permissions.AuditTrails.View"));
        assert!(!registry.contains("Permissions.Users"));
        assert!(!registry.contains("permissions.users.create"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = PermissionRegistry::new();
        registry.register("Permissions.Widgets.View");
        registry.register("Permissions.Widgets.View");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_all_is_sorted() {
        let mut registry = PermissionRegistry::new();
        registry.register("Permissions.B.View");
        registry.register("Permissions.A.View");
        let all: Vec<_> = registry.all().collect();
        assert_eq!(all, vec!["Permissions.A.View", "Permissions.B.View"]);
    }
}
