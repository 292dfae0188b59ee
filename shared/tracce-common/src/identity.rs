//! Authenticated subjects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluator::{is_allowed, is_allowed_any, MatchMode};
use crate::role::Role;

/// A user id paired with its resolved [`Role`].
///
/// Built by [`RoleRegistry::resolve`](crate::RoleRegistry::resolve). The role is a
/// snapshot; a changed assignment is only seen once the identity is resolved again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub const fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub fn has_permission(&self, required: &str) -> bool {
        is_allowed(&self.role.permissions, required)
    }

    #[must_use]
    pub fn has_any<S: AsRef<str>>(&self, required: &[S], mode: MatchMode) -> bool {
        is_allowed_any(&self.role.permissions, required, mode)
    }

    /// Whether the role id is one of `allowed`.
    #[must_use]
    pub fn has_role<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        allowed.iter().any(|id| id.as_ref() == self.role.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::RoleRegistry;

    #[test]
    fn test_researcher_identity() {
        let registry = RoleRegistry::builtin();
        let identity = registry.resolve(Uuid::new_v4(), "researcher");

        assert!(identity.has_permission("conservation.read"));
        assert!(!identity.has_permission("qr.scan"));
        assert!(identity.has_any(&["qr.scan", "data.export"], MatchMode::Any));
        assert!(!identity.has_any(&["qr.scan", "data.export"], MatchMode::All));
    }

    #[test]
    fn test_has_role() {
        let registry = RoleRegistry::builtin();
        let identity = registry.resolve(Uuid::new_v4(), "farmer");

        assert!(identity.has_role(&["fisherman", "farmer"]));
        assert!(!identity.has_role(&["admin"]));
        assert!(!identity.has_role::<&str>(&[]));
    }
}
