//! View-layer guards.
//!
//! Pure predicates deciding whether a piece of UI may be shown to the current
//! identity. They carry no rendering logic; a view layer maps the outcome to
//! whatever it draws.

use serde::Serialize;

use crate::evaluator::MatchMode;
use crate::identity::Identity;
use crate::permission::Permission;

/// Guard over a subtree, combining an optional role list and an optional permission list.
///
/// An empty list imposes no constraint. Without an identity the guard never permits.
///
/// # Examples
///
/// ```
/// use tracce_common::{known, RoleGuard, RoleRegistry};
/// use uuid::Uuid;
///
/// let registry = RoleRegistry::builtin();
/// let farmer = registry.resolve(Uuid::new_v4(), "farmer");
///
/// let guard = RoleGuard::new().permissions([known::SUPPLY_CHAIN_FARMED_WRITE]);
/// assert_eq!(guard.render(Some(&farmer), "form", "locked"), "form");
/// assert_eq!(guard.render(None, "form", "locked"), "locked");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoleGuard {
    allowed_roles: Vec<String>,
    allowed_permissions: Vec<Permission>,
    match_mode: MatchMode,
}

impl RoleGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.allowed_permissions = permissions.into_iter().collect();
        self
    }

    /// Require every listed permission instead of any one.
    #[must_use]
    pub fn require_all(mut self) -> Self {
        self.match_mode = MatchMode::All;
        self
    }

    #[must_use]
    pub fn permits(&self, identity: Option<&Identity>) -> bool {
        let Some(identity) = identity else {
            return false;
        };

        let role_ok = self.allowed_roles.is_empty() || identity.has_role(&self.allowed_roles);
        let permission_ok = self.allowed_permissions.is_empty()
            || identity.has_any(&self.allowed_permissions, self.match_mode);

        role_ok && permission_ok
    }

    /// Return `content` when permitted, otherwise `fallback`.
    pub fn render<T>(&self, identity: Option<&Identity>, content: T, fallback: T) -> T {
        if self.permits(identity) {
            content
        } else {
            fallback
        }
    }

    /// Return `Some(content)` when permitted, otherwise nothing.
    pub fn render_or_hide<T>(&self, identity: Option<&Identity>, content: T) -> Option<T> {
        self.permits(identity).then_some(content)
    }
}

/// Outcome of a [`ProtectedView`] check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewDecision {
    /// No identity; the view should prompt for sign-in.
    AuthenticationRequired,
    /// Identity lacks the named permission.
    AccessDenied { required: String },
    /// Identity holds a different role than the one required.
    RoleRequired { required: String, current: String },
    Granted,
}

impl ViewDecision {
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Page-level guard: an optional required permission and an optional required role.
///
/// Checks run in order: authentication, then permission, then role.
#[derive(Debug, Clone, Default)]
pub struct ProtectedView {
    required_permission: Option<Permission>,
    required_role: Option<String>,
}

impl ProtectedView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn permission(mut self, permission: Permission) -> Self {
        self.required_permission = Some(permission);
        self
    }

    #[must_use]
    pub fn role(mut self, role_id: impl Into<String>) -> Self {
        self.required_role = Some(role_id.into());
        self
    }

    #[must_use]
    pub fn check(&self, identity: Option<&Identity>) -> ViewDecision {
        let Some(identity) = identity else {
            return ViewDecision::AuthenticationRequired;
        };

        if let Some(required) = &self.required_permission {
            if !identity.has_permission(required.as_str()) {
                return ViewDecision::AccessDenied {
                    required: required.to_string(),
                };
            }
        }

        if let Some(required) = &self.required_role {
            if identity.role.id != *required {
                return ViewDecision::RoleRequired {
                    required: required.clone(),
                    current: identity.role.name.clone(),
                };
            }
        }

        ViewDecision::Granted
    }
}
