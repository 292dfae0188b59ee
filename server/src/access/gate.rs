//! Gate evaluation.

use std::fmt;

use tracce_common::{is_allowed, is_allowed_any, Identity, MatchMode, Permission};

/// What a guarded operation demands of its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Any authenticated identity.
    Authenticated,
    /// A single permission.
    Permission(Permission),
    /// At least one of the listed permissions.
    AnyOf(Vec<Permission>),
    /// Every listed permission.
    AllOf(Vec<Permission>),
    /// One of the listed role ids. An empty list admits any identity.
    Role(Vec<String>),
}

impl Requirement {
    /// Whether `identity` satisfies this requirement.
    #[must_use]
    pub fn is_met_by(&self, identity: &Identity) -> bool {
        let held = &identity.role.permissions;
        match self {
            Self::Authenticated => true,
            Self::Permission(permission) => is_allowed(held, permission.as_str()),
            Self::AnyOf(permissions) => is_allowed_any(held, permissions, MatchMode::Any),
            Self::AllOf(permissions) => is_allowed_any(held, permissions, MatchMode::All),
            Self::Role(roles) => roles.is_empty() || identity.has_role(roles),
        }
    }
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated => f.write_str("authenticated"),
            Self::Permission(permission) => write!(f, "{permission}"),
            Self::AnyOf(permissions) => f.write_str(&join(permissions, " | ")),
            Self::AllOf(permissions) => f.write_str(&join(permissions, " & ")),
            Self::Role(roles) => write!(f, "role {}", join(roles, " | ")),
        }
    }
}

impl From<Permission> for Requirement {
    fn from(permission: Permission) -> Self {
        Self::Permission(permission)
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Unauthenticated,
    /// `required` names what was missing, for the response message.
    Forbidden { required: String },
    Allowed,
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decide whether `identity` may pass a gate guarded by `requirement`.
#[must_use]
pub fn evaluate(identity: Option<&Identity>, requirement: &Requirement) -> Decision {
    let Some(identity) = identity else {
        return Decision::Unauthenticated;
    };

    if requirement.is_met_by(identity) {
        Decision::Allowed
    } else {
        Decision::Forbidden {
            required: requirement.to_string(),
        }
    }
}
