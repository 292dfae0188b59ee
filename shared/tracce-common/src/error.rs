//! Error types for the access-control model.

use thiserror::Error;

/// Reasons a permission string is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionParseError {
    /// The input was empty.
    #[error("permission must not be empty")]
    Empty,

    /// A dot-separated segment was empty (`a..b`, `.a`, `a.`).
    #[error("permission '{0}' contains an empty segment")]
    EmptySegment(String),

    /// `*` appeared anywhere other than the final segment.
    #[error("permission '{0}' has a wildcard before its final segment")]
    MisplacedWildcard(String),

    /// A segment contained a character outside `[a-z0-9_]`.
    #[error("permission '{permission}' contains invalid character '{character}'")]
    InvalidCharacter { permission: String, character: char },
}

/// Errors raised while building a role table.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two roles share the same id.
    #[error("duplicate role id '{0}'")]
    DuplicateRole(String),

    /// A role id was empty.
    #[error("role id must not be empty")]
    EmptyRoleId,

    /// The role table could not be parsed.
    #[error("invalid role table: {0}")]
    Parse(#[from] serde_json::Error),
}
