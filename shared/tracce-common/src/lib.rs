//! TracceAqua Common Library
//!
//! Access-control model shared by the server and the client:
//! roles, permission strings, the permission evaluator, identities and view guards.

pub mod error;
pub mod evaluator;
pub mod guard;
pub mod identity;
pub mod permission;
pub mod role;

pub use error::{PermissionParseError, RegistryError};
pub use evaluator::{is_allowed, is_allowed_any, MatchMode};
pub use guard::{ProtectedView, RoleGuard, ViewDecision};
pub use identity::Identity;
pub use permission::{known, Permission, PermissionSet, GLOBAL_WILDCARD};
pub use role::{Role, RoleRegistry, ADMIN_ROLE, DEFAULT_ROLE};
