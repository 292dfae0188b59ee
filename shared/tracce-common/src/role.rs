//! Roles and the role registry.
//!
//! The registry is built once at startup and only read afterwards. It is
//! passed to whoever needs it rather than living in a global, so tests can
//! substitute an alternate table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistryError;
use crate::evaluator::is_allowed;
use crate::identity::Identity;
use crate::permission::{known, Permission, PermissionSet};

/// Id of the global administrator role.
pub const ADMIN_ROLE: &str = "admin";

/// Id of the role given to newly registered users.
pub const DEFAULT_ROLE: &str = "consumer";

/// Named bundle of permissions with a privilege level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable key, e.g. `farmer`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Higher is more privileged; unknown roles sit at 0.
    pub level: u8,
    /// Granted permissions.
    pub permissions: PermissionSet,
    #[serde(default)]
    pub description: String,
}

impl Role {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        level: u8,
        permissions: impl IntoIterator<Item = Permission>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            permissions: permissions.into_iter().collect(),
            description: description.into(),
        }
    }

    /// Placeholder for a role id missing from the registry: level 0, no permissions.
    #[must_use]
    pub fn unresolved(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            level: 0,
            permissions: PermissionSet::empty(),
            description: String::new(),
        }
    }

    /// Whether this role holds the global sentinel.
    #[must_use]
    pub fn is_global_admin(&self) -> bool {
        self.permissions.is_global()
    }

    #[must_use]
    pub fn allows(&self, required: &str) -> bool {
        is_allowed(&self.permissions, required)
    }
}

/// Immutable mapping from role id to [`Role`].
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: HashMap<String, Role>,
    empty: PermissionSet,
}

impl RoleRegistry {
    /// Build a registry, rejecting duplicate or empty ids.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Result<Self, RegistryError> {
        let mut table = HashMap::new();
        for role in roles {
            if role.id.is_empty() {
                return Err(RegistryError::EmptyRoleId);
            }
            if table.contains_key(&role.id) {
                return Err(RegistryError::DuplicateRole(role.id));
            }
            table.insert(role.id.clone(), role);
        }

        Ok(Self {
            roles: table,
            empty: PermissionSet::empty(),
        })
    }

    /// Parse a JSON array of roles.
    ///
    /// Permission strings are validated while deserializing.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let roles: Vec<Role> = serde_json::from_str(json)?;
        Self::new(roles)
    }

    /// The application's built-in role table.
    #[must_use]
    pub fn builtin() -> Self {
        let roles = builtin_roles()
            .into_iter()
            .map(|role| (role.id.clone(), role))
            .collect();

        Self {
            roles,
            empty: PermissionSet::empty(),
        }
    }

    /// Look up a role by id.
    #[must_use]
    pub fn lookup(&self, role_id: &str) -> Option<&Role> {
        self.roles.get(role_id)
    }

    /// Permissions for a role id, or the empty set if the id is unknown.
    #[must_use]
    pub fn permissions_of(&self, role_id: &str) -> &PermissionSet {
        match self.lookup(role_id) {
            Some(role) => &role.permissions,
            None => {
                tracing::warn!(role_id = %role_id, "Unknown role, treating as no permissions");
                &self.empty
            }
        }
    }

    /// Level for a role id, or 0 if the id is unknown.
    #[must_use]
    pub fn level_of(&self, role_id: &str) -> u8 {
        self.lookup(role_id).map_or(0, |role| role.level)
    }

    #[must_use]
    pub fn contains(&self, role_id: &str) -> bool {
        self.roles.contains_key(role_id)
    }

    /// The role given to newly registered users, if this table defines it.
    #[must_use]
    pub fn default_role(&self) -> Option<&Role> {
        self.lookup(DEFAULT_ROLE)
    }

    /// Resolve a stored role assignment into an [`Identity`].
    ///
    /// Unknown role ids resolve to [`Role::unresolved`], never to an error.
    #[must_use]
    pub fn resolve(&self, user_id: Uuid, role_id: &str) -> Identity {
        let role = self.lookup(role_id).cloned().unwrap_or_else(|| {
            tracing::warn!(%user_id, role_id = %role_id, "Unknown role, identity has no permissions");
            Role::unresolved(role_id)
        });
        Identity::new(user_id, role)
    }

    /// Whether a holder of `manager_role` may manage a holder of `target_role`.
    ///
    /// Global admins manage anyone; otherwise a strictly higher level is required.
    /// Unknown manager roles manage nobody.
    #[must_use]
    pub fn can_manage(&self, manager_role: &str, target_role: &str) -> bool {
        let Some(manager) = self.lookup(manager_role) else {
            return false;
        };
        if manager.is_global_admin() {
            return true;
        }
        manager.level > self.level_of(target_role)
    }

    /// Roles sorted by descending level, then id.
    #[must_use]
    pub fn roles(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.values().collect();
        roles.sort_by(|a, b| b.level.cmp(&a.level).then_with(|| a.id.cmp(&b.id)));
        roles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_roles() -> Vec<Role> {
    vec![
        Role::new(
            ADMIN_ROLE,
            "Administrator",
            3,
            [known::ADMIN_ALL],
            "Full system access and user management",
        ),
        Role::new(
            "researcher",
            "Researcher",
            2,
            [
                known::CONSERVATION_READ,
                known::CONSERVATION_WRITE,
                known::ANALYTICS_READ,
                known::DATA_EXPORT,
            ],
            "Conservation data collection and analysis",
        ),
        Role::new(
            "farmer",
            "Farmer",
            2,
            [
                known::SUPPLY_CHAIN_FARMED_WRITE,
                known::SUPPLY_CHAIN_READ,
                known::PRODUCTS_CREATE,
            ],
            "Aquaculture operations and farming data",
        ),
        Role::new(
            "fisherman",
            "Fisherman",
            2,
            [
                known::SUPPLY_CHAIN_WILD_CAPTURE_WRITE,
                known::SUPPLY_CHAIN_READ,
                known::PRODUCTS_CREATE,
            ],
            "Wild capture operations and fishing data",
        ),
        Role::new(
            "processor",
            "Processor",
            2,
            [
                known::SUPPLY_CHAIN_PROCESSING_WRITE,
                known::SUPPLY_CHAIN_READ,
                known::QUALITY_MANAGE,
            ],
            "Processing operations and quality control",
        ),
        Role::new(
            "trader",
            "Trader/Distributor",
            2,
            [
                known::SUPPLY_CHAIN_DISTRIBUTION_WRITE,
                known::SUPPLY_CHAIN_READ,
                known::LOGISTICS_MANAGE,
            ],
            "Distribution and logistics management",
        ),
        Role::new(
            "retailer",
            "Retailer",
            2,
            [
                known::SUPPLY_CHAIN_RETAIL_WRITE,
                known::SUPPLY_CHAIN_READ,
                known::SALES_MANAGE,
            ],
            "Retail operations and sales management",
        ),
        Role::new(
            DEFAULT_ROLE,
            "Consumer",
            1,
            [known::TRACEABILITY_READ, known::QR_SCAN],
            "Product traceability and transparency access",
        ),
    ]
}
