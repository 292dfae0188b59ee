//! Permission identifiers.
//!
//! A permission is a dot-delimited capability path such as
//! `supply_chain.farmed.write`. Two wildcard forms exist:
//! - `*` alone grants every permission (global admin)
//! - a trailing `*` segment (`supply_chain.*`) grants everything under that prefix
//!
//! Strings are validated once, at the boundary, by [`Permission::parse`].

use std::borrow::{Borrow, Cow};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PermissionParseError;

/// The global sentinel.
pub const GLOBAL_WILDCARD: &str = "*";

/// Validated, dot-hierarchical permission identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// The global admin permission `*`.
    pub const ALL: Self = Self::from_static(GLOBAL_WILDCARD);

    /// Wrap a literal already known to be well formed.
    ///
    /// Only used for the constants in [`known`]; their validity is covered by tests.
    const fn from_static(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Parse and validate a permission string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracce_common::Permission;
    ///
    /// let perm = Permission::parse("supply_chain.farmed.write").unwrap();
    /// assert_eq!(perm.segments().count(), 3);
    /// assert!(Permission::parse("supply_chain..write").is_err());
    /// ```
    pub fn parse(value: impl Into<String>) -> Result<Self, PermissionParseError> {
        let value = value.into();
        validate(&value)?;
        Ok(Self(Cow::Owned(value)))
    }

    /// Build `"{resource}.{action}"`, validating the result.
    pub fn resource_action(resource: &str, action: &str) -> Result<Self, PermissionParseError> {
        Self::parse(format!("{resource}.{action}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the global sentinel `*`.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.as_str() == GLOBAL_WILDCARD
    }

    /// Whether this is a scoped grant such as `supply_chain.*`.
    #[must_use]
    pub fn is_prefix_wildcard(&self) -> bool {
        !self.is_global() && self.as_str().ends_with(".*")
    }

    /// Iterate over the dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.as_str().split('.')
    }
}

fn validate(value: &str) -> Result<(), PermissionParseError> {
    if value.is_empty() {
        return Err(PermissionParseError::Empty);
    }
    if value == GLOBAL_WILDCARD {
        return Ok(());
    }

    let segments: Vec<&str> = value.split('.').collect();
    let last = segments.len() - 1;

    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            return Err(PermissionParseError::EmptySegment(value.to_string()));
        }
        if *segment == GLOBAL_WILDCARD {
            if index == last {
                continue;
            }
            return Err(PermissionParseError::MisplacedWildcard(value.to_string()));
        }
        if let Some(character) = segment
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
        {
            if character == '*' {
                return Err(PermissionParseError::MisplacedWildcard(value.to_string()));
            }
            return Err(PermissionParseError::InvalidCharacter {
                permission: value.to_string(),
                character,
            });
        }
    }

    Ok(())
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Permission {
    type Error = PermissionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.0.into_owned()
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// Hash and Ord of `Permission` are those of the inner `str`, so lookups by `&str` are sound.
impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// Immutable set of held permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// The empty set, granting nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Exact membership test.
    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// Whether the set holds the global sentinel.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.contains(GLOBAL_WILDCARD)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::collections::btree_set::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Permissions used by the TracceAqua application.
pub mod known {
    use super::Permission;

    pub const ADMIN_ALL: Permission = Permission::ALL;
    pub const ADMIN_USERS: Permission = Permission::from_static("admin.users.write");
    pub const ADMIN_SYSTEM: Permission = Permission::from_static("admin.system.write");

    pub const CONSERVATION_READ: Permission = Permission::from_static("conservation.read");
    pub const CONSERVATION_WRITE: Permission = Permission::from_static("conservation.write");

    pub const SUPPLY_CHAIN_READ: Permission = Permission::from_static("supply_chain.read");
    pub const SUPPLY_CHAIN_FARMED_WRITE: Permission =
        Permission::from_static("supply_chain.farmed.write");
    pub const SUPPLY_CHAIN_WILD_CAPTURE_WRITE: Permission =
        Permission::from_static("supply_chain.wild_capture.write");
    pub const SUPPLY_CHAIN_PROCESSING_WRITE: Permission =
        Permission::from_static("supply_chain.processing.write");
    pub const SUPPLY_CHAIN_DISTRIBUTION_WRITE: Permission =
        Permission::from_static("supply_chain.distribution.write");
    pub const SUPPLY_CHAIN_RETAIL_WRITE: Permission =
        Permission::from_static("supply_chain.retail.write");

    pub const ANALYTICS_READ: Permission = Permission::from_static("analytics.read");
    pub const TRACEABILITY_READ: Permission = Permission::from_static("traceability.read");
    pub const QR_SCAN: Permission = Permission::from_static("qr.scan");
    pub const PRODUCTS_CREATE: Permission = Permission::from_static("products.create");
    pub const QUALITY_MANAGE: Permission = Permission::from_static("quality.manage");
    pub const LOGISTICS_MANAGE: Permission = Permission::from_static("logistics.manage");
    pub const SALES_MANAGE: Permission = Permission::from_static("sales.manage");
    pub const DATA_EXPORT: Permission = Permission::from_static("data.export");

    const ALL_KNOWN: &[Permission] = &[
        ADMIN_ALL,
        ADMIN_USERS,
        ADMIN_SYSTEM,
        CONSERVATION_READ,
        CONSERVATION_WRITE,
        SUPPLY_CHAIN_READ,
        SUPPLY_CHAIN_FARMED_WRITE,
        SUPPLY_CHAIN_WILD_CAPTURE_WRITE,
        SUPPLY_CHAIN_PROCESSING_WRITE,
        SUPPLY_CHAIN_DISTRIBUTION_WRITE,
        SUPPLY_CHAIN_RETAIL_WRITE,
        ANALYTICS_READ,
        TRACEABILITY_READ,
        QR_SCAN,
        PRODUCTS_CREATE,
        QUALITY_MANAGE,
        LOGISTICS_MANAGE,
        SALES_MANAGE,
        DATA_EXPORT,
    ];

    /// Every well-known permission, for iteration and validation.
    #[must_use]
    pub fn all() -> &'static [Permission] {
        ALL_KNOWN
    }
}
