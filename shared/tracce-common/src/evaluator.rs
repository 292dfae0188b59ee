//! Permission evaluation.
//!
//! Pure functions over a held [`PermissionSet`] and a requested permission.
//! Requests are taken as raw strings so that malformed input is answered
//! with a deny instead of an error.

use serde::{Deserialize, Serialize};

use crate::permission::{PermissionSet, GLOBAL_WILDCARD};

/// How a list of required permissions is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// At least one permission must be held.
    #[default]
    Any,
    /// Every permission must be held.
    All,
}

/// Decide whether `held` satisfies `required`.
///
/// Resolution order:
/// 1. A held `*` allows everything
/// 2. An empty request is denied
/// 3. Exact match
/// 4. Prefix wildcards, longest prefix first (`a.b.*`, then `a.*`)
///
/// # Examples
///
/// ```
/// use tracce_common::{is_allowed, Permission, PermissionSet};
///
/// let held: PermissionSet = ["supply_chain.*"]
///     .into_iter()
///     .map(|p| Permission::parse(p).unwrap())
///     .collect();
///
/// assert!(is_allowed(&held, "supply_chain.farmed.write"));
/// assert!(!is_allowed(&held, "conservation.read"));
/// ```
#[must_use]
pub fn is_allowed(held: &PermissionSet, required: &str) -> bool {
    if held.is_global() {
        return true;
    }
    if required.is_empty() {
        return false;
    }
    if held.contains(required) {
        return true;
    }

    // A bare `*` request has no prefix and is only met by a held `*` above.
    let mut prefix = required;
    while let Some(split) = prefix.rfind('.') {
        prefix = &prefix[..split];
        if prefix.is_empty() {
            break;
        }
        if held.contains(format!("{prefix}.{GLOBAL_WILDCARD}").as_str()) {
            return true;
        }
    }

    false
}

/// Reduce a list of required permissions with [`MatchMode`] semantics.
///
/// An empty list is `false` under [`MatchMode::Any`] and `true` under
/// [`MatchMode::All`].
#[must_use]
pub fn is_allowed_any<S: AsRef<str>>(held: &PermissionSet, required: &[S], mode: MatchMode) -> bool {
    match mode {
        MatchMode::Any => required.iter().any(|p| is_allowed(held, p.as_ref())),
        MatchMode::All => required.iter().all(|p| is_allowed(held, p.as_ref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{known, Permission};

    fn set(perms: &[&str]) -> PermissionSet {
        perms
            .iter()
            .map(|p| Permission::parse(*p).unwrap())
            .collect()
    }

    #[test]
    fn test_global_wildcard_allows_anything() {
        let admin = set(&["*"]);
        for required in [
            "anything.at.all",
            "*",
            "",
            "..",
            "NOT VALID",
            "supply_chain.*",
        ] {
            assert!(is_allowed(&admin, required), "'{required}' should be allowed");
        }
    }

    #[test]
    fn test_empty_request_denied() {
        let held = set(&["qr.scan"]);
        assert!(!is_allowed(&held, ""));
        assert!(!is_allowed(&PermissionSet::empty(), ""));
    }

    #[test]
    fn test_exact_match() {
        let farmer = set(&[
            "supply_chain.farmed.write",
            "supply_chain.read",
            "products.create",
        ]);
        assert!(is_allowed(&farmer, "supply_chain.read"));
        assert!(!is_allowed(&farmer, "supply_chain.processing.write"));
        assert!(!is_allowed(&farmer, "admin.users.write"));
    }

    #[test]
    fn test_star_request_needs_global() {
        let held = set(&["supply_chain.*", "qr.scan"]);
        assert!(!is_allowed(&held, "*"));
    }

    #[test]
    fn test_prefix_wildcard_covers_descendants() {
        let held = set(&["supply_chain.*"]);
        assert!(is_allowed(&held, "supply_chain.read"));
        assert!(is_allowed(&held, "supply_chain.farmed.write"));
        assert!(is_allowed(&held, "supply_chain.*"));
        assert!(!is_allowed(&held, "supply_chain"));
        assert!(!is_allowed(&held, "supply_chains.read"));
        assert!(!is_allowed(&held, "conservation.read"));
    }

    #[test]
    fn test_prefix_wildcard_sibling_monotonicity() {
        let held = set(&["a.b.*"]);
        assert!(is_allowed(&held, "a.b.c"));
        for sibling in ["d", "write", "read", "x_1"] {
            assert!(is_allowed(&held, &format!("a.b.{sibling}")));
        }
        assert!(!is_allowed(&held, "a.c.d"));
        assert!(!is_allowed(&held, "a.b"));
    }

    #[test]
    fn test_non_wildcard_set_denies_uncovered() {
        let held = set(&["conservation.read", "analytics.read"]);
        for required in ["conservation.write", "analytics", "data.export", "a.b.c"] {
            assert!(!is_allowed(&held, required), "'{required}' should be denied");
        }
    }

    #[test]
    fn test_malformed_request_denied_without_global() {
        let held = set(&["qr.scan"]);
        assert!(!is_allowed(&held, ".qr.scan"));
        assert!(!is_allowed(&held, "qr..scan"));
        assert!(!is_allowed(&held, "."));
    }

    #[test]
    fn test_any_mode() {
        let consumer = set(&["traceability.read", "qr.scan"]);
        assert!(is_allowed_any(
            &consumer,
            &["admin.users.write", "qr.scan"],
            MatchMode::Any
        ));
        assert!(!is_allowed_any(
            &consumer,
            &["admin.users.write", "conservation.read"],
            MatchMode::Any
        ));
    }

    #[test]
    fn test_all_mode() {
        let consumer = set(&["traceability.read", "qr.scan"]);
        assert!(is_allowed_any(
            &consumer,
            &["traceability.read", "qr.scan"],
            MatchMode::All
        ));
        assert!(!is_allowed_any(
            &consumer,
            &["traceability.read", "conservation.read"],
            MatchMode::All
        ));
    }

    #[test]
    fn test_empty_list_conventions() {
        let held = set(&["qr.scan"]);
        let empty: [&str; 0] = [];
        assert!(!is_allowed_any(&held, &empty, MatchMode::Any));
        assert!(is_allowed_any(&held, &empty, MatchMode::All));
    }

    #[test]
    fn test_accepts_typed_permissions() {
        let held = set(&["conservation.read"]);
        assert!(is_allowed_any(
            &held,
            &[known::CONSERVATION_READ, known::CONSERVATION_WRITE],
            MatchMode::Any
        ));
    }

    #[test]
    fn test_default_mode_is_any() {
        assert_eq!(MatchMode::default(), MatchMode::Any);
    }
}
