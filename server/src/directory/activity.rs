//! Append-only activity log.
//!
//! Holds at most `retention` entries; the oldest are dropped first.

use std::collections::VecDeque;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One recorded action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// e.g. `login`, `logout`, `role_update`, `status_update`
    pub action: String,
    /// e.g. `auth`, `user`
    pub resource: String,
    pub resource_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Where a request came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Optional filters for [`ActivityLog::query`].
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub user_id: Option<Uuid>,
    pub action: Option<String>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

/// A page of entries, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityPage {
    pub logs: Vec<ActivityEntry>,
    pub pagination: Pagination,
}

/// In-memory activity log.
#[derive(Debug)]
pub struct ActivityLog {
    entries: RwLock<VecDeque<ActivityEntry>>,
    retention: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_retention(crate::config::DEFAULT_ACTIVITY_RETENTION)
    }
}

impl ActivityLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log keeping at most `retention` entries (at least one).
    #[must_use]
    pub fn with_retention(retention: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            retention: retention.max(1),
        }
    }

    /// Append an entry.
    ///
    /// Logging never fails the surrounding operation; a poisoned lock is recovered.
    pub fn record(
        &self,
        user_id: Uuid,
        action: &str,
        resource: &str,
        resource_id: Option<Uuid>,
        metadata: serde_json::Value,
        origin: &RequestOrigin,
    ) {
        let entry = ActivityEntry {
            id: Uuid::now_v7(),
            user_id,
            action: action.to_string(),
            resource: resource.to_string(),
            resource_id,
            metadata,
            ip_address: origin.ip_address.clone(),
            user_agent: origin.user_agent.clone(),
            created_at: Utc::now(),
        };
        tracing::debug!(%user_id, action = %entry.action, resource = %entry.resource, "Activity recorded");

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.len() >= self.retention {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Filtered, paginated entries. `page` is 1-based; `limit` is at least 1.
    #[must_use]
    pub fn query(&self, filter: &ActivityFilter, page: usize, limit: usize) -> ActivityPage {
        let page = page.max(1);
        let limit = limit.max(1);

        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let matching: Vec<&ActivityEntry> = entries
            .iter()
            .rev()
            .filter(|e| filter.user_id.is_none_or(|id| e.user_id == id))
            .filter(|e| filter.action.as_deref().is_none_or(|a| e.action == a))
            .collect();

        let total = matching.len();
        let logs = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();

        ActivityPage {
            logs,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (ActivityLog, Uuid, Uuid) {
        let log = ActivityLog::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let origin = RequestOrigin {
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: Some("tracce-tests/1.0".to_string()),
        };

        log.record(
            alice,
            "login",
            "auth",
            None,
            serde_json::json!({"method": "wallet"}),
            &origin,
        );
        log.record(bob, "login", "auth", None, serde_json::json!({}), &origin);
        log.record(
            alice,
            "role_update",
            "user",
            Some(bob),
            serde_json::json!({"newRole": "farmer"}),
            &origin,
        );
        log.record(alice, "logout", "auth", None, serde_json::json!({}), &origin);
        (log, alice, bob)
    }

    #[test]
    fn test_newest_first() {
        let (log, _, _) = seeded();
        let page = log.query(&ActivityFilter::default(), 1, 50);

        assert_eq!(page.logs.len(), 4);
        assert_eq!(page.logs[0].action, "logout");
        assert_eq!(page.logs[3].action, "login");
        assert_eq!(
            page.pagination,
            Pagination {
                page: 1,
                limit: 50,
                total: 4,
                pages: 1
            }
        );
    }

    #[test]
    fn test_filters() {
        let (log, alice, bob) = seeded();

        let by_user = log.query(
            &ActivityFilter {
                user_id: Some(bob),
                action: None,
            },
            1,
            50,
        );
        assert_eq!(by_user.pagination.total, 1);

        let by_action = log.query(
            &ActivityFilter {
                user_id: Some(alice),
                action: Some("login".to_string()),
            },
            1,
            50,
        );
        assert_eq!(by_action.pagination.total, 1);
        assert_eq!(by_action.logs[0].user_id, alice);
    }

    #[test]
    fn test_pagination() {
        let (log, _, _) = seeded();

        let second = log.query(&ActivityFilter::default(), 2, 3);
        assert_eq!(second.logs.len(), 1);
        assert_eq!(second.pagination.pages, 2);
        assert_eq!(second.logs[0].action, "login");

        let beyond = log.query(&ActivityFilter::default(), 5, 3);
        assert!(beyond.logs.is_empty());
        assert_eq!(beyond.pagination.total, 4);
    }

    #[test]
    fn test_zero_page_and_limit_are_clamped() {
        let (log, _, _) = seeded();
        let page = log.query(&ActivityFilter::default(), 0, 0);
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.limit, 1);
        assert_eq!(page.logs.len(), 1);
    }

    #[test]
    fn test_origin_is_stored() {
        let (log, _, _) = seeded();
        let page = log.query(&ActivityFilter::default(), 1, 1);
        assert_eq!(page.logs[0].ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(page.logs[0].user_agent.as_deref(), Some("tracce-tests/1.0"));
    }

    #[test]
    fn test_retention_drops_oldest() {
        let log = ActivityLog::with_retention(2);
        let user = Uuid::new_v4();
        for action in ["login", "role_update", "logout"] {
            log.record(
                user,
                action,
                "auth",
                None,
                serde_json::json!({}),
                &RequestOrigin::default(),
            );
        }

        assert_eq!(log.len(), 2);
        let page = log.query(&ActivityFilter::default(), 1, 50);
        assert_eq!(page.logs[0].action, "logout");
        assert_eq!(page.logs[1].action, "role_update");
    }
}
