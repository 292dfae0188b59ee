//! User records and role assignments.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use tracce_common::{RoleRegistry, DEFAULT_ROLE};

/// A stored user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    /// Lower-cased wallet address.
    pub wallet_address: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Assigned role id; resolved against the registry on every request.
    pub role_id: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Directory errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid role: {0}")]
    InvalidRole(String),
}

/// Concurrent map of users keyed by id.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: DashMap<Uuid, UserRecord>,
    wallets: DashMap<String, Uuid>,
}

impl UserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the user for a wallet address, creating a verified consumer if none exists.
    pub fn register_wallet(&self, address: &str) -> Result<UserRecord, DirectoryError> {
        let address = address.trim().to_lowercase();

        // The wallet entry stays locked until the record exists, so concurrent
        // sign-ins with one address cannot create two users.
        let id = *self.wallets.entry(address.clone()).or_insert_with(|| {
            let record = UserRecord {
                id: Uuid::now_v7(),
                wallet_address: Some(address),
                email: None,
                name: None,
                role_id: DEFAULT_ROLE.to_string(),
                is_verified: true,
                is_active: true,
                last_login_at: None,
                created_at: Utc::now(),
            };
            tracing::info!(user_id = %record.id, "User registered");
            let id = record.id;
            self.users.insert(id, record);
            id
        });

        self.get(id).ok_or(DirectoryError::UserNotFound)
    }

    /// Insert or replace a record as-is.
    pub fn insert(&self, record: UserRecord) {
        if let Some(address) = &record.wallet_address {
            self.wallets.insert(address.to_lowercase(), record.id);
        }
        self.users.insert(record.id, record);
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.users.get(&id).map(|entry| entry.clone())
    }

    /// All users, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self.users.iter().map(|entry| entry.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        users
    }

    /// Change a user's role. The role id must exist in `roles`.
    pub fn set_role(
        &self,
        id: Uuid,
        role_id: &str,
        roles: &RoleRegistry,
    ) -> Result<UserRecord, DirectoryError> {
        if !roles.contains(role_id) {
            return Err(DirectoryError::InvalidRole(role_id.to_string()));
        }

        let mut entry = self.users.get_mut(&id).ok_or(DirectoryError::UserNotFound)?;
        entry.role_id = role_id.to_string();
        Ok(entry.clone())
    }

    pub fn set_active(&self, id: Uuid, is_active: bool) -> Result<UserRecord, DirectoryError> {
        let mut entry = self.users.get_mut(&id).ok_or(DirectoryError::UserNotFound)?;
        entry.is_active = is_active;
        Ok(entry.clone())
    }

    /// Record a successful sign-in.
    pub fn touch_login(&self, id: Uuid) -> Result<(), DirectoryError> {
        let mut entry = self.users.get_mut(&id).ok_or(DirectoryError::UserNotFound)?;
        entry.last_login_at = Some(Utc::now());
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
