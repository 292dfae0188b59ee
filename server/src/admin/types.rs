//! Admin module types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use tracce_common::Role;

use crate::directory::{ActivityEntry, DirectoryError, Pagination, UserRecord};

/// Admin API error type.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Unknown role id.
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// The actor's role may not manage the target's role.
    #[error("Cannot manage a user with role '{0}'")]
    CannotManage(String),

    /// Validation error.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<DirectoryError> for AdminError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::UserNotFound => Self::NotFound("User".to_string()),
            DirectoryError::InvalidRole(role) => Self::InvalidRole(role),
        }
    }
}

impl From<validator::ValidationErrors> for AdminError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::InvalidRole(_) => (StatusCode::BAD_REQUEST, "invalid_role"),
            Self::CannotManage(_) => (StatusCode::FORBIDDEN, "cannot_manage"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
        };
        (
            status,
            Json(serde_json::json!({"error": code, "message": message})),
        )
            .into_response()
    }
}

// Request types
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 64))]
    pub role_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<Uuid>,
    pub action: Option<String>,
}

/// `?userId=` with no value means no filter.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_page() -> usize {
    1
}

#[allow(clippy::missing_const_for_fn)]
fn default_limit() -> usize {
    50
}

// Response types

/// User with its resolved role.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub wallet_address: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role_id: String,
    /// `None` when the stored role id is not in the registry.
    pub role: Option<Role>,
    pub is_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserSummary {
    #[must_use]
    pub fn new(user: UserRecord, role: Option<Role>) -> Self {
        Self {
            id: user.id,
            wallet_address: user.wallet_address,
            email: user.email,
            name: user.name,
            role_id: user.role_id,
            role,
            is_verified: user.is_verified,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// The acting user of an activity entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub wallet_address: Option<String>,
    pub name: Option<String>,
    pub role_id: String,
}

impl From<UserRecord> for ActorSummary {
    fn from(user: UserRecord) -> Self {
        Self {
            wallet_address: user.wallet_address,
            name: user.name,
            role_id: user.role_id,
        }
    }
}

/// Activity entry joined with its actor. `user` is `None` if the actor no longer exists.
#[derive(Debug, Serialize)]
pub struct ActivityView {
    #[serde(flatten)]
    pub entry: ActivityEntry,
    pub user: Option<ActorSummary>,
}

#[derive(Debug, Serialize)]
pub struct ActivityPageResponse {
    pub logs: Vec<ActivityView>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdateResponse {
    pub id: Uuid,
    pub role: Role,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub id: Uuid,
    pub is_active: bool,
    pub message: String,
}
