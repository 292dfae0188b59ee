//! Authentication Handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use tracce_common::Role;

use crate::api::AppState;
use crate::directory::RequestOrigin;

use super::error::{AuthError, AuthResult};
use super::middleware::AuthUser;

/// Current user profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub wallet_address: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Logout acknowledgement.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Get the current user.
///
/// `GET /api/auth/me`
#[tracing::instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AuthResult<Json<ProfileResponse>> {
    let user = state
        .users
        .get(auth_user.id())
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(ProfileResponse {
        id: user.id,
        wallet_address: user.wallet_address,
        email: user.email,
        name: user.name,
        role: auth_user.identity.role,
        is_verified: user.is_verified,
        last_login_at: user.last_login_at,
        created_at: user.created_at,
    }))
}

/// Revoke the current session.
///
/// `POST /api/auth/logout`
#[tracing::instrument(skip(state, auth_user, origin), fields(user_id = %auth_user.id()))]
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    origin: RequestOrigin,
) -> AuthResult<Json<LogoutResponse>> {
    state.sessions.revoke(auth_user.session_id);
    state.activity.record(
        auth_user.id(),
        "logout",
        "auth",
        None,
        serde_json::json!({}),
        &origin,
    );

    tracing::info!(user_id = %auth_user.id(), "User logged out");

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}
