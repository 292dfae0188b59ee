//! Session tracking.
//!
//! Every issued token belongs to a session row. Logout removes the row, which
//! invalidates the token even before it expires.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use super::error::{AuthError, AuthResult};
use super::jwt::generate_token;
use crate::api::AppState;
use crate::directory::{RequestOrigin, UserRecord};

/// A live session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Concurrent session table keyed by session id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        self.sessions.insert(session.id, session);
    }

    /// Whether the session exists and has not lapsed.
    #[must_use]
    pub fn is_active(&self, session_id: Uuid) -> bool {
        self.sessions
            .get(&session_id)
            .is_some_and(|s| s.expires_at > Utc::now())
    }

    /// Remove a session. Returns whether it existed.
    pub fn revoke(&self, session_id: Uuid) -> bool {
        self.sessions.remove(&session_id).is_some()
    }

    /// Remove every session of a user. Returns how many were removed.
    pub fn revoke_user(&self, user_id: Uuid) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.user_id != user_id);
        before.saturating_sub(self.sessions.len())
    }

    /// Drop lapsed sessions.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        before.saturating_sub(self.sessions.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Token handed to a client after sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedSession {
    pub token: String,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Open a session for a known, active user and sign its token.
///
/// Callers are expected to have proven control of the user's wallet first.
/// `origin` is stored with the `login` activity entry.
#[tracing::instrument(skip(state, origin))]
pub fn issue_session(
    state: &AppState,
    user_id: Uuid,
    origin: &RequestOrigin,
) -> AuthResult<IssuedSession> {
    let user: UserRecord = state.users.get(user_id).ok_or(AuthError::UserNotFound)?;
    if !user.is_active {
        return Err(AuthError::AccountDisabled);
    }

    let session_id = Uuid::now_v7();
    let signed = generate_token(
        user.id,
        session_id,
        user.wallet_address.as_deref(),
        &state.config.jwt_secret,
        state.config.jwt_expiry,
    )?;

    state.sessions.insert(Session {
        id: session_id,
        user_id: user.id,
        wallet_address: user.wallet_address.clone(),
        created_at: Utc::now(),
        expires_at: signed.expires_at,
    });
    state
        .users
        .touch_login(user.id)
        .map_err(|_| AuthError::UserNotFound)?;
    state.activity.record(
        user.id,
        "login",
        "auth",
        None,
        serde_json::json!({ "method": "wallet" }),
        origin,
    );

    tracing::info!(user_id = %user.id, %session_id, "User logged in");

    Ok(IssuedSession {
        token: signed.token,
        session_id,
        expires_at: signed.expires_at,
    })
}
