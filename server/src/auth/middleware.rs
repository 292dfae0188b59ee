//! Authentication Middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use tracce_common::Identity;

use crate::api::AppState;

use super::error::AuthError;
use super::jwt::validate_token;

/// Authenticated caller injected into request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User id and role, resolved for this request.
    pub identity: Identity,
    /// Session the bearer token belongs to.
    pub session_id: Uuid,
    /// Wallet address, if the account has one.
    pub wallet_address: Option<String>,
}

impl AuthUser {
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.identity.user_id
    }
}

/// Middleware that attaches an [`AuthUser`] when a bearer token is present.
///
/// - No `Authorization` header: the request continues anonymously and
///   downstream gates answer `401 AUTHENTICATION_REQUIRED`.
/// - A header that fails any check (format, signature, expiry, revoked
///   session, unknown or disabled user) is rejected here with 401.
///
/// The user's role is looked up on every request, so a role change applies
/// from the next request on.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, authenticate))
/// ```
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(auth_header) = request.headers().get(AUTHORIZATION) else {
        return Ok(next.run(request).await);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = validate_token(token, &state.config.jwt_secret)?;
    let user_id = claims.user_id()?;
    let session_id = claims.session_id()?;

    if !state.sessions.is_active(session_id) {
        return Err(AuthError::SessionRevoked);
    }

    let user = state.users.get(user_id).ok_or(AuthError::InvalidToken)?;
    if !user.is_active {
        tracing::info!(%user_id, "Rejected request from disabled account");
        return Err(AuthError::AccountDisabled);
    }

    let auth_user = AuthUser {
        identity: state.roles.resolve(user.id, &user.role_id),
        session_id,
        wallet_address: user.wallet_address,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extractor for the authenticated user in handlers.
///
/// Rejects with `401 AUTHENTICATION_REQUIRED` when no identity was attached.
///
/// ```ignore
/// async fn protected_handler(auth_user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", auth_user.id())
/// }
/// ```
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::AuthenticationRequired)
    }
}
