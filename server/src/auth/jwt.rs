//! JWT Token Generation and Validation
//!
//! Tokens are HS256-signed with the server secret. Each token carries the
//! id of the session it belongs to (`jti`) so logout can revoke it.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string).
    pub sub: String,
    /// Wallet address the session was opened with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Session ID.
    pub jti: String,
}

impl Claims {
    /// Parse the subject as a user id.
    pub fn user_id(&self) -> AuthResult<Uuid> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    /// Parse the session id.
    pub fn session_id(&self) -> AuthResult<Uuid> {
        self.jti.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// A signed token and its expiry.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Sign a token for `user_id` bound to `session_id`.
pub fn generate_token(
    user_id: Uuid,
    session_id: Uuid,
    address: Option<&str>,
    secret: &str,
    expiry_seconds: i64,
) -> AuthResult<SignedToken> {
    let now = Utc::now();
    let expires_at = Duration::try_seconds(expiry_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            AuthError::Internal(format!("token lifetime out of range: {expiry_seconds}s"))
        })?;

    let claims = Claims {
        sub: user_id.to_string(),
        address: address.map(str::to_string),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        jti: session_id.to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(SignedToken { token, expires_at })
}

/// Validate and decode a token.
///
/// Returns `TokenExpired` for an expired signature and `InvalidToken` for anything else.
pub fn validate_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
