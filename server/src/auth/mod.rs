//! Authentication Service
//!
//! Bearer-token authentication, session tracking and the current-user endpoints.
//! Proving wallet ownership happens before [`issue_session`] is called.

mod error;
mod handlers;
pub mod jwt;
mod middleware;
pub mod session;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};

use crate::access::{require, Requirement};
use crate::api::AppState;

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use middleware::{authenticate, AuthUser};
pub use session::{issue_session, IssuedSession, Session, SessionStore};

/// Create authentication router.
///
/// Protected routes (identity required):
/// - GET /me - Get current user
/// - POST /logout - Revoke the current session
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_profile))
        .route("/logout", post(handlers::logout))
        .layer(from_fn(require(Requirement::Authenticated)))
}
