//! User Administration Module
//!
//! User listing, role assignment, account status and the activity log.
//! All routes require the global `*` permission.

pub mod handlers;
pub mod types;

use axum::{
    middleware::from_fn,
    routing::{get, put},
    Router,
};

use tracce_common::known;

use crate::access::require_permission;
use crate::api::AppState;

pub use types::AdminError;

/// Create the admin router (mounted under `/api`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/{id}/role", put(handlers::update_role))
        .route("/users/{id}/status", put(handlers::update_status))
        .route("/activity", get(handlers::get_activity))
        .layer(from_fn(require_permission(known::ADMIN_ALL)))
}
