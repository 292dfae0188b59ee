//! API Router and Application State
//!
//! Central routing configuration and shared state.

mod origin;

use axum::{extract::State, http::HeaderValue, middleware::from_fn_with_state, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use tracce_common::{Role, RoleRegistry};

use crate::{
    admin, auth,
    auth::SessionStore,
    config::Config,
    directory::{ActivityLog, UserDirectory},
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Role table, fixed for the life of the process
    pub roles: Arc<RoleRegistry>,
    /// User records and role assignments
    pub users: Arc<UserDirectory>,
    /// Issued sessions
    pub sessions: Arc<SessionStore>,
    /// Administrative activity trail
    pub activity: Arc<ActivityLog>,
}

impl AppState {
    /// Create new application state with empty stores.
    #[must_use]
    pub fn new(config: Config, roles: RoleRegistry) -> Self {
        let activity = ActivityLog::with_retention(config.activity_retention);
        Self {
            config: Arc::new(config),
            roles: Arc::new(roles),
            users: Arc::new(UserDirectory::new()),
            sessions: Arc::new(SessionStore::new()),
            activity: Arc::new(activity),
        }
    }

    /// State with the test configuration and the built-in role table.
    #[must_use]
    pub fn for_test() -> Self {
        Self::new(Config::default_for_test(), RoleRegistry::builtin())
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(frontend_url = %state.config.frontend_url, "Invalid FRONTEND_URL, CORS disabled");
            CorsLayer::new()
        }
    };

    // Everything under /api may carry a bearer token; gates decide per route.
    let api_routes = Router::new()
        .nest("/auth", auth::router())
        .route("/roles", get(list_roles))
        .merge(admin::router())
        .layer(from_fn_with_state(state.clone(), auth::authenticate));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Public role catalogue, highest level first.
///
/// `GET /api/roles`
async fn list_roles(State(state): State<AppState>) -> Json<Vec<Role>> {
    Json(state.roles.roles().into_iter().cloned().collect())
}

async fn not_found() -> (axum::http::StatusCode, Json<auth::ErrorResponse>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(auth::ErrorResponse {
            error: "NOT_FOUND".to_string(),
            message: "Route not found".to_string(),
        }),
    )
}
