//! Gate middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use tracce_common::Permission;

use crate::auth::AuthUser;

use super::error::AccessError;
use super::gate::{evaluate, Decision, Requirement};

type GateFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Guard routes with a [`Requirement`].
///
/// Must run after [`authenticate`](crate::auth::authenticate), which attaches the identity.
///
/// # Usage
///
/// ```ignore
/// let app = Router::new()
///     .route("/records", get(list_records))
///     .layer(from_fn(require(Requirement::Permission(known::CONSERVATION_READ))));
/// ```
pub fn require(
    requirement: Requirement,
) -> impl Fn(Request, Next) -> GateFuture + Clone + Send + 'static {
    let requirement = Arc::new(requirement);
    move |request: Request, next: Next| {
        let requirement = Arc::clone(&requirement);
        Box::pin(async move {
            let identity = request
                .extensions()
                .get::<AuthUser>()
                .map(|user| &user.identity);
            let decision = evaluate(identity, &requirement);

            match &decision {
                Decision::Allowed => {}
                Decision::Unauthenticated => {
                    tracing::debug!(
                        path = %request.uri().path(),
                        requirement = %requirement,
                        "Denied unauthenticated request"
                    );
                }
                Decision::Forbidden { required } => {
                    tracing::info!(
                        user_id = ?identity.map(|i| i.user_id),
                        role = ?identity.map(|i| i.role.id.as_str()),
                        path = %request.uri().path(),
                        required = %required,
                        "Denied request lacking permission"
                    );
                }
            }

            match AccessError::from_decision(decision) {
                None => next.run(request).await,
                Some(denial) => denial.into_response(),
            }
        })
    }
}

/// Shorthand for `require(Requirement::Permission(permission))`.
pub fn require_permission(
    permission: Permission,
) -> impl Fn(Request, Next) -> GateFuture + Clone + Send + 'static {
    require(Requirement::Permission(permission))
}
