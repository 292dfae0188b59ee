//! Admin API handlers.
//!
//! Every route here sits behind the global `*` permission gate.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::directory::{ActivityFilter, RequestOrigin};

use super::types::{
    ActivityPageResponse, ActivityParams, ActivityView, AdminError, RoleUpdateResponse,
    StatusUpdateResponse, UpdateRoleRequest, UpdateStatusRequest, UserSummary,
};

/// List all users, newest first.
///
/// `GET /api/users`
#[tracing::instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AuthUser,
) -> Result<Json<Vec<UserSummary>>, AdminError> {
    let users = state
        .users
        .list()
        .into_iter()
        .map(|user| {
            let role = state.roles.lookup(&user.role_id).cloned();
            UserSummary::new(user, role)
        })
        .collect();

    Ok(Json(users))
}

/// Assign a role to a user.
///
/// `PUT /api/users/{id}/role`
///
/// The actor must be able to manage both the target's current role and the new one.
/// The change is seen by the target on their next request.
#[tracing::instrument(skip(state, admin, origin, body), fields(actor_id = %admin.id()))]
pub async fn update_role(
    State(state): State<AppState>,
    admin: AuthUser,
    origin: RequestOrigin,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<RoleUpdateResponse>, AdminError> {
    body.validate()?;

    let new_role = state
        .roles
        .lookup(&body.role_id)
        .cloned()
        .ok_or_else(|| AdminError::InvalidRole(body.role_id.clone()))?;

    let target = state
        .users
        .get(user_id)
        .ok_or_else(|| AdminError::NotFound("User".to_string()))?;

    let actor_role = admin.identity.role.id.as_str();
    for role in [target.role_id.as_str(), new_role.id.as_str()] {
        if !state.roles.can_manage(actor_role, role) {
            return Err(AdminError::CannotManage(role.to_string()));
        }
    }

    state.users.set_role(user_id, &new_role.id, &state.roles)?;
    state.activity.record(
        admin.id(),
        "role_update",
        "user",
        Some(user_id),
        serde_json::json!({
            "newRole": new_role.id,
            "previousRole": target.role_id,
            "targetUser": user_id,
        }),
        &origin,
    );

    tracing::info!(
        target_id = %user_id,
        previous_role = %target.role_id,
        new_role = %new_role.id,
        "User role updated"
    );

    Ok(Json(RoleUpdateResponse {
        id: user_id,
        role: new_role,
        message: "Role updated successfully".to_string(),
    }))
}

/// Activate or deactivate a user.
///
/// `PUT /api/users/{id}/status`
///
/// Deactivation also ends every session of the user.
#[tracing::instrument(skip(state, admin, origin, body), fields(actor_id = %admin.id()))]
pub async fn update_status(
    State(state): State<AppState>,
    admin: AuthUser,
    origin: RequestOrigin,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<StatusUpdateResponse>, AdminError> {
    if user_id == admin.id() && !body.is_active {
        return Err(AdminError::Validation(
            "Cannot deactivate yourself".to_string(),
        ));
    }

    let user = state.users.set_active(user_id, body.is_active)?;
    if !user.is_active {
        let revoked = state.sessions.revoke_user(user_id);
        tracing::info!(target_id = %user_id, revoked, "Sessions revoked for deactivated user");
    }

    state.activity.record(
        admin.id(),
        "status_update",
        "user",
        Some(user_id),
        serde_json::json!({ "newStatus": user.is_active, "targetUser": user_id }),
        &origin,
    );

    Ok(Json(StatusUpdateResponse {
        id: user.id,
        is_active: user.is_active,
        message: "User status updated successfully".to_string(),
    }))
}

/// Paginated activity log, each entry joined with its actor.
///
/// `GET /api/activity?page=&limit=&userId=&action=`
#[tracing::instrument(skip(state, _admin))]
pub async fn get_activity(
    State(state): State<AppState>,
    _admin: AuthUser,
    Query(params): Query<ActivityParams>,
) -> Result<Json<ActivityPageResponse>, AdminError> {
    let limit = params.limit.clamp(1, 100);
    let filter = ActivityFilter {
        user_id: params.user_id,
        action: params.action.filter(|a| !a.is_empty()),
    };

    let page = state.activity.query(&filter, params.page, limit);
    let logs = page
        .logs
        .into_iter()
        .map(|entry| {
            let user = state.users.get(entry.user_id).map(Into::into);
            ActivityView { entry, user }
        })
        .collect();

    Ok(Json(ActivityPageResponse {
        logs,
        pagination: page.pagination,
    }))
}
