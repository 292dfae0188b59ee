//! HTTP Integration Tests for User Administration
//!
//! Tests role assignment, account status changes and the activity log.
//!
//! Run with: `cargo test --test admin_http_test -- --nocapture`

mod helpers;

use axum::http::Method;
use helpers::{body_to_json, TestApp, TEST_CLIENT_IP, TEST_USER_AGENT};
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Role assignment
// ============================================================================

#[tokio::test]
async fn test_update_role_success() {
    let app = TestApp::new();
    let (_, token) = app.login_as("admin");
    let user = app.create_user("consumer");

    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/role", user.id),
            &token,
            &json!({ "roleId": "researcher" }),
        )
        .await;
    assert_eq!(resp.status(), 200);

    let json = body_to_json(resp).await;
    assert_eq!(json["id"], user.id.to_string());
    assert_eq!(json["role"]["id"], "researcher");
    assert_eq!(json["message"], "Role updated successfully");

    assert_eq!(app.state.users.get(user.id).unwrap().role_id, "researcher");
}

#[tokio::test]
async fn test_update_role_unknown_role_is_400() {
    let app = TestApp::new();
    let (_, token) = app.login_as("admin");
    let user = app.create_user("consumer");

    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/role", user.id),
            &token,
            &json!({ "roleId": "superuser" }),
        )
        .await;
    assert_eq!(resp.status(), 400);

    let json = body_to_json(resp).await;
    assert_eq!(json["error"], "invalid_role");
    assert_eq!(app.state.users.get(user.id).unwrap().role_id, "consumer");
}

#[tokio::test]
async fn test_update_role_empty_role_is_400() {
    let app = TestApp::new();
    let (_, token) = app.login_as("admin");
    let user = app.create_user("consumer");

    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/role", user.id),
            &token,
            &json!({ "roleId": "" }),
        )
        .await;
    assert_eq!(resp.status(), 400);

    let json = body_to_json(resp).await;
    assert_eq!(json["error"], "validation");
}

#[tokio::test]
async fn test_update_role_missing_user_is_404() {
    let app = TestApp::new();
    let (_, token) = app.login_as("admin");

    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/role", Uuid::new_v4()),
            &token,
            &json!({ "roleId": "farmer" }),
        )
        .await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_update_role_requires_admin() {
    let app = TestApp::new();
    let (_, token) = app.login_as("researcher");
    let user = app.create_user("consumer");

    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/role", user.id),
            &token,
            &json!({ "roleId": "farmer" }),
        )
        .await;
    assert_eq!(resp.status(), 403);
    assert_eq!(app.state.users.get(user.id).unwrap().role_id, "consumer");
}

// ============================================================================
// Account status
// ============================================================================

#[tokio::test]
async fn test_deactivation_revokes_sessions() {
    let app = TestApp::new();
    let (_, admin_token) = app.login_as("admin");
    let (user, user_token) = app.login_as("retailer");

    let resp = app
        .send(Method::GET, "/api/auth/me", Some(&user_token))
        .await;
    assert_eq!(resp.status(), 200);

    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/status", user.id),
            &admin_token,
            &json!({ "isActive": false }),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let json = body_to_json(resp).await;
    assert_eq!(json["isActive"], false);

    let resp = app
        .send(Method::GET, "/api/auth/me", Some(&user_token))
        .await;
    assert_eq!(resp.status(), 401);

    // Reactivated users must sign in again.
    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/status", user.id),
            &admin_token,
            &json!({ "isActive": true }),
        )
        .await;
    assert_eq!(resp.status(), 200);

    let resp = app
        .send(Method::GET, "/api/auth/me", Some(&user_token))
        .await;
    assert_eq!(resp.status(), 401);

    let fresh_token = app.token_for(user.id);
    let resp = app
        .send(Method::GET, "/api/auth/me", Some(&fresh_token))
        .await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_cannot_deactivate_self() {
    let app = TestApp::new();
    let (admin, token) = app.login_as("admin");

    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/status", admin.id),
            &token,
            &json!({ "isActive": false }),
        )
        .await;
    assert_eq!(resp.status(), 400);
    assert!(app.state.users.get(admin.id).unwrap().is_active);
}

// ============================================================================
// Activity log
// ============================================================================

#[tokio::test]
async fn test_activity_log_filters_and_paginates() {
    let app = TestApp::new();
    let (admin, token) = app.login_as("admin");

    for role in ["farmer", "fisherman", "processor"] {
        let user = app.create_user("consumer");
        let resp = app
            .send_json(
                Method::PUT,
                &format!("/api/users/{}/role", user.id),
                &token,
                &json!({ "roleId": role }),
            )
            .await;
        assert_eq!(resp.status(), 200);
    }

    let resp = app
        .send(
            Method::GET,
            "/api/activity?action=role_update&limit=2",
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), 200);

    let json = body_to_json(resp).await;
    let logs = json["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["pages"], 2);
    assert_eq!(logs[0]["userId"], admin.id.to_string());
    assert_eq!(logs[0]["metadata"]["newRole"], "processor");
    assert_eq!(logs[0]["ipAddress"], TEST_CLIENT_IP.to_string());
    assert_eq!(logs[0]["userAgent"], TEST_USER_AGENT);
    assert_eq!(logs[0]["user"]["roleId"], "admin");
    assert_eq!(logs[0]["user"]["walletAddress"], admin.wallet_address.clone().unwrap());

    let resp = app
        .send(
            Method::GET,
            "/api/activity?action=role_update&limit=2&page=2",
            Some(&token),
        )
        .await;
    let json = body_to_json(resp).await;
    assert_eq!(json["logs"].as_array().unwrap().len(), 1);
    assert_eq!(json["logs"][0]["metadata"]["newRole"], "farmer");

    // Login entries are recorded too.
    let resp = app
        .send(Method::GET, "/api/activity?action=login", Some(&token))
        .await;
    let json = body_to_json(resp).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert!(json["logs"][0]["ipAddress"].is_null());
}

#[tokio::test]
async fn test_activity_empty_user_filter_is_ignored() {
    let app = TestApp::new();
    let (admin, token) = app.login_as("admin");
    let user = app.create_user("consumer");

    let resp = app
        .send_json(
            Method::PUT,
            &format!("/api/users/{}/status", user.id),
            &token,
            &json!({ "isActive": false }),
        )
        .await;
    assert_eq!(resp.status(), 200);

    let resp = app
        .send(Method::GET, "/api/activity?userId=&action=", Some(&token))
        .await;
    assert_eq!(resp.status(), 200, "Empty filters should be treated as absent");
    let json = body_to_json(resp).await;
    assert_eq!(json["pagination"]["total"], 2);

    let resp = app
        .send(
            Method::GET,
            &format!("/api/activity?userId={}", admin.id),
            Some(&token),
        )
        .await;
    let json = body_to_json(resp).await;
    assert_eq!(json["pagination"]["total"], 2);
    assert_eq!(json["logs"][0]["action"], "status_update");
    assert_eq!(json["logs"][0]["userAgent"], TEST_USER_AGENT);

    let resp = app
        .send(Method::GET, "/api/activity?userId=not-a-uuid", Some(&token))
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_activity_requires_admin() {
    let app = TestApp::new();
    let (_, token) = app.login_as("researcher");

    let resp = app.send(Method::GET, "/api/activity", Some(&token)).await;
    assert_eq!(resp.status(), 403);
}
