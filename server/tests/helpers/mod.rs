//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum router,
//! plus utilities for user creation and token issuance.
//!
//! Every `TestApp` owns fresh in-memory stores, so tests do not share state.
#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;
use tracce_server::api::{create_router, AppState};
use tracce_server::auth::issue_session;
use tracce_server::config::Config;
use tracce_server::directory::{RequestOrigin, UserRecord};

/// User agent sent by [`TestApp::send_json`].
pub const TEST_USER_AGENT: &str = "tracce-tests/1.0";

/// Client address attached by [`TestApp::send_json`].
pub const TEST_CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test app with the built-in role table.
    pub fn new() -> Self {
        Self::with_state(AppState::for_test())
    }

    /// Create a test app around prepared state (custom role tables, expiry).
    pub fn with_state(state: AppState) -> Self {
        let router = create_router(state.clone());
        Self { router, state }
    }

    /// Create a test app with a custom config.
    pub fn with_config(config: Config) -> Self {
        let roles = config.load_roles().expect("Failed to load roles");
        Self::with_state(AppState::new(config, roles))
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Register a wallet user and assign `role_id`.
    pub fn create_user(&self, role_id: &str) -> UserRecord {
        let wallet = format!("0x{}", Uuid::new_v4().simple());
        let user = self
            .state
            .users
            .register_wallet(&wallet)
            .expect("Failed to register user");
        self.state
            .users
            .set_role(user.id, role_id, &self.state.roles)
            .expect("Failed to assign role")
    }

    /// Store a user whose role id is not in the registry.
    pub fn create_user_with_unknown_role(&self, role_id: &str) -> UserRecord {
        let user = self.create_user("consumer");
        let record = UserRecord {
            role_id: role_id.to_string(),
            ..user
        };
        self.state.users.insert(record.clone());
        record
    }

    /// Open a session for `user_id` and return its bearer token.
    pub fn token_for(&self, user_id: Uuid) -> String {
        issue_session(&self.state, user_id, &RequestOrigin::default())
            .expect("Failed to issue session")
            .token
    }

    /// Create a user with `role_id` and return it with a bearer token.
    pub fn login_as(&self, role_id: &str) -> (UserRecord, String) {
        let user = self.create_user(role_id);
        let token = self.token_for(user.id);
        (user, token)
    }

    /// Send a bodiless request, optionally authenticated.
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Self::request(method, uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.oneshot(builder.body(Body::empty()).unwrap()).await
    }

    /// Send a JSON body with a bearer token, from [`TEST_CLIENT_IP`] as [`TEST_USER_AGENT`].
    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Response<Body> {
        let req = Self::request(method, uri)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .header("User-Agent", TEST_USER_AGENT)
            .extension(ConnectInfo(SocketAddr::new(TEST_CLIENT_IP, 40000)))
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap();
        self.oneshot(req).await
    }
}

/// Read a response body as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
