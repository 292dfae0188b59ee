//! Request origin extraction for the activity log.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};

use crate::directory::RequestOrigin;

use super::AppState;

/// Longest user agent kept, in characters.
const MAX_USER_AGENT_LEN: usize = 512;

/// Client IP from proxy headers (when trusted) or the connection itself.
fn extract_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> Option<IpAddr> {
    if trust_proxy {
        let forwarded = headers
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|ip| ip.trim().parse().ok());
        if forwarded.is_some() {
            return forwarded;
        }

        let real_ip = headers
            .get("X-Real-IP")
            .and_then(|h| h.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok());
        if real_ip.is_some() {
            return real_ip;
        }
    }

    connect_info.map(|c| c.0.ip())
}

/// User agent with control characters removed, truncated.
fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| {
            s.chars()
                .filter(|c| !c.is_control() || c.is_whitespace())
                .take(MAX_USER_AGENT_LEN)
                .collect()
        })
}

impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let connect_info = parts.extensions.get::<ConnectInfo<SocketAddr>>();
        let ip_address = extract_client_ip(&parts.headers, connect_info, state.config.trust_proxy)
            .map(|ip| ip.to_string());

        Ok(Self {
            ip_address,
            user_agent: extract_user_agent(&parts.headers),
        })
    }
}
