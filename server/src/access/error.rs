//! Access denial responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::ErrorResponse;

use super::gate::Decision;

/// A gate denial. Never retried; the caller decides whether to sign in again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No identity on the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// Identity present but the requirement is not met.
    #[error("Insufficient permissions. Required: {required}")]
    Forbidden { required: String },
}

impl AccessError {
    /// Convert a non-allowing decision; `Allowed` yields `None`.
    #[must_use]
    pub fn from_decision(decision: Decision) -> Option<Self> {
        match decision {
            Decision::Allowed => None,
            Decision::Unauthenticated => Some(Self::Unauthenticated),
            Decision::Forbidden { required } => Some(Self::Forbidden { required }),
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "AUTHENTICATION_REQUIRED"),
            Self::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
