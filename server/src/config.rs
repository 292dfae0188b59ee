//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{bail, Context, Result};
use std::env;

use tracce_common::RoleRegistry;

/// Longest accepted token lifetime (365 days).
pub const MAX_JWT_EXPIRY: i64 = 365 * 24 * 60 * 60;

/// Default number of activity entries kept in memory.
pub const DEFAULT_ACTIVITY_RETENTION: usize = 10_000;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3001")
    pub bind_address: String,

    /// HS256 JWT signing secret
    pub jwt_secret: String,

    /// JWT lifetime in seconds (default: 604800 = 7 days)
    pub jwt_expiry: i64,

    /// Origin allowed by CORS (the frontend)
    pub frontend_url: String,

    /// Path to a JSON role table replacing the built-in one (optional)
    pub roles_file: Option<String>,

    /// Activity entries kept before the oldest are dropped (default: 10000)
    pub activity_retention: usize,

    /// Read client IPs from `X-Forwarded-For` / `X-Real-IP` (default: false)
    pub trust_proxy: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".into()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiry: parse_jwt_expiry(env::var("JWT_EXPIRY").ok().as_deref())?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            roles_file: env::var("ROLES_FILE").ok().filter(|v| !v.trim().is_empty()),
            activity_retention: env::var("ACTIVITY_RETENTION")
                .ok()
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("ACTIVITY_RETENTION must be a positive integer")?
                .unwrap_or(DEFAULT_ACTIVITY_RETENTION)
                .max(1),
            trust_proxy: env::var("TRUST_PROXY")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Build the role registry: the configured file if any, otherwise the built-in table.
    ///
    /// Called once at startup; the result is never mutated.
    pub fn load_roles(&self) -> Result<RoleRegistry> {
        let Some(path) = &self.roles_file else {
            return Ok(RoleRegistry::builtin());
        };

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read role table from {path}"))?;
        RoleRegistry::from_json(&json).with_context(|| format!("Invalid role table in {path}"))
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".into(),
            jwt_secret: "test-secret".into(),
            jwt_expiry: 604800,
            frontend_url: "http://localhost:5173".into(),
            roles_file: None,
            activity_retention: DEFAULT_ACTIVITY_RETENTION,
            trust_proxy: false,
        }
    }
}

/// Parse `JWT_EXPIRY` seconds; unset means 7 days.
fn parse_jwt_expiry(value: Option<&str>) -> Result<i64> {
    let Some(value) = value else {
        return Ok(604800);
    };

    let seconds: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("JWT_EXPIRY must be an integer, got '{value}'"))?;
    if !(1..=MAX_JWT_EXPIRY).contains(&seconds) {
        bail!("JWT_EXPIRY must be between 1 and {MAX_JWT_EXPIRY} seconds, got {seconds}");
    }
    Ok(seconds)
}
