//! Server-side access gate.
//!
//! Evaluates a [`Requirement`] against the caller's identity and turns the
//! outcome into a tri-state [`Decision`]:
//! - `Unauthenticated`: no identity (401)
//! - `Forbidden`: identity present, requirement not met (403)
//! - `Allowed`: proceed to the wrapped handler

mod error;
pub mod gate;
mod middleware;

pub use error::AccessError;
pub use gate::{evaluate, Decision, Requirement};
pub use middleware::{require, require_permission};
