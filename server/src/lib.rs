//! TracceAqua Server
//!
//! REST backend for the seafood traceability platform: bearer-token
//! authentication, role-based access gates and user administration.

pub mod access;
pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod directory;
