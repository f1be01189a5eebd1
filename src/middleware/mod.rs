//! Request pre-processing.
//!
//! Runs before routing and decides who the caller is. Unauthenticated
//! requests never reach a handler.

/// API key authentication
pub mod auth;
