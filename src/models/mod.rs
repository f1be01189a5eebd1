//! Data models.
//!
//! This module contains the key set stored in the database and the webhook
//! request/response shapes exchanged with the host.

/// Persisted API key set
pub mod api_key;
/// Webhook request, response and body
pub mod webhook;
