//! Webhook-to-chat relay.
//!
//! Receives webhook requests forwarded by a host, authenticates the caller
//! against a persisted set of API keys plus one admin key, and either manages
//! that key set or relays a message into a chat channel.
//!
//! # Architecture
//!
//! - **Transport**: requests arrive over one stream and are handled one at a time
//! - **Storage**: SQLite key-value slot with sqlx, holding a JSON array of keys
//! - **Authentication**: `x-api-key` header, admin secret or registered key
//! - **Relay**: HTTP POST to the host's chat transport, HMAC-signed

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;
pub mod services;
