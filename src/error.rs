//! Error types and webhook response mapping.
//!
//! This module defines all application errors and how they are converted
//! into webhook responses with the status codes and plain-text bodies the
//! webhook callers rely on.

use crate::models::webhook::WebhookResponse;

/// Application-wide error type.
///
/// Each variant maps to a specific status code and body. Every failure is
/// local to the request that produced it.
///
/// # Error Categories
///
/// - **Storage Errors**: the key store rejected a read or write
/// - **Authentication Errors**: missing credentials or a disallowed channel
/// - **Input Errors**: malformed bodies, unknown routes or methods
/// - **Relay Errors**: the chat transport failed to take the message
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., I/O error, locked or corrupt file).
    ///
    /// Returns HTTP 500.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The key set could not be encoded for storage.
    ///
    /// Returns HTTP 500.
    #[error("Serialization error: {0}")]
    Serialization(serde_json::Error),

    /// Request body is not valid JSON for the expected shape.
    ///
    /// Returns HTTP 500. Callers have historically seen a server error here,
    /// so the classification is kept.
    #[error("Unable to decode: {0}")]
    Decode(serde_json::Error),

    /// No `x-api-key` header matched the admin secret or a registered key.
    ///
    /// Returns HTTP 401.
    #[error("unauthorized")]
    Unauthorized,

    /// Requested channel is not in the configured allow-list.
    ///
    /// Returns HTTP 401 with this message as the body.
    #[error("channel not allowed: {0}")]
    UnauthorizedChannel(String),

    /// The chat transport rejected or failed to deliver the message.
    ///
    /// Returns HTTP 500.
    #[error("Relay error: {0}")]
    Relay(String),

    /// Path did not match any route available to the caller.
    ///
    /// Returns HTTP 400.
    #[error("Unknown")]
    UnknownRoute,

    /// Key management was called with an unsupported method.
    ///
    /// Returns HTTP 400.
    #[error("Unknown action")]
    UnknownAction,

    /// Startup configuration is unusable. Never produced while serving.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convert AppError into a webhook response.
///
/// Handlers return `Result<WebhookResponse, AppError>` and have errors
/// converted here, so each body string lives in exactly one place.
///
/// # Status Code Mapping
///
/// - `Unauthorized`, `UnauthorizedChannel` → 401
/// - `UnknownRoute`, `UnknownAction` → 400
/// - `Decode` → 500 "Unable to decode"
/// - `Database`, `Serialization` → 500 "Unable to get keys" (hides details from client)
/// - `Relay` → 500 "Unable to send"
impl From<AppError> for WebhookResponse {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Unauthorized | AppError::UnauthorizedChannel(_) => {
                WebhookResponse::text(401, error.to_string())
            }
            AppError::UnknownRoute | AppError::UnknownAction => {
                WebhookResponse::text(400, error.to_string())
            }
            AppError::Decode(_) => WebhookResponse::text(500, "Unable to decode"),
            AppError::Database(_) | AppError::Serialization(_) => {
                WebhookResponse::text(500, "Unable to get keys")
            }
            AppError::Relay(_) => WebhookResponse::text(500, "Unable to send"),
            AppError::InvalidConfig(_) => {
                WebhookResponse::text(500, "An internal error occurred")
            }
        }
    }
}
