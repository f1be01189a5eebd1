//! Request routing and handlers.
//!
//! Each handler:
//! 1. Receives an authenticated webhook request
//! 2. Decodes the body it needs and performs the operation
//! 3. Returns a webhook response (errors are mapped by `AppError`)
//!
//! # Routes
//!
//! Paths are lower-cased and stripped of the mount point, then matched by
//! prefix in this order:
//! - `keys*` (admin only): GET lists, POST adds, DELETE removes
//! - `sendmessage*` (admin or member): relays a message
//! - anything else: 400 "Unknown"

/// Service health endpoint
pub mod health;
/// Key management for admins
pub mod keys;
/// Message relay
pub mod messages;

use crate::error::AppError;
use crate::middleware::auth::AuthLevel;
use crate::models::webhook::{WebhookRequest, WebhookResponse};
use crate::services::webhook_service::WebhookService;

const KEYS_ROUTE: &str = "keys";
const SEND_MESSAGE_ROUTE: &str = "sendmessage";

/// Lower-case `path` and strip one leading `/`, the mount point, then one
/// more leading `/`.
pub fn normalize_path(path: &str, prefix: &str) -> String {
    let path = path.to_lowercase();
    let path = path.strip_prefix('/').unwrap_or(&path);
    let path = path.strip_prefix(prefix).unwrap_or(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    path.to_string()
}

/// Dispatch an authenticated request.
pub async fn route(
    service: &WebhookService,
    level: AuthLevel,
    request: &WebhookRequest,
) -> WebhookResponse {
    let path = normalize_path(&request.path, service.path_prefix());
    tracing::debug!(path = %path, method = %request.method, ?level, "Routing request");

    let result = if level == AuthLevel::Admin && path.starts_with(KEYS_ROUTE) {
        keys::handle_keys(service.registry(), request).await
    } else if path.starts_with(SEND_MESSAGE_ROUTE) {
        messages::send_message(service.channels(), service.sender(), request).await
    } else {
        Err(AppError::UnknownRoute)
    };

    result.unwrap_or_else(WebhookResponse::from)
}
