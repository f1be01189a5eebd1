//! Key management handlers.
//!
//! Admin-only operations on the registered key set:
//! - GET    - list keys as a JSON array
//! - POST   - register the key in the body's `message` field
//! - DELETE - remove the key in the body's `message` field
//!
//! # Request Body (POST, DELETE)
//!
//! ```json
//! {
//!   "message": "abc123"
//! }
//! ```

use crate::error::AppError;
use crate::models::api_key::fingerprint;
use crate::models::webhook::{WebhookBody, WebhookRequest, WebhookResponse};
use crate::services::key_registry::KeyRegistry;

/// Dispatch on the request method.
pub async fn handle_keys(
    registry: &KeyRegistry,
    request: &WebhookRequest,
) -> Result<WebhookResponse, AppError> {
    match request.method.as_str() {
        "GET" => list_keys(registry).await,
        "POST" => {
            let body = WebhookBody::decode(&request.body).map_err(AppError::Decode)?;
            add_key(registry, &body.message).await
        }
        "DELETE" => {
            let body = WebhookBody::decode(&request.body).map_err(AppError::Decode)?;
            delete_key(registry, &body.message).await
        }
        _ => Err(AppError::UnknownAction),
    }
}

/// # Response
///
/// 200 with `Content-Type: application/json`:
///
/// ```json
/// ["abc123", "def456"]
/// ```
pub async fn list_keys(registry: &KeyRegistry) -> Result<WebhookResponse, AppError> {
    let keys = registry.list().await;
    let body = serde_json::to_vec(&keys).map_err(AppError::Serialization)?;

    Ok(WebhookResponse::json(body))
}

/// # Response
///
/// - **200** "User added": key stored
/// - **204** "User exists": key already registered, nothing written
/// - **500**: storage failure
pub async fn add_key(registry: &KeyRegistry, key: &str) -> Result<WebhookResponse, AppError> {
    if registry.try_contains(key).await? {
        tracing::debug!(key = %fingerprint(key), "API key already registered");
        return Ok(WebhookResponse::text(204, "User exists"));
    }

    registry.add(key).await?;

    Ok(WebhookResponse::text(200, "User added"))
}

/// # Response
///
/// - **200** "User deleted": key removed
/// - **404** "User not found": key was not registered, nothing written
/// - **500**: storage failure
pub async fn delete_key(registry: &KeyRegistry, key: &str) -> Result<WebhookResponse, AppError> {
    if !registry.try_contains(key).await? {
        return Ok(WebhookResponse::text(404, "User not found"));
    }

    registry.remove(key).await?;

    Ok(WebhookResponse::text(200, "User deleted"))
}
