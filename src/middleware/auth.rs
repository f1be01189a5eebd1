//! API key authentication.
//!
//! Every inbound request is classified before routing:
//! 1. Scan the `x-api-key` headers in arrival order
//! 2. The admin secret wins immediately
//! 3. A registered key marks the caller as a member, but the scan goes on,
//!    so a later admin header still upgrades the caller
//! 4. Nothing matched: the request is rejected with 401

use crate::models::webhook::WebhookRequest;
use crate::services::key_registry::KeyRegistry;

/// Header that carries credentials. Matched case-insensitively.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Privilege of the caller behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthLevel {
    /// Presented the admin secret: may manage keys and send messages.
    Admin,
    /// Presented a registered key: may send messages.
    Member,
    Unauthorized,
}

/// Classify the caller of `request`.
///
/// Has no side effects; the registry is only read.
pub async fn authenticate(
    request: &WebhookRequest,
    admin_key: &str,
    registry: &KeyRegistry,
) -> AuthLevel {
    let mut level = AuthLevel::Unauthorized;

    for header in &request.headers {
        if !header.key.eq_ignore_ascii_case(API_KEY_HEADER) {
            continue;
        }
        if header.value == admin_key {
            return AuthLevel::Admin;
        }
        if level == AuthLevel::Unauthorized && registry.contains(&header.value).await {
            level = AuthLevel::Member;
        }
    }

    level
}
