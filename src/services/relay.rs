//! Chat relay - hands messages to the host's chat transport.
//!
//! The service only depends on [`MessageSender`]; [`HttpRelay`] is the
//! production implementation, which posts each message to the host over HTTP
//! with an HMAC signature.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// One-shot delivery of a line of text into a named channel.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_channel_message(&self, channel: &str, message: &str) -> Result<(), AppError>;
}

/// Body posted to the relay endpoint.
#[derive(Debug, Serialize)]
pub struct ChannelMessage<'a> {
    pub channel: &'a str,
    pub message: &'a str,
}

/// Sends messages to the chat host over HTTP.
///
/// # Headers Sent
///
/// - `Content-Type: application/json`
/// - `Authorization: Bearer <token>` (when a token is configured)
/// - `X-Webhook-Signature: sha256=<hex>`
///
/// # Timeout
///
/// 5 seconds per message.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Relay(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl MessageSender for HttpRelay {
    async fn send_channel_message(&self, channel: &str, message: &str) -> Result<(), AppError> {
        let payload = serde_json::to_string(&ChannelMessage { channel, message })
            .map_err(AppError::Serialization)?;
        let signature = generate_signature(&self.token, &payload)?;

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header(SIGNATURE_HEADER, signature);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| AppError::Relay(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Relay(format!("Relay answered {}", status)));
        }

        Ok(())
    }
}

/// Generate HMAC-SHA256 signature for a relay payload.
///
/// # Format
///
/// `sha256=<hex_encoded_hmac>`
pub fn generate_signature(secret: &str, payload: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Relay(format!("Invalid signing key: {}", e)))?;
    mac.update(payload.as_bytes());
    let result = mac.finalize();
    Ok(format!("sha256={}", hex::encode(result.into_bytes())))
}
