//! Message relay handler.

use crate::error::AppError;
use crate::models::webhook::{WebhookBody, WebhookRequest, WebhookResponse};
use crate::services::channel::ChannelAuthorizer;
use crate::services::relay::MessageSender;

/// Relay the body's message into a channel.
///
/// # Request Body
///
/// ```json
/// {
///   "message": "deploy finished",
///   "channel": "#ops"
/// }
/// ```
///
/// `channel` is optional; without it the configured default is used.
///
/// # Response
///
/// - **200** "Delivered": the transport accepted the message
/// - **401**: requested channel is not allowed (nothing is sent)
/// - **500** "Unable to decode" / "Unable to send"
pub async fn send_message(
    channels: &ChannelAuthorizer,
    sender: &dyn MessageSender,
    request: &WebhookRequest,
) -> Result<WebhookResponse, AppError> {
    let body = WebhookBody::decode(&request.body).map_err(AppError::Decode)?;

    let channel = channels
        .resolve(&body.channel)
        .inspect_err(|e| tracing::warn!("{}", e))?;

    sender
        .send_channel_message(&channel, &body.message)
        .await
        .inspect_err(|e| tracing::error!(channel = %channel, "Unable to send message: {}", e))?;

    tracing::info!(channel = %channel, "Message delivered");
    Ok(WebhookResponse::text(200, "Delivered"))
}
