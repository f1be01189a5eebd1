//! Webhook service - composition root and request loop.
//!
//! Holds everything a request needs (admin secret, mount point, key
//! registry, channel authorizer, message sender), built once at startup and
//! passed by reference to the authenticator and the router.
//!
//! # Processing Model
//!
//! Requests are read from one stream and handled strictly one at a time:
//! a response is produced for each request before the next is read. The loop
//! ends when the stream ends.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::AppError;
use crate::handlers;
use crate::middleware::auth::{self, AuthLevel};
use crate::models::webhook::{Exchange, WebhookRequest, WebhookResponse};
use crate::services::channel::ChannelAuthorizer;
use crate::services::key_registry::KeyRegistry;
use crate::services::relay::MessageSender;

pub struct WebhookService {
    admin_key: String,
    path_prefix: String,
    registry: KeyRegistry,
    channels: ChannelAuthorizer,
    sender: Arc<dyn MessageSender>,
}

impl WebhookService {
    pub fn new(
        config: &Config,
        registry: KeyRegistry,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            admin_key: config.admin_key.clone(),
            path_prefix: config.path_prefix(),
            registry,
            channels: ChannelAuthorizer::new(config.channel.clone(), &config.allowed_channels),
            sender,
        }
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn channels(&self) -> &ChannelAuthorizer {
        &self.channels
    }

    pub fn sender(&self) -> &dyn MessageSender {
        self.sender.as_ref()
    }

    /// Authenticate and route one request.
    pub async fn handle(&self, request: &WebhookRequest) -> WebhookResponse {
        let level = auth::authenticate(request, &self.admin_key, &self.registry).await;
        if level == AuthLevel::Unauthorized {
            tracing::debug!(path = %request.path, "Rejected unauthenticated request");
            return AppError::Unauthorized.into();
        }

        handlers::route(self, level, request).await
    }

    /// Serve requests from `requests` until the stream ends.
    pub async fn run(self, mut requests: mpsc::Receiver<Exchange>) {
        while let Some(Exchange {
            request,
            respond_to,
        }) = requests.recv().await
        {
            let response = self.handle(&request).await;
            if respond_to.send(response).is_err() {
                tracing::warn!(path = %request.path, "Error sending response, requester went away");
                continue;
            }
        }

        tracing::debug!("Request stream ended");
    }
}
