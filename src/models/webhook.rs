//! Webhook request and response models.
//!
//! Requests arrive already parsed by the host: a path, a method, the header
//! list and the raw body. The host may normalise header names (the HTTP
//! adapter lower-cases them and groups repeated names), so only the relative
//! order of values sharing a name is guaranteed. The service answers each one with
//! a status, optional headers and a raw body.
//!
//! # Flow
//!
//! 1. The host wraps a request and a reply slot into an [`Exchange`]
//! 2. The service loop authenticates and routes the request
//! 3. The produced [`WebhookResponse`] goes back through the reply slot

use serde::Deserialize;
use tokio::sync::oneshot;

/// A single header as handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Inbound webhook request forwarded by the host.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    pub path: String,
    pub method: String,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
}

impl WebhookRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            ..Default::default()
        }
    }

    /// Append a header after the ones already present.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Response handed back to the host for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
}

impl WebhookResponse {
    /// Plain-text response with no headers.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into().into_bytes(),
        }
    }

    /// 200 response carrying a JSON document.
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: vec![Header::new("Content-Type", "application/json")],
            body,
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Decoded webhook payload.
///
/// # Example
///
/// ```json
/// {
///   "message": "deploy finished",
///   "channel": "#ops"
/// }
/// ```
///
/// Field names match either lower or capitalised casing (`Message` works
/// too). Missing fields are empty; an empty channel means the default one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookBody {
    #[serde(default, alias = "Message")]
    pub message: String,

    #[serde(default, alias = "Channel")]
    pub channel: String,
}

impl WebhookBody {
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }
}

/// A request paired with the slot its response must be written to.
#[derive(Debug)]
pub struct Exchange {
    pub request: WebhookRequest,
    pub respond_to: oneshot::Sender<WebhookResponse>,
}
