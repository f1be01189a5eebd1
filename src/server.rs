//! HTTP host adapter.
//!
//! Registers the webhook mount point on an HTTP listener and forwards every
//! matching request into the service loop, one [`Exchange`] per request. The
//! loop answers through the exchange's reply slot and the answer is turned
//! back into an HTTP response.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::handlers;
use crate::models::webhook::{Exchange, Header, WebhookRequest, WebhookResponse};

/// Requests waiting for the service loop before senders are held back.
pub const REQUEST_BUFFER: usize = 64;

/// Shared state of the HTTP adapter.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub requests: mpsc::Sender<Exchange>,
}

/// Build the HTTP router: `/health` plus every path under `/<prefix>`.
///
/// The mount point matches in any casing (`/WebHook/keys` reaches the
/// service like `/webhook/keys`); other unmatched paths are 404.
pub fn router(prefix: &str, state: AppState) -> Router {
    let mount = prefix.to_lowercase();

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(&format!("/{prefix}"), any(forward))
        .route(&format!("/{prefix}/{{*rest}}"), any(forward))
        .fallback(
            move |state: State<AppState>,
                  method: Method,
                  uri: Uri,
                  headers: HeaderMap,
                  body: Bytes| {
                let mounted = is_mounted(uri.path(), &mount);
                async move {
                    if mounted {
                        forward(state, method, uri, headers, body).await
                    } else {
                        StatusCode::NOT_FOUND.into_response()
                    }
                }
            },
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Whether `path` is `/<prefix>` or lies under it, ignoring case.
pub fn is_mounted(path: &str, prefix: &str) -> bool {
    let path = path.to_lowercase();
    match path.strip_prefix('/').and_then(|p| p.strip_prefix(prefix)) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Hand one HTTP request to the service loop and wait for its answer.
async fn forward(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("webhook", %request_id, path = %uri.path());

    async move {
        let request = to_webhook_request(&method, &uri, &headers, body);
        let (respond_to, response) = oneshot::channel();

        if state
            .requests
            .send(Exchange {
                request,
                respond_to,
            })
            .await
            .is_err()
        {
            tracing::error!("Service loop is not running");
            return unavailable();
        }

        match response.await {
            Ok(response) => response.into_response(),
            Err(_) => {
                tracing::error!("Service loop dropped the request");
                unavailable()
            }
        }
    }
    .instrument(span)
    .await
}

fn unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response()
}

/// Header names come out lower-cased and grouped by name, as `HeaderMap`
/// stores them; repeated values of one name keep their relative order.
/// Values that are not valid UTF-8 are converted lossily.
pub fn to_webhook_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> WebhookRequest {
    WebhookRequest {
        path: uri.path().to_string(),
        method: method.as_str().to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                Header::new(name.as_str(), String::from_utf8_lossy(value.as_bytes()))
            })
            .collect(),
        body: body.to_vec(),
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut headers = HeaderMap::new();
        for header in &self.headers {
            match (
                HeaderName::try_from(header.key.as_str()),
                HeaderValue::try_from(header.value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!(header = %header.key, "Dropping invalid response header"),
            }
        }

        (status, headers, self.body).into_response()
    }
}
