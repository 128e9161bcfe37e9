//! Request ID middleware for correlating logs with requests.
//!
//! Every request runs inside a `request` span tagged with a fresh UUID v4.
//! The id only appears in logs; responses are left untouched.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Path polled by the kubelet; its completions are logged at debug level so
/// probes do not flood the info stream.
const PROBE_PATH: &str = "/health";

/// Request ID stored in request extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Middleware that tags the request with an id and logs its completion.
///
/// Install as the outermost layer so the span covers the fallback and any
/// per-route layers too.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4());
    let probe = request.uri().path() == PROBE_PATH;

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.0,
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    );

    request.extensions_mut().insert(request_id);
    let start = Instant::now();

    async move {
        let response = next.run(request).await;
        let status = response.status().as_u16();
        let duration_ms = start.elapsed().as_millis() as u64;

        if probe {
            tracing::debug!(status, duration_ms, "Request completed");
        } else {
            tracing::info!(status, duration_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}

