use std::time::Instant;

use axum::{
    Json,
    body::Body,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use serde_json::{Map, Value};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::{
    envelope,
    error::{ErrorReport, fallback_message},
};

const METRIC_HTTP_REQUESTS: &str = "sortera_http_requests_total";
const METRIC_HTTP_FAILURES: &str = "sortera_http_failures_total";
const METRIC_HTTP_REQUEST_MS: &str = "sortera_http_request_ms";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Failure boundary for the whole router.
///
/// Successful responses pass through untouched. For any 4xx or 5xx this
/// logs the diagnostic chain from the attached [`ErrorReport`] and then
/// replaces the body with the canonical failure envelope carrying the
/// request path. Responses produced outside a handler, such as the
/// router's own fallback for unknown routes, get the same treatment, so
/// every failure leaves the process in envelope form exactly once. Only
/// the body is replaced: headers the inner service set, such as `Allow`
/// on a 405, carry over to the rebuilt response.
pub async fn finalize_failures(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    counter!(METRIC_HTTP_REQUESTS).increment(1);
    histogram!(METRIC_HTTP_REQUEST_MS).record(start.elapsed().as_secs_f64() * 1000.0);

    if status.is_client_error() || status.is_server_error() {
        counter!(METRIC_HTTP_FAILURES).increment(1);

        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, public_message, messages) = match report {
            Some(report) => (report.source, report.public_message, report.messages),
            None => ("unknown", fallback_message(status).to_string(), Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "sortera::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "sortera::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "client request error",
            );
        }

        let mut details = Map::new();
        details.insert("path".to_string(), Value::String(uri.path().to_string()));
        let body = envelope::error(&public_message, status, details);
        let mut rebuilt = (status, Json(body)).into_response();
        for (name, value) in response.headers() {
            if *name == header::CONTENT_TYPE || *name == header::CONTENT_LENGTH {
                continue;
            }
            rebuilt.headers_mut().append(name.clone(), value.clone());
        }
        return rebuilt;
    }

    response
}
