//! Response cache middleware.
//!
//! Serves stored GET responses without touching the handlers below, and
//! stores fresh 200 responses on the way out. Failure responses pass
//! through uncached so a transient error never gets pinned for a full
//! TTL window.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::{debug, instrument};

use super::{
    CacheConfig,
    keys::ResponseKey,
    store::{CachedResponse, ResponseStore},
};

const METRIC_CACHE_HIT: &str = "sortera_cache_hit_total";
const METRIC_CACHE_MISS: &str = "sortera_cache_miss_total";
const METRIC_CACHE_STORE: &str = "sortera_cache_store_total";

/// Shared cache state for middleware.
///
/// The store is built once at startup and cloned by handle into every
/// request, so all requests in the process observe the same entries.
#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<ResponseStore>,
}

impl CacheState {
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(ResponseStore::new(&config));
        Self { config, store }
    }
}

/// Middleware for response caching.
///
/// Only GET requests that return 200 OK are stored. Everything else
/// passes straight through.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enabled {
        return next.run(request).await;
    }

    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let path = request.uri().path();
    let query = request.uri().query().unwrap_or("");
    let key = ResponseKey::from_parts(path, query);

    if let Some(cached) = cache.store.get(&key) {
        counter!(METRIC_CACHE_HIT).increment(1);
        debug!(outcome = "hit", "serving cached response");
        return build_response(cached);
    }

    counter!(METRIC_CACHE_MISS).increment(1);
    debug!(outcome = "miss", "cache miss, executing handler");

    let response = next.run(request).await;

    if response.status() == StatusCode::OK {
        let (parts, body) = response.into_parts();
        let bytes = match axum::body::to_bytes(body, cache.config.body_limit_bytes).await {
            Ok(b) => b,
            Err(_) => {
                // Body collection failed, nothing usable left to return
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let cached = CachedResponse {
            status: parts.status.as_u16(),
            headers: parts
                .headers
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
                .collect(),
            body: bytes.clone(),
        };

        counter!(METRIC_CACHE_STORE).increment(1);
        debug!("caching response");

        cache.store.set(key, cached, cache.config.ttl());

        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    }
}

/// Build a response from cached data.
fn build_response(cached: CachedResponse) -> Response {
    use axum::http::HeaderValue;

    let mut builder = Response::builder().status(cached.status);

    for (name, value) in cached.headers {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, header_value);
        }
    }

    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn build_response_restores_status_headers_and_body() {
        let cached = CachedResponse {
            status: 200,
            headers: vec![(
                "content-type".to_string(),
                "application/json".to_string(),
            )],
            body: Bytes::from("{\"success\":true}"),
        };

        let response = build_response(cached);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .expect("content type header"),
            "application/json"
        );
    }

    #[test]
    fn build_response_skips_unrepresentable_headers() {
        let cached = CachedResponse {
            status: 200,
            headers: vec![("x-odd".to_string(), "line\nbreak".to_string())],
            body: Bytes::new(),
        };

        let response = build_response(cached);

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-odd").is_none());
    }
}
