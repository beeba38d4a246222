use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    body::Body,
    extract::Path,
    http::{Method, Request, StatusCode},
    middleware,
    routing::get,
};
use metrics_util::debugging::DebuggingRecorder;
use sortera::cache::{CacheConfig, CacheState, response_cache_layer};
use sortera::infra::http::finalize_failures;
use tower::ServiceExt;

#[tokio::test]
async fn request_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let cache_state = CacheState::new(CacheConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();

    let app = Router::new()
        .route(
            "/guide/{slug}",
            get(move |Path(_slug): Path<String>| {
                let calls = Arc::clone(&handler_calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    StatusCode::OK
                }
            }),
        )
        .layer(middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ))
        .layer(middleware::from_fn(finalize_failures));

    // Second /guide/one is a cache hit; /missing drives the failure counter.
    for (uri, expected) in [
        ("/guide/one", StatusCode::OK),
        ("/guide/one", StatusCode::OK),
        ("/guide/two", StatusCode::OK),
        ("/missing", StatusCode::NOT_FOUND),
    ] {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        assert_eq!(response.status(), expected, "uri: {uri}");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "sortera_cache_hit_total",
        "sortera_cache_miss_total",
        "sortera_cache_store_total",
        "sortera_http_requests_total",
        "sortera_http_failures_total",
        "sortera_http_request_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
