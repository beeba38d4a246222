//! HTTP surface: shared handler state, router assembly, and middleware.

pub mod api;
mod middleware;

pub use middleware::{RequestContext, finalize_failures, set_request_context};

use std::sync::Arc;

use axum::{Router, http::Method, middleware as axum_middleware, routing::get};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::application::repos::{
    DropboxesRepo, HealthRepo, PickupsRepo, WasteItemsRepo, WasteTypesRepo,
};
use crate::cache::{CacheState, response_cache_layer};
use crate::config::HttpSettings;

/// Repository handles the API handlers work against.
#[derive(Clone)]
pub struct ApiContext {
    pub waste_types: Arc<dyn WasteTypesRepo>,
    pub waste_items: Arc<dyn WasteItemsRepo>,
    pub dropboxes: Arc<dyn DropboxesRepo>,
    pub pickups: Arc<dyn PickupsRepo>,
    pub health: Arc<dyn HealthRepo>,
}

/// Build the CORS layer from configured origins.
///
/// The API is read-only, so only GET and the preflight OPTIONS are
/// allowed.
pub fn build_cors_layer(settings: &HttpSettings) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(settings.cors_origins.iter().cloned()))
        .allow_methods([Method::GET])
}

/// Assemble the API router.
///
/// The fixed listings sit behind the response cache when one is
/// provided; parameterized routes always reach their handler. The
/// failure boundary wraps everything, and CORS plus request-id
/// assignment sit outside it so rebuilt failure bodies still pick up
/// CORS headers.
pub fn build_router(context: ApiContext, cache: Option<CacheState>, cors: CorsLayer) -> Router {
    let mut cached_routes = Router::new()
        .route("/api/waste-types", get(api::list_waste_types))
        .route("/api/dropboxes", get(api::list_dropboxes));

    if let Some(cache_state) = cache {
        cached_routes = cached_routes.layer(axum_middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ));
    }

    Router::new()
        .merge(cached_routes)
        .route("/api/waste-types/{id}/waste", get(api::list_waste_for_type))
        .route("/api/waste", get(api::list_waste))
        .route("/api/waste/search", get(api::search_waste))
        .route("/api/pickups", get(api::list_pickups))
        .route("/api/health", get(api::health))
        .with_state(context)
        .layer(axum_middleware::from_fn(finalize_failures))
        .layer(cors)
        .layer(axum_middleware::from_fn(set_request_context))
}
