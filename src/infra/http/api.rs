//! Request handlers for the waste guide API.
//!
//! Every handler resolves its inputs, talks to a repository trait, and
//! returns either a success envelope or an [`ApiError`]. Empty results
//! are a 404 for the fixed listings and lookups, but the paginated
//! listings return an empty success page instead, so clients can page
//! past the end of a result set without tripping error handling.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::application::{
    envelope::{self, DEFAULT_SUCCESS_MESSAGE},
    error::ApiError,
    params::{self, PageParams},
    repos::{PickupQueryFilter, WasteQueryFilter},
};

use super::ApiContext;

/// Hard cap on name-search results.
pub const SEARCH_RESULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct WasteListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WasteSearchQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PickupListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub district: Option<String>,
}

/// GET /api/waste-types
pub async fn list_waste_types(State(ctx): State<ApiContext>) -> Result<Json<Value>, ApiError> {
    let types = ctx
        .waste_types
        .list_types()
        .await
        .map_err(|err| ApiError::upstream("listing waste types", err))?;

    if types.is_empty() {
        return Err(ApiError::not_found("No waste types found."));
    }

    Ok(Json(envelope::success(&types, DEFAULT_SUCCESS_MESSAGE)))
}

/// GET /api/waste-types/{id}/waste
pub async fn list_waste_for_type(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let type_id = params::entity_id(&id, "waste type")?;

    let items = ctx
        .waste_items
        .list_for_type(type_id)
        .await
        .map_err(|err| ApiError::upstream("listing waste for type", err))?;

    if items.is_empty() {
        return Err(ApiError::not_found("No waste found for the given ID."));
    }

    Ok(Json(envelope::success(&items, DEFAULT_SUCCESS_MESSAGE)))
}

/// GET /api/waste
pub async fn list_waste(
    State(ctx): State<ApiContext>,
    Query(query): Query<WasteListQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = PageParams::resolve(query.page.as_deref(), query.limit.as_deref());
    let filter = WasteQueryFilter {
        search: non_empty(query.search),
    };

    let (items, total) = tokio::try_join!(
        ctx.waste_items.list_page(&filter, params.skip(), params.limit),
        ctx.waste_items.count(&filter),
    )
    .map_err(|err| ApiError::upstream("listing waste", err))?;

    Ok(Json(envelope::paginated(
        &items,
        &params.meta(total),
        DEFAULT_SUCCESS_MESSAGE,
    )))
}

/// GET /api/waste/search
pub async fn search_waste(
    State(ctx): State<ApiContext>,
    Query(query): Query<WasteSearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let name =
        non_empty(query.name).ok_or_else(|| ApiError::validation("Waste name is required."))?;

    let items = ctx
        .waste_items
        .search_by_name(&name, SEARCH_RESULT_LIMIT)
        .await
        .map_err(|err| ApiError::upstream("searching waste by name", err))?;

    if items.is_empty() {
        return Err(ApiError::not_found("No waste found with the given name."));
    }

    Ok(Json(envelope::success(&items, DEFAULT_SUCCESS_MESSAGE)))
}

/// GET /api/dropboxes
pub async fn list_dropboxes(State(ctx): State<ApiContext>) -> Result<Json<Value>, ApiError> {
    let dropboxes = ctx
        .dropboxes
        .list_all()
        .await
        .map_err(|err| ApiError::upstream("listing dropboxes", err))?;

    if dropboxes.is_empty() {
        return Err(ApiError::not_found("No dropboxes found."));
    }

    Ok(Json(envelope::success(&dropboxes, DEFAULT_SUCCESS_MESSAGE)))
}

/// GET /api/pickups
pub async fn list_pickups(
    State(ctx): State<ApiContext>,
    Query(query): Query<PickupListQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = PageParams::resolve(query.page.as_deref(), query.limit.as_deref());
    let filter = PickupQueryFilter {
        district: non_empty(query.district),
    };

    let (pickups, total) = tokio::try_join!(
        ctx.pickups.list_page(&filter, params.skip(), params.limit),
        ctx.pickups.count(&filter),
    )
    .map_err(|err| ApiError::upstream("listing pickups", err))?;

    Ok(Json(envelope::paginated(
        &pickups,
        &params.meta(total),
        DEFAULT_SUCCESS_MESSAGE,
    )))
}

/// GET /api/health
pub async fn health(State(ctx): State<ApiContext>) -> Result<Json<Value>, ApiError> {
    ctx.health
        .ping()
        .await
        .map_err(|err| ApiError::upstream("database health check", err))?;

    Ok(Json(envelope::success(
        &json!({ "status": "ok" }),
        DEFAULT_SUCCESS_MESSAGE,
    )))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
