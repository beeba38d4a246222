//! Uniform JSON response envelope.
//!
//! Every payload the API returns goes through one of these builders. A
//! response body carries either a `data` field (single result set) or an
//! `items` field with a `pagination` block, never both. Failure bodies
//! carry `success: false` plus the HTTP status and whatever details the
//! failure boundary attaches, such as the request path.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Message used when a handler has nothing more specific to say.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Success";
/// Message used for failures whose detail must stay out of the response.
pub const DEFAULT_ERROR_MESSAGE: &str = "Internal server error";

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    pub total_pages: u64,
}

impl PageMeta {
    /// Derive the block from resolved paging values and a total row count.
    ///
    /// `total_pages` rounds up, so a partial final page still counts.
    pub fn new(page: i64, limit: i64, total: u64) -> Self {
        let limit_rows = u64::try_from(limit).unwrap_or(1).max(1);
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit_rows),
        }
    }
}

/// Build a `{success, message, data}` body around a single result set.
pub fn success<T: Serialize>(data: &T, message: &str) -> Value {
    json!({
        "success": true,
        "message": message,
        "data": data,
    })
}

/// Build a `{success, message, items, pagination}` body for a paginated list.
pub fn paginated<T: Serialize>(items: &[T], pagination: &PageMeta, message: &str) -> Value {
    json!({
        "success": true,
        "message": message,
        "items": items,
        "pagination": pagination,
    })
}

/// Build a `{success, message, status, ..details}` failure body.
///
/// Extra keys in `details` land at the top level of the body. The failure
/// boundary uses this to add the request path.
pub fn error(message: &str, status: StatusCode, details: Map<String, Value>) -> Value {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(false));
    body.insert("message".to_string(), Value::String(message.to_string()));
    body.insert("status".to_string(), json!(status.as_u16()));
    body.extend(details);
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wraps_data() {
        let body = success(&vec!["glass", "paper"], DEFAULT_SUCCESS_MESSAGE);

        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Success"));
        assert_eq!(body["data"], json!(["glass", "paper"]));
        assert!(body.get("items").is_none());
    }

    #[test]
    fn paginated_puts_items_and_pagination_at_top_level() {
        let meta = PageMeta::new(2, 50, 120);
        let body = paginated(&[1, 2, 3], &meta, DEFAULT_SUCCESS_MESSAGE);

        assert_eq!(body["success"], json!(true));
        assert_eq!(body["items"], json!([1, 2, 3]));
        assert_eq!(body["pagination"]["page"], json!(2));
        assert_eq!(body["pagination"]["limit"], json!(50));
        assert_eq!(body["pagination"]["total"], json!(120));
        assert_eq!(body["pagination"]["totalPages"], json!(3));
        assert!(body.get("data").is_none());
    }

    #[test]
    fn error_merges_details_at_top_level() {
        let mut details = Map::new();
        details.insert("path".to_string(), json!("/api/waste"));
        let body = error("No waste types found.", StatusCode::NOT_FOUND, details);

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("No waste types found."));
        assert_eq!(body["status"], json!(404));
        assert_eq!(body["path"], json!("/api/waste"));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PageMeta::new(1, 10, 1).total_pages, 1);
        assert_eq!(PageMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PageMeta::new(1, 10, 11).total_pages, 2);
        assert_eq!(PageMeta::new(2, 50, 120).total_pages, 3);
    }
}
