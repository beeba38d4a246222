//! Request parameter handling.
//!
//! Paging input is forgiving: anything that does not parse as an integer
//! falls back to a default, and out-of-range values are clamped instead of
//! rejected. Identifier input is strict and is the only place a query or
//! path parameter can fail validation.

use crate::application::envelope::PageMeta;
use crate::application::error::ApiError;

/// Page used when the query string carries none.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when the query string carries none.
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest page size a caller can request.
pub const MAX_LIMIT: i64 = 100;

/// Resolved paging values, always within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    /// Resolve raw query values into usable paging numbers.
    ///
    /// Missing or non-numeric input falls back to the defaults, then the
    /// page is clamped to at least 1 and the limit to `1..=MAX_LIMIT`.
    /// This never fails.
    pub fn resolve(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_or(page, DEFAULT_PAGE).max(1);
        let limit = parse_or(limit, DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Self { page, limit }
    }

    /// Number of rows to skip before the requested page starts.
    ///
    /// Saturates at `i64::MAX` for absurdly large pages, so an oversized
    /// page number yields an empty page instead of an overflow.
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Pagination block for a response carrying `total` matching rows.
    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta::new(self.page, self.limit, total)
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Parse a path or query value as a positive integer identifier.
///
/// `entity` names what the identifier refers to and appears in the
/// validation message, e.g. "waste type".
pub fn entity_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation(format!("Invalid {entity} ID."))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_defaults_when_absent() {
        let params = PageParams::resolve(None, None);
        assert_eq!(params, PageParams { page: 1, limit: 10 });
    }

    #[test]
    fn resolve_falls_back_on_garbage() {
        let params = PageParams::resolve(Some("two"), Some("ten"));
        assert_eq!(params, PageParams { page: 1, limit: 10 });

        let params = PageParams::resolve(Some("3.5"), Some(""));
        assert_eq!(params, PageParams { page: 1, limit: 10 });
    }

    #[test]
    fn resolve_clamps_out_of_range_values() {
        let params = PageParams::resolve(Some("0"), Some("0"));
        assert_eq!(params, PageParams { page: 1, limit: 1 });

        let params = PageParams::resolve(Some("-5"), Some("1000"));
        assert_eq!(params, PageParams { page: 1, limit: 100 });
    }

    #[test]
    fn skip_is_zero_based_offset() {
        assert_eq!(PageParams { page: 1, limit: 10 }.skip(), 0);
        assert_eq!(PageParams { page: 2, limit: 50 }.skip(), 50);
        assert_eq!(PageParams { page: 4, limit: 25 }.skip(), 75);
    }

    #[test]
    fn skip_saturates_for_oversized_pages() {
        let params = PageParams::resolve(Some("9223372036854775807"), Some("100"));
        assert_eq!(params.page, i64::MAX);
        assert_eq!(params.limit, 100);
        assert_eq!(params.skip(), i64::MAX);
    }

    #[test]
    fn entity_id_accepts_positive_integers() {
        assert_eq!(entity_id("42", "waste type").ok(), Some(42));
        assert_eq!(entity_id(" 7 ", "waste type").ok(), Some(7));
    }

    #[test]
    fn entity_id_rejects_everything_else() {
        for raw in ["0", "-1", "abc", "4.2", ""] {
            let err = entity_id(raw, "waste type").unwrap_err();
            assert_eq!(err.http_status().as_u16(), 400);
            assert!(err.public_message().contains("waste type"), "raw: {raw}");
        }
    }
}
