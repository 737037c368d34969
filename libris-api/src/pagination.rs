//! Pagination for the list endpoints

use serde::Deserialize;

/// Default page size when the client sends no `limit`
pub const DEFAULT_LIMIT: i64 = 3;

/// Upper bound on `limit` to keep list responses small
pub const MAX_LIMIT: i64 = 100;

/// Query parameters for list endpoints (`?page=&limit=`)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Rows per page
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl ListParams {
    /// Page floored at 1, limit bounded to [1, MAX_LIMIT]
    ///
    /// A page past the end of the data is NOT clamped: the query simply
    /// returns an empty list.
    pub fn sanitized(self) -> (i64, i64) {
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, MAX_LIMIT);
        (page, limit)
    }

    /// Offset for SQL LIMIT/OFFSET query
    ///
    /// Saturates instead of overflowing, so an absurd `page` yields an
    /// offset past the end of any table.
    pub fn offset(self) -> i64 {
        let (page, limit) = self.sanitized();
        (page - 1).saturating_mul(limit)
    }

    /// Sanitized limit for SQL LIMIT/OFFSET query
    pub fn limit(self) -> i64 {
        let (_, limit) = self.sanitized();
        limit
    }

    /// Cache key suffix, stable across equivalent requests
    pub fn cache_suffix(self) -> String {
        let (page, limit) = self.sanitized();
        format!("{}-{}", page, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ListParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_for_later_pages() {
        let params = ListParams { page: 3, limit: 10 };
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_page_floored_at_one() {
        let params = ListParams { page: 0, limit: 5 };
        assert_eq!(params.offset(), 0);

        let params = ListParams { page: -7, limit: 5 };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_saturates_at_extreme_page() {
        let params = ListParams {
            page: i64::MAX,
            limit: MAX_LIMIT,
        };
        assert_eq!(params.offset(), i64::MAX);
    }

    #[test]
    fn test_limit_bounds() {
        let params = ListParams { page: 1, limit: 0 };
        assert_eq!(params.limit(), 1);

        let params = ListParams { page: 1, limit: 5000 };
        assert_eq!(params.limit(), MAX_LIMIT);
    }

    #[test]
    fn test_cache_suffix_uses_sanitized_values() {
        let params = ListParams { page: 0, limit: 5000 };
        assert_eq!(params.cache_suffix(), "1-100");

        let params = ListParams { page: 2, limit: 3 };
        assert_eq!(params.cache_suffix(), "2-3");
    }
}
