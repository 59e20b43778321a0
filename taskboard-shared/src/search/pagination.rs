/// Page/limit pagination
///
/// Malformed, missing or non-positive values fall back to the defaults
/// instead of failing the request.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// One-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn positive_or(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

impl Pagination {
    /// Zero values are replaced by the defaults
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Parses raw query-string values
    ///
    /// # Example
    ///
    /// ```
    /// use taskboard_shared::search::Pagination;
    ///
    /// let pagination = Pagination::parse(Some("3"), Some("abc"));
    /// assert_eq!(pagination, Pagination::new(3, 10));
    /// assert_eq!(pagination.offset(), 20);
    /// ```
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: positive_or(page, DEFAULT_PAGE),
            limit: positive_or(limit, DEFAULT_LIMIT),
        }
    }

    /// Rows skipped before this page
    ///
    /// Saturates at `i64::MAX` for windows past any real table.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1).saturating_mul(i64::from(self.limit))
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}
