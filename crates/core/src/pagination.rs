//! Page/limit query parameters shared by list endpoints.
//!
//! Both the Portuguese (`pagina`, `limite`) and English (`page`, `limit`) names
//! are accepted.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 12;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Raw pagination parameters from a query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    #[serde(default, alias = "pagina")]
    pub page: Option<u32>,
    #[serde(default, alias = "limite")]
    pub limit: Option<u32>,
}

impl PageParams {
    /// 1-based page number, at least 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Row offset for SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }

    /// Pagination metadata for a result with `total` rows.
    #[must_use]
    pub fn meta(&self, total: i64) -> Pagination {
        let total = u64::try_from(total).unwrap_or(0);
        let limit = u64::from(self.limit());
        Pagination {
            page: self.page(),
            limit: self.limit(),
            total,
            total_pages: total.div_ceil(limit),
        }
    }
}

/// Pagination block of the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}
