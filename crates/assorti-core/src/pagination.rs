//! # Pagination
//!
//! Normalizes `?page=&limit=` and builds the page envelope every list
//! endpoint returns.
//!
//! ```text
//! page=3, limit=10, total=42
//!   offset      = (3 - 1) * 10 = 20
//!   total_pages = ceil(42 / 10) = 5
//!   data        = rows 20..30
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Raw query parameters. Missing values fall back to page 1, limit 10.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        PageRequest {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Applies defaults, rejects values below 1 and clamps `limit` to 100.
    ///
    /// ```rust
    /// use assorti_core::PageRequest;
    ///
    /// let p = PageRequest::new(2, 500).normalize().unwrap();
    /// assert_eq!((p.page, p.limit, p.offset()), (2, 100, 100));
    ///
    /// assert!(PageRequest::new(0, 10).normalize().is_err());
    /// ```
    pub fn normalize(&self) -> Result<Pagination, ValidationError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 || limit < 1 {
            return Err(ValidationError::InvalidPagination);
        }

        Ok(Pagination {
            page,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }
}

impl Pagination {
    /// Rows to skip.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`.
    #[inline]
    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, window: Pagination) -> Self {
        Page {
            data,
            total,
            page: window.page,
            limit: window.limit,
            total_pages: window.total_pages(total),
        }
    }

    /// Maps every row, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
