//! Page-based pagination
//!
//! Page windows and metadata over a counted collection. Out-of-bound
//! parameters are rejected, never clamped.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Hard upper bound on page size
pub const MAX_PAGE_SIZE: i64 = 100;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 10;

/// Pagination query parameters (`?page=2&page_size=25`)
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// Reject out-of-bound parameters.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page < 1 {
            return Err(AppError::Validation("page must be >= 1".to_string()));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(
                "page_size must be between 1 and 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of rows to skip for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub previous_page: Option<i64>,
    pub next_page: Option<i64>,
}

impl PageMeta {
    /// Compute metadata for a page over `total` items.
    ///
    /// `total_pages` is at least 1, so page 1 of an empty collection is
    /// valid while page 2 is not. Expects `params` to be validated.
    pub fn compute(total: i64, params: &PageParams) -> Result<Self, AppError> {
        let total_pages = if total == 0 {
            1
        } else {
            (total + params.page_size - 1) / params.page_size
        };

        if params.page > total_pages {
            return Err(AppError::Validation("Page not found".to_string()));
        }

        Ok(Self {
            total,
            page: params.page,
            page_size: params.page_size,
            total_pages,
            previous_page: (params.page > 1).then(|| params.page - 1),
            next_page: (params.page < total_pages).then(|| params.page + 1),
        })
    }
}

/// One page of results with its metadata
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(page: i64, page_size: i64) -> PageParams {
        PageParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        let p = PageParams::default();
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 10);
    }

    #[test]
    fn test_rejects_page_below_one() {
        let err = params(0, 10).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "page must be >= 1"));
    }

    #[test]
    fn test_rejects_page_size_out_of_bounds() {
        assert!(params(1, 0).validate().is_err());
        assert!(params(1, 101).validate().is_err());
        assert!(params(1, 1).validate().is_ok());
        assert!(params(1, 100).validate().is_ok());
    }

    #[test]
    fn test_offset_window() {
        assert_eq!(params(1, 10).offset(), 0);
        assert_eq!(params(3, 25).offset(), 50);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let meta = PageMeta::compute(21, &params(1, 10)).unwrap();
        assert_eq!(meta.total_pages, 3);

        let meta = PageMeta::compute(20, &params(1, 10)).unwrap();
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn test_empty_collection_first_page_is_valid() {
        let meta = PageMeta::compute(0, &params(1, 10)).unwrap();
        assert_eq!(
            meta,
            PageMeta {
                total: 0,
                page: 1,
                page_size: 10,
                total_pages: 1,
                previous_page: None,
                next_page: None,
            }
        );
    }

    #[test]
    fn test_empty_collection_second_page_is_rejected() {
        let err = PageMeta::compute(0, &params(2, 10)).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Page not found"));
    }

    #[test]
    fn test_page_past_end_is_rejected() {
        assert!(PageMeta::compute(30, &params(3, 10)).is_ok());
        assert!(PageMeta::compute(30, &params(4, 10)).is_err());
    }

    #[test]
    fn test_previous_and_next_boundaries() {
        let meta = PageMeta::compute(30, &params(1, 10)).unwrap();
        assert_eq!(meta.previous_page, None);
        assert_eq!(meta.next_page, Some(2));

        let meta = PageMeta::compute(30, &params(2, 10)).unwrap();
        assert_eq!(meta.previous_page, Some(1));
        assert_eq!(meta.next_page, Some(3));

        let meta = PageMeta::compute(30, &params(3, 10)).unwrap();
        assert_eq!(meta.previous_page, Some(2));
        assert_eq!(meta.next_page, None);
    }
}
