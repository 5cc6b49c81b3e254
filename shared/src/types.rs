//! Shared Types
//!
//! Common types used across the application

use serde::{Deserialize, Serialize};

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Number of records skipped before this page
    pub fn skip(&self) -> u32 {
        self.page.saturating_sub(1) * self.limit
    }
}

/// Paginated response envelope
///
/// `has_more = skip + returned < total`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let has_more = (params.skip() as u64 + items.len() as u64) < total;
        Self {
            items,
            total,
            page: params.page,
            limit: params.limit,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_follows_skip_plus_returned() {
        let params = PaginationParams { page: 1, limit: 2 };
        let page = Paginated::new(vec![1, 2], 5, &params);
        assert!(page.has_more);

        let params = PaginationParams { page: 3, limit: 2 };
        let page = Paginated::new(vec![5], 5, &params);
        assert!(!page.has_more);
    }

    #[test]
    fn skip_never_underflows_on_page_zero() {
        let params = PaginationParams { page: 0, limit: 20 };
        assert_eq!(params.skip(), 0);
    }
}
