//! Page-based pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Requested page window (1-based page number).
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

impl Pagination {
    /// Normalize raw query values: page 0 becomes 1, limit is clamped to `1..=MAX_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Wrap one window of rows together with the unpaginated row count.
    pub fn page_of<T>(&self, total: u64, data: Vec<T>) -> Page<T> {
        let last_page = if total == 0 {
            1
        } else {
            total.div_ceil(u64::from(self.limit))
        };
        Page {
            total,
            per_page: self.limit,
            page: self.page,
            last_page,
            data,
        }
    }

    /// Cut the requested window out of an already-filtered, ordered collection.
    pub fn slice<T>(&self, rows: Vec<T>) -> Page<T> {
        let total = rows.len() as u64;
        let data = rows
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect();
        self.page_of(total, data)
    }
}

/// One page of results plus the metadata clients need to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total: u64,
    pub per_page: u32,
    pub page: u32,
    pub last_page: u64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            per_page: self.per_page,
            page: self.page,
            last_page: self.last_page,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_page_and_oversized_limit_are_normalized() {
        let p = Pagination::new(Some(0), Some(10_000));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, MAX_LIMIT);
    }

    #[test]
    fn slice_returns_requested_window() {
        let p = Pagination::new(Some(2), Some(3));
        let page = p.slice((1..=8).collect::<Vec<_>>());
        assert_eq!(page.data, vec![4, 5, 6]);
        assert_eq!(page.total, 8);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.per_page, 3);
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let page = Pagination::default().slice(Vec::<u8>::new());
        assert_eq!(page.last_page, 1);
        assert!(page.data.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let page = Pagination::default().slice(vec![1]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["perPage"], 20);
        assert_eq!(json["lastPage"], 1);
    }

    proptest! {
        /// Property: the window never exceeds the limit and pages cover every row.
        #[test]
        fn pages_cover_all_rows(len in 0usize..500, limit in 1u32..50) {
            let first = Pagination::new(Some(1), Some(limit)).slice(vec![0u8; len]);
            let mut seen = 0usize;
            for page in 1..=first.last_page as u32 {
                let window = Pagination::new(Some(page), Some(limit)).slice(vec![0u8; len]);
                prop_assert!(window.data.len() <= limit as usize);
                seen += window.data.len();
            }
            prop_assert_eq!(seen, len);
        }
    }
}
