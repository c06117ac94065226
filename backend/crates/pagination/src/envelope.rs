//! Page envelopes returned alongside listed records.

use serde::{Deserialize, Serialize};

use crate::PageRequest;

/// Metadata describing where a page sits in the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// The 1-indexed page number.
    pub page: u32,
    /// Page size requested by the caller.
    pub limit: u32,
    /// Number of records across all pages.
    pub total: u64,
    /// Number of pages, `ceil(total / limit)`.
    pub pages: u64,
}

impl PaginationMeta {
    /// Derive metadata for `request` over a result set of `total` records.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, PaginationMeta};
    ///
    /// let meta = PaginationMeta::new(PageRequest::default(), 21);
    /// assert_eq!(meta.pages, 3);
    /// ```
    #[must_use]
    pub const fn new(request: PageRequest, total: u64) -> Self {
        let limit = request.limit();
        Self {
            page: request.page(),
            limit,
            total,
            pages: total.div_ceil(limit as u64),
        }
    }

    /// Whether a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.pages
    }

    /// Whether a page precedes this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// One page of items plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    meta: PaginationMeta,
}

impl<T> Page<T> {
    /// Wrap the items loaded for `request` out of `total` records.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            meta: PaginationMeta::new(request, total),
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Pagination metadata.
    #[must_use]
    pub const fn meta(&self) -> PaginationMeta {
        self.meta
    }

    /// Split the page into its items and metadata.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, PaginationMeta) {
        (self.items, self.meta)
    }

    /// Convert every item while keeping the metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(101, 25, 5)]
    fn pages_round_up(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        let request = PageRequest::try_new(Some(1), Some(limit)).expect("valid request");
        assert_eq!(PaginationMeta::new(request, total).pages, expected);
    }

    #[rstest]
    fn navigation_flags_follow_position() {
        let first = PaginationMeta::new(PageRequest::default(), 25);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = PaginationMeta::new(
            PageRequest::try_new(Some(3), None).expect("valid request"),
            25,
        );
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[rstest]
    fn meta_serialises_in_camel_case() {
        let meta = PaginationMeta::new(PageRequest::default(), 3);
        let value = serde_json::to_value(meta).expect("serialises");
        assert_eq!(
            value,
            serde_json::json!({"page": 1, "limit": 10, "total": 3, "pages": 1})
        );
    }

    #[rstest]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::default(), 2);
        let mapped = page.map(|value| value * 10);
        assert_eq!(mapped.items(), &[10, 20]);
        assert_eq!(mapped.meta().total, 2);
    }
}
