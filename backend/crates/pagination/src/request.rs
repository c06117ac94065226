//! Validated page requests.

use serde::{Deserialize, Serialize};

/// Page used when the caller does not supply one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised when a page request falls outside the supported window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Pages are 1-indexed.
    #[error("page must be at least 1, got {page}")]
    PageTooSmall {
        /// Rejected page number.
        page: u32,
    },
    /// The limit is zero or above [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max}, got {limit}")]
    LimitOutOfRange {
        /// Rejected limit.
        limit: u32,
        /// Largest accepted limit.
        max: u32,
    },
}

/// A 1-indexed page request.
///
/// # Examples
/// ```
/// use pagination::{PageRequest, DEFAULT_LIMIT};
///
/// let request = PageRequest::default();
/// assert_eq!(request.page(), 1);
/// assert_eq!(request.limit(), DEFAULT_LIMIT);
/// assert_eq!(request.offset(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

#[derive(Deserialize)]
struct RawPageRequest {
    page: Option<u32>,
    limit: Option<u32>,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::try_new(value.page, value.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request, applying defaults for missing values.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `page` is zero or `limit` is outside
    /// `1..=MAX_LIMIT`.
    pub const fn try_new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(value) => value,
            None => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(value) => value,
            None => DEFAULT_LIMIT,
        };
        if page < 1 {
            return Err(PageRequestError::PageTooSmall { page });
        }
        if limit < 1 || limit > MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange {
                limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    /// The 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(3), None, 3, 10)]
    #[case(None, Some(100), 1, 100)]
    fn applies_defaults(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let request = PageRequest::try_new(page, limit).expect("valid request");
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.limit(), expected_limit);
    }

    #[rstest]
    #[case(Some(0), None, PageRequestError::PageTooSmall { page: 0 })]
    #[case(None, Some(0), PageRequestError::LimitOutOfRange { limit: 0, max: MAX_LIMIT })]
    #[case(None, Some(101), PageRequestError::LimitOutOfRange { limit: 101, max: MAX_LIMIT })]
    fn rejects_out_of_range(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected: PageRequestError,
    ) {
        assert_eq!(PageRequest::try_new(page, limit), Err(expected));
    }

    #[rstest]
    fn offset_skips_previous_pages() {
        let request = PageRequest::try_new(Some(4), Some(25)).expect("valid request");
        assert_eq!(request.offset(), 75);
    }

    #[rstest]
    fn deserialises_missing_fields_as_defaults() {
        let request: PageRequest = serde_json::from_str("{}").expect("defaults apply");
        assert_eq!(request, PageRequest::default());
    }

    #[rstest]
    fn deserialisation_validates() {
        let result = serde_json::from_str::<PageRequest>(r#"{"page":0}"#);
        assert!(result.is_err());
    }
}
