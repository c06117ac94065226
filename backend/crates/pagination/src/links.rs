//! Navigation links derived from the request URL.

use serde::Serialize;
use url::Url;

use crate::PaginationMeta;

/// Absolute links to neighbouring pages.
///
/// Existing query parameters on the base URL are preserved; only `page` and
/// `limit` are rewritten.
///
/// # Examples
/// ```
/// use pagination::{PageRequest, PaginationLinks, PaginationMeta};
/// use url::Url;
///
/// let base = Url::parse("http://localhost/api/v1/parking-lots?page=1").expect("url");
/// let meta = PaginationMeta::new(PageRequest::default(), 30);
/// let links = PaginationLinks::from_meta(&base, meta);
/// assert_eq!(
///     links.next.as_deref(),
///     Some("http://localhost/api/v1/parking-lots?page=2&limit=10")
/// );
/// assert!(links.prev.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub current: String,
    /// Link to the next page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the previous page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl PaginationLinks {
    /// Build links for `meta` relative to `base`.
    #[must_use]
    pub fn from_meta(base: &Url, meta: PaginationMeta) -> Self {
        let next = meta
            .has_next()
            .then(|| page_url(base, meta.page.saturating_add(1), meta.limit));
        let prev = meta
            .has_previous()
            .then(|| page_url(base, meta.page.saturating_sub(1), meta.limit));
        Self {
            current: page_url(base, meta.page, meta.limit),
            next,
            prev,
        }
    }
}

fn page_url(base: &Url, page: u32, limit: u32) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page" && key != "limit")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
    }
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageRequest;
    use rstest::rstest;

    fn base() -> Url {
        Url::parse("http://localhost/api/v1/reports/entered?startDate=2026-01-01&page=2&limit=5")
            .expect("fixture url")
    }

    #[rstest]
    fn keeps_unrelated_query_parameters() {
        let meta = PaginationMeta::new(
            PageRequest::try_new(Some(2), Some(5)).expect("valid request"),
            12,
        );
        let links = PaginationLinks::from_meta(&base(), meta);
        assert_eq!(
            links.current,
            "http://localhost/api/v1/reports/entered?startDate=2026-01-01&page=2&limit=5"
        );
        assert_eq!(
            links.next.as_deref(),
            Some("http://localhost/api/v1/reports/entered?startDate=2026-01-01&page=3&limit=5")
        );
        assert_eq!(
            links.prev.as_deref(),
            Some("http://localhost/api/v1/reports/entered?startDate=2026-01-01&page=1&limit=5")
        );
    }

    #[rstest]
    fn single_page_has_no_neighbours() {
        let meta = PaginationMeta::new(PageRequest::default(), 3);
        let links = PaginationLinks::from_meta(&base(), meta);
        assert!(links.next.is_none());
        assert!(links.prev.is_none());
    }

    #[rstest]
    fn serialises_current_link_as_self() {
        let meta = PaginationMeta::new(PageRequest::default(), 0);
        let value = serde_json::to_value(PaginationLinks::from_meta(&base(), meta))
            .expect("serialises");
        assert!(value.get("self").is_some());
        assert!(value.get("next").is_none());
    }
}
