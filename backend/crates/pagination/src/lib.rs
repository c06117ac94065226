//! Offset pagination primitives shared by the parking backend.
//!
//! The crate keeps the paging convention in one place:
//!
//! - pages are 1-indexed and default to page 1 with 10 items;
//! - limits are capped at [`MAX_LIMIT`];
//! - responses carry `{page, limit, total, pages}` where
//!   `pages = ceil(total / limit)`.
//!
//! # Examples
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::try_new(Some(2), Some(5)).expect("valid request");
//! assert_eq!(request.offset(), 5);
//!
//! let page = Page::new(vec!["a", "b"], request, 7);
//! assert_eq!(page.meta().pages, 2);
//! ```

mod envelope;
mod links;
mod request;

pub use envelope::{Page, PaginationMeta};
pub use links::PaginationLinks;
pub use request::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, PageRequest, PageRequestError};
