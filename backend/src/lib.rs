//! Parking lot management backend.
//!
//! Hexagonal layout: [`domain`] holds the lot, session, billing, report and
//! account rules behind ports; [`inbound`] adapts HTTP onto them and
//! [`outbound`] provides PostgreSQL, in-memory, hashing and metrics adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
