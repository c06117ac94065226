//! OpenAPI schema definitions for domain and pagination types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with current state, such as a full lot.
    #[schema(rename = "conflict")]
    Conflict,
    /// The database or another backing service is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "parking lot is full")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "6f1c2a9e-3f55-4c1e-9d1f-0f3c6b2e8a11")]
    trace_id: Option<String>,
    /// Supplementary error details, such as the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::UserRole`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserRole)]
pub enum UserRoleSchema {
    /// Manages lots, users, and reports.
    #[schema(rename = "admin")]
    Admin,
    /// Records vehicle entries and exits.
    #[schema(rename = "attendant")]
    Attendant,
}

/// OpenAPI schema for [`crate::domain::User`].
///
/// Registered account as returned to clients.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "Ada")]
    first_name: String,
    #[schema(example = "Lovelace")]
    last_name: String,
    /// Lower-cased login email.
    #[schema(example = "ada@example.com")]
    email: String,
    role: UserRoleSchema,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`pagination::PaginationMeta`].
#[derive(ToSchema)]
#[schema(as = pagination::PaginationMeta)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PaginationMetaSchema {
    /// The 1-indexed page number.
    #[schema(example = 1)]
    page: u32,
    /// Page size requested by the caller.
    #[schema(example = 10)]
    limit: u32,
    /// Number of records across all pages.
    #[schema(example = 42)]
    total: u64,
    /// Number of pages, `ceil(total / limit)`.
    #[schema(example = 5)]
    pages: u64,
}

/// OpenAPI schema for [`pagination::PaginationLinks`].
#[derive(ToSchema)]
#[schema(as = pagination::PaginationLinks)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PaginationLinksSchema {
    /// Link to the current page.
    #[schema(rename = "self")]
    current: String,
    /// Link to the next page, when one exists.
    next: Option<String>,
    /// Link to the previous page, when one exists.
    prev: Option<String>,
}
