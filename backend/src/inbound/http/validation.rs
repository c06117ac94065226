//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes `400 invalid_request` with a `details`
//! object naming the offending field, so clients can highlight it.

use std::fmt::Display;

use chrono::NaiveDate;
use pagination::{PageRequest, PageRequestError};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::domain::{
    CredentialsValidationError, DateRange, DateRangeError, Error, LotValidationError,
    SessionValidationError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidField,
    InvalidUuid,
    InvalidDate,
    InvalidPage,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidField => "invalid_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidPage => "invalid_page",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

/// Domain validation errors that know which request field they refer to.
pub(crate) trait FieldError: Display {
    fn field(&self) -> &'static str;
}

macro_rules! impl_field_error {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FieldError for $ty {
                fn field(&self) -> &'static str {
                    <$ty>::field(self)
                }
            }
        )+
    };
}

impl_field_error!(
    LotValidationError,
    SessionValidationError,
    UserValidationError,
    CredentialsValidationError,
);

/// Map a domain validation error onto the field it names.
pub(crate) fn invalid_field(err: impl FieldError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(ErrorCode::InvalidField)
}

/// Map a domain validation error onto an explicitly chosen field.
///
/// Used when one domain rule backs several request fields, such as the
/// password rules behind both `currentPassword` and `newPassword`.
pub(crate) fn invalid_field_as(field: FieldName, err: impl Display) -> Error {
    ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::InvalidField)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        ValidationError::new(name, format!("{name} must be a date in YYYY-MM-DD format"))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

/// Parse the `startDate`/`endDate` pair of a report query.
pub(crate) fn parse_date_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<DateRange, Error> {
    const START: FieldName = FieldName::new("startDate");
    const END: FieldName = FieldName::new("endDate");

    let start = start_date.ok_or_else(|| missing_field_error(START))?;
    let end = end_date.ok_or_else(|| missing_field_error(END))?;
    let start = parse_date(start, START)?;
    let end = parse_date(end, END)?;
    DateRange::from_dates(start, end).map_err(|err: DateRangeError| {
        ValidationError::new(END.as_str(), err.to_string()).with_code(ErrorCode::InvalidField)
    })
}

/// `page` and `limit` query parameters shared by every listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-indexed page number; defaults to 1.
    #[param(minimum = 1, example = 1)]
    pub page: Option<u32>,
    /// Page size between 1 and 100; defaults to 10.
    #[param(minimum = 1, maximum = 100, example = 10)]
    pub limit: Option<u32>,
}

impl PageQuery {
    pub(crate) fn to_request(&self) -> Result<PageRequest, Error> {
        page_request(self.page, self.limit)
    }
}

/// Build a page request from optional `page`/`limit` query parameters.
pub(crate) fn page_request(page: Option<u32>, limit: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::try_new(page, limit).map_err(|err| {
        let field = match err {
            PageRequestError::PageTooSmall { .. } => "page",
            PageRequestError::LimitOutOfRange { .. } => "limit",
        };
        ValidationError::new(field, err.to_string()).with_code(ErrorCode::InvalidPage)
    })
}
