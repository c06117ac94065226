//! Domain primitives, ports, and services.
//!
//! Purpose: model parking lots, sessions, billing, reports, and accounts
//! independently of HTTP and storage. Inbound adapters call the driving
//! ports in [`ports`]; services implement them on top of the driven ports.
//!
//! Public surface:
//! - [`ParkingLot`] and the space counter rules.
//! - [`ParkingSession`], [`PlateNumber`], and the entry/exit outcomes.
//! - [`charge`] and [`billable_hours`] for time-based fees.
//! - Report projections such as [`DashboardSummary`] and [`DateRange`].
//! - [`Error`] / [`ErrorCode`], the transport-agnostic failure payload.

pub mod auth;
pub mod billing;
pub mod error;
pub mod lots;
pub mod parking_lot_service;
pub mod parking_session_service;
pub mod ports;
pub mod report_service;
pub mod reports;
pub mod sessions;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::auth::{
    CredentialsValidationError, LoginCredentials, NewPassword, PASSWORD_MIN_LEN, PasswordHash,
};
pub use self::billing::{Bill, MILLIS_PER_HOUR, billable_hours, charge};
pub use self::error::{Error, ErrorCode};
pub use self::lots::{
    HOURLY_RATE_MAX, HourlyRate, LOT_CAPACITY_MAX, LotCode, LotDetails, LotFull, LotId,
    LotValidationError, NewParkingLot, ParkingLot, resized_occupancy,
};
pub use self::parking_lot_service::ParkingLotService;
pub use self::parking_session_service::ParkingSessionService;
pub use self::report_service::ReportService;
pub use self::reports::{
    ActivityItem, ActivityKind, DailyCounts, DashboardSummary, DateRange, DateRangeError,
    EnteredReport, OccupancyTotals, OutgoingReport, RECENT_ACTIVITY_LIMIT, start_of_day,
};
pub use self::sessions::{
    EntryOutcome, ExitOutcome, LotRef, ParkingSession, PlateNumber, SessionAlreadyClosed,
    SessionId, SessionRecord, SessionStatus, SessionValidationError, SessionView,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, PersonName, Principal, User, UserId, UserProfile, UserRole,
    UserValidationError,
};
pub use self::user_account_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use parking_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
