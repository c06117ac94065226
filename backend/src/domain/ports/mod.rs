//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, metrics) are implemented by outbound
//! adapters. Driving ports (commands and queries) are implemented by domain
//! services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod parking_lot_command;
mod parking_lot_query;
mod parking_lot_repository;
mod parking_metrics;
mod parking_session_command;
mod parking_session_query;
mod parking_session_repository;
mod password_hasher;
mod report_query;
mod report_repository;
mod user_account_command;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use parking_lot_command::MockParkingLotCommand;
pub use parking_lot_command::{CreateLotRequest, ParkingLotCommand};
#[cfg(test)]
pub use parking_lot_query::MockParkingLotQuery;
pub use parking_lot_query::ParkingLotQuery;
#[cfg(test)]
pub use parking_lot_repository::MockParkingLotRepository;
pub use parking_lot_repository::{
    FixtureParkingLotRepository, ParkingLotRepository, ParkingLotRepositoryError,
};
#[cfg(test)]
pub use parking_metrics::MockParkingMetrics;
pub use parking_metrics::{
    EntryRejection, NoOpParkingMetrics, ParkingMetrics, ParkingMetricsError,
};
#[cfg(test)]
pub use parking_session_command::MockParkingSessionCommand;
pub use parking_session_command::ParkingSessionCommand;
#[cfg(test)]
pub use parking_session_query::MockParkingSessionQuery;
pub use parking_session_query::ParkingSessionQuery;
#[cfg(test)]
pub use parking_session_repository::MockParkingSessionRepository;
pub use parking_session_repository::{
    FixtureParkingSessionRepository, NewSessionEntry, ParkingSessionRepository,
    ParkingSessionRepositoryError,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use report_query::MockReportQuery;
pub use report_query::ReportQuery;
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{
    ExitedPage, FixtureReportRepository, ReportRepository, ReportRepositoryError,
};
#[cfg(test)]
pub use user_account_command::MockUserAccountCommand;
pub use user_account_command::{ChangePasswordRequest, RegisterUserRequest, UserAccountCommand};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;

#[cfg(test)]
mod tests;
