//! Shared translation of pool and Diesel failures.
//!
//! Repositories classify a failure once with [`classify_diesel_error`] and
//! then pick their own error variant, so unique-constraint violations can be
//! turned into domain conflicts while everything else keeps the
//! connection/query split.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse outcome of a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint or unique index rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Any other query failure.
    Query(String),
}

impl DieselFailure {
    /// True when the violated constraint is `name`.
    pub(crate) fn violates(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint: Some(found) } if found == name)
    }
}

/// Error type for transaction closures that can stop on a domain rule as
/// well as on a Diesel failure. Returning either variant rolls back.
#[derive(Debug)]
pub(crate) enum TxError<E> {
    Diesel(DieselError),
    Rejected(E),
}

impl<E> From<DieselError> for TxError<E> {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl<E> TxError<E> {
    /// Collapse into the repository error, mapping Diesel failures with
    /// `map_diesel`.
    pub(crate) fn resolve(self, map_diesel: impl FnOnce(DieselError) -> E) -> E {
        match self {
            Self::Diesel(error) => map_diesel(error),
            Self::Rejected(error) => error,
        }
    }
}

/// Extract the message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the driver detail at debug level.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            DieselFailure::Query("database query error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        _ => DieselFailure::Query("database error".to_owned()),
    }
}

/// Map the generic failure kinds onto a repository's constructors.
///
/// Unique violations fall back to `query` here; repositories that expect one
/// check [`DieselFailure::violates`] first.
pub(crate) fn map_basic_failure<E>(
    failure: DieselFailure,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    match failure {
        DieselFailure::Connection(message) => connection(message),
        DieselFailure::UniqueViolation { constraint } => query(format!(
            "unique constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DieselFailure::Query(message) => query(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify_diesel_error(DieselError::NotFound),
            DieselFailure::Query("record not found".to_owned())
        );
    }

    #[rstest]
    fn violation_matches_only_its_constraint() {
        let failure = DieselFailure::UniqueViolation {
            constraint: Some("parking_lots_code_key".to_owned()),
        };
        assert!(failure.violates("parking_lots_code_key"));
        assert!(!failure.violates("users_email_key"));
        assert!(!DieselFailure::Query("x".to_owned()).violates("users_email_key"));
    }

    #[rstest]
    #[case(DieselFailure::Connection("gone".to_owned()), "connection: gone")]
    #[case(DieselFailure::Query("bad".to_owned()), "query: bad")]
    #[case(
        DieselFailure::UniqueViolation { constraint: None },
        "query: unique constraint violated: unknown"
    )]
    fn basic_mapping_keeps_the_split(#[case] failure: DieselFailure, #[case] expected: &str) {
        let mapped = map_basic_failure(
            failure,
            |message| format!("query: {message}"),
            |message| format!("connection: {message}"),
        );
        assert_eq!(mapped, expected);
    }

    #[rstest]
    fn rejected_transactions_keep_the_domain_error() {
        let rejected: TxError<String> = TxError::Rejected("lot full".to_owned());
        assert_eq!(rejected.resolve(|_| "diesel".to_owned()), "lot full");
        let failed: TxError<String> = DieselError::RollbackTransaction.into();
        assert_eq!(failed.resolve(|_| "diesel".to_owned()), "diesel");
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        assert_eq!(
            pool_error_message(PoolError::checkout("timed out")),
            "timed out"
        );
    }
}
