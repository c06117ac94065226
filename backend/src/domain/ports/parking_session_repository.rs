//! Port for the session ledger.
//!
//! `open_session` and `close_session` each change a session and its lot's
//! counter together. Adapters commit both or neither.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{
    EntryOutcome, ExitOutcome, LotRef, PlateNumber, SessionId, SessionRecord,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session ledger adapters.
    pub enum ParkingSessionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "parking session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "parking session repository query failed: {message}",
        /// The referenced lot does not exist.
        LotNotFound { lot: String } => "parking lot {lot} not found",
        /// The lot has no free space.
        LotFull { capacity: u32 } => "parking lot is full ({capacity} spaces)",
        /// The plate already has an open session somewhere.
        AlreadyActive { plate: String } => "vehicle {plate} already has an active session",
        /// No session matched the identifier.
        NotFound { session: String } => "parking session {session} not found",
        /// The session has already been closed.
        AlreadyClosed { session: String } => "parking session {session} is already closed",
    }
}

/// A vehicle arriving at a lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionEntry {
    pub session_id: SessionId,
    pub plate: PlateNumber,
    pub lot: LotRef,
    pub entry_time: DateTime<Utc>,
}

/// Persistence port for parking sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingSessionRepository: Send + Sync {
    /// Reserve a space and record an open session in one transaction.
    async fn open_session(
        &self,
        entry: &NewSessionEntry,
    ) -> Result<EntryOutcome, ParkingSessionRepositoryError>;

    /// Close an open session at `exit_time`, bill it at the lot's rate, and
    /// release its space in one transaction.
    async fn close_session(
        &self,
        id: SessionId,
        exit_time: DateTime<Utc>,
    ) -> Result<ExitOutcome, ParkingSessionRepositoryError>;

    /// Fetch a session with its lot attributes.
    async fn find_by_id(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionRecord>, ParkingSessionRepositoryError>;

    /// Fetch the open session for a plate, if any.
    async fn find_open_by_plate(
        &self,
        plate: &PlateNumber,
    ) -> Result<Option<SessionRecord>, ParkingSessionRepositoryError>;

    /// List all sessions, most recent entry first.
    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Page<SessionRecord>, ParkingSessionRepositoryError>;
}

/// Fixture implementation holding no sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParkingSessionRepository;

#[async_trait]
impl ParkingSessionRepository for FixtureParkingSessionRepository {
    async fn open_session(
        &self,
        entry: &NewSessionEntry,
    ) -> Result<EntryOutcome, ParkingSessionRepositoryError> {
        Err(ParkingSessionRepositoryError::lot_not_found(entry.lot.to_string()))
    }

    async fn close_session(
        &self,
        id: SessionId,
        _exit_time: DateTime<Utc>,
    ) -> Result<ExitOutcome, ParkingSessionRepositoryError> {
        Err(ParkingSessionRepositoryError::not_found(id.to_string()))
    }

    async fn find_by_id(
        &self,
        _id: SessionId,
    ) -> Result<Option<SessionRecord>, ParkingSessionRepositoryError> {
        Ok(None)
    }

    async fn find_open_by_plate(
        &self,
        _plate: &PlateNumber,
    ) -> Result<Option<SessionRecord>, ParkingSessionRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Page<SessionRecord>, ParkingSessionRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }
}
