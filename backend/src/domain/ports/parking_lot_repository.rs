//! Port for the lot registry and its space counter.
//!
//! Adapters own `occupied` for every lot. Reserve and release must be
//! indivisible per lot: a PostgreSQL adapter uses a conditional update, an
//! in-memory adapter a lock around the lot table.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{LotCode, LotDetails, LotId, ParkingLot};

use super::define_port_error;

define_port_error! {
    /// Errors raised by lot registry adapters.
    pub enum ParkingLotRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "parking lot repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "parking lot repository query failed: {message}",
        /// Another lot already uses the code.
        DuplicateCode { code: String } => "parking lot code {code} is already in use",
        /// No lot matched the identifier.
        NotFound { lot: String } => "parking lot {lot} not found",
        /// Every space in the lot is occupied.
        LotFull { capacity: u32 } => "parking lot is full ({capacity} spaces)",
        /// The lot still has open sessions.
        HasActiveSessions { lot: String } => "parking lot {lot} has active sessions",
    }
}

/// Persistence port for parking lots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingLotRepository: Send + Sync {
    /// Store a new lot. Fails with `DuplicateCode` when the code is taken.
    async fn insert(&self, lot: &ParkingLot) -> Result<(), ParkingLotRepositoryError>;

    /// Fetch a lot by id.
    async fn find_by_id(&self, id: LotId) -> Result<Option<ParkingLot>, ParkingLotRepositoryError>;

    /// Fetch a lot by code.
    async fn find_by_code(
        &self,
        code: &LotCode,
    ) -> Result<Option<ParkingLot>, ParkingLotRepositoryError>;

    /// List lots, newest first.
    async fn list(&self, page: PageRequest) -> Result<Page<ParkingLot>, ParkingLotRepositoryError>;

    /// Replace the editable attributes of a lot, resizing its occupancy in
    /// the same atomic step.
    async fn update_details(
        &self,
        id: LotId,
        details: &LotDetails,
    ) -> Result<ParkingLot, ParkingLotRepositoryError>;

    /// Remove a lot. Fails with `HasActiveSessions` while any session for the
    /// lot is open.
    async fn delete(&self, id: LotId) -> Result<(), ParkingLotRepositoryError>;

    /// Take one space if `occupied < capacity`.
    async fn try_reserve_space(&self, id: LotId) -> Result<ParkingLot, ParkingLotRepositoryError>;

    /// Give one space back, clamped at zero.
    async fn release_space(&self, id: LotId) -> Result<ParkingLot, ParkingLotRepositoryError>;
}

/// Fixture implementation for tests that never reach the lot registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParkingLotRepository;

#[async_trait]
impl ParkingLotRepository for FixtureParkingLotRepository {
    async fn insert(&self, _lot: &ParkingLot) -> Result<(), ParkingLotRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: LotId) -> Result<Option<ParkingLot>, ParkingLotRepositoryError> {
        Ok(None)
    }

    async fn find_by_code(
        &self,
        _code: &LotCode,
    ) -> Result<Option<ParkingLot>, ParkingLotRepositoryError> {
        Ok(None)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<ParkingLot>, ParkingLotRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn update_details(
        &self,
        id: LotId,
        _details: &LotDetails,
    ) -> Result<ParkingLot, ParkingLotRepositoryError> {
        Err(ParkingLotRepositoryError::not_found(id.to_string()))
    }

    async fn delete(&self, id: LotId) -> Result<(), ParkingLotRepositoryError> {
        Err(ParkingLotRepositoryError::not_found(id.to_string()))
    }

    async fn try_reserve_space(&self, id: LotId) -> Result<ParkingLot, ParkingLotRepositoryError> {
        Err(ParkingLotRepositoryError::not_found(id.to_string()))
    }

    async fn release_space(&self, id: LotId) -> Result<ParkingLot, ParkingLotRepositoryError> {
        Err(ParkingLotRepositoryError::not_found(id.to_string()))
    }
}
