//! Driving port for lot administration.

use async_trait::async_trait;

use crate::domain::{Error, LotCode, LotDetails, LotId, ParkingLot, Principal};

/// Validated input for a new lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLotRequest {
    pub code: LotCode,
    pub details: LotDetails,
}

/// Admin-only lot mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingLotCommand: Send + Sync {
    /// Create an empty lot.
    async fn create_lot(
        &self,
        principal: &Principal,
        request: CreateLotRequest,
    ) -> Result<ParkingLot, Error>;

    /// Replace a lot's editable attributes.
    async fn update_lot(
        &self,
        principal: &Principal,
        id: LotId,
        details: LotDetails,
    ) -> Result<ParkingLot, Error>;

    /// Delete a lot with no open sessions.
    async fn delete_lot(&self, principal: &Principal, id: LotId) -> Result<(), Error>;
}
