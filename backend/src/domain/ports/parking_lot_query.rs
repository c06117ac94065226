//! Driving port for reading lots.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, LotId, ParkingLot};

/// Lot reads available to any signed-in user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingLotQuery: Send + Sync {
    /// Lots, newest first.
    async fn list_lots(&self, page: PageRequest) -> Result<Page<ParkingLot>, Error>;

    /// One lot by id.
    async fn get_lot(&self, id: LotId) -> Result<ParkingLot, Error>;
}
