//! Lot registry services.
//!
//! The service implements both lot driving ports on top of a
//! [`ParkingLotRepository`]. Mutations require an admin principal.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use crate::domain::ports::{
    CreateLotRequest, ParkingLotCommand, ParkingLotQuery, ParkingLotRepository,
    ParkingLotRepositoryError,
};
use crate::domain::{Error, LotDetails, LotId, NewParkingLot, ParkingLot, Principal};

fn map_repository_error(error: ParkingLotRepositoryError) -> Error {
    match error {
        ParkingLotRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("parking lot repository unavailable: {message}"))
        }
        ParkingLotRepositoryError::Query { message } => {
            Error::internal(format!("parking lot repository error: {message}"))
        }
        err @ ParkingLotRepositoryError::NotFound { .. } => Error::not_found(err.to_string()),
        err @ (ParkingLotRepositoryError::DuplicateCode { .. }
        | ParkingLotRepositoryError::LotFull { .. }
        | ParkingLotRepositoryError::HasActiveSessions { .. }) => Error::conflict(err.to_string()),
    }
}

/// Lot service implementing [`ParkingLotCommand`] and [`ParkingLotQuery`].
#[derive(Clone)]
pub struct ParkingLotService<R> {
    lot_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ParkingLotService<R> {
    /// Create a service over the lot repository.
    pub fn new(lot_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { lot_repo, clock }
    }
}

#[async_trait]
impl<R> ParkingLotCommand for ParkingLotService<R>
where
    R: ParkingLotRepository,
{
    async fn create_lot(
        &self,
        principal: &Principal,
        request: CreateLotRequest,
    ) -> Result<ParkingLot, Error> {
        principal.require_admin()?;
        let lot = ParkingLot::new(NewParkingLot {
            id: LotId::random(),
            code: request.code,
            details: request.details,
            created_at: self.clock.utc(),
        });

        self.lot_repo.insert(&lot).await.map_err(|err| {
            warn!(code = %lot.code(), error = %err, "parking lot creation rejected");
            map_repository_error(err)
        })?;

        info!(
            lot_id = %lot.id(),
            code = %lot.code(),
            capacity = lot.capacity(),
            created_by = %principal.user_id(),
            "parking lot created"
        );
        Ok(lot)
    }

    async fn update_lot(
        &self,
        principal: &Principal,
        id: LotId,
        details: LotDetails,
    ) -> Result<ParkingLot, Error> {
        principal.require_admin()?;
        let lot = self
            .lot_repo
            .update_details(id, &details)
            .await
            .map_err(map_repository_error)?;

        info!(
            lot_id = %lot.id(),
            capacity = lot.capacity(),
            occupied = lot.occupied(),
            "parking lot updated"
        );
        Ok(lot)
    }

    async fn delete_lot(&self, principal: &Principal, id: LotId) -> Result<(), Error> {
        principal.require_admin()?;
        self.lot_repo.delete(id).await.map_err(|err| {
            warn!(lot_id = %id, error = %err, "parking lot deletion rejected");
            map_repository_error(err)
        })?;
        info!(lot_id = %id, "parking lot deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> ParkingLotQuery for ParkingLotService<R>
where
    R: ParkingLotRepository,
{
    async fn list_lots(&self, page: PageRequest) -> Result<Page<ParkingLot>, Error> {
        self.lot_repo.list(page).await.map_err(map_repository_error)
    }

    async fn get_lot(&self, id: LotId) -> Result<ParkingLot, Error> {
        self.lot_repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("parking lot {id} not found")))
    }
}

#[cfg(test)]
#[path = "parking_lot_service_tests.rs"]
mod tests;
