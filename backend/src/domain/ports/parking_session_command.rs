//! Driving port for vehicle entries and exits.
//!
//! This is the core transaction surface: entry reserves a space and opens a
//! session, exit closes the session, bills it and releases the space.

use async_trait::async_trait;

use crate::domain::{EntryOutcome, Error, ExitOutcome, LotRef, PlateNumber, Principal, SessionId};

/// Entry and exit use-cases for attendants and admins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingSessionCommand: Send + Sync {
    /// Admit `plate` into `lot`.
    async fn record_entry(
        &self,
        principal: &Principal,
        plate: PlateNumber,
        lot: LotRef,
    ) -> Result<EntryOutcome, Error>;

    /// Close session `id` at the current time.
    async fn record_exit(
        &self,
        principal: &Principal,
        id: SessionId,
    ) -> Result<ExitOutcome, Error>;
}
