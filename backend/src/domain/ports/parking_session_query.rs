//! Driving port for reading sessions.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, PlateNumber, Principal, SessionId, SessionView};

/// Session lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingSessionQuery: Send + Sync {
    /// One session by id.
    async fn get_session(&self, id: SessionId) -> Result<SessionView, Error>;

    /// The open session for `plate`.
    async fn active_session(&self, plate: &PlateNumber) -> Result<SessionView, Error>;

    /// Every session, most recent entry first. Admin only.
    async fn list_sessions(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<SessionView>, Error>;
}
