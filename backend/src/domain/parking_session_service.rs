//! Entry/exit services.
//!
//! Entry reserves a space and opens a session; exit closes the session,
//! bills it at the lot's hourly rate and releases the space. Both steps run
//! as one repository transaction, so a failure leaves neither the counter nor
//! the ledger changed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use crate::domain::ports::{
    EntryRejection, NewSessionEntry, ParkingMetrics, ParkingSessionCommand, ParkingSessionQuery,
    ParkingSessionRepository, ParkingSessionRepositoryError,
};
use crate::domain::{
    EntryOutcome, Error, ExitOutcome, LotRef, PlateNumber, Principal, SessionId, SessionView,
};

fn map_repository_error(error: ParkingSessionRepositoryError) -> Error {
    match error {
        ParkingSessionRepositoryError::Connection { message } => Error::service_unavailable(
            format!("parking session repository unavailable: {message}"),
        ),
        ParkingSessionRepositoryError::Query { message } => {
            Error::internal(format!("parking session repository error: {message}"))
        }
        err @ (ParkingSessionRepositoryError::LotNotFound { .. }
        | ParkingSessionRepositoryError::NotFound { .. }) => Error::not_found(err.to_string()),
        err @ (ParkingSessionRepositoryError::LotFull { .. }
        | ParkingSessionRepositoryError::AlreadyActive { .. }
        | ParkingSessionRepositoryError::AlreadyClosed { .. }) => Error::conflict(err.to_string()),
    }
}

fn rejection_reason(error: &ParkingSessionRepositoryError) -> Option<EntryRejection> {
    match error {
        ParkingSessionRepositoryError::LotFull { .. } => Some(EntryRejection::LotFull),
        ParkingSessionRepositoryError::AlreadyActive { .. } => Some(EntryRejection::AlreadyActive),
        ParkingSessionRepositoryError::LotNotFound { .. } => Some(EntryRejection::LotNotFound),
        _ => None,
    }
}

/// Session service implementing [`ParkingSessionCommand`] and
/// [`ParkingSessionQuery`].
#[derive(Clone)]
pub struct ParkingSessionService<R> {
    session_repo: Arc<R>,
    metrics: Arc<dyn ParkingMetrics>,
    clock: Arc<dyn Clock>,
}

impl<R> ParkingSessionService<R> {
    /// Create a service over the session ledger.
    pub fn new(
        session_repo: Arc<R>,
        metrics: Arc<dyn ParkingMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session_repo,
            metrics,
            clock,
        }
    }

    async fn note_rejection(&self, error: &ParkingSessionRepositoryError) {
        let Some(reason) = rejection_reason(error) else {
            return;
        };
        if let Err(metrics_err) = self.metrics.record_rejected_entry(reason).await {
            warn!(error = %metrics_err, "failed to record rejected entry");
        }
    }
}

#[async_trait]
impl<R> ParkingSessionCommand for ParkingSessionService<R>
where
    R: ParkingSessionRepository,
{
    async fn record_entry(
        &self,
        principal: &Principal,
        plate: PlateNumber,
        lot: LotRef,
    ) -> Result<EntryOutcome, Error> {
        let entry = NewSessionEntry {
            session_id: SessionId::random(),
            plate,
            lot,
            entry_time: self.clock.utc(),
        };

        let outcome = match self.session_repo.open_session(&entry).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    plate = %entry.plate,
                    lot = %entry.lot,
                    error = %err,
                    "vehicle entry rejected"
                );
                self.note_rejection(&err).await;
                return Err(map_repository_error(err));
            }
        };

        info!(
            session_id = %outcome.session.id(),
            plate = %outcome.session.plate(),
            lot = %outcome.lot.code(),
            available = outcome.lot.available(),
            recorded_by = %principal.user_id(),
            "vehicle entered"
        );
        if let Err(err) = self.metrics.record_entry(outcome.lot.code()).await {
            warn!(error = %err, "failed to record entry metric");
        }
        Ok(outcome)
    }

    async fn record_exit(
        &self,
        principal: &Principal,
        id: SessionId,
    ) -> Result<ExitOutcome, Error> {
        let outcome = self
            .session_repo
            .close_session(id, self.clock.utc())
            .await
            .map_err(|err| {
                warn!(session_id = %id, error = %err, "vehicle exit rejected");
                map_repository_error(err)
            })?;

        info!(
            session_id = %id,
            plate = %outcome.session.plate(),
            lot = %outcome.lot.code(),
            billable_hours = outcome.bill.billable_hours(),
            charged = %outcome.bill.amount(),
            recorded_by = %principal.user_id(),
            "vehicle exited"
        );
        if let Err(err) = self
            .metrics
            .record_exit(outcome.lot.code(), outcome.bill.amount())
            .await
        {
            warn!(error = %err, "failed to record exit metric");
        }
        Ok(outcome)
    }
}

#[async_trait]
impl<R> ParkingSessionQuery for ParkingSessionService<R>
where
    R: ParkingSessionRepository,
{
    async fn get_session(&self, id: SessionId) -> Result<SessionView, Error> {
        let record = self
            .session_repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("parking session {id} not found")))?;
        Ok(SessionView::at(record, self.clock.utc()))
    }

    async fn active_session(&self, plate: &PlateNumber) -> Result<SessionView, Error> {
        let record = self
            .session_repo
            .find_open_by_plate(plate)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("no active parking session for vehicle {plate}"))
            })?;
        Ok(SessionView::at(record, self.clock.utc()))
    }

    async fn list_sessions(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<SessionView>, Error> {
        principal.require_admin()?;
        let now = self.clock.utc();
        let records = self
            .session_repo
            .list(page)
            .await
            .map_err(map_repository_error)?;
        Ok(records.map(|record| SessionView::at(record, now)))
    }
}

#[cfg(test)]
#[path = "parking_session_service_tests.rs"]
mod tests;
