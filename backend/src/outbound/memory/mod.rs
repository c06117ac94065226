//! In-memory adapter used when no database is configured.
//!
//! A single [`InMemoryStore`] implements every repository port over one
//! mutex-guarded state, so an entry or exit changes the lot counter and the
//! ledger under the same lock. Locks are never held across an `.await`.
//! Data lives only as long as the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use rust_decimal::Decimal;

use crate::domain::ports::{
    ExitedPage, NewSessionEntry, ParkingLotRepository, ParkingLotRepositoryError,
    ParkingSessionRepository, ParkingSessionRepositoryError, ReportRepository,
    ReportRepositoryError, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    DailyCounts, DateRange, EmailAddress, EntryOutcome, ExitOutcome, LotCode, LotDetails, LotId,
    LotRef, OccupancyTotals, ParkingLot, ParkingSession, PasswordHash, PlateNumber, SessionId,
    SessionRecord, User, UserId, UserProfile,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct State {
    lots: HashMap<LotId, ParkingLot>,
    sessions: HashMap<SessionId, ParkingSession>,
    users: HashMap<UserId, StoredCredentials>,
}

impl State {
    fn lot_by_code(&self, code: &LotCode) -> Option<&ParkingLot> {
        self.lots.values().find(|lot| lot.code() == code)
    }

    fn resolve_lot(&self, lot: &LotRef) -> Option<LotId> {
        match lot {
            LotRef::Id(id) => self.lots.contains_key(id).then_some(*id),
            LotRef::Code(code) => self.lot_by_code(code).map(ParkingLot::id),
        }
    }

    fn open_session_for(&self, plate: &PlateNumber) -> Option<&ParkingSession> {
        self.sessions
            .values()
            .find(|session| session.is_open() && session.plate() == plate)
    }

    fn has_open_sessions(&self, lot_id: LotId) -> bool {
        self.sessions
            .values()
            .any(|session| session.is_open() && session.lot_id() == lot_id)
    }

    fn record(&self, session: &ParkingSession) -> Option<SessionRecord> {
        self.lots
            .get(&session.lot_id())
            .map(|lot| SessionRecord::new(session.clone(), lot))
    }

    /// Records matching `keep`, sorted newest first by `key`.
    fn records_by<K, F>(&self, keep: F, key: K) -> Vec<SessionRecord>
    where
        F: Fn(&ParkingSession) -> bool,
        K: Fn(&ParkingSession) -> DateTime<Utc>,
    {
        let mut sessions: Vec<&ParkingSession> =
            self.sessions.values().filter(|s| keep(s)).collect();
        sessions.sort_by(|a, b| {
            key(b)
                .cmp(&key(a))
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        sessions
            .into_iter()
            .filter_map(|session| self.record(session))
            .collect()
    }

    fn email_taken(&self, email: &EmailAddress, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|stored| &stored.user.email == email && Some(stored.user.id) != except)
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page::new(items, page, total)
}

/// Process-local store implementing the lot, session, report, and user
/// repositories.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, &'static str> {
        self.state.lock().map_err(|_| POISONED)
    }
}

#[async_trait]
impl ParkingLotRepository for InMemoryStore {
    async fn insert(&self, lot: &ParkingLot) -> Result<(), ParkingLotRepositoryError> {
        let mut state = self.lock().map_err(ParkingLotRepositoryError::query)?;
        if state.lot_by_code(lot.code()).is_some() {
            return Err(ParkingLotRepositoryError::duplicate_code(lot.code().to_string()));
        }
        state.lots.insert(lot.id(), lot.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: LotId) -> Result<Option<ParkingLot>, ParkingLotRepositoryError> {
        let state = self.lock().map_err(ParkingLotRepositoryError::query)?;
        Ok(state.lots.get(&id).cloned())
    }

    async fn find_by_code(
        &self,
        code: &LotCode,
    ) -> Result<Option<ParkingLot>, ParkingLotRepositoryError> {
        let state = self.lock().map_err(ParkingLotRepositoryError::query)?;
        Ok(state.lot_by_code(code).cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<ParkingLot>, ParkingLotRepositoryError> {
        let state = self.lock().map_err(ParkingLotRepositoryError::query)?;
        let mut lots: Vec<ParkingLot> = state.lots.values().cloned().collect();
        lots.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.code().as_ref().cmp(b.code().as_ref()))
        });
        Ok(paginate(lots, page))
    }

    async fn update_details(
        &self,
        id: LotId,
        details: &LotDetails,
    ) -> Result<ParkingLot, ParkingLotRepositoryError> {
        let mut state = self.lock().map_err(ParkingLotRepositoryError::query)?;
        let lot = state
            .lots
            .get_mut(&id)
            .ok_or_else(|| ParkingLotRepositoryError::not_found(id.to_string()))?;
        lot.apply_details(details.clone());
        Ok(lot.clone())
    }

    async fn delete(&self, id: LotId) -> Result<(), ParkingLotRepositoryError> {
        let mut state = self.lock().map_err(ParkingLotRepositoryError::query)?;
        if !state.lots.contains_key(&id) {
            return Err(ParkingLotRepositoryError::not_found(id.to_string()));
        }
        if state.has_open_sessions(id) {
            return Err(ParkingLotRepositoryError::has_active_sessions(id.to_string()));
        }
        state.lots.remove(&id);
        state.sessions.retain(|_, session| session.lot_id() != id);
        Ok(())
    }

    async fn try_reserve_space(&self, id: LotId) -> Result<ParkingLot, ParkingLotRepositoryError> {
        let mut state = self.lock().map_err(ParkingLotRepositoryError::query)?;
        let lot = state
            .lots
            .get_mut(&id)
            .ok_or_else(|| ParkingLotRepositoryError::not_found(id.to_string()))?;
        lot.try_reserve()
            .map_err(|full| ParkingLotRepositoryError::lot_full(full.capacity))?;
        Ok(lot.clone())
    }

    async fn release_space(&self, id: LotId) -> Result<ParkingLot, ParkingLotRepositoryError> {
        let mut state = self.lock().map_err(ParkingLotRepositoryError::query)?;
        let lot = state
            .lots
            .get_mut(&id)
            .ok_or_else(|| ParkingLotRepositoryError::not_found(id.to_string()))?;
        lot.release();
        Ok(lot.clone())
    }
}

#[async_trait]
impl ParkingSessionRepository for InMemoryStore {
    async fn open_session(
        &self,
        entry: &NewSessionEntry,
    ) -> Result<EntryOutcome, ParkingSessionRepositoryError> {
        let mut guard = self.lock().map_err(ParkingSessionRepositoryError::query)?;
        let lot_id = guard
            .resolve_lot(&entry.lot)
            .ok_or_else(|| ParkingSessionRepositoryError::lot_not_found(entry.lot.to_string()))?;
        if guard.open_session_for(&entry.plate).is_some() {
            return Err(ParkingSessionRepositoryError::already_active(
                entry.plate.to_string(),
            ));
        }

        let State { lots, sessions, .. } = &mut *guard;
        let lot = lots
            .get_mut(&lot_id)
            .ok_or_else(|| ParkingSessionRepositoryError::lot_not_found(lot_id.to_string()))?;
        lot.try_reserve()
            .map_err(|full| ParkingSessionRepositoryError::lot_full(full.capacity))?;
        let session = ParkingSession::open(
            entry.session_id,
            entry.plate.clone(),
            lot_id,
            entry.entry_time,
        );
        sessions.insert(session.id(), session.clone());
        Ok(EntryOutcome {
            session,
            lot: lot.clone(),
        })
    }

    async fn close_session(
        &self,
        id: SessionId,
        exit_time: DateTime<Utc>,
    ) -> Result<ExitOutcome, ParkingSessionRepositoryError> {
        let mut guard = self.lock().map_err(ParkingSessionRepositoryError::query)?;
        let State { lots, sessions, .. } = &mut *guard;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| ParkingSessionRepositoryError::not_found(id.to_string()))?;
        let lot = lots.get_mut(&session.lot_id()).ok_or_else(|| {
            ParkingSessionRepositoryError::query(format!(
                "session {id} references missing lot {}",
                session.lot_id()
            ))
        })?;
        let bill = session
            .close(exit_time, lot.hourly_rate())
            .map_err(|closed| ParkingSessionRepositoryError::already_closed(closed.id.to_string()))?;
        lot.release();
        Ok(ExitOutcome {
            session: session.clone(),
            bill,
            lot: lot.clone(),
        })
    }

    async fn find_by_id(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionRecord>, ParkingSessionRepositoryError> {
        let state = self.lock().map_err(ParkingSessionRepositoryError::query)?;
        Ok(state
            .sessions
            .get(&id)
            .and_then(|session| state.record(session)))
    }

    async fn find_open_by_plate(
        &self,
        plate: &PlateNumber,
    ) -> Result<Option<SessionRecord>, ParkingSessionRepositoryError> {
        let state = self.lock().map_err(ParkingSessionRepositoryError::query)?;
        Ok(state
            .open_session_for(plate)
            .and_then(|session| state.record(session)))
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Page<SessionRecord>, ParkingSessionRepositoryError> {
        let state = self.lock().map_err(ParkingSessionRepositoryError::query)?;
        let records = state.records_by(|_| true, ParkingSession::entry_time);
        Ok(paginate(records, page))
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn occupancy_totals(&self) -> Result<OccupancyTotals, ReportRepositoryError> {
        let state = self.lock().map_err(ReportRepositoryError::query)?;
        Ok(state
            .lots
            .values()
            .fold(OccupancyTotals::default(), |mut totals, lot| {
                totals.total_lots += 1;
                totals.total_capacity += u64::from(lot.capacity());
                totals.total_occupied += u64::from(lot.occupied());
                totals
            }))
    }

    async fn daily_counts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<DailyCounts, ReportRepositoryError> {
        let state = self.lock().map_err(ReportRepositoryError::query)?;
        let mut counts = DailyCounts::default();
        for session in state.sessions.values() {
            if session.entry_time() >= since {
                counts.check_ins += 1;
            }
            if session.exit_time().is_some_and(|exit| exit >= since) {
                counts.check_outs += 1;
            }
        }
        Ok(counts)
    }

    async fn recent_activity(
        &self,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, ReportRepositoryError> {
        let state = self.lock().map_err(ReportRepositoryError::query)?;
        let mut records = state.records_by(|_| true, ParkingSession::last_activity);
        records.truncate(limit);
        Ok(records)
    }

    async fn entered_between(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Page<SessionRecord>, ReportRepositoryError> {
        let state = self.lock().map_err(ReportRepositoryError::query)?;
        let records = state.records_by(
            |session| range.contains(session.entry_time()),
            ParkingSession::entry_time,
        );
        Ok(paginate(records, page))
    }

    async fn exited_between(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<ExitedPage, ReportRepositoryError> {
        let state = self.lock().map_err(ReportRepositoryError::query)?;
        let records = state.records_by(
            |session| session.exit_time().is_some_and(|exit| range.contains(exit)),
            ParkingSession::last_activity,
        );
        let total_amount = records
            .iter()
            .filter_map(|record| record.session.charged_amount())
            .sum::<Decimal>();
        Ok(ExitedPage {
            records: paginate(records, page),
            total_amount,
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state.email_taken(&user.email, None) {
            return Err(UserPersistenceError::duplicate_email(user.email.to_string()));
        }
        state.users.insert(
            user.id,
            StoredCredentials {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(())
    }

    async fn insert_first(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if !state.users.is_empty() {
            return Ok(false);
        }
        state.users.insert(
            user.id,
            StoredCredentials {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(true)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|stored| &stored.user.email == email)
            .cloned())
    }

    async fn find_credentials_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<User, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state.email_taken(&profile.email, Some(id)) {
            return Err(UserPersistenceError::duplicate_email(profile.email.to_string()));
        }
        let stored = state
            .users
            .get_mut(&id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        stored.user.first_name = profile.first_name.clone();
        stored.user.last_name = profile.last_name.clone();
        stored.user.email = profile.email.clone();
        Ok(stored.user.clone())
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let stored = state
            .users
            .get_mut(&id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        stored.password_hash = password_hash.clone();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        let mut users: Vec<User> = state.users.values().map(|s| s.user.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.len() as u64)
    }
}

#[cfg(test)]
mod tests;
