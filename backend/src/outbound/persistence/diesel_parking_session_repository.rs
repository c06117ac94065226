//! PostgreSQL-backed session ledger.
//!
//! Entry and exit each run in one transaction that touches the session row
//! and the lot counter. The partial unique index
//! `parking_sessions_open_plate_key` backs the one-open-session-per-plate
//! rule when two entries for the same plate race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::ports::{NewSessionEntry, ParkingSessionRepository, ParkingSessionRepositoryError};
use crate::domain::{
    EntryOutcome, ExitOutcome, HourlyRate, LotRef, ParkingLot, ParkingSession, PlateNumber, SessionId,
    SessionRecord,
};

use super::diesel_basic_error_mapping::{
    DieselFailure, TxError, classify_diesel_error, map_basic_failure, pool_error_message,
};
use super::diesel_parking_lot_repository::{release_space, reserve_space};
use super::models::{LotRow, NewSessionRow, SessionRow, page_window, session_record, to_total};
use super::pool::{DbPool, PoolError};
use super::schema::{parking_lots, parking_sessions};

const OPEN_PLATE_UNIQUE: &str = "parking_sessions_open_plate_key";

type Tx = TxError<ParkingSessionRepositoryError>;

/// Diesel implementation of [`ParkingSessionRepository`].
#[derive(Clone)]
pub struct DieselParkingSessionRepository {
    pool: DbPool,
}

impl DieselParkingSessionRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ParkingSessionRepositoryError {
    ParkingSessionRepositoryError::connection(pool_error_message(error))
}

fn map_failure(failure: DieselFailure) -> ParkingSessionRepositoryError {
    map_basic_failure(
        failure,
        ParkingSessionRepositoryError::query,
        ParkingSessionRepositoryError::connection,
    )
}

fn map_diesel_error(error: DieselError) -> ParkingSessionRepositoryError {
    map_failure(classify_diesel_error(error))
}

fn corrupt(message: String) -> Tx {
    TxError::Rejected(ParkingSessionRepositoryError::query(message))
}

fn to_records(
    rows: Vec<(SessionRow, LotRow)>,
) -> Result<Vec<SessionRecord>, ParkingSessionRepositoryError> {
    rows.into_iter()
        .map(session_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ParkingSessionRepositoryError::query)
}

#[async_trait]
impl ParkingSessionRepository for DieselParkingSessionRepository {
    async fn open_session(
        &self,
        entry: &NewSessionEntry,
    ) -> Result<EntryOutcome, ParkingSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction::<_, Tx, _>(|conn| {
                async move {
                    let lot_query = parking_lots::table.select(LotRow::as_select()).into_boxed();
                    let lot_query = match &entry.lot {
                        LotRef::Id(id) => lot_query.filter(parking_lots::id.eq(*id.as_uuid())),
                        LotRef::Code(code) => {
                            lot_query.filter(parking_lots::code.eq(code.as_ref().to_owned()))
                        }
                    };
                    let lot: Option<LotRow> = lot_query.first(conn).await.optional()?;
                    let Some(lot) = lot else {
                        return Err(TxError::Rejected(ParkingSessionRepositoryError::lot_not_found(
                            entry.lot.to_string(),
                        )));
                    };

                    let plate_active: bool = diesel::select(exists(
                        parking_sessions::table
                            .filter(parking_sessions::plate_number.eq(entry.plate.as_ref()))
                            .filter(parking_sessions::exit_time.is_null()),
                    ))
                    .get_result(conn)
                    .await?;
                    if plate_active {
                        return Err(TxError::Rejected(
                            ParkingSessionRepositoryError::already_active(entry.plate.to_string()),
                        ));
                    }

                    let Some(reserved) = reserve_space(conn, lot.id).await? else {
                        let capacity = u32::try_from(lot.capacity).unwrap_or_default();
                        return Err(TxError::Rejected(ParkingSessionRepositoryError::lot_full(
                            capacity,
                        )));
                    };

                    let row = NewSessionRow {
                        id: *entry.session_id.as_uuid(),
                        plate_number: entry.plate.as_ref(),
                        lot_id: reserved.id,
                        entry_time: entry.entry_time,
                    };
                    diesel::insert_into(parking_sessions::table)
                        .values(&row)
                        .execute(conn)
                        .await?;

                    let lot = ParkingLot::try_from(reserved).map_err(corrupt)?;
                    let session = ParkingSession::open(
                        entry.session_id,
                        entry.plate.clone(),
                        lot.id(),
                        entry.entry_time,
                    );
                    Ok(EntryOutcome { session, lot })
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| {
                err.resolve(|error| {
                    let failure = classify_diesel_error(error);
                    if failure.violates(OPEN_PLATE_UNIQUE) {
                        ParkingSessionRepositoryError::already_active(entry.plate.to_string())
                    } else {
                        map_failure(failure)
                    }
                })
            })?;
        debug!(
            session_id = %outcome.session.id(),
            occupied = outcome.lot.occupied(),
            "session row opened"
        );
        Ok(outcome)
    }

    async fn close_session(
        &self,
        id: SessionId,
        exit_time: DateTime<Utc>,
    ) -> Result<ExitOutcome, ParkingSessionRepositoryError> {
        let session_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, Tx, _>(|conn| {
            async move {
                let row: Option<SessionRow> = parking_sessions::table
                    .find(session_id)
                    .select(SessionRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let Some(row) = row else {
                    return Err(TxError::Rejected(ParkingSessionRepositoryError::not_found(
                        id.to_string(),
                    )));
                };
                let mut session = ParkingSession::try_from(row).map_err(corrupt)?;
                let rate: Decimal = parking_lots::table
                    .find(*session.lot_id().as_uuid())
                    .select(parking_lots::hourly_rate)
                    .first(conn)
                    .await?;
                let rate = HourlyRate::new(rate).map_err(|err| corrupt(err.to_string()))?;
                let bill = session.close(exit_time, rate).map_err(|closed| {
                    TxError::Rejected(ParkingSessionRepositoryError::already_closed(
                        closed.id.to_string(),
                    ))
                })?;

                diesel::update(
                    parking_sessions::table
                        .filter(parking_sessions::id.eq(session_id))
                        .filter(parking_sessions::exit_time.is_null()),
                )
                .set((
                    parking_sessions::exit_time.eq(Some(exit_time)),
                    parking_sessions::charged_amount.eq(Some(bill.amount())),
                ))
                .execute(conn)
                .await?;

                let Some(lot) = release_space(conn, *session.lot_id().as_uuid()).await? else {
                    return Err(corrupt(format!(
                        "session {id} references missing lot {}",
                        session.lot_id()
                    )));
                };
                let lot = ParkingLot::try_from(lot).map_err(corrupt)?;
                Ok(ExitOutcome { session, bill, lot })
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.resolve(map_diesel_error))
    }

    async fn find_by_id(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionRecord>, ParkingSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(SessionRow, LotRow)> = parking_sessions::table
            .inner_join(parking_lots::table)
            .filter(parking_sessions::id.eq(*id.as_uuid()))
            .select((SessionRow::as_select(), LotRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(session_record)
            .transpose()
            .map_err(ParkingSessionRepositoryError::query)
    }

    async fn find_open_by_plate(
        &self,
        plate: &PlateNumber,
    ) -> Result<Option<SessionRecord>, ParkingSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(SessionRow, LotRow)> = parking_sessions::table
            .inner_join(parking_lots::table)
            .filter(parking_sessions::plate_number.eq(plate.as_ref()))
            .filter(parking_sessions::exit_time.is_null())
            .select((SessionRow::as_select(), LotRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(session_record)
            .transpose()
            .map_err(ParkingSessionRepositoryError::query)
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Page<SessionRecord>, ParkingSessionRepositoryError> {
        let (limit, offset) = page_window(page);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = parking_sessions::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(SessionRow, LotRow)> = parking_sessions::table
            .inner_join(parking_lots::table)
            .select((SessionRow::as_select(), LotRow::as_select()))
            .order((parking_sessions::entry_time.desc(), parking_sessions::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(to_records(rows)?, page, to_total(total)))
    }
}
