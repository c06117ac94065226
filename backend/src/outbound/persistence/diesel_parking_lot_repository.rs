//! PostgreSQL-backed lot registry.
//!
//! The space counter lives in `parking_lots.occupied`. Reserve and release
//! are single conditional `UPDATE ... RETURNING` statements, so concurrent
//! entries for one lot serialize on the row lock and the `occupied` range
//! check can never be violated.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ParkingLotRepository, ParkingLotRepositoryError};
use crate::domain::{LotCode, LotDetails, LotId, ParkingLot};

use super::diesel_basic_error_mapping::{
    TxError, classify_diesel_error, map_basic_failure, pool_error_message,
};
use super::models::{LotDetailsUpdate, LotRow, NewLotRow, page_window, to_i32, to_total};
use super::pool::{DbPool, PoolError};
use super::schema::{parking_lots, parking_sessions};

const CODE_UNIQUE: &str = "parking_lots_code_key";

/// Diesel implementation of [`ParkingLotRepository`].
#[derive(Clone)]
pub struct DieselParkingLotRepository {
    pool: DbPool,
}

impl DieselParkingLotRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ParkingLotRepositoryError {
    ParkingLotRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: DieselError) -> ParkingLotRepositoryError {
    map_basic_failure(
        classify_diesel_error(error),
        ParkingLotRepositoryError::query,
        ParkingLotRepositoryError::connection,
    )
}

fn to_lot(row: LotRow) -> Result<ParkingLot, ParkingLotRepositoryError> {
    ParkingLot::try_from(row).map_err(ParkingLotRepositoryError::query)
}

/// Take one space in lot `id` if any is free.
///
/// Returns `None` when the lot is full or does not exist.
pub(crate) async fn reserve_space(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> QueryResult<Option<LotRow>> {
    diesel::update(
        parking_lots::table
            .filter(parking_lots::id.eq(id))
            .filter(parking_lots::occupied.lt(parking_lots::capacity)),
    )
    .set(parking_lots::occupied.eq(parking_lots::occupied + 1))
    .returning(LotRow::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// Give one space back to lot `id`, never going below zero.
///
/// Returns the lot as stored afterwards, or `None` when it does not exist.
pub(crate) async fn release_space(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> QueryResult<Option<LotRow>> {
    let released = diesel::update(
        parking_lots::table
            .filter(parking_lots::id.eq(id))
            .filter(parking_lots::occupied.gt(0)),
    )
    .set(parking_lots::occupied.eq(parking_lots::occupied - 1))
    .returning(LotRow::as_returning())
    .get_result(conn)
    .await
    .optional()?;
    match released {
        Some(row) => Ok(Some(row)),
        None => {
            parking_lots::table
                .find(id)
                .select(LotRow::as_select())
                .first(conn)
                .await
                .optional()
        }
    }
}

#[async_trait]
impl ParkingLotRepository for DieselParkingLotRepository {
    async fn insert(&self, lot: &ParkingLot) -> Result<(), ParkingLotRepositoryError> {
        let row = NewLotRow::from_lot(lot).map_err(ParkingLotRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(parking_lots::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                let failure = classify_diesel_error(error);
                if failure.violates(CODE_UNIQUE) {
                    ParkingLotRepositoryError::duplicate_code(lot.code().to_string())
                } else {
                    map_basic_failure(
                        failure,
                        ParkingLotRepositoryError::query,
                        ParkingLotRepositoryError::connection,
                    )
                }
            })
    }

    async fn find_by_id(&self, id: LotId) -> Result<Option<ParkingLot>, ParkingLotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<LotRow> = parking_lots::table
            .find(*id.as_uuid())
            .select(LotRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_lot).transpose()
    }

    async fn find_by_code(
        &self,
        code: &LotCode,
    ) -> Result<Option<ParkingLot>, ParkingLotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<LotRow> = parking_lots::table
            .filter(parking_lots::code.eq(code.as_ref()))
            .select(LotRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_lot).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Page<ParkingLot>, ParkingLotRepositoryError> {
        let (limit, offset) = page_window(page);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = parking_lots::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<LotRow> = parking_lots::table
            .select(LotRow::as_select())
            .order((parking_lots::created_at.desc(), parking_lots::code.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let lots = rows.into_iter().map(to_lot).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(lots, page, to_total(total)))
    }

    async fn update_details(
        &self,
        id: LotId,
        details: &LotDetails,
    ) -> Result<ParkingLot, ParkingLotRepositoryError> {
        let lot_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = conn
            .transaction::<_, TxError<ParkingLotRepositoryError>, _>(|conn| {
                async move {
                    let current: Option<LotRow> = parking_lots::table
                        .find(lot_id)
                        .select(LotRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(current) = current else {
                        return Err(TxError::Rejected(ParkingLotRepositoryError::not_found(
                            id.to_string(),
                        )));
                    };
                    let mut lot = to_lot(current).map_err(TxError::Rejected)?;
                    lot.apply_details(details.clone());

                    let reject =
                        |msg: String| TxError::Rejected(ParkingLotRepositoryError::query(msg));
                    let changes = LotDetailsUpdate {
                        name: lot.name(),
                        capacity: to_i32(lot.capacity(), "capacity").map_err(reject)?,
                        occupied: to_i32(lot.occupied(), "occupied").map_err(reject)?,
                        location: lot.location(),
                        hourly_rate: lot.hourly_rate().amount(),
                    };
                    diesel::update(parking_lots::table.find(lot_id))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                    Ok(lot)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| err.resolve(map_diesel_error))?;
        debug!(lot_id = %id, occupied = updated.occupied(), "lot details stored");
        Ok(updated)
    }

    async fn delete(&self, id: LotId) -> Result<(), ParkingLotRepositoryError> {
        let lot_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, TxError<ParkingLotRepositoryError>, _>(|conn| {
            async move {
                let locked: Option<Uuid> = parking_lots::table
                    .find(lot_id)
                    .select(parking_lots::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Err(TxError::Rejected(ParkingLotRepositoryError::not_found(
                        id.to_string(),
                    )));
                }
                let has_open: bool = diesel::select(exists(
                    parking_sessions::table
                        .filter(parking_sessions::lot_id.eq(lot_id))
                        .filter(parking_sessions::exit_time.is_null()),
                ))
                .get_result(conn)
                .await?;
                if has_open {
                    return Err(TxError::Rejected(
                        ParkingLotRepositoryError::has_active_sessions(id.to_string()),
                    ));
                }
                diesel::delete(parking_lots::table.find(lot_id))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.resolve(map_diesel_error))
    }

    async fn try_reserve_space(&self, id: LotId) -> Result<ParkingLot, ParkingLotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if let Some(row) = reserve_space(&mut conn, *id.as_uuid())
            .await
            .map_err(map_diesel_error)?
        {
            return to_lot(row);
        }
        let capacity: Option<i32> = parking_lots::table
            .find(*id.as_uuid())
            .select(parking_lots::capacity)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match capacity {
            Some(capacity) => Err(ParkingLotRepositoryError::lot_full(
                u32::try_from(capacity).unwrap_or_default(),
            )),
            None => Err(ParkingLotRepositoryError::not_found(id.to_string())),
        }
    }

    async fn release_space(&self, id: LotId) -> Result<ParkingLot, ParkingLotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        release_space(&mut conn, *id.as_uuid())
            .await
            .map_err(map_diesel_error)?
            .map_or_else(
                || Err(ParkingLotRepositoryError::not_found(id.to_string())),
                to_lot,
            )
    }
}
