//! PostgreSQL-backed report queries.
//!
//! Plain reads without row locks; totals may lag a concurrent entry by one
//! statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sql, sum};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::Timestamptz;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use rust_decimal::Decimal;

use crate::domain::ports::{ExitedPage, ReportRepository, ReportRepositoryError};
use crate::domain::{DailyCounts, DateRange, OccupancyTotals, SessionRecord};

use super::diesel_basic_error_mapping::{
    classify_diesel_error, map_basic_failure, pool_error_message,
};
use super::models::{LotRow, SessionRow, page_window, session_record, to_total};
use super::pool::{DbPool, PoolError};
use super::schema::{parking_lots, parking_sessions};

const LAST_ACTIVITY: &str = "COALESCE(parking_sessions.exit_time, parking_sessions.entry_time)";

/// Diesel implementation of [`ReportRepository`].
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReportRepositoryError {
    ReportRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: DieselError) -> ReportRepositoryError {
    map_basic_failure(
        classify_diesel_error(error),
        ReportRepositoryError::query,
        ReportRepositoryError::connection,
    )
}

fn to_records(rows: Vec<(SessionRow, LotRow)>) -> Result<Vec<SessionRecord>, ReportRepositoryError> {
    rows.into_iter()
        .map(session_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ReportRepositoryError::query)
}

fn non_negative(sum: Option<i64>) -> u64 {
    sum.map_or(0, to_total)
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn occupancy_totals(&self) -> Result<OccupancyTotals, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (lots, capacity, occupied): (i64, Option<i64>, Option<i64>) = parking_lots::table
            .select((
                count_star(),
                sum(parking_lots::capacity),
                sum(parking_lots::occupied),
            ))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(OccupancyTotals {
            total_lots: to_total(lots),
            total_capacity: non_negative(capacity),
            total_occupied: non_negative(occupied),
        })
    }

    async fn daily_counts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<DailyCounts, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let check_ins: i64 = parking_sessions::table
            .filter(parking_sessions::entry_time.ge(since))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let check_outs: i64 = parking_sessions::table
            .filter(parking_sessions::exit_time.ge(since))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(DailyCounts {
            check_ins: to_total(check_ins),
            check_outs: to_total(check_outs),
        })
    }

    async fn recent_activity(
        &self,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, ReportRepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(SessionRow, LotRow)> = parking_sessions::table
            .inner_join(parking_lots::table)
            .select((SessionRow::as_select(), LotRow::as_select()))
            .order((
                sql::<Timestamptz>(LAST_ACTIVITY).desc(),
                parking_sessions::id.desc(),
            ))
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_records(rows)
    }

    async fn entered_between(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Page<SessionRecord>, ReportRepositoryError> {
        let (limit, offset) = page_window(page);
        let in_range = parking_sessions::entry_time.between(range.start(), range.end());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = parking_sessions::table
            .filter(in_range.clone())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(SessionRow, LotRow)> = parking_sessions::table
            .inner_join(parking_lots::table)
            .filter(in_range)
            .select((SessionRow::as_select(), LotRow::as_select()))
            .order((parking_sessions::entry_time.desc(), parking_sessions::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(to_records(rows)?, page, to_total(total)))
    }

    async fn exited_between(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<ExitedPage, ReportRepositoryError> {
        let (limit, offset) = page_window(page);
        let in_range = parking_sessions::exit_time
            .ge(range.start())
            .and(parking_sessions::exit_time.le(range.end()));
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (total, amount): (i64, Option<Decimal>) = parking_sessions::table
            .filter(in_range.clone())
            .select((count_star(), sum(parking_sessions::charged_amount)))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(SessionRow, LotRow)> = parking_sessions::table
            .inner_join(parking_lots::table)
            .filter(in_range)
            .select((SessionRow::as_select(), LotRow::as_select()))
            .order((parking_sessions::exit_time.desc(), parking_sessions::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ExitedPage {
            records: Page::new(to_records(rows)?, page, to_total(total)),
            total_amount: amount.unwrap_or(Decimal::ZERO),
        })
    }
}
