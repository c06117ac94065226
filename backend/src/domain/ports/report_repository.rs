//! Read-only port backing dashboards and date-range reports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use rust_decimal::Decimal;

use crate::domain::{DailyCounts, DateRange, OccupancyTotals, SessionRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by report adapters.
    pub enum ReportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "report repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "report repository query failed: {message}",
    }
}

/// Page of closed sessions with the sum charged across the whole range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitedPage {
    pub records: Page<SessionRecord>,
    pub total_amount: Decimal,
}

/// Aggregate reads over lots and sessions. Implementations never lock rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Capacity and occupancy summed over every lot.
    async fn occupancy_totals(&self) -> Result<OccupancyTotals, ReportRepositoryError>;

    /// Entries and exits recorded at or after `since`.
    async fn daily_counts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<DailyCounts, ReportRepositoryError>;

    /// Sessions ordered by their latest event, newest first.
    async fn recent_activity(
        &self,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, ReportRepositoryError>;

    /// Sessions whose entry time falls in `range`, newest entry first.
    async fn entered_between(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Page<SessionRecord>, ReportRepositoryError>;

    /// Sessions whose exit time falls in `range`, newest exit first.
    async fn exited_between(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<ExitedPage, ReportRepositoryError>;
}

/// Fixture implementation describing an empty car park.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportRepository;

#[async_trait]
impl ReportRepository for FixtureReportRepository {
    async fn occupancy_totals(&self) -> Result<OccupancyTotals, ReportRepositoryError> {
        Ok(OccupancyTotals::default())
    }

    async fn daily_counts(
        &self,
        _since: DateTime<Utc>,
    ) -> Result<DailyCounts, ReportRepositoryError> {
        Ok(DailyCounts::default())
    }

    async fn recent_activity(
        &self,
        _limit: usize,
    ) -> Result<Vec<SessionRecord>, ReportRepositoryError> {
        Ok(Vec::new())
    }

    async fn entered_between(
        &self,
        _range: DateRange,
        page: PageRequest,
    ) -> Result<Page<SessionRecord>, ReportRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn exited_between(
        &self,
        _range: DateRange,
        page: PageRequest,
    ) -> Result<ExitedPage, ReportRepositoryError> {
        Ok(ExitedPage {
            records: Page::new(Vec::new(), page, 0),
            total_amount: Decimal::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_outgoing_page_sums_to_zero() {
        let day = NaiveDate::from_ymd_opt(2026, 4, 2).expect("valid date");
        let range = DateRange::from_dates(day, day).expect("valid range");
        let page = FixtureReportRepository
            .exited_between(range, PageRequest::default())
            .await
            .expect("fixture report");
        assert_eq!(page.total_amount, Decimal::ZERO);
        assert_eq!(page.records.meta().total, 0);
    }
}
