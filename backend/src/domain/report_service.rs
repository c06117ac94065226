//! Report services: dashboard summary and date-range reports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::PageRequest;
use tracing::debug;

use crate::domain::ports::{ReportQuery, ReportRepository, ReportRepositoryError};
use crate::domain::{
    ActivityItem, DashboardSummary, DateRange, EnteredReport, Error, OutgoingReport, Principal,
    RECENT_ACTIVITY_LIMIT, start_of_day,
};

fn map_repository_error(error: ReportRepositoryError) -> Error {
    match error {
        ReportRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("report repository unavailable: {message}"))
        }
        ReportRepositoryError::Query { message } => {
            Error::internal(format!("report repository error: {message}"))
        }
    }
}

/// Report service implementing [`ReportQuery`].
#[derive(Clone)]
pub struct ReportService<R> {
    report_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ReportService<R> {
    /// Create a report service; "today" is the UTC day of `clock`.
    pub fn new(report_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { report_repo, clock }
    }
}

#[async_trait]
impl<R> ReportQuery for ReportService<R>
where
    R: ReportRepository,
{
    async fn dashboard(&self) -> Result<DashboardSummary, Error> {
        let since = start_of_day(self.clock.utc());
        let totals = self
            .report_repo
            .occupancy_totals()
            .await
            .map_err(map_repository_error)?;
        let today = self
            .report_repo
            .daily_counts(since)
            .await
            .map_err(map_repository_error)?;
        let recent = self
            .report_repo
            .recent_activity(RECENT_ACTIVITY_LIMIT)
            .await
            .map_err(map_repository_error)?;

        debug!(
            check_ins = today.check_ins,
            check_outs = today.check_outs,
            recent = recent.len(),
            "dashboard summary computed"
        );
        Ok(DashboardSummary {
            totals,
            today,
            recent_activity: recent
                .iter()
                .take(RECENT_ACTIVITY_LIMIT)
                .map(ActivityItem::from_record)
                .collect(),
        })
    }

    async fn entered(
        &self,
        principal: &Principal,
        range: DateRange,
        page: PageRequest,
    ) -> Result<EnteredReport, Error> {
        principal.require_admin()?;
        let records = self
            .report_repo
            .entered_between(range, page)
            .await
            .map_err(map_repository_error)?;
        debug!(
            start = %range.start(),
            end = %range.end(),
            total = records.meta().total,
            "entered report generated"
        );
        Ok(EnteredReport { records })
    }

    async fn outgoing(
        &self,
        principal: &Principal,
        range: DateRange,
        page: PageRequest,
    ) -> Result<OutgoingReport, Error> {
        principal.require_admin()?;
        let exited = self
            .report_repo
            .exited_between(range, page)
            .await
            .map_err(map_repository_error)?;
        debug!(
            start = %range.start(),
            end = %range.end(),
            total = exited.records.meta().total,
            total_amount = %exited.total_amount,
            "outgoing report generated"
        );
        Ok(OutgoingReport {
            records: exited.records,
            total_amount: exited.total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ExitedPage, MockReportRepository};
    use crate::domain::{
        ActivityKind, DailyCounts, ErrorCode, OccupancyTotals, ParkingSession, SessionId,
        SessionRecord,
    };
    use crate::test_support::clock::{MutableClock, fixed_morning};
    use crate::test_support::fixtures::{admin, attendant, lot, plate};
    use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
    use pagination::Page;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    #[fixture]
    fn range() -> DateRange {
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date");
        DateRange::from_dates(day, day).expect("valid range")
    }

    fn service(repo: MockReportRepository) -> ReportService<MockReportRepository> {
        ReportService::new(Arc::new(repo), Arc::new(MutableClock::morning()))
    }

    #[rstest]
    #[tokio::test]
    async fn dashboard_counts_from_start_of_utc_day() {
        let midnight = Utc
            .with_ymd_and_hms(2026, 3, 10, 0, 0, 0)
            .single()
            .expect("valid");
        let lot = lot("NORTH", 5, 2);
        let mut closed = ParkingSession::open(
            SessionId::random(),
            plate("OUT1"),
            lot.id(),
            fixed_morning() - TimeDelta::hours(2),
        );
        closed
            .close(fixed_morning(), lot.hourly_rate())
            .expect("open");
        let open = ParkingSession::open(
            SessionId::random(),
            plate("IN1"),
            lot.id(),
            fixed_morning() - TimeDelta::minutes(5),
        );
        let records = vec![SessionRecord::new(closed, &lot), SessionRecord::new(open, &lot)];

        let mut repo = MockReportRepository::new();
        repo.expect_occupancy_totals().return_once(|| {
            Ok(OccupancyTotals {
                total_lots: 1,
                total_capacity: 5,
                total_occupied: 1,
            })
        });
        repo.expect_daily_counts()
            .withf(move |since| *since == midnight)
            .return_once(|_| {
                Ok(DailyCounts {
                    check_ins: 2,
                    check_outs: 1,
                })
            });
        repo.expect_recent_activity()
            .withf(|limit| *limit == RECENT_ACTIVITY_LIMIT)
            .return_once(move |_| Ok(records));

        let summary = service(repo).dashboard().await.expect("dashboard");

        assert_eq!(summary.totals.total_available(), 4);
        assert_eq!(summary.today.check_ins, 2);
        let kinds: Vec<_> = summary.recent_activity.iter().map(|item| item.kind).collect();
        assert_eq!(kinds, vec![ActivityKind::Exit, ActivityKind::Entry]);
        assert_eq!(summary.recent_activity[0].at, fixed_morning());
    }

    #[rstest]
    #[tokio::test]
    async fn reports_require_admin(range: DateRange) {
        let mut repo = MockReportRepository::new();
        repo.expect_entered_between().times(0);
        repo.expect_exited_between().times(0);
        let service = service(repo);

        let err = service
            .entered(&attendant(), range, PageRequest::default())
            .await
            .expect_err("attendant");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        let err = service
            .outgoing(&attendant(), range, PageRequest::default())
            .await
            .expect_err("attendant");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn outgoing_report_carries_total_amount(range: DateRange) {
        let mut repo = MockReportRepository::new();
        repo.expect_exited_between().return_once(|_, page| {
            Ok(ExitedPage {
                records: Page::new(Vec::new(), page, 3),
                total_amount: dec!(27.50),
            })
        });

        let report = service(repo)
            .outgoing(&admin(), range, PageRequest::default())
            .await
            .expect("admin report");

        assert_eq!(report.total_amount, dec!(27.50));
        assert_eq!(report.records.meta().total, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_are_unavailable() {
        let mut repo = MockReportRepository::new();
        repo.expect_occupancy_totals()
            .return_once(|| Err(ReportRepositoryError::connection("refused")));

        let err = service(repo).dashboard().await.expect_err("db down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
