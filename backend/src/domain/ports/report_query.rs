//! Driving port for dashboards and date-range reports.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{DashboardSummary, DateRange, EnteredReport, Error, OutgoingReport, Principal};

/// Report use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportQuery: Send + Sync {
    /// Occupancy totals, today's counts and recent activity.
    async fn dashboard(&self) -> Result<DashboardSummary, Error>;

    /// Sessions entered within `range`. Admin only.
    async fn entered(
        &self,
        principal: &Principal,
        range: DateRange,
        page: PageRequest,
    ) -> Result<EnteredReport, Error>;

    /// Sessions closed within `range`, with revenue. Admin only.
    async fn outgoing(
        &self,
        principal: &Principal,
        range: DateRange,
        page: PageRequest,
    ) -> Result<OutgoingReport, Error>;
}
