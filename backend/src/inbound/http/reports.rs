//! Report API handlers.
//!
//! ```text
//! GET /api/v1/reports/dashboard
//! GET /api/v1/reports/entered?startDate=2026-03-01&endDate=2026-03-31&page=1&limit=10
//! GET /api/v1/reports/outgoing?startDate=2026-03-01&endDate=2026-03-31
//! ```

use actix_web::{HttpRequest, get, web};
use chrono::{DateTime, Utc};
use pagination::{Page, PaginationLinks, PaginationMeta};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    ActivityItem, ActivityKind, DailyCounts, DashboardSummary, DateRange, Error, OccupancyTotals,
    SessionRecord,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::{SessionResponse, money};
use crate::inbound::http::schemas::{ErrorSchema, PaginationLinksSchema, PaginationMetaSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{page_request, parse_date_range};

/// Query parameters of the date-range reports.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ReportParams {
    /// First day included, `YYYY-MM-DD` (UTC).
    #[param(example = "2026-03-01")]
    pub start_date: Option<String>,
    /// Last day included, `YYYY-MM-DD` (UTC).
    #[param(example = "2026-03-31")]
    pub end_date: Option<String>,
    #[param(minimum = 1)]
    pub page: Option<u32>,
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<u32>,
}

impl ReportParams {
    fn range(&self) -> Result<DateRange, Error> {
        parse_date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Occupancy totals across every lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResponse {
    pub total_lots: u64,
    pub total_capacity: u64,
    pub total_occupied: u64,
    pub total_available: u64,
}

impl From<OccupancyTotals> for TotalsResponse {
    fn from(totals: OccupancyTotals) -> Self {
        Self {
            total_lots: totals.total_lots,
            total_capacity: totals.total_capacity,
            total_occupied: totals.total_occupied,
            total_available: totals.total_available(),
        }
    }
}

/// Entries and exits since UTC midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub check_ins: u64,
    pub check_outs: u64,
}

impl From<DailyCounts> for TodayResponse {
    fn from(counts: DailyCounts) -> Self {
        Self {
            check_ins: counts.check_ins,
            check_outs: counts.check_outs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityTypeResponse {
    Entry,
    Exit,
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub session_id: Uuid,
    #[schema(example = "ABC123")]
    pub plate_number: String,
    pub lot_name: String,
    #[serde(rename = "type")]
    pub kind: ActivityTypeResponse,
    pub at: DateTime<Utc>,
}

impl From<ActivityItem> for ActivityResponse {
    fn from(item: ActivityItem) -> Self {
        Self {
            session_id: *item.session_id.as_uuid(),
            plate_number: item.plate.to_string(),
            lot_name: item.lot_name,
            kind: match item.kind {
                ActivityKind::Entry => ActivityTypeResponse::Entry,
                ActivityKind::Exit => ActivityTypeResponse::Exit,
            },
            at: item.at,
        }
    }
}

/// Dashboard overview for `GET /api/v1/reports/dashboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub totals: TotalsResponse,
    pub today: TodayResponse,
    pub recent_activity: Vec<ActivityResponse>,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            totals: summary.totals.into(),
            today: summary.today.into(),
            recent_activity: summary
                .recent_activity
                .into_iter()
                .map(ActivityResponse::from)
                .collect(),
        }
    }
}

/// A page of sessions matching a date-range report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub records: Vec<SessionResponse>,
    /// Matching sessions across every page.
    pub total_records: u64,
    /// Revenue across every page; outgoing report only.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "125.50")]
    pub total_amount: Option<String>,
    #[schema(value_type = PaginationMetaSchema)]
    pub pagination: PaginationMeta,
    #[schema(value_type = PaginationLinksSchema)]
    pub links: PaginationLinks,
}

impl ReportResponse {
    fn from_page(page: Page<SessionRecord>, base: &Url) -> Self {
        let (records, meta) = page.into_parts();
        Self {
            records: records.iter().map(SessionResponse::from).collect(),
            total_records: meta.total,
            total_amount: None,
            pagination: meta,
            links: PaginationLinks::from_meta(base, meta),
        }
    }
}

/// Occupancy totals, today's counts and the latest activity.
#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "dashboard"
)]
#[get("/reports/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardResponse>> {
    session.require_principal()?;
    let summary = state.reports.dashboard().await?;
    Ok(web::Json(summary.into()))
}

/// Sessions that entered within the range, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/reports/entered",
    params(ReportParams),
    responses(
        (status = 200, description = "Entered sessions", body = ReportResponse),
        (status = 400, description = "Invalid dates or pagination", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "enteredReport"
)]
#[get("/reports/entered")]
pub async fn entered(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<ReportParams>,
) -> ApiResult<web::Json<ReportResponse>> {
    let principal = session.require_principal()?;
    let range = query.range()?;
    let page = page_request(query.page, query.limit)?;
    let report = state.reports.entered(&principal, range, page).await?;
    Ok(web::Json(ReportResponse::from_page(
        report.records,
        &req.full_url(),
    )))
}

/// Sessions that exited within the range, newest exit first, with revenue.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/reports/outgoing",
    params(ReportParams),
    responses(
        (status = 200, description = "Exited sessions", body = ReportResponse),
        (status = 400, description = "Invalid dates or pagination", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "outgoingReport"
)]
#[get("/reports/outgoing")]
pub async fn outgoing(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<ReportParams>,
) -> ApiResult<web::Json<ReportResponse>> {
    let principal = session.require_principal()?;
    let range = query.range()?;
    let page = page_request(query.page, query.limit)?;
    let report = state.reports.outgoing(&principal, range, page).await?;
    let body = ReportResponse {
        total_amount: Some(money(report.total_amount)),
        ..ReportResponse::from_page(report.records, &req.full_url())
    };
    Ok(web::Json(body))
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
