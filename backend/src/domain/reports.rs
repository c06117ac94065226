//! Read-only report projections over lots and sessions.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use pagination::Page;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{PlateNumber, SessionId, SessionRecord};

/// Number of items in the dashboard activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Validation errors for report date ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeError {
    #[error("endDate must not be before startDate")]
    EndBeforeStart,
}

/// Inclusive UTC time window covering whole calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Span `start_date 00:00:00.000` to `end_date 23:59:59.999` UTC.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use parking_backend::domain::DateRange;
    ///
    /// let day = NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid date");
    /// let range = DateRange::from_dates(day, day).expect("same day is valid");
    /// assert_eq!(range.end().to_rfc3339(), "2026-05-01T23:59:59.999+00:00");
    /// ```
    pub fn from_dates(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, DateRangeError> {
        if end_date < start_date {
            return Err(DateRangeError::EndBeforeStart);
        }
        let start = start_date.and_time(NaiveTime::MIN).and_utc();
        let end = end_date
            .checked_add_days(Days::new(1))
            .map_or(DateTime::<Utc>::MAX_UTC, |next| {
                next.and_time(NaiveTime::MIN).and_utc() - TimeDelta::milliseconds(1)
            });
        Ok(Self { start, end })
    }

    /// First instant in the range.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last instant in the range.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `instant` falls inside the range, bounds included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Start of the UTC day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Occupancy summed across all lots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyTotals {
    pub total_lots: u64,
    pub total_capacity: u64,
    pub total_occupied: u64,
}

impl OccupancyTotals {
    pub fn total_available(&self) -> u64 {
        self.total_capacity.saturating_sub(self.total_occupied)
    }
}

/// Entries and exits counted since the start of the current day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCounts {
    pub check_ins: u64,
    pub check_outs: u64,
}

/// Kind of event shown in the activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Entry,
    Exit,
}

/// One line of the dashboard activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem {
    pub session_id: SessionId,
    pub plate: PlateNumber,
    pub lot_name: String,
    pub kind: ActivityKind,
    pub at: DateTime<Utc>,
}

impl ActivityItem {
    /// Project a session onto its most recent event.
    pub fn from_record(record: &SessionRecord) -> Self {
        let session = &record.session;
        let kind = if session.is_open() {
            ActivityKind::Entry
        } else {
            ActivityKind::Exit
        };
        Self {
            session_id: session.id(),
            plate: session.plate().clone(),
            lot_name: record.lot_name.clone(),
            kind,
            at: session.last_activity(),
        }
    }
}

/// Dashboard overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub totals: OccupancyTotals,
    pub today: DailyCounts,
    pub recent_activity: Vec<ActivityItem>,
}

/// Sessions that started within a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnteredReport {
    pub records: Page<SessionRecord>,
}

/// Sessions that ended within a date range, with revenue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReport {
    pub records: Page<SessionRecord>,
    pub total_amount: Decimal,
}
