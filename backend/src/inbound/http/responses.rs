//! Response bodies shared by the parking endpoints.
//!
//! Money is rendered as a string with exactly two decimal places so clients
//! never round-trip amounts through binary floating point.

use chrono::{DateTime, Utc};
use pagination::{Page, PaginationLinks, PaginationMeta};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Bill, ParkingLot, ParkingSession, SessionRecord, SessionStatus, SessionView};
use crate::inbound::http::schemas::{PaginationLinksSchema, PaginationMetaSchema};

/// Format an amount with two decimal places.
pub(crate) fn money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// One page of a listing with navigation links.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[schema(value_type = PaginationMetaSchema)]
    pub pagination: PaginationMeta,
    #[schema(value_type = PaginationLinksSchema)]
    pub links: PaginationLinks,
}

impl<T> ListResponse<T> {
    /// Convert every item of `page`, deriving links from the request URL.
    pub fn from_page<S>(page: Page<S>, base: &Url, convert: impl FnMut(S) -> T) -> Self {
        let (items, meta) = page.into_parts();
        Self {
            data: items.into_iter().map(convert).collect(),
            pagination: meta,
            links: PaginationLinks::from_meta(base, meta),
        }
    }
}

/// A parking lot with its live occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LotResponse {
    pub id: Uuid,
    #[schema(example = "NORTH-01")]
    pub code: String,
    #[schema(example = "North Garage")]
    pub name: String,
    #[schema(example = 120)]
    pub capacity: u32,
    #[schema(example = 37)]
    pub occupied: u32,
    #[schema(example = 83)]
    pub available_spaces: u32,
    #[schema(example = "12 Harbour Road")]
    pub location: Option<String>,
    #[schema(example = "2.50")]
    pub hourly_rate: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ParkingLot> for LotResponse {
    fn from(lot: &ParkingLot) -> Self {
        Self {
            id: *lot.id().as_uuid(),
            code: lot.code().to_string(),
            name: lot.name().to_owned(),
            capacity: lot.capacity(),
            occupied: lot.occupied(),
            available_spaces: lot.available(),
            location: lot.location().map(str::to_owned),
            hourly_rate: money(lot.hourly_rate().amount()),
            created_at: lot.created_at(),
        }
    }
}

/// Lifecycle state of a session as rendered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatusResponse {
    Open,
    Closed,
}

impl From<SessionStatus> for SessionStatusResponse {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Open => Self::Open,
            SessionStatus::Closed => Self::Closed,
        }
    }
}

/// A parking session, optionally enriched with its lot and elapsed hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    #[schema(example = "ABC123")]
    pub plate_number: String,
    pub lot_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_name: Option<String>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    #[schema(example = "15.00")]
    pub charged_amount: Option<String>,
    pub status: SessionStatusResponse,
    /// Billable hours so far for open sessions, or the billed hours once
    /// closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<u64>,
}

impl From<&ParkingSession> for SessionResponse {
    fn from(session: &ParkingSession) -> Self {
        Self {
            id: *session.id().as_uuid(),
            plate_number: session.plate().to_string(),
            lot_id: *session.lot_id().as_uuid(),
            lot_code: None,
            lot_name: None,
            entry_time: session.entry_time(),
            exit_time: session.exit_time(),
            charged_amount: session.charged_amount().map(money),
            status: session.status().into(),
            duration_hours: None,
        }
    }
}

impl From<&SessionRecord> for SessionResponse {
    fn from(record: &SessionRecord) -> Self {
        Self {
            lot_code: Some(record.lot_code.to_string()),
            lot_name: Some(record.lot_name.clone()),
            ..Self::from(&record.session)
        }
    }
}

impl From<&SessionView> for SessionResponse {
    fn from(view: &SessionView) -> Self {
        Self {
            duration_hours: Some(view.duration_hours),
            ..Self::from(&view.record)
        }
    }
}

/// The fee computed when a vehicle leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    #[schema(example = 3)]
    pub billable_hours: u64,
    #[schema(example = "5.00")]
    pub hourly_rate: String,
    #[schema(example = "15.00")]
    pub charged_amount: String,
}

impl From<&Bill> for BillResponse {
    fn from(bill: &Bill) -> Self {
        Self {
            billable_hours: bill.billable_hours(),
            hourly_rate: money(bill.hourly_rate().amount()),
            charged_amount: money(bill.amount()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use pagination::PageRequest;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::domain::SessionId;
    use crate::test_support::clock::fixed_morning;
    use crate::test_support::fixtures::{lot, plate};

    #[rstest]
    #[case(dec!(15), "15.00")]
    #[case(dec!(2.5), "2.50")]
    #[case(dec!(0.005), "0.01")]
    fn money_has_two_decimal_places(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(money(amount), expected);
    }

    #[rstest]
    fn lot_response_derives_available_spaces() {
        let mut lot = lot("NORTH", 3, 5);
        lot.try_reserve().expect("space free");

        let body = serde_json::to_value(LotResponse::from(&lot)).expect("serialise");

        assert_eq!(body["occupied"], json!(1));
        assert_eq!(body["availableSpaces"], json!(2));
        assert_eq!(body["hourlyRate"], json!("5.00"));
    }

    #[rstest]
    fn closed_session_renders_charge_and_status() {
        let lot = lot("NORTH", 3, 5);
        let mut session = ParkingSession::open(
            SessionId::random(),
            plate("ABC123"),
            lot.id(),
            fixed_morning(),
        );
        session
            .close(fixed_morning() + TimeDelta::minutes(125), lot.hourly_rate())
            .expect("open session");
        let view = SessionView::at(
            SessionRecord::new(session, &lot),
            fixed_morning() + TimeDelta::hours(5),
        );

        let body = serde_json::to_value(SessionResponse::from(&view)).expect("serialise");

        assert_eq!(body["status"], json!("closed"));
        assert_eq!(body["chargedAmount"], json!("15.00"));
        assert_eq!(body["lotCode"], json!("NORTH"));
        assert_eq!(body["durationHours"], json!(3));
    }

    #[rstest]
    fn list_response_carries_links() {
        let page = Page::new(vec![1_u32, 2], PageRequest::try_new(Some(1), Some(2)).expect("page"), 5);
        let base = Url::parse("http://localhost/api/v1/parking-lots").expect("url");

        let body = serde_json::to_value(ListResponse::from_page(page, &base, |n| n * 10))
            .expect("serialise");

        assert_eq!(body["data"], json!([10, 20]));
        assert_eq!(body["pagination"]["pages"], json!(3));
        assert_eq!(
            body["links"]["next"],
            json!("http://localhost/api/v1/parking-lots?page=2&limit=2")
        );
    }
}
