//! Tests for plate validation and the session lifecycle.

use super::*;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};
use rust_decimal_macros::dec;

#[fixture]
fn entry_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 7, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn open_session(entry_time: DateTime<Utc>) -> ParkingSession {
    ParkingSession::open(
        SessionId::random(),
        PlateNumber::new("ABC123").expect("valid plate"),
        LotId::random(),
        entry_time,
    )
}

fn rate(value: Decimal) -> HourlyRate {
    HourlyRate::new(value).expect("valid rate")
}

#[rstest]
#[case("abc123", "ABC123")]
#[case("  xy-99 ", "XY-99")]
#[case("a1", "A1")]
fn plates_are_normalised(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(PlateNumber::new(raw).expect("valid").as_ref(), expected);
}

#[rstest]
#[case("A", SessionValidationError::PlateLength { min: PLATE_MIN, max: PLATE_MAX })]
#[case("ABCDEFGHIJKLMNOPQRSTU", SessionValidationError::PlateLength { min: PLATE_MIN, max: PLATE_MAX })]
#[case("AB_12", SessionValidationError::PlateCharacters)]
#[case("AB 12", SessionValidationError::PlateCharacters)]
fn plates_are_validated(#[case] raw: &str, #[case] expected: SessionValidationError) {
    assert_eq!(PlateNumber::new(raw), Err(expected));
}

#[rstest]
fn close_records_exit_and_charge(mut open_session: ParkingSession, entry_time: DateTime<Utc>) {
    let exit = entry_time + Duration::minutes(61);
    let bill = open_session.close(exit, rate(dec!(3.00))).expect("open session");

    assert_eq!(bill.billable_hours(), 2);
    assert_eq!(bill.amount(), dec!(6.00));
    assert_eq!(open_session.status(), SessionStatus::Closed);
    assert_eq!(open_session.exit_time(), Some(exit));
    assert_eq!(open_session.charged_amount(), Some(dec!(6.00)));
}

#[rstest]
fn closing_twice_fails(mut open_session: ParkingSession, entry_time: DateTime<Utc>) {
    open_session
        .close(entry_time + Duration::minutes(5), rate(dec!(1)))
        .expect("first close");
    let snapshot = open_session.clone();

    let err = open_session
        .close(entry_time + Duration::hours(3), rate(dec!(1)))
        .expect_err("second close");

    assert_eq!(err.id, open_session.id());
    assert_eq!(open_session, snapshot);
}

#[rstest]
fn open_sessions_bill_up_to_now(open_session: ParkingSession, entry_time: DateTime<Utc>) {
    assert_eq!(
        open_session.billable_hours_at(entry_time + Duration::minutes(150)),
        3
    );
    assert_eq!(open_session.last_activity(), entry_time);
}

#[rstest]
fn restore_fills_missing_charge_for_closed_sessions(entry_time: DateTime<Utc>) {
    let session = ParkingSession::restore(
        SessionId::random(),
        PlateNumber::new("ABC123").expect("valid plate"),
        LotId::random(),
        entry_time,
        Some(entry_time + Duration::hours(1)),
        None,
    );
    assert_eq!(session.charged_amount(), Some(Decimal::ZERO));
    assert_eq!(session.last_activity(), entry_time + Duration::hours(1));
}
