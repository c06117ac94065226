//! Tests for lot validation and the space counter.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use rust_decimal_macros::dec;

fn details(capacity: u32) -> LotDetails {
    LotDetails::try_new("Main Street", capacity, Some("12 Main St"), dec!(5.00))
        .expect("valid details")
}

fn lot_with(capacity: u32, occupied: u32) -> ParkingLot {
    ParkingLot::restore(
        NewParkingLot {
            id: LotId::random(),
            code: LotCode::new("MAIN-1").expect("valid code"),
            details: details(capacity),
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
        },
        occupied,
    )
    .expect("occupied within capacity")
}

#[fixture]
fn single_space_lot() -> ParkingLot {
    lot_with(1, 0)
}

#[rstest]
fn new_lots_start_empty() {
    let lot = lot_with(3, 0);
    assert_eq!(lot.occupied(), 0);
    assert_eq!(lot.available(), 3);
}

#[rstest]
fn reserve_fills_until_capacity(mut single_space_lot: ParkingLot) {
    single_space_lot.try_reserve().expect("first space is free");
    assert!(single_space_lot.is_full());
    assert_eq!(
        single_space_lot.try_reserve(),
        Err(LotFull { capacity: 1 })
    );
    assert_eq!(single_space_lot.occupied(), 1);
}

#[rstest]
fn release_is_clamped_at_zero(mut single_space_lot: ParkingLot) {
    single_space_lot.release();
    assert_eq!(single_space_lot.occupied(), 0);
}

#[rstest]
fn reserve_then_release_restores_availability(mut single_space_lot: ParkingLot) {
    single_space_lot.try_reserve().expect("space is free");
    single_space_lot.release();
    assert_eq!(single_space_lot.available(), 1);
}

#[rstest]
#[case(10, 8, 5, 5)]
#[case(10, 2, 5, 2)]
#[case(10, 8, 20, 8)]
#[case(10, 0, 1, 0)]
fn capacity_changes_preserve_occupied_count(
    #[case] capacity: u32,
    #[case] occupied: u32,
    #[case] new_capacity: u32,
    #[case] expected_occupied: u32,
) {
    let mut lot = lot_with(capacity, occupied);
    lot.apply_details(details(new_capacity));
    assert_eq!(lot.capacity(), new_capacity);
    assert_eq!(lot.occupied(), expected_occupied);
    assert!(lot.occupied() <= lot.capacity());
}

#[rstest]
fn restore_rejects_overfull_counter() {
    let result = ParkingLot::restore(
        NewParkingLot {
            id: LotId::random(),
            code: LotCode::new("MAIN-1").expect("valid code"),
            details: details(2),
            created_at: Utc::now(),
        },
        3,
    );
    assert_eq!(
        result,
        Err(LotValidationError::OccupiedExceedsCapacity {
            occupied: 3,
            capacity: 2
        })
    );
}

#[rstest]
#[case("A", LotValidationError::CodeLength { min: LOT_CODE_MIN, max: LOT_CODE_MAX })]
#[case("lot 1", LotValidationError::CodeCharacters)]
#[case("lot#1", LotValidationError::CodeCharacters)]
fn lot_codes_are_validated(#[case] raw: &str, #[case] expected: LotValidationError) {
    assert_eq!(LotCode::new(raw), Err(expected));
}

#[rstest]
fn details_validation_reports_field() {
    let err = LotDetails::try_new("Main", 0, None, dec!(1)).expect_err("zero capacity");
    assert_eq!(err, LotValidationError::ZeroCapacity);
    assert_eq!(err.field(), "capacity");

    let err = LotDetails::try_new("Main", 4, None, dec!(-0.01)).expect_err("negative rate");
    assert_eq!(err.field(), "hourlyRate");

    let long_location = "x".repeat(LOT_LOCATION_MAX + 1);
    let err = LotDetails::try_new("Main", 4, Some(&long_location), dec!(1))
        .expect_err("long location");
    assert_eq!(err.field(), "location");
}

#[rstest]
#[case(LOT_CAPACITY_MAX, true)]
#[case(LOT_CAPACITY_MAX + 1, false)]
#[case(3_000_000_000, false)]
fn capacity_fits_the_counter_column(#[case] capacity: u32, #[case] accepted: bool) {
    let result = LotDetails::try_new("Main", capacity, None, dec!(1));

    match result {
        Ok(details) => {
            assert!(accepted, "capacity {capacity} should be rejected");
            assert_eq!(details.capacity(), capacity);
        }
        Err(err) => {
            assert!(!accepted, "capacity {capacity} should be accepted");
            assert_eq!(err, LotValidationError::CapacityTooLarge { max: LOT_CAPACITY_MAX });
            assert_eq!(err.field(), "capacity");
        }
    }
}

#[rstest]
#[case(dec!(99999999.99), true)]
#[case(dec!(99999999.994), true)]
#[case(dec!(99999999.995), false)]
#[case(dec!(10000000000.00), false)]
fn hourly_rate_fits_the_rate_column(#[case] raw: Decimal, #[case] accepted: bool) {
    match HourlyRate::new(raw) {
        Ok(rate) => {
            assert!(accepted, "rate {raw} should be rejected");
            assert!(rate.amount() <= HOURLY_RATE_MAX);
        }
        Err(err) => {
            assert!(!accepted, "rate {raw} should be accepted");
            assert_eq!(err.field(), "hourlyRate");
        }
    }
}

#[rstest]
fn largest_rate_is_the_column_maximum() {
    assert_eq!(HOURLY_RATE_MAX, dec!(99999999.99));
}

#[rstest]
fn blank_location_is_dropped() {
    let details = LotDetails::try_new("Main", 4, Some("   "), dec!(1)).expect("valid");
    assert!(details.location().is_none());
}

#[rstest]
#[case(dec!(5), "5.00")]
#[case(dec!(2.345), "2.35")]
#[case(dec!(0), "0.00")]
fn hourly_rates_keep_two_decimals(#[case] raw: Decimal, #[case] expected: &str) {
    assert_eq!(HourlyRate::new(raw).expect("valid rate").to_string(), expected);
}
