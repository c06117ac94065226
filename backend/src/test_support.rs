//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Compiled
//! for tests and when the `test-support` feature is enabled.

pub mod http;

pub mod clock {
    //! Controllable clocks.

    use std::sync::{Mutex, MutexGuard};

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    /// A clock whose time only moves when told to.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Start at 09:00 UTC on a fixed weekday.
        pub fn morning() -> Self {
            Self::new(fixed_morning())
        }

        pub fn advance(&self, delta: TimeDelta) {
            *self.lock_clock() += delta;
        }

        pub fn advance_minutes(&self, minutes: i64) {
            self.advance(TimeDelta::minutes(minutes));
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.lock_clock() = now;
        }

        fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }

    /// 2026-03-10 09:00:00 UTC.
    pub fn fixed_morning() -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).single() {
            Some(now) => now,
            None => panic!("valid fixture timestamp"),
        }
    }
}

pub mod fixtures {
    //! Builders for common domain values.

    use rust_decimal::Decimal;

    use crate::domain::{
        LotCode, LotDetails, LotId, NewParkingLot, ParkingLot, PlateNumber, Principal, UserId,
        UserRole,
    };

    use super::clock::fixed_morning;

    pub fn admin() -> Principal {
        Principal::new(UserId::random(), UserRole::Admin)
    }

    pub fn attendant() -> Principal {
        Principal::new(UserId::random(), UserRole::Attendant)
    }

    pub fn plate(raw: &str) -> PlateNumber {
        match PlateNumber::new(raw) {
            Ok(plate) => plate,
            Err(err) => panic!("invalid fixture plate {raw}: {err}"),
        }
    }

    pub fn lot_code(raw: &str) -> LotCode {
        match LotCode::new(raw) {
            Ok(code) => code,
            Err(err) => panic!("invalid fixture lot code {raw}: {err}"),
        }
    }

    /// Lot details with a whole-number hourly rate.
    pub fn lot_details(capacity: u32, hourly_rate: i64) -> LotDetails {
        match LotDetails::try_new("Fixture Lot", capacity, None, Decimal::new(hourly_rate, 0)) {
            Ok(details) => details,
            Err(err) => panic!("invalid fixture lot details: {err}"),
        }
    }

    /// An empty lot created at the fixture morning.
    pub fn lot(code: &str, capacity: u32, hourly_rate: i64) -> ParkingLot {
        ParkingLot::new(NewParkingLot {
            id: LotId::random(),
            code: lot_code(code),
            details: lot_details(capacity, hourly_rate),
            created_at: fixed_morning(),
        })
    }
}
