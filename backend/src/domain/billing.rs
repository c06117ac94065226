//! Time-based parking fees.
//!
//! Every started hour is billed in full and a stay always bills at least one
//! hour, including zero or negative elapsed time from clock skew.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::HourlyRate;

/// Milliseconds in one billable hour.
pub const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Number of billable hours between `entry` and `exit`.
///
/// # Examples
/// ```
/// use chrono::{Duration, Utc};
/// use parking_backend::domain::billable_hours;
///
/// let entry = Utc::now();
/// assert_eq!(billable_hours(entry, entry), 1);
/// assert_eq!(billable_hours(entry, entry + Duration::minutes(60)), 1);
/// assert_eq!(billable_hours(entry, entry + Duration::minutes(61)), 2);
/// ```
pub fn billable_hours(entry: DateTime<Utc>, exit: DateTime<Utc>) -> u64 {
    let elapsed_ms = exit.signed_duration_since(entry).num_milliseconds();
    u64::try_from(elapsed_ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map_or(1, |ms| ms.div_ceil(MILLIS_PER_HOUR))
}

/// The fee owed for one stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    billable_hours: u64,
    hourly_rate: HourlyRate,
    amount: Decimal,
}

impl Bill {
    /// Hours charged.
    pub fn billable_hours(&self) -> u64 {
        self.billable_hours
    }

    /// Rate applied per hour.
    pub fn hourly_rate(&self) -> HourlyRate {
        self.hourly_rate
    }

    /// Total charged, rounded to two decimal places.
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Compute the bill for a stay from `entry` to `exit` at `rate`.
///
/// # Examples
/// ```
/// use chrono::{Duration, Utc};
/// use parking_backend::domain::{charge, HourlyRate};
/// use rust_decimal::Decimal;
///
/// let entry = Utc::now();
/// let rate = HourlyRate::new(Decimal::new(500, 2)).expect("valid rate");
/// let bill = charge(entry, entry + Duration::minutes(125), rate);
/// assert_eq!(bill.billable_hours(), 3);
/// assert_eq!(bill.amount(), Decimal::new(1500, 2));
/// ```
pub fn charge(entry: DateTime<Utc>, exit: DateTime<Utc>, rate: HourlyRate) -> Bill {
    let hours = billable_hours(entry, exit);
    let amount = Decimal::from(hours)
        .checked_mul(rate.amount())
        .unwrap_or(Decimal::MAX)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Bill {
        billable_hours: hours,
        hourly_rate: rate,
        amount,
    }
}
