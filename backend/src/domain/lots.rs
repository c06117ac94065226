//! Parking lots and their space counter.
//!
//! A [`ParkingLot`] owns the authoritative `occupied` counter. The counter is
//! only changed through [`ParkingLot::try_reserve`], [`ParkingLot::release`]
//! and [`ParkingLot::apply_details`], each of which keeps
//! `0 <= occupied <= capacity`. Adapters that perform the same change in SQL
//! must match these rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum length of a lot code.
pub const LOT_CODE_MIN: usize = 2;
/// Maximum length of a lot code.
pub const LOT_CODE_MAX: usize = 50;
/// Minimum length of a lot name once trimmed.
pub const LOT_NAME_MIN: usize = 2;
/// Maximum length of a lot name once trimmed.
pub const LOT_NAME_MAX: usize = 100;
/// Maximum length of a lot location once trimmed.
pub const LOT_LOCATION_MAX: usize = 200;
/// Largest capacity a lot may have; the counter is stored as `INTEGER`.
pub const LOT_CAPACITY_MAX: u32 = 2_147_483_647;
/// Largest hourly rate, matching the `NUMERIC(10, 2)` rate column.
pub const HOURLY_RATE_MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Validation errors raised by lot constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LotValidationError {
    #[error("code must be between {min} and {max} characters")]
    CodeLength { min: usize, max: usize },
    #[error("code can only contain letters, numbers, hyphens, and underscores")]
    CodeCharacters,
    #[error("name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("capacity must be a positive integer")]
    ZeroCapacity,
    #[error("capacity must not exceed {max}")]
    CapacityTooLarge { max: u32 },
    #[error("location must not exceed {max} characters")]
    LocationTooLong { max: usize },
    #[error("hourly rate must not be negative")]
    NegativeRate,
    #[error("hourly rate must not exceed {max}")]
    RateTooHigh { max: Decimal },
    #[error("occupied spaces ({occupied}) exceed capacity ({capacity})")]
    OccupiedExceedsCapacity { occupied: u32, capacity: u32 },
}

impl LotValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::CodeLength { .. } | Self::CodeCharacters => "code",
            Self::NameLength { .. } => "name",
            Self::ZeroCapacity
            | Self::CapacityTooLarge { .. }
            | Self::OccupiedExceedsCapacity { .. } => "capacity",
            Self::LocationTooLong { .. } => "location",
            Self::NegativeRate | Self::RateTooHigh { .. } => "hourlyRate",
        }
    }
}

/// Stable lot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(Uuid);

impl LotId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LotId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Unique, human-facing lot code such as `DOWNTOWN-1`.
///
/// Codes are trimmed and matched case-sensitively, as entered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotCode(String);

impl LotCode {
    /// Validate a lot code.
    ///
    /// # Examples
    /// ```
    /// use parking_backend::domain::LotCode;
    ///
    /// assert!(LotCode::new(" MAIN_01 ").is_ok());
    /// assert!(LotCode::new("main lot").is_err());
    /// ```
    pub fn new(value: &str) -> Result<Self, LotValidationError> {
        let trimmed = value.trim();
        let length = trimmed.chars().count();
        if !(LOT_CODE_MIN..=LOT_CODE_MAX).contains(&length) {
            return Err(LotValidationError::CodeLength {
                min: LOT_CODE_MIN,
                max: LOT_CODE_MAX,
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(LotValidationError::CodeCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for LotCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LotCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-negative price charged per billable hour, kept at two decimal places.
///
/// # Examples
/// ```
/// use parking_backend::domain::HourlyRate;
/// use rust_decimal::Decimal;
///
/// let rate = HourlyRate::new(Decimal::new(25, 1)).expect("non-negative");
/// assert_eq!(rate.to_string(), "2.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlyRate(Decimal);

impl HourlyRate {
    /// Validate a rate, rescaling it to two decimal places.
    pub fn new(value: Decimal) -> Result<Self, LotValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LotValidationError::NegativeRate);
        }
        let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded > HOURLY_RATE_MAX {
            return Err(LotValidationError::RateTooHigh {
                max: HOURLY_RATE_MAX,
            });
        }
        rounded.rescale(2);
        Ok(Self(rounded))
    }

    /// The rate as a decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for HourlyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Admin-editable lot attributes shared by creation and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotDetails {
    name: String,
    capacity: u32,
    location: Option<String>,
    hourly_rate: HourlyRate,
}

impl LotDetails {
    /// Validate editable lot attributes.
    pub fn try_new(
        name: &str,
        capacity: u32,
        location: Option<&str>,
        hourly_rate: Decimal,
    ) -> Result<Self, LotValidationError> {
        let name = name.trim();
        let name_length = name.chars().count();
        if !(LOT_NAME_MIN..=LOT_NAME_MAX).contains(&name_length) {
            return Err(LotValidationError::NameLength {
                min: LOT_NAME_MIN,
                max: LOT_NAME_MAX,
            });
        }
        if capacity == 0 {
            return Err(LotValidationError::ZeroCapacity);
        }
        if capacity > LOT_CAPACITY_MAX {
            return Err(LotValidationError::CapacityTooLarge {
                max: LOT_CAPACITY_MAX,
            });
        }
        let location = location.map(str::trim).filter(|value| !value.is_empty());
        if location.is_some_and(|value| value.chars().count() > LOT_LOCATION_MAX) {
            return Err(LotValidationError::LocationTooLong {
                max: LOT_LOCATION_MAX,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            capacity,
            location: location.map(str::to_owned),
            hourly_rate: HourlyRate::new(hourly_rate)?,
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Total number of spaces.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Free-form address or description.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Price per billable hour.
    pub fn hourly_rate(&self) -> HourlyRate {
        self.hourly_rate
    }
}

/// Input for creating a new, empty lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParkingLot {
    pub id: LotId,
    pub code: LotCode,
    pub details: LotDetails,
    pub created_at: DateTime<Utc>,
}

/// Returned when no space is left in a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("parking lot is full ({capacity} of {capacity} spaces occupied)")]
pub struct LotFull {
    pub capacity: u32,
}

/// Occupancy after a capacity change.
///
/// The count of occupied spaces is preserved and clamped to the new
/// capacity, so `available = max(0, new_capacity - occupied)`.
///
/// # Examples
/// ```
/// use parking_backend::domain::resized_occupancy;
///
/// assert_eq!(resized_occupancy(8, 5), 5);
/// assert_eq!(resized_occupancy(3, 5), 3);
/// assert_eq!(resized_occupancy(8, 20), 8);
/// ```
pub fn resized_occupancy(occupied: u32, new_capacity: u32) -> u32 {
    occupied.min(new_capacity)
}

/// A parking facility with its space counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingLot {
    id: LotId,
    code: LotCode,
    details: LotDetails,
    occupied: u32,
    created_at: DateTime<Utc>,
}

impl ParkingLot {
    /// Create an empty lot.
    pub fn new(new_lot: NewParkingLot) -> Self {
        let NewParkingLot {
            id,
            code,
            details,
            created_at,
        } = new_lot;
        Self {
            id,
            code,
            details,
            occupied: 0,
            created_at,
        }
    }

    /// Rebuild a lot from stored state, checking the counter invariant.
    pub fn restore(
        new_lot: NewParkingLot,
        occupied: u32,
    ) -> Result<Self, LotValidationError> {
        let capacity = new_lot.details.capacity();
        if occupied > capacity {
            return Err(LotValidationError::OccupiedExceedsCapacity { occupied, capacity });
        }
        let mut lot = Self::new(new_lot);
        lot.occupied = occupied;
        Ok(lot)
    }

    /// Stable lot identifier.
    pub fn id(&self) -> LotId {
        self.id
    }

    /// Unique short code attendants type at the gate.
    pub fn code(&self) -> &LotCode {
        &self.code
    }

    /// Editable name, capacity, location, and rate.
    pub fn details(&self) -> &LotDetails {
        &self.details
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.details.name()
    }

    /// Total number of spaces.
    pub fn capacity(&self) -> u32 {
        self.details.capacity()
    }

    /// Free-form location, if recorded.
    pub fn location(&self) -> Option<&str> {
        self.details.location()
    }

    /// Charge per started hour.
    pub fn hourly_rate(&self) -> HourlyRate {
        self.details.hourly_rate()
    }

    /// Spaces taken by open sessions.
    pub fn occupied(&self) -> u32 {
        self.occupied
    }

    /// When the lot was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Free spaces, `capacity - occupied`.
    pub fn available(&self) -> u32 {
        self.capacity().saturating_sub(self.occupied)
    }

    /// Whether every space is taken.
    pub fn is_full(&self) -> bool {
        self.occupied >= self.capacity()
    }

    /// Take one space, failing when none is free.
    pub fn try_reserve(&mut self) -> Result<(), LotFull> {
        if self.is_full() {
            return Err(LotFull {
                capacity: self.capacity(),
            });
        }
        self.occupied += 1;
        Ok(())
    }

    /// Give one space back. The counter never drops below zero.
    pub fn release(&mut self) {
        self.occupied = self.occupied.saturating_sub(1);
    }

    /// Replace the editable attributes, recomputing occupancy when the
    /// capacity changes.
    pub fn apply_details(&mut self, details: LotDetails) {
        self.occupied = resized_occupancy(self.occupied, details.capacity());
        self.details = details;
    }
}

#[cfg(test)]
#[path = "lots_tests.rs"]
mod tests;
