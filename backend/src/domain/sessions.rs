//! Parking sessions: one vehicle's stay in a lot.
//!
//! A session is created open on entry and closed exactly once on exit.
//! Closing is terminal; a closed session never changes again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Bill, HourlyRate, LotCode, LotId, ParkingLot, billable_hours, charge};

/// Minimum length of a normalised plate number.
pub const PLATE_MIN: usize = 2;
/// Maximum length of a normalised plate number.
pub const PLATE_MAX: usize = 20;

/// Validation errors for session inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionValidationError {
    #[error("plate number must be between {min} and {max} characters")]
    PlateLength { min: usize, max: usize },
    #[error("plate number can only contain letters, numbers, and hyphens")]
    PlateCharacters,
}

impl SessionValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        "plateNumber"
    }
}

/// Stable session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Vehicle registration plate, trimmed and uppercased.
///
/// # Examples
/// ```
/// use parking_backend::domain::PlateNumber;
///
/// let plate = PlateNumber::new(" abc-123 ").expect("valid plate");
/// assert_eq!(plate.as_ref(), "ABC-123");
/// assert!(PlateNumber::new("AB 123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlateNumber(String);

impl PlateNumber {
    pub fn new(value: &str) -> Result<Self, SessionValidationError> {
        let normalised = value.trim().to_ascii_uppercase();
        let length = normalised.chars().count();
        if !(PLATE_MIN..=PLATE_MAX).contains(&length) {
            return Err(SessionValidationError::PlateLength {
                min: PLATE_MIN,
                max: PLATE_MAX,
            });
        }
        if !normalised
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(SessionValidationError::PlateCharacters);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for PlateNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an entry request names its lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotRef {
    Id(LotId),
    Code(LotCode),
}

impl fmt::Display for LotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Code(code) => write!(f, "code {code}"),
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// Returned when closing a session that already has an exit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("parking session {id} is already closed")]
pub struct SessionAlreadyClosed {
    pub id: SessionId,
}

/// One vehicle's stay in a lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSession {
    id: SessionId,
    plate: PlateNumber,
    lot_id: LotId,
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    charged_amount: Option<Decimal>,
}

impl ParkingSession {
    /// Start a new open session.
    pub fn open(
        id: SessionId,
        plate: PlateNumber,
        lot_id: LotId,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            plate,
            lot_id,
            entry_time,
            exit_time: None,
            charged_amount: None,
        }
    }

    /// Rebuild a session from storage.
    ///
    /// A stored exit time without a charge is treated as a zero charge so the
    /// closed state stays consistent.
    pub fn restore(
        id: SessionId,
        plate: PlateNumber,
        lot_id: LotId,
        entry_time: DateTime<Utc>,
        exit_time: Option<DateTime<Utc>>,
        charged_amount: Option<Decimal>,
    ) -> Self {
        let charged_amount = exit_time.map(|_| charged_amount.unwrap_or(Decimal::ZERO));
        Self {
            id,
            plate,
            lot_id,
            entry_time,
            exit_time,
            charged_amount,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn plate(&self) -> &PlateNumber {
        &self.plate
    }

    pub fn lot_id(&self) -> LotId {
        self.lot_id
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }

    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.exit_time
    }

    pub fn charged_amount(&self) -> Option<Decimal> {
        self.charged_amount
    }

    pub fn status(&self) -> SessionStatus {
        if self.exit_time.is_some() {
            SessionStatus::Closed
        } else {
            SessionStatus::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    /// The moment used to order activity feeds: exit time once closed,
    /// entry time while open.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.exit_time.unwrap_or(self.entry_time)
    }

    /// Billable hours up to the exit, or up to `now` while still open.
    pub fn billable_hours_at(&self, now: DateTime<Utc>) -> u64 {
        billable_hours(self.entry_time, self.exit_time.unwrap_or(now))
    }

    /// Close the session at `exit_time`, charging `rate` per billable hour.
    pub fn close(
        &mut self,
        exit_time: DateTime<Utc>,
        rate: HourlyRate,
    ) -> Result<Bill, SessionAlreadyClosed> {
        if !self.is_open() {
            return Err(SessionAlreadyClosed { id: self.id });
        }
        let bill = charge(self.entry_time, exit_time, rate);
        self.exit_time = Some(exit_time);
        self.charged_amount = Some(bill.amount());
        Ok(bill)
    }
}

/// A session joined with the lot attributes shown alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session: ParkingSession,
    pub lot_code: LotCode,
    pub lot_name: String,
}

impl SessionRecord {
    /// Pair a session with the lot it belongs to.
    pub fn new(session: ParkingSession, lot: &ParkingLot) -> Self {
        Self {
            session,
            lot_code: lot.code().clone(),
            lot_name: lot.name().to_owned(),
        }
    }
}

/// A session record as presented to callers, with hours billed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub record: SessionRecord,
    pub duration_hours: u64,
}

impl SessionView {
    /// Present `record`, counting open sessions up to `now`.
    pub fn at(record: SessionRecord, now: DateTime<Utc>) -> Self {
        let duration_hours = record.session.billable_hours_at(now);
        Self {
            record,
            duration_hours,
        }
    }
}

/// Result of a successful entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub session: ParkingSession,
    pub lot: ParkingLot,
}

/// Result of a successful exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    pub session: ParkingSession,
    pub bill: Bill,
    pub lot: ParkingLot,
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
