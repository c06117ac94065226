//! Internal Diesel row structs and their conversion into domain types.
//!
//! Rows never leave the persistence layer. Conversions return `String`
//! errors which each repository maps into its own query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pagination::PageRequest;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::StoredCredentials;
use crate::domain::{
    EmailAddress, LotCode, LotDetails, LotId, NewParkingLot, ParkingLot, ParkingSession,
    PasswordHash, PersonName, PlateNumber, SessionId, SessionRecord, User, UserId, UserRole,
};

use super::schema::{parking_lots, parking_sessions, users};

fn to_u32(value: i32, column: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{column} is negative: {value}"))
}

/// Convert a domain count into an `INTEGER` column value.
pub(crate) fn to_i32(value: u32, column: &str) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("{column} overflows INTEGER: {value}"))
}

/// `LIMIT` and `OFFSET` values for a page request.
pub(crate) fn page_window(page: PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (i64::from(page.limit()), offset)
}

/// Convert a `COUNT(*)` result into a page total.
pub(crate) fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Rebuild the domain user, dropping the password hash.
    pub fn into_user(self) -> Result<User, String> {
        self.into_credentials().map(|stored| stored.user)
    }

    /// Rebuild the domain user together with its stored hash.
    pub fn into_credentials(self) -> Result<StoredCredentials, String> {
        let user = User {
            id: UserId::from_uuid(self.id),
            first_name: PersonName::new("firstName", &self.first_name)
                .map_err(|err| err.to_string())?,
            last_name: PersonName::new("lastName", &self.last_name)
                .map_err(|err| err.to_string())?,
            email: EmailAddress::new(&self.email).map_err(|err| err.to_string())?,
            role: self.role.parse::<UserRole>().map_err(|err| err.to_string())?,
            created_at: self.created_at,
        };
        Ok(StoredCredentials {
            user,
            password_hash: PasswordHash::new(self.password_hash),
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Changeset for self-service profile edits.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
}

// ---------------------------------------------------------------------------
// Parking lots
// ---------------------------------------------------------------------------

/// Row struct for reading from the parking_lots table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = parking_lots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LotRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub capacity: i32,
    pub occupied: i32,
    pub location: Option<String>,
    pub hourly_rate: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LotRow> for ParkingLot {
    type Error = String;

    fn try_from(row: LotRow) -> Result<Self, Self::Error> {
        let details = LotDetails::try_new(
            &row.name,
            to_u32(row.capacity, "capacity")?,
            row.location.as_deref(),
            row.hourly_rate,
        )
        .map_err(|err| err.to_string())?;
        let new_lot = NewParkingLot {
            id: LotId::from_uuid(row.id),
            code: LotCode::new(&row.code).map_err(|err| err.to_string())?,
            details,
            created_at: row.created_at,
        };
        Self::restore(new_lot, to_u32(row.occupied, "occupied")?).map_err(|err| err.to_string())
    }
}

/// Insertable struct for creating lot records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parking_lots)]
pub(crate) struct NewLotRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub name: &'a str,
    pub capacity: i32,
    pub occupied: i32,
    pub location: Option<&'a str>,
    pub hourly_rate: Decimal,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewLotRow<'a> {
    pub fn from_lot(lot: &'a ParkingLot) -> Result<Self, String> {
        Ok(Self {
            id: *lot.id().as_uuid(),
            code: lot.code().as_ref(),
            name: lot.name(),
            capacity: to_i32(lot.capacity(), "capacity")?,
            occupied: to_i32(lot.occupied(), "occupied")?,
            location: lot.location(),
            hourly_rate: lot.hourly_rate().amount(),
            created_at: lot.created_at(),
        })
    }
}

/// Changeset for admin edits; `occupied` carries the resized counter.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = parking_lots)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct LotDetailsUpdate<'a> {
    pub name: &'a str,
    pub capacity: i32,
    pub occupied: i32,
    pub location: Option<&'a str>,
    pub hourly_rate: Decimal,
}

// ---------------------------------------------------------------------------
// Parking sessions
// ---------------------------------------------------------------------------

/// Row struct for reading from the parking_sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = parking_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub plate_number: String,
    pub lot_id: Uuid,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub charged_amount: Option<Decimal>,
}

impl TryFrom<SessionRow> for ParkingSession {
    type Error = String;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self::restore(
            SessionId::from_uuid(row.id),
            PlateNumber::new(&row.plate_number).map_err(|err| err.to_string())?,
            LotId::from_uuid(row.lot_id),
            row.entry_time,
            row.exit_time,
            row.charged_amount,
        ))
    }
}

/// Rebuild a session joined with its lot.
pub(crate) fn session_record((session, lot): (SessionRow, LotRow)) -> Result<SessionRecord, String> {
    let session = ParkingSession::try_from(session)?;
    let lot = ParkingLot::try_from(lot)?;
    Ok(SessionRecord::new(session, &lot))
}

/// Insertable struct for opening a session.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parking_sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub id: Uuid,
    pub plate_number: &'a str,
    pub lot_id: Uuid,
    pub entry_time: DateTime<Utc>,
}
