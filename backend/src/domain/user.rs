//! User accounts and the authenticated principal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;

/// Minimum length of a first or last name once trimmed.
pub const PERSON_NAME_MIN: usize = 2;
/// Maximum length of a first or last name once trimmed.
pub const PERSON_NAME_MAX: usize = 50;
/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors raised by user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    NameTooShort { field: &'static str, min: usize },
    NameTooLong { field: &'static str, max: usize },
    InvalidEmail,
    UnknownRole { value: String },
}

impl UserValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::NameTooShort { field, .. } | Self::NameTooLong { field, .. } => field,
            Self::InvalidEmail => "email",
            Self::UnknownRole { .. } => "role",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::NameTooShort { field, min } => {
                write!(f, "{field} must be at least {min} characters")
            }
            Self::NameTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::InvalidEmail => write!(f, "email must be a valid email address"),
            Self::UnknownRole { value } => {
                write!(f, "role must be admin or attendant, got {value}")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual UUID form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role granted to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Manages lots, users, and reports.
    Admin,
    /// Records vehicle entries and exits.
    Attendant,
}

impl UserRole {
    /// Canonical storage form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Attendant => "attendant",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    /// Parse a role, accepting `parking_attendant` as an alias.
    ///
    /// # Examples
    /// ```
    /// use parking_backend::domain::UserRole;
    ///
    /// assert_eq!("parking_attendant".parse::<UserRole>(), Ok(UserRole::Attendant));
    /// assert!("owner".parse::<UserRole>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "attendant" | "parking_attendant" => Ok(Self::Attendant),
            _ => Err(UserValidationError::UnknownRole {
                value: s.to_owned(),
            }),
        }
    }
}

/// A first or last name, trimmed and length-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name for the request field `field`.
    pub fn new(field: &'static str, value: &str) -> Result<Self, UserValidationError> {
        let trimmed = value.trim();
        let length = trimmed.chars().count();
        if length < PERSON_NAME_MIN {
            return Err(UserValidationError::NameTooShort {
                field,
                min: PERSON_NAME_MIN,
            });
        }
        if length > PERSON_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field,
                max: PERSON_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Normalised (trimmed, lowercase) email address.
///
/// # Examples
/// ```
/// use parking_backend::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// assert!(EmailAddress::new("no-at-sign").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(value: &str) -> Result<Self, UserValidationError> {
        let normalised = value.trim().to_lowercase();
        if normalised.len() > EMAIL_MAX || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain
            .split('.')
            .all(|label| !label.is_empty())
            && domain.contains('.');
        if local.is_empty() || domain.contains('@') || !domain_ok {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Editable profile fields shared by registration and profile updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
}

impl UserProfile {
    /// Validate raw profile values.
    pub fn try_from_parts(
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            first_name: PersonName::new("firstName", first_name)?,
            last_name: PersonName::new("lastName", last_name)?,
            email: EmailAddress::new(email)?,
        })
    }
}

/// Registered application user. Password hashes never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller as read from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    role: UserRole,
}

impl Principal {
    /// Build a principal from a session.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// The caller's user id.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The caller's role.
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Fail with `403 Forbidden` unless the caller is an admin.
    ///
    /// # Examples
    /// ```
    /// use parking_backend::domain::{ErrorCode, Principal, UserId, UserRole};
    ///
    /// let attendant = Principal::new(UserId::random(), UserRole::Attendant);
    /// let err = attendant.require_admin().expect_err("attendants are not admins");
    /// assert_eq!(err.code(), ErrorCode::Forbidden);
    /// ```
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }
}

#[cfg(test)]
mod tests;
