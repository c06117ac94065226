//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, PasswordHash, User, UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email {email} is already registered",
        /// No account matched the identifier.
        NotFound { user: String } => "user {user} not found",
    }
}

/// A user together with the stored password hash, used only for login and
/// password changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user. Fails with `DuplicateEmail` when the email is taken.
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// Create a user only while no account exists.
    ///
    /// Returns `false` without inserting when any user is already registered.
    /// The emptiness check and the insert happen atomically.
    async fn insert_first(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by email.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Fetch a user and password hash by identifier.
    async fn find_credentials_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Replace the editable profile fields.
    async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<User, UserPersistenceError>;

    /// Replace the stored password hash.
    async fn update_password(
        &self,
        id: UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// All users, newest first.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Number of registered users.
    async fn count(&self) -> Result<u64, UserPersistenceError>;
}
