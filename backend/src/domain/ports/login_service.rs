//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to check credentials without importing
//! persistence or hashing concerns, so handler tests can substitute a mock.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown emails and wrong passwords fail with the same
    /// `401 Unauthorized` message.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
