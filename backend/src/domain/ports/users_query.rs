//! Driving port for user-facing account queries.

use async_trait::async_trait;

use crate::domain::{Error, Principal, User};

/// Domain use-case port for reading accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// The caller's own account.
    async fn current_user(&self, principal: &Principal) -> Result<User, Error>;

    /// Every account, newest first. Admin only.
    async fn list_users(&self, principal: &Principal) -> Result<Vec<User>, Error>;
}
