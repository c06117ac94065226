//! Driving port for account registration and self-service changes.

use std::fmt;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Error, NewPassword, Principal, User, UserProfile, UserRole};

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    pub profile: UserProfile,
    pub password: NewPassword,
    pub role: UserRole,
}

/// Password change input. The current password is only compared, never
/// validated against the length policy.
#[derive(Clone, PartialEq, Eq)]
pub struct ChangePasswordRequest {
    pub current_password: Zeroizing<String>,
    pub new_password: NewPassword,
}

impl fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

/// Account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Register an account.
    ///
    /// Admin accounts need an admin `caller` unless no account exists yet.
    async fn register(
        &self,
        caller: Option<Principal>,
        request: RegisterUserRequest,
    ) -> Result<User, Error>;

    /// Update the caller's own profile.
    async fn update_profile(
        &self,
        principal: &Principal,
        profile: UserProfile,
    ) -> Result<User, Error>;

    /// Change the caller's own password after checking the current one.
    async fn change_password(
        &self,
        principal: &Principal,
        request: ChangePasswordRequest,
    ) -> Result<(), Error>;
}
