//! Account services: login, registration, and self-service profile changes.
//!
//! Password hashes stay inside this module and the repository; callers only
//! ever see [`User`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    ChangePasswordRequest, LoginService, PasswordHasher, PasswordHasherError,
    RegisterUserRequest, StoredCredentials, UserAccountCommand, UserPersistenceError,
    UserRepository, UsersQuery,
};
use crate::domain::{
    Error, LoginCredentials, NewPassword, PasswordHash, Principal, User, UserId, UserProfile,
    UserRole,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        err @ UserPersistenceError::DuplicateEmail { .. } => Error::conflict(err.to_string()),
        err @ UserPersistenceError::NotFound { .. } => Error::not_found(err.to_string()),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Account service implementing [`LoginService`], [`UserAccountCommand`], and
/// [`UsersQuery`].
#[derive(Clone)]
pub struct UserAccountService<R> {
    user_repo: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<R> UserAccountService<R>
where
    R: UserRepository,
{
    /// Create a service over the user repository and password hasher.
    pub fn new(user_repo: Arc<R>, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            hasher,
            clock,
        }
    }

    /// Create an admin account when no account exists yet.
    ///
    /// Returns the new admin, or `None` when users are already registered.
    pub async fn ensure_bootstrap_admin(
        &self,
        profile: UserProfile,
        password: NewPassword,
    ) -> Result<Option<User>, Error> {
        if self.user_count().await? > 0 {
            return Ok(None);
        }
        let user = self
            .create_first_account(RegisterUserRequest {
                profile,
                password,
                role: UserRole::Admin,
            })
            .await?;
        if let Some(user) = &user {
            info!(user_id = %user.id, email = %user.email, "bootstrap admin created");
        }
        Ok(user)
    }

    async fn user_count(&self) -> Result<u64, Error> {
        self.user_repo.count().await.map_err(map_repository_error)
    }

    fn new_account(&self, request: RegisterUserRequest) -> Result<(User, PasswordHash), Error> {
        let RegisterUserRequest {
            profile,
            password,
            role,
        } = request;
        let password_hash = self
            .hasher
            .hash(password.expose())
            .map_err(map_hasher_error)?;
        let user = User {
            id: UserId::random(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            role,
            created_at: self.clock.utc(),
        };
        Ok((user, password_hash))
    }

    async fn create_account(&self, request: RegisterUserRequest) -> Result<User, Error> {
        let (user, password_hash) = self.new_account(request)?;
        self.user_repo
            .insert(&user, &password_hash)
            .await
            .map_err(map_repository_error)?;
        Ok(user)
    }

    /// Insert the account only if the user table is still empty.
    async fn create_first_account(
        &self,
        request: RegisterUserRequest,
    ) -> Result<Option<User>, Error> {
        let (user, password_hash) = self.new_account(request)?;
        let inserted = self
            .user_repo
            .insert_first(&user, &password_hash)
            .await
            .map_err(map_repository_error)?;
        Ok(inserted.then_some(user))
    }

    async fn credentials_for(&self, principal: &Principal) -> Result<StoredCredentials, Error> {
        self.user_repo
            .find_credentials_by_id(principal.user_id())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", principal.user_id())))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, Error> {
        self.hasher.verify(password, hash).map_err(map_hasher_error)
    }
}

#[async_trait]
impl<R> LoginService for UserAccountService<R>
where
    R: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .user_repo
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?;
        let Some(StoredCredentials {
            user,
            password_hash,
        }) = stored
        else {
            warn!("login rejected for unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self.verify(credentials.password(), &password_hash)? {
            warn!(user_id = %user.id, "login rejected for wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok(user)
    }
}

#[async_trait]
impl<R> UserAccountCommand for UserAccountService<R>
where
    R: UserRepository,
{
    async fn register(
        &self,
        caller: Option<Principal>,
        request: RegisterUserRequest,
    ) -> Result<User, Error> {
        let caller_is_admin = caller.is_some_and(|principal| principal.is_admin());
        let user = if request.role == UserRole::Admin && !caller_is_admin {
            let email = request.profile.email.clone();
            let Some(user) = self.create_first_account(request).await? else {
                warn!(%email, "admin registration without admin session");
                return Err(Error::forbidden("only an admin can register another admin"));
            };
            user
        } else {
            self.create_account(request).await?
        };
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    async fn update_profile(
        &self,
        principal: &Principal,
        profile: UserProfile,
    ) -> Result<User, Error> {
        let user = self
            .user_repo
            .update_profile(principal.user_id(), &profile)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        principal: &Principal,
        request: ChangePasswordRequest,
    ) -> Result<(), Error> {
        let stored = self.credentials_for(principal).await?;
        if !self.verify(request.current_password.as_str(), &stored.password_hash)? {
            warn!(user_id = %principal.user_id(), "password change with wrong current password");
            return Err(Error::unauthorized("current password is incorrect"));
        }
        let password_hash = self
            .hasher
            .hash(request.new_password.expose())
            .map_err(map_hasher_error)?;
        self.user_repo
            .update_password(principal.user_id(), &password_hash)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %principal.user_id(), "password changed");
        Ok(())
    }
}

#[async_trait]
impl<R> UsersQuery for UserAccountService<R>
where
    R: UserRepository,
{
    async fn current_user(&self, principal: &Principal) -> Result<User, Error> {
        self.user_repo
            .find_by_id(principal.user_id())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", principal.user_id())))
    }

    async fn list_users(&self, principal: &Principal) -> Result<Vec<User>, Error> {
        principal.require_admin()?;
        self.user_repo.list().await.map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
