//! PostgreSQL-backed user accounts.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, PasswordHash, User, UserId, UserProfile};

use super::diesel_basic_error_mapping::{
    DieselFailure, classify_diesel_error, map_basic_failure, pool_error_message,
};
use super::models::{NewUserRow, UserProfileUpdate, UserRow, to_total};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_UNIQUE: &str = "users_email_key";

// Blocks concurrent inserts while still allowing reads; self-conflicting, so
// two first-user transactions serialise.
const LOCK_USERS: &str = "LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE";

/// Diesel implementation of [`UserRepository`].
///
/// # Examples
///
/// ```rust,no_run
/// use parking_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = DbPool::new(PoolConfig::new("postgres://localhost/parking")).await?;
/// let repository = DieselUserRepository::new(pool);
/// # let _ = repository;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_failure(failure: DieselFailure, email: &EmailAddress) -> UserPersistenceError {
    if failure.violates(EMAIL_UNIQUE) {
        return UserPersistenceError::duplicate_email(email.to_string());
    }
    map_basic_failure(
        failure,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn new_user_row<'a>(user: &'a User, password_hash: &'a PasswordHash) -> NewUserRow<'a> {
    NewUserRow {
        id: *user.id.as_uuid(),
        first_name: user.first_name.as_ref(),
        last_name: user.last_name.as_ref(),
        email: user.email.as_ref(),
        password_hash: password_hash.as_str(),
        role: user.role.as_str(),
        created_at: user.created_at,
    }
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    map_basic_failure(
        classify_diesel_error(error),
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let row = new_user_row(user, password_hash);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_failure(classify_diesel_error(error), &user.email))
    }

    async fn insert_first(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError> {
        let row = new_user_row(user, password_hash);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    diesel::sql_query(LOCK_USERS).execute(conn).await?;
                    let taken: bool = diesel::select(exists(users::table.select(users::id)))
                        .get_result(conn)
                        .await?;
                    if taken {
                        return Ok(false);
                    }
                    diesel::insert_into(users::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(|error| map_failure(classify_diesel_error(error), &user.email))?;
        debug!(user_id = %user.id, inserted, "first-user insert attempted");
        Ok(inserted)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_user)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_credentials)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_credentials_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_credentials)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<User, UserPersistenceError> {
        let changes = UserProfileUpdate {
            first_name: profile.first_name.as_ref(),
            last_name: profile.last_name.as_ref(),
            email: profile.email.as_ref(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(*id.as_uuid()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|error| map_failure(classify_diesel_error(error), &profile.email))?;
        row.ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?
            .into_user()
            .map_err(UserPersistenceError::query)
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*id.as_uuid()))
            .set(users::password_hash.eq(password_hash.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(UserPersistenceError::not_found(id.to_string()));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(UserRow::into_user)
            .collect::<Result<Vec<_>, _>>()
            .map_err(UserPersistenceError::query)
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_total(total))
    }
}
