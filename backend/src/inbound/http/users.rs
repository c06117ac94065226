//! Account API handlers.
//!
//! ```text
//! POST /api/v1/login {"email":"ada@example.com","password":"secret1"}
//! POST /api/v1/logout
//! POST /api/v1/users/register
//! GET  /api/v1/users/me
//! PUT  /api/v1/users/me
//! PUT  /api/v1/users/me/password
//! GET  /api/v1/users
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::{ChangePasswordRequest, RegisterUserRequest};
use crate::domain::{Error, LoginCredentials, NewPassword, User, UserProfile, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, invalid_field_as};

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Registration body for `POST /api/v1/users/register`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
    /// `admin` or `attendant` (`parking_attendant` is accepted); defaults to
    /// `attendant`.
    #[schema(example = "attendant")]
    pub role: Option<String>,
}

/// Profile update body for `PUT /api/v1/users/me`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Password change body for `PUT /api/v1/users/me/password`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

impl TryFrom<RegisterRequest> for RegisterUserRequest {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let profile = UserProfile::try_from_parts(&value.first_name, &value.last_name, &value.email)
            .map_err(invalid_field)?;
        let password = NewPassword::new(&value.password).map_err(invalid_field)?;
        let role = match value.role.as_deref() {
            Some(raw) => raw.parse::<UserRole>().map_err(invalid_field)?,
            None => UserRole::Attendant,
        };
        Ok(Self {
            profile,
            password,
            role,
        })
    }
}

impl TryFrom<ChangePasswordBody> for ChangePasswordRequest {
    type Error = Error;

    fn try_from(value: ChangePasswordBody) -> Result<Self, Self::Error> {
        if value.current_password.is_empty() {
            return Err(invalid_field_as(
                FieldName::new("currentPassword"),
                "current password must not be empty",
            ));
        }
        let new_password = NewPassword::new(&value.new_password)
            .map_err(|err| invalid_field_as(FieldName::new("newPassword"), err))?;
        Ok(Self {
            current_password: Zeroizing::new(value.current_password),
            new_password,
        })
    }
}

/// Authenticate a user and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password).map_err(invalid_field)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user)?;
    Ok(web::Json(user))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Register a new account.
///
/// Anyone may register an attendant. Registering an admin needs an admin
/// session, except for the very first account.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admin session required", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = RegisterUserRequest::try_from(payload.into_inner())?;
    let caller = session.principal()?;
    let user = state.accounts.register(caller, request).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Fetch the signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let principal = session.require_principal()?;
    let user = state.users.current_user(&principal).await?;
    Ok(web::Json(user))
}

/// Update the signed-in account's names and email.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[put("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<User>> {
    let principal = session.require_principal()?;
    let UpdateProfileRequest {
        first_name,
        last_name,
        email,
    } = payload.into_inner();
    let profile =
        UserProfile::try_from_parts(&first_name, &last_name, &email).map_err(invalid_field)?;
    let user = state.accounts.update_profile(&principal, profile).await?;
    Ok(web::Json(user))
}

/// Change the signed-in account's password.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/password",
    request_body = ChangePasswordBody,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Not signed in or wrong current password", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[put("/users/me/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChangePasswordBody>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let request = ChangePasswordRequest::try_from(payload.into_inner())?;
    state.accounts.change_password(&principal, request).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List every account, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let principal = session.require_principal()?;
    let users = state.users.list_users(&principal).await?;
    Ok(web::Json(users))
}
