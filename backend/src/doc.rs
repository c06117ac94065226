//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (accounts, parking
//!   lots, parking sessions, reports, health)
//! - **Schemas**: request and response DTOs plus the domain wrappers from
//!   [`crate::inbound::http::schemas`], which keep domain types free of
//!   utoipa derives
//! - **Security**: Session cookie authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::health::{HealthBody, StorageBackend};
use crate::inbound::http::parking_lots::{CreateLotBody, UpdateLotBody};
use crate::inbound::http::parking_sessions::{EntryRequest, EntryResponse, ExitResponse};
use crate::inbound::http::reports::{DashboardResponse, ReportResponse};
use crate::inbound::http::responses::{
    BillResponse, LotResponse, SessionResponse, SessionStatusResponse,
};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, PaginationLinksSchema, PaginationMetaSchema, UserRoleSchema,
    UserSchema,
};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::users::{
    ChangePasswordBody, LoginRequest, RegisterRequest, UpdateProfileRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Parking backend API",
        description = "Parking lot management: lots, vehicle entry and exit, billing, and reports."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::list_users,
        crate::inbound::http::parking_lots::create_lot,
        crate::inbound::http::parking_lots::list_lots,
        crate::inbound::http::parking_lots::get_lot,
        crate::inbound::http::parking_lots::update_lot,
        crate::inbound::http::parking_lots::delete_lot,
        crate::inbound::http::parking_sessions::record_entry,
        crate::inbound::http::parking_sessions::record_exit,
        crate::inbound::http::parking_sessions::get_session,
        crate::inbound::http::parking_sessions::list_sessions,
        crate::inbound::http::parking_sessions::active_session,
        crate::inbound::http::reports::dashboard,
        crate::inbound::http::reports::entered,
        crate::inbound::http::reports::outgoing,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserSchema,
        UserRoleSchema,
        ErrorSchema,
        ErrorCodeSchema,
        PaginationMetaSchema,
        PaginationLinksSchema,
        LoginRequest,
        RegisterRequest,
        UpdateProfileRequest,
        ChangePasswordBody,
        CreateLotBody,
        UpdateLotBody,
        LotResponse,
        EntryRequest,
        EntryResponse,
        ExitResponse,
        SessionResponse,
        SessionStatusResponse,
        BillResponse,
        DashboardResponse,
        ReportResponse,
        HealthBody,
        StorageBackend,
    )),
    tags(
        (name = "users", description = "Accounts, login, and sessions"),
        (name = "parking-lots", description = "Parking lot management"),
        (name = "parking-sessions", description = "Vehicle entry, exit, and billing"),
        (name = "reports", description = "Dashboard and date-range reports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
