//! Parking session API handlers: vehicle entry, exit, and lookups.
//!
//! ```text
//! POST /api/v1/parking-sessions/entry {"plateNumber":"ABC123","lotCode":"NORTH-01"}
//! POST /api/v1/parking-sessions/{id}/exit
//! GET  /api/v1/parking-sessions/{id}
//! GET  /api/v1/parking-sessions?page=1&limit=10
//! GET  /api/v1/parking-sessions/active/{plate}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    EntryOutcome, Error, ExitOutcome, LotCode, LotId, LotRef, PlateNumber, SessionId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::{BillResponse, ListResponse, LotResponse, SessionResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, PageQuery, invalid_field, invalid_field_as, missing_field_error, parse_uuid,
};

const SESSION_ID: FieldName = FieldName::new("id");
const LOT_ID: FieldName = FieldName::new("lotId");
const LOT_CODE: FieldName = FieldName::new("lotCode");

/// Entry body for `POST /api/v1/parking-sessions/entry`.
///
/// Exactly one of `lotId` or `lotCode` must be present.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    #[schema(example = "abc-123")]
    pub plate_number: String,
    pub lot_id: Option<String>,
    #[schema(example = "NORTH-01")]
    pub lot_code: Option<String>,
}

/// Validated entry input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntry {
    pub plate: PlateNumber,
    pub lot: LotRef,
}

impl TryFrom<EntryRequest> for ValidatedEntry {
    type Error = Error;

    fn try_from(value: EntryRequest) -> Result<Self, Self::Error> {
        let plate = PlateNumber::new(&value.plate_number).map_err(invalid_field)?;
        let lot = match (value.lot_id.as_deref(), value.lot_code.as_deref()) {
            (Some(id), None) => LotRef::Id(LotId::from_uuid(parse_uuid(id, LOT_ID)?)),
            (None, Some(code)) => LotRef::Code(LotCode::new(code).map_err(|err| {
                invalid_field_as(LOT_CODE, err)
            })?),
            (Some(_), Some(_)) => {
                return Err(invalid_field_as(
                    LOT_CODE,
                    "provide either lotId or lotCode, not both",
                ));
            }
            (None, None) => return Err(missing_field_error(LOT_ID)),
        };
        Ok(Self { plate, lot })
    }
}

/// A vehicle admitted into a lot.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryResponse {
    pub session: SessionResponse,
    pub lot: LotResponse,
}

impl From<EntryOutcome> for EntryResponse {
    fn from(outcome: EntryOutcome) -> Self {
        Self {
            session: SessionResponse::from(&outcome.session),
            lot: LotResponse::from(&outcome.lot),
        }
    }
}

/// A vehicle released from a lot with its bill.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExitResponse {
    pub session: SessionResponse,
    pub bill: BillResponse,
    pub lot: LotResponse,
}

impl From<ExitOutcome> for ExitResponse {
    fn from(outcome: ExitOutcome) -> Self {
        Self {
            session: SessionResponse::from(&outcome.session),
            bill: BillResponse::from(&outcome.bill),
            lot: LotResponse::from(&outcome.lot),
        }
    }
}

fn session_id(raw: &str) -> Result<SessionId, Error> {
    parse_uuid(raw, SESSION_ID).map(SessionId::from_uuid)
}

/// Admit a vehicle, reserving one space.
#[utoipa::path(
    post,
    path = "/api/v1/parking-sessions/entry",
    request_body = EntryRequest,
    responses(
        (status = 201, description = "Vehicle admitted", body = EntryResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such lot", body = ErrorSchema),
        (status = 409, description = "Lot full or vehicle already parked", body = ErrorSchema)
    ),
    tags = ["parking-sessions"],
    operation_id = "recordEntry"
)]
#[post("/parking-sessions/entry")]
pub async fn record_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EntryRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let ValidatedEntry { plate, lot } = ValidatedEntry::try_from(payload.into_inner())?;
    let outcome = state.sessions.record_entry(&principal, plate, lot).await?;
    Ok(HttpResponse::Created().json(EntryResponse::from(outcome)))
}

/// Close an open session, bill it and release the space.
#[utoipa::path(
    post,
    path = "/api/v1/parking-sessions/{id}/exit",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Vehicle released", body = ExitResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such session", body = ErrorSchema),
        (status = 409, description = "Session already closed", body = ErrorSchema)
    ),
    tags = ["parking-sessions"],
    operation_id = "recordExit"
)]
#[post("/parking-sessions/{id}/exit")]
pub async fn record_exit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ExitResponse>> {
    let principal = session.require_principal()?;
    let id = session_id(&path)?;
    let outcome = state.sessions.record_exit(&principal, id).await?;
    Ok(web::Json(ExitResponse::from(outcome)))
}

/// Fetch one session with its lot and elapsed billable hours.
#[utoipa::path(
    get,
    path = "/api/v1/parking-sessions/{id}",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session", body = SessionResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such session", body = ErrorSchema)
    ),
    tags = ["parking-sessions"],
    operation_id = "getParkingSession"
)]
#[get("/parking-sessions/{id}")]
pub async fn get_session(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SessionResponse>> {
    session.require_principal()?;
    let id = session_id(&path)?;
    let view = state.sessions_query.get_session(id).await?;
    Ok(web::Json(SessionResponse::from(&view)))
}

/// List every session, most recent entry first. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/parking-sessions",
    params(PageQuery),
    responses(
        (status = 200, description = "Sessions", body = ListResponse<SessionResponse>),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["parking-sessions"],
    operation_id = "listParkingSessions"
)]
#[get("/parking-sessions")]
pub async fn list_sessions(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ListResponse<SessionResponse>>> {
    let principal = session.require_principal()?;
    let page = state
        .sessions_query
        .list_sessions(&principal, query.to_request()?)
        .await?;
    let body = ListResponse::from_page(page, &req.full_url(), |view| {
        SessionResponse::from(&view)
    });
    Ok(web::Json(body))
}

/// Find the open session for a plate.
#[utoipa::path(
    get,
    path = "/api/v1/parking-sessions/active/{plate}",
    params(("plate" = String, Path, description = "Plate number, any case")),
    responses(
        (status = 200, description = "Open session", body = SessionResponse),
        (status = 400, description = "Invalid plate", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Vehicle not parked", body = ErrorSchema)
    ),
    tags = ["parking-sessions"],
    operation_id = "activeParkingSession"
)]
#[get("/parking-sessions/active/{plate}")]
pub async fn active_session(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SessionResponse>> {
    session.require_principal()?;
    let plate = PlateNumber::new(&path).map_err(invalid_field)?;
    let view = state.sessions_query.active_session(&plate).await?;
    Ok(web::Json(SessionResponse::from(&view)))
}

#[cfg(test)]
#[path = "parking_sessions_tests.rs"]
mod tests;
