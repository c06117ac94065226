//! Parking lot API handlers.
//!
//! ```text
//! POST   /api/v1/parking-lots {"code":"NORTH-01","name":"North Garage","capacity":120,"hourlyRate":"2.50"}
//! GET    /api/v1/parking-lots?page=1&limit=10
//! GET    /api/v1/parking-lots/{id}
//! PUT    /api/v1/parking-lots/{id}
//! DELETE /api/v1/parking-lots/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateLotRequest;
use crate::domain::{Error, LotCode, LotDetails, LotId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::{ListResponse, LotResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, invalid_field, parse_uuid};

const LOT_ID: FieldName = FieldName::new("id");

/// Creation body for `POST /api/v1/parking-lots`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotBody {
    #[schema(example = "NORTH-01")]
    pub code: String,
    #[schema(example = "North Garage")]
    pub name: String,
    #[schema(example = 120, minimum = 1)]
    pub capacity: u32,
    #[schema(example = "12 Harbour Road")]
    pub location: Option<String>,
    /// Accepts a JSON number or a decimal string.
    #[schema(value_type = String, example = "2.50")]
    pub hourly_rate: Decimal,
}

/// Update body for `PUT /api/v1/parking-lots/{id}`.
///
/// The code is immutable once a lot exists.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLotBody {
    #[schema(example = "North Garage")]
    pub name: String,
    #[schema(example = 150, minimum = 1)]
    pub capacity: u32,
    pub location: Option<String>,
    #[schema(value_type = String, example = "3.00")]
    pub hourly_rate: Decimal,
}

impl TryFrom<CreateLotBody> for CreateLotRequest {
    type Error = Error;

    fn try_from(value: CreateLotBody) -> Result<Self, Self::Error> {
        let code = LotCode::new(&value.code).map_err(invalid_field)?;
        let details = LotDetails::try_new(
            &value.name,
            value.capacity,
            value.location.as_deref(),
            value.hourly_rate,
        )
        .map_err(invalid_field)?;
        Ok(Self { code, details })
    }
}

impl TryFrom<UpdateLotBody> for LotDetails {
    type Error = Error;

    fn try_from(value: UpdateLotBody) -> Result<Self, Self::Error> {
        LotDetails::try_new(
            &value.name,
            value.capacity,
            value.location.as_deref(),
            value.hourly_rate,
        )
        .map_err(invalid_field)
    }
}

fn lot_id(raw: &str) -> Result<LotId, Error> {
    parse_uuid(raw, LOT_ID).map(LotId::from_uuid)
}

/// Create a parking lot. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/parking-lots",
    request_body = CreateLotBody,
    responses(
        (status = 201, description = "Lot created", body = LotResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Lot code already in use", body = ErrorSchema)
    ),
    tags = ["parking-lots"],
    operation_id = "createParkingLot"
)]
#[post("/parking-lots")]
pub async fn create_lot(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateLotBody>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let request = CreateLotRequest::try_from(payload.into_inner())?;
    let lot = state.lots.create_lot(&principal, request).await?;
    Ok(HttpResponse::Created().json(LotResponse::from(&lot)))
}

/// List lots, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/parking-lots",
    params(PageQuery),
    responses(
        (status = 200, description = "Lots", body = ListResponse<LotResponse>),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["parking-lots"],
    operation_id = "listParkingLots"
)]
#[get("/parking-lots")]
pub async fn list_lots(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ListResponse<LotResponse>>> {
    session.require_principal()?;
    let page = state.lots_query.list_lots(query.to_request()?).await?;
    let body = ListResponse::from_page(page, &req.full_url(), |lot| LotResponse::from(&lot));
    Ok(web::Json(body))
}

/// Fetch one lot with its live occupancy.
#[utoipa::path(
    get,
    path = "/api/v1/parking-lots/{id}",
    params(("id" = String, Path, description = "Lot identifier")),
    responses(
        (status = 200, description = "Lot", body = LotResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such lot", body = ErrorSchema)
    ),
    tags = ["parking-lots"],
    operation_id = "getParkingLot"
)]
#[get("/parking-lots/{id}")]
pub async fn get_lot(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LotResponse>> {
    session.require_principal()?;
    let id = lot_id(&path)?;
    let lot = state.lots_query.get_lot(id).await?;
    Ok(web::Json(LotResponse::from(&lot)))
}

/// Edit a lot. Shrinking below the current occupancy clamps `occupied`.
#[utoipa::path(
    put,
    path = "/api/v1/parking-lots/{id}",
    params(("id" = String, Path, description = "Lot identifier")),
    request_body = UpdateLotBody,
    responses(
        (status = 200, description = "Updated lot", body = LotResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such lot", body = ErrorSchema)
    ),
    tags = ["parking-lots"],
    operation_id = "updateParkingLot"
)]
#[put("/parking-lots/{id}")]
pub async fn update_lot(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateLotBody>,
) -> ApiResult<web::Json<LotResponse>> {
    let principal = session.require_principal()?;
    let id = lot_id(&path)?;
    let details = LotDetails::try_from(payload.into_inner())?;
    let lot = state.lots.update_lot(&principal, id, details).await?;
    Ok(web::Json(LotResponse::from(&lot)))
}

/// Delete a lot and its closed sessions. Refused while vehicles are parked.
#[utoipa::path(
    delete,
    path = "/api/v1/parking-lots/{id}",
    params(("id" = String, Path, description = "Lot identifier")),
    responses(
        (status = 204, description = "Lot deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such lot", body = ErrorSchema),
        (status = 409, description = "Lot has open sessions", body = ErrorSchema)
    ),
    tags = ["parking-lots"],
    operation_id = "deleteParkingLot"
)]
#[delete("/parking-lots/{id}")]
pub async fn delete_lot(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let id = lot_id(&path)?;
    state.lots.delete_lot(&principal, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "parking_lots_tests.rs"]
mod tests;
