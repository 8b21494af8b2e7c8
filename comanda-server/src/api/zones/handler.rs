//! Printer Zone API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::ApiResponse;
use shared::models::{PrinterZone, PrinterZoneCreate, PrinterZoneDetail, PrinterZoneUpdate};

use crate::core::ServerState;
use crate::utils::AppResult;

/// POST /api/printer-zones
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PrinterZoneCreate>,
) -> AppResult<Json<PrinterZone>> {
    let zone = state.zones.create(payload)?;
    Ok(Json(zone))
}

/// GET /api/printer-zones/business/:business_id
pub async fn list(
    State(state): State<ServerState>,
    Path(business_id): Path<i64>,
) -> AppResult<Json<Vec<PrinterZoneDetail>>> {
    let zones = state.zones.list(business_id)?;
    Ok(Json(zones))
}

/// GET /api/printer-zones/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PrinterZoneDetail>> {
    let zone = state.zones.get(id)?;
    Ok(Json(zone))
}

/// PUT /api/printer-zones/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PrinterZoneUpdate>,
) -> AppResult<Json<PrinterZone>> {
    let zone = state.zones.update(id, payload)?;
    Ok(Json(zone))
}

/// DELETE /api/printer-zones/:id - refused while PENDING tickets exist
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.zones.delete(id)?;
    Ok(ApiResponse::ok())
}
