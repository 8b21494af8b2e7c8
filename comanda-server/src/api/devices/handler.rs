//! Printer Device API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{
    DeviceHistory, DeviceRegistration, DeviceRegistrationResponse, PrinterCheck, PrinterStatus,
};

use crate::core::ServerState;
use crate::utils::AppResult;

/// POST /api/printer-devices/register
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<DeviceRegistration>,
) -> AppResult<Json<DeviceRegistrationResponse>> {
    let response = state.devices.register(payload)?;
    Ok(Json(response))
}

/// GET /api/printer-devices/status/:business_id
pub async fn status(
    State(state): State<ServerState>,
    Path(business_id): Path<i64>,
) -> AppResult<Json<Vec<PrinterStatus>>> {
    let printers = state.devices.status(business_id)?;
    Ok(Json(printers))
}

/// GET /api/printer-devices/:device_id/history
pub async fn history(
    State(state): State<ServerState>,
    Path(device_id): Path<String>,
) -> AppResult<Json<DeviceHistory>> {
    let history = state.devices.history(&device_id)?;
    Ok(Json(history))
}

/// GET /api/printer-devices/check/:printer_ip
pub async fn check(
    State(state): State<ServerState>,
    Path(printer_ip): Path<String>,
) -> AppResult<Json<PrinterCheck>> {
    let check = state.devices.check_printer(&printer_ip).await?;
    Ok(Json(check))
}
