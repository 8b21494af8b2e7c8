//! Print Ticket API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use shared::models::{TicketStatus, TicketSummary};

use crate::core::ServerState;
use crate::services::TicketRetryResult;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
}

/// GET /api/print-tickets/zone/:zone_id?status=PENDING
pub async fn list_by_zone(
    State(state): State<ServerState>,
    Path(zone_id): Path<i64>,
    Query(query): Query<TicketQuery>,
) -> AppResult<Json<Vec<TicketSummary>>> {
    let tickets = state.tickets.list_for_zone(zone_id, query.status)?;
    Ok(Json(tickets))
}

/// GET /api/print-tickets/:id/content - raw ESC/POS bytes
pub async fn content(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let bytes = state.tickets.content(id)?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

/// POST /api/print-tickets/:id/printed
pub async fn mark_printed(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TicketSummary>> {
    let ticket = state.tickets.mark_printed(id)?;
    Ok(Json(ticket))
}

/// POST /api/print-tickets/:id/retry
pub async fn retry(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TicketRetryResult>> {
    let result = state.tickets.retry(id).await?;
    Ok(Json(result))
}
