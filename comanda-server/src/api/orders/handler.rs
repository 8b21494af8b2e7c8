//! Order intake API Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::FinalizedOrder;

use crate::core::ServerState;
use crate::printing::RouteSummary;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct OrderAccepted {
    pub order_id: String,
    pub items: usize,
}

fn validate(state: &ServerState, finalized: &FinalizedOrder) -> AppResult<()> {
    if finalized.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).with_detail("order_id", finalized.order.id.clone()));
    }
    if let Some(item) = finalized.first_out_of_range_item() {
        return Err(AppError::new(ErrorCode::ValueOutOfRange).with_detail("item_id", item.id.clone()));
    }
    state.catalog.get_business(finalized.order.business_id)?;
    Ok(())
}

/// POST /api/print/orders - accept a finalized order, print in background
///
/// Printing problems never reach the caller; they are recorded on the
/// tickets and logged.
pub async fn submit(
    State(state): State<ServerState>,
    Json(finalized): Json<FinalizedOrder>,
) -> AppResult<(StatusCode, Json<OrderAccepted>)> {
    validate(&state, &finalized)?;

    let accepted = OrderAccepted {
        order_id: finalized.order.id.clone(),
        items: finalized.items.len(),
    };

    let router = state.router.clone();
    tokio::spawn(async move {
        if let Err(e) = router.process_order(&finalized).await {
            tracing::error!(order_id = %finalized.order.id, error = %e, "Order printing failed");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

/// POST /api/print/orders/sync - route an order and wait for the summary
pub async fn submit_and_wait(
    State(state): State<ServerState>,
    Json(finalized): Json<FinalizedOrder>,
) -> AppResult<Json<RouteSummary>> {
    validate(&state, &finalized)?;
    let summary = state.router.process_order(&finalized).await?;
    Ok(Json(summary))
}
