//! Order intake API
//!
//! Finalized orders are accepted immediately and printed in the background.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/print", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", post(handler::submit))
        .route("/orders/sync", post(handler::submit_and_wait))
}
