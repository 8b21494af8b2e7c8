//! Print Ticket API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/print-tickets", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/zone/{zone_id}", get(handler::list_by_zone))
        .route("/{id}/content", get(handler::content))
        .route("/{id}/printed", post(handler::mark_printed))
        .route("/{id}/retry", post(handler::retry))
}
