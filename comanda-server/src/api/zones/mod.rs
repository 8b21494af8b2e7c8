//! Printer Zone API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/printer-zones", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/business/{business_id}", get(handler::list))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
