//! Business directory API
//!
//! Pushed by the ordering platform whenever a business or category changes.

mod handler;

use axum::{Router, routing::put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/businesses/{id}", put(handler::upsert_business))
        .route("/api/categories/{id}", put(handler::upsert_category))
}
