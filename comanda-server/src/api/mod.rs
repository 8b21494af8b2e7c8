//! API routes
//!
//! - [`health`] - service liveness
//! - [`catalog`] - business directory pushed by the ordering platform
//! - [`orders`] - finalized order intake
//! - [`zones`] - printer zone administration
//! - [`tickets`] - ticket listings, content and manual overrides
//! - [`devices`] - device registration and printer status

pub mod catalog;
pub mod devices;
pub mod health;
pub mod orders;
pub mod tickets;
pub mod zones;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Every route, without middleware or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(orders::router())
        .merge(zones::router())
        .merge(tickets::router())
        .merge(devices::router())
}

/// Fully configured application, shared by the server and oneshot tests
pub fn build_app(state: &ServerState) -> Router {
    build_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone())
}
