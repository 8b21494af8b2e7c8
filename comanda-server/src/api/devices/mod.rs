//! Printer Device API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/printer-devices/register | POST | device self-registration |
//! | /api/printer-devices/status/{business_id} | GET | printer status per zone |
//! | /api/printer-devices/{device_id}/history | GET | connection history |
//! | /api/printer-devices/check/{printer_ip} | GET | probe a printer now |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/printer-devices", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/status/{business_id}", get(handler::status))
        .route("/check/{printer_ip}", get(handler::check))
        .route("/{device_id}/history", get(handler::history))
}
