//! Shared types for the Comanda print engine
//!
//! Domain models, error codes and the unified API response shape used by
//! the server crate and its HTTP clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
