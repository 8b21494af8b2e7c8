//! Core module: configuration, state, server and background tasks
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - shared services
//! - [`Server`] - HTTP server
//! - [`BackgroundTasks`] - background task registry
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
