//! Comanda print server - kitchen and bar ticket dispatch
//!
//! # Overview
//!
//! Finalized restaurant orders are split per printer zone, encoded as
//! ESC/POS tickets, persisted and pushed to networked thermal printers over
//! raw TCP. Failed tickets are retried in the background and embedded
//! printer devices report their liveness.
//!
//! # Module layout
//!
//! ```text
//! comanda-server/src/
//! ├── core/          # config, state, server, background tasks
//! ├── printing/      # routing, rendering, storage, dispatch, health
//! ├── services/      # zone, ticket, device and directory services
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, validation
//! ```

pub mod api;
pub mod core;
pub mod printing;
pub mod services;
pub mod utils;

// Re-export public types
pub use core::{Config, Server, ServerState};
pub use printing::{PrintStorage, ZoneRouter};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Load `.env`, read the configuration, prepare the work directory and
/// start logging
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let logs_dir = config.logs_dir();
    init_logger_with_file(&config.log_level, config.log_json, Some(&logs_dir))?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ______                                __
  / ____/___  ____ ___  ____ _____  ____/ /___ _
 / /   / __ \/ __ `__ \/ __ `/ __ \/ __  / __ `/
/ /___/ /_/ / / / / / / /_/ / / / / /_/ / /_/ /
\____/\____/_/ /_/ /_/\__,_/_/ /_/\__,_/\__,_/
    "#
    );
}
