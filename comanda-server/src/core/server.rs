//! Server Implementation
//!
//! HTTP server startup and shutdown

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until Ctrl+C, then stop the background tasks
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let mut tasks = BackgroundTasks::new();
        state.start_background_tasks(&mut tasks);
        tasks.log_summary();

        let app = crate::api::build_app(&state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Comanda print server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        tasks.check_health();
        tasks.shutdown().await;
        Ok(())
    }
}
