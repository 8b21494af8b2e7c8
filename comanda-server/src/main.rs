use comanda_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, config, work dir, logging)
    let config = setup_environment()?;

    print_banner();
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Comanda print server starting..."
    );

    // 2. Server state
    let state = ServerState::initialize(&config)?;

    // 3. HTTP server (starts the background tasks)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
