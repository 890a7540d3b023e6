use anyhow::Result;
use clap::Parser;
use datadeck::config::AppConfig;
use datadeck::http::app_server::AppServer;
use datadeck::telemetry::init_telemetry;
use datadeck::DeckEngine;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "datadeck-server", about = "DataDeck HTTP Server")]
struct Cli {
    /// Path to config file
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let now = Instant::now();

    init_telemetry().map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))?;

    let cli = Cli::parse();

    tracing::info!("Starting DataDeck HTTP Server");

    // Load configuration
    let config = AppConfig::load(&cli.config)?;
    config.validate()?;

    tracing::info!("Configuration '{}' loaded successfully", &cli.config);

    // Initialize engine from config
    let engine = DeckEngine::from_config(&config).await?;

    tracing::info!("Engine initialized");

    // Create router
    let app = AppServer::new(engine, &config.server.allowed_origins);
    let engine = app.engine.clone();

    // Create server address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server started in {}ms", now.elapsed().as_millis());
    tracing::info!("Server listening on {}", addr);

    // Start server
    let server = axum::serve(listener, app.router).with_graceful_shutdown(shutdown());

    server.await?;

    // Explicitly shutdown engine to close catalog connection
    if let Err(e) = engine.shutdown().await {
        tracing::error!("Error during engine shutdown: {}", e);
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}
