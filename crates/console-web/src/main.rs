//! Console web server.

use std::sync::Arc;

use console::{Console, ConsoleConfig, ConsoleServices};
use console_web::config::Config;
use console_web::AppState;
use database::Database;
use openai_completion::OpenAiCompletion;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_platform::{RelayTransport, VoiceClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting console web server");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let services = ConsoleServices {
        store: Arc::new(db),
        completion: Arc::new(OpenAiCompletion::from_env()?),
        platform: Arc::new(VoiceClient::from_env()?),
        transport: Arc::new(RelayTransport::new()),
    };
    let state = AppState::new(
        Console::new(services, ConsoleConfig::from_env()),
        config.public_base_url.clone(),
    );
    let console = state.console.clone();

    let app = console_web::app(state);

    info!(addr = %config.addr, "Console web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    console.calls().shutdown().await;
    info!("Console web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
