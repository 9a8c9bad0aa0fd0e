use std::net::SocketAddr;

use atelier::config::{Cli, Config};
use atelier::state::AppState;
use atelier::{db, routes};
use clap::Parser;
use tracing_subscriber::EnvFilter;

const ADMIN_PASSWORD_ENV: &str = "ATELIER_ADMIN_PASSWORD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli)?;
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Ensure media directory exists
    std::fs::create_dir_all(config.media_path())?;

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;

    let state = AppState::new(pool, config.clone());

    match std::env::var(ADMIN_PASSWORD_ENV) {
        Ok(password) => {
            state
                .auth
                .ensure_admin(&config.auth.admin_email, &password)
                .await?;
        }
        Err(_) => tracing::warn!(
            "{} not set, admin account left unchanged",
            ADMIN_PASSWORD_ENV
        ),
    }

    if let Err(e) = state.load_collections().await {
        tracing::warn!("Starting with empty collections: {}", e);
    }

    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
