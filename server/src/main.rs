//! SpaceSync Server - reference record store for SpaceSync clients.
//!
//! Serves an in-memory record store over HTTP: private and shared databases
//! per container, share invitations and share acceptance. Clients reach it
//! through the engine's `HttpRecordStore`.

mod auth;
mod config;
mod error;
mod handlers;
mod routes;


use crate::config::Config;
use spacesync_engine::MemoryBackend;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<MemoryBackend>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state with an empty store hosting the configured containers.
    pub fn new(config: Config) -> Self {
        let backend = MemoryBackend::new();
        for container in &config.containers {
            backend.add_container(container.clone());
        }

        Self {
            backend: Arc::new(backend),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spacesync_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting SpaceSync Server on {}:{}", config.host, config.port);
    tracing::info!(containers = ?config.containers, "Hosting containers");
    if config.auth_secret.is_none() {
        tracing::warn!("AUTH_SECRET not set, accepting anonymous requests");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let app = routes::build_router(AppState::new(config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
