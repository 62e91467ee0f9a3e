//! Submission Proxy Service
//!
//! Relays test-drive registrations to the spreadsheet script.

use anyhow::{Context, Result};
use std::sync::Arc;
use submission_gate::{MemoryStore, RedisStore, SubmissionGate, SubmissionStore};
use submission_proxy::{create_router, AppState, Config};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "submission_proxy=debug,submission_gate=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Submission Proxy");

    let config = Config::from_env().context("Failed to load configuration")?;

    match &config.google_script_url {
        Some(_) => info!("Upstream script URL configured"),
        None => warn!("GOOGLE_SCRIPT_URL is not set; submissions will fail until it is"),
    }

    let gate = if config.gate_enabled {
        let store: Arc<dyn SubmissionStore> = match &config.redis_url {
            Some(redis_url) => Arc::new(
                RedisStore::connect(redis_url)
                    .await
                    .context("Failed to initialize Redis store")?,
            ),
            None => {
                info!("No REDIS_URL set, keeping submission records in memory");
                Arc::new(MemoryStore::new())
            }
        };
        Some(SubmissionGate::new(store))
    } else {
        info!("Server-side submission gate disabled");
        None
    };

    let state = AppState::new(&config, gate);
    let app = create_router(state);

    let listener = TcpListener::bind(&config.address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.address()))?;

    info!("Submission Proxy listening on http://{}", config.address());

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
