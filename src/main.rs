//! Chirpy - message board backend
//! Mission: Serve the chirp API over a single-file document store

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, io::ErrorKind, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chirpy_backend::{
    api::{create_router, AppState},
    auth::{CredentialHasher, TokenIssuer},
    config::{load_env, Config},
    store::DocumentStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    info!("🚀 Chirpy starting");

    if config.debug {
        warn!(path = %config.db_path.display(), "Debug mode: deleting database file");
        match fs::remove_file(&config.db_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Could not delete {}", config.db_path.display())
                })
            }
        }
    }

    let store = Arc::new(
        DocumentStore::initialize(&config.db_path)
            .with_context(|| format!("Failed to open store at {}", config.db_path.display()))?,
    );
    info!("📁 Document store ready at: {}", config.db_path.display());

    let tokens = TokenIssuer::new(config.jwt_secret.clone()).with_max_ttl(config.access_ttl());
    let state = AppState::new(
        store,
        tokens,
        CredentialHasher::new(),
        config.refresh_ttl()?,
        &config.polka_key,
    );

    let app = create_router(state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy_backend=debug,chirpy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
