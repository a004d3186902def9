//! Guide HTTP Server Binary
//!
//! This is the main entry point for the channel guide REST API server.
//! It loads configuration, seeds the in-memory repository, sets up the HTTP
//! router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Serve an empty guide on 0.0.0.0:8080
//! cargo run --bin guide-server
//!
//! # Serve a seeded guide with an explicit config file
//! GUIDE_CONFIG=backend/guide.toml GUIDE_SEED_FILE=demos/seed.json \
//!   cargo run --bin guide-server
//! ```
//!
//! # Environment Variables
//!
//! - `GUIDE_CONFIG`: Path to a `guide.toml` (default: search standard locations)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `GUIDE_SEED_FILE`: JSON seed document loaded at startup
//! - `GUIDE_BASE_URL`: Remote guide backend watched by the background session
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use channel_guide::config::GuideConfig;
use channel_guide::db::{self, LineupRepository, LocalRepository};
use channel_guide::http::{create_router, AppState};
use channel_guide::services::{
    Clock, GuideSession, GuideTicker, GuideViewState, SystemClock, TickerHandle,
};
use channel_guide::source::{LineupSource, RepositorySource};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

#[cfg(feature = "http-client")]
fn session_source(
    config: &GuideConfig,
    repository: Arc<dyn LineupRepository>,
) -> anyhow::Result<Arc<dyn LineupSource>> {
    match &config.client.base_url {
        Some(base_url) => {
            info!("Background session follows remote guide at {}", base_url);
            let source = channel_guide::source::HttpLineupSource::new(
                base_url.clone(),
                config.client_timeout(),
            )?;
            Ok(Arc::new(source))
        }
        None => Ok(Arc::new(RepositorySource::new(repository))),
    }
}

#[cfg(not(feature = "http-client"))]
fn session_source(
    config: &GuideConfig,
    repository: Arc<dyn LineupRepository>,
) -> anyhow::Result<Arc<dyn LineupSource>> {
    if config.client.base_url.is_some() {
        warn!("GUIDE_BASE_URL ignored: built without the http-client feature");
    }
    Ok(Arc::new(RepositorySource::new(repository)))
}

/// Keep a guide session running for the current window so lineup problems
/// show up in the server log as they happen.
fn spawn_background_session(
    config: &GuideConfig,
    state: &AppState,
    ticker: &TickerHandle,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let source = session_source(config, state.repository.clone())?;
    let now = ticker.latest();
    let settings = state.settings.as_ref().clone();
    let window = settings.window_at(now)?;
    let session = GuideSession::new(source, settings, window, now);

    let (states_tx, mut states_rx) = watch::channel(GuideViewState::Loading);
    let run = session.run(ticker.subscribe(), state.events.subscribe(), states_tx);

    Ok(tokio::spawn(async move {
        let report = async move {
            while states_rx.changed().await.is_ok() {
                match &*states_rx.borrow_and_update() {
                    GuideViewState::Loading => {}
                    GuideViewState::Failed(message) => warn!("Guide session failed: {}", message),
                    GuideViewState::Ready(snapshot) => {
                        let issues: usize = snapshot.rows.iter().map(|r| r.issues.len()).sum();
                        info!(
                            "Guide ready: {} channels, now at {:?}%, {} lineup issues",
                            snapshot.rows.len(),
                            snapshot.progress,
                            issues
                        );
                    }
                }
            }
        };
        tokio::join!(run, report);
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Starting guide HTTP server");

    let config = GuideConfig::load()?;

    let repository = LocalRepository::new();
    if let Some(seed_file) = &config.seed.file {
        let seed = db::load_seed_file(seed_file)?;
        db::apply_seed(&repository, seed).await?;
        info!("Loaded seed from {}", seed_file.display());
    }
    let repository: Arc<dyn LineupRepository> = Arc::new(repository);

    let state = AppState::with_settings(repository, config.to_settings());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ticker = GuideTicker::spawn(clock, config.tick_interval());
    let session_task = spawn_background_session(&config, &state, &ticker)?;

    let app = create_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;

    ticker.stop();
    session_task.abort();
    Ok(())
}
