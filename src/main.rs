//! SeismicWatch — Binary Entrypoint
//! Boots the Axum HTTP server and the background feed poller.
//!
//! See `README.md` for quickstart and endpoint list.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use seismic_watch::alerts::{AlertPolicy, AlertTracker};
use seismic_watch::api::{create_router, AppState};
use seismic_watch::feeds::config::FeedConfig;
use seismic_watch::feeds::fetch::{Fetcher, HttpFetcher};
use seismic_watch::feeds::poll::{spawn_poller, PollerCfg};
use seismic_watch::history::AlertHistory;
use seismic_watch::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("seismic_watch=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let feeds = Arc::new(FeedConfig::load_default().context("failed to load feed config")?);
    tracing::info!(sources = feeds.sources.len(), "feed config ready");

    let poller_cfg = PollerCfg::from_env();
    let metrics = Metrics::init(poller_cfg.interval_secs);

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::default());
    let history = Arc::new(AlertHistory::with_capacity(2000));
    let tracker = AlertTracker::new(AlertPolicy::from_env());

    let _poller = spawn_poller(
        poller_cfg,
        Arc::clone(&feeds),
        Arc::clone(&fetcher),
        tracker,
        Arc::clone(&history),
    );

    let state = AppState::new(fetcher, feeds, history);
    let router = create_router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
