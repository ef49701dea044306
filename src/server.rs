use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api::{AppState, create_router};
use crate::batch::BatchCoordinator;
use crate::config::Config;
use crate::fetcher::SearchFetcher;

/// Builds the full application (fetcher, coordinator, router) from config.
pub fn build_app(config: &Config) -> Result<Router> {
    let fetcher = SearchFetcher::video_search(&config.search_endpoint)
        .context("Failed to set up search fetcher")?;
    let coordinator = BatchCoordinator::new(fetcher).with_fetch_timeout(config.fetch_timeout);
    let allowed_origin = HeaderValue::from_str(&config.allowed_origin)
        .with_context(|| format!("Invalid allowed origin: {}", config.allowed_origin))?;

    Ok(create_router(AppState::new(coordinator, allowed_origin)))
}

/// Binds the configured address and serves until `shutdown` is cancelled.
pub async fn serve(config: &Config, shutdown: CancellationToken) -> Result<()> {
    let app = build_app(config)?;
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!(
        "search endpoint {}, fetch timeout {:?}, allowed origin {}",
        config.search_endpoint,
        config.fetch_timeout,
        config.allowed_origin
    );
    run(listener, app, shutdown).await
}

pub async fn run(listener: TcpListener, app: Router, shutdown: CancellationToken) -> Result<()> {
    let addr = listener.local_addr()?;
    log::info!("Server starting on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("Server error")?;

    log::info!("Server on {addr} stopped");
    Ok(())
}
