//! HTTP server initialization and runtime setup.
//!
//! Selects the storage backend, wires services into [`AppState`], and runs
//! the Axum server until Ctrl+C.

use crate::application::services::{AuthService, ClickService, LinkService, StatsService};
use crate::config::{Config, StorageBackend};
use crate::domain::crawler::{CrawlerDetector, ParsingCrawlerDetector, SignatureCrawlerDetector};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::persistence::{
    MemoryClickRepository, MemoryLinkRepository, PgClickRepository, PgLinkRepository,
};
use crate::infrastructure::preview::{HttpPreviewFetcher, NullPreviewFetcher, PreviewFetcher};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL with migrations, or in-memory)
/// - In-memory click fallback store
/// - Preview fetcher
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wires repositories and services for the configured backend.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or migrated, or if the
/// preview HTTP client cannot be built.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let (links, primary_clicks): (Arc<dyn LinkRepository>, Arc<dyn ClickRepository>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let pool = Arc::new(connect_pool(config).await?);
                tracing::info!("Connected to database");

                sqlx::migrate!("./migrations")
                    .run(pool.as_ref())
                    .await
                    .context("Failed to run database migrations")?;

                (
                    Arc::new(PgLinkRepository::new(pool.clone())),
                    Arc::new(PgClickRepository::new(pool)),
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                (
                    Arc::new(MemoryLinkRepository::new()),
                    Arc::new(MemoryClickRepository::new()),
                )
            }
        };

    // One fallback per process, shared by every request.
    let fallback_clicks: Arc<dyn ClickRepository> = Arc::new(MemoryClickRepository::new());

    let preview: Arc<dyn PreviewFetcher> = if config.preview_fetch_enabled {
        Arc::new(
            HttpPreviewFetcher::new(Duration::from_secs(config.preview_fetch_timeout_secs))
                .context("Failed to build preview HTTP client")?,
        )
    } else {
        tracing::info!("Preview fetching disabled");
        Arc::new(NullPreviewFetcher::new())
    };

    let auth_service = match config.token_signing_secret.as_deref() {
        Some(secret) if config.is_auth_enabled() => {
            AuthService::new(&config.dashboard_token_hashes, secret.to_string())
        }
        _ => {
            tracing::warn!("Dashboard authentication disabled: no token hashes configured");
            AuthService::disabled()
        }
    };

    let click_service = Arc::new(ClickService::new(primary_clicks, fallback_clicks));
    let link_service = Arc::new(LinkService::new(
        links.clone(),
        click_service.clone(),
        preview,
    ));
    let stats_service = Arc::new(StatsService::new(links, click_service.clone()));

    Ok(AppState {
        link_service,
        click_service,
        stats_service,
        auth_service: Arc::new(auth_service),
        crawler_detector: crawler_detector(config),
        client_info: Arc::new(config.client_info()),
        public_base_url: Arc::from(config.public_base_url.as_str()),
    })
}

fn crawler_detector(config: &Config) -> Arc<dyn CrawlerDetector> {
    let signatures = SignatureCrawlerDetector::with_extra(config.crawler_extra_signatures.iter());
    if config.crawler_ua_parser {
        Arc::new(ParsingCrawlerDetector::new(signatures))
    } else {
        Arc::new(signatures)
    }
}

/// Opens a PostgreSQL pool with the configured limits.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;

    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

/// Resolves once `signal` fires. A signal that cannot be installed never
/// resolves, so the server keeps running.
async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}
