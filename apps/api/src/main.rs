use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use listings::config::Config;
use listings::routes::build_router;
use listings::source::{CachedJobSource, FileJobSource, HttpJobSource, JobSource};
use listings::state::AppState;
use listings::visitors::VisitorStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Listings API v{}", env!("CARGO_PKG_VERSION"));

    let source = build_source(&config)?;

    let state = AppState {
        config: config.clone(),
        source,
        visitors: VisitorStore::with_capacity(config.max_visitors),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the job source: a local JSON file when `JOBS_FILE` is set, the
/// upstream listing API otherwise. Either is cached for
/// `JOBS_CACHE_TTL_SECS` when that is non-zero.
fn build_source(config: &Config) -> Result<Arc<dyn JobSource>> {
    let source: Arc<dyn JobSource> = if let Some(path) = &config.jobs_file {
        info!("Serving jobs from file {}", path.display());
        Arc::new(FileJobSource::new(path.clone()))
    } else {
        let page_limit = u32::try_from(config.upstream_page_limit).unwrap_or(u32::MAX);
        info!(
            "Serving jobs from upstream {} (page limit {})",
            config.jobs_api_url, page_limit
        );
        Arc::new(HttpJobSource::new(&config.jobs_api_url, page_limit)?)
    };

    if config.jobs_cache_ttl_secs == 0 {
        return Ok(source);
    }
    info!("Caching job collection for {}s", config.jobs_cache_ttl_secs);
    Ok(Arc::new(CachedJobSource::new(
        source,
        Duration::from_secs(config.jobs_cache_ttl_secs),
    )))
}
