use anyhow::{Context, Result};
use clap::Parser;
use seolens_core::{PageSource, ResultCache, SafeFetcher, SeoAnalyzer};
use seolens_server::config::{LogFormat, ServerConfig};
use seolens_server::{AppState, cors_layer, router};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_tracing(config.log_format);

    let fetcher = SafeFetcher::new(config.fetch_config()).context("Failed to build HTTP client")?;
    let source: Arc<dyn PageSource> = Arc::new(fetcher);
    let cache = Arc::new(ResultCache::new(config.cache_config()));
    let state = AppState::new(SeoAnalyzer::new(source, cache));

    let cors = cors_layer(&config.allowed_origin).context("Invalid --allowed-origin")?;
    let app = router(state, cors);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(address = %config.bind, origin = %config.allowed_origin, "seolens-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
