//! Company Happiness Index — Binary Entrypoint
//! Boots the Axum HTTP server, wiring config, shared services, and middleware.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use happiness_index::api;
use happiness_index::config::ServiceConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("happiness_index=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ServiceConfig::load_default()?;
    tracing::info!(
        provider = %config.scoring.provider,
        cache_enabled = config.cache.enabled,
        ttl_secs = config.cache.ttl_secs,
        "configuration loaded"
    );

    let metrics_handle = api::init_metrics(config.cache.ttl_secs);
    let app = happiness_index::build_app(&config)?.merge(api::metrics_router(metrics_handle));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
