//! FxQuote Server Binary
//!
//! Serves currency conversion quotes over HTTP.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fxquote_fx::{HttpRateFetcher, QuoteService};
use fxquote_server::{create_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting FxQuote server");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let fetcher = Arc::new(HttpRateFetcher::new(config.fetcher_config())?);
    let quote_service = Arc::new(QuoteService::new(fetcher, config.quote_service_config()));

    // Expired rates are dropped lazily on lookup; sweep the rest periodically.
    let sweeper = quote_service.clone();
    let sweep_interval = config.cache_ttl;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            sweeper.purge_expired();
        }
    });

    let app = create_router().with_state(AppState::new(quote_service));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        listen_addr = %config.listen_addr,
        listen_port = %config.listen_port,
        rate_api_url = %config.rate_api_url,
        currencies = %config.supported_currencies.codes(),
        "Quote server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Quote server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
