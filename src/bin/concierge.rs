//! Runs the Concierge registry gateway.
//!
//! Configuration comes from `CONCIERGE_*` environment variables, optionally
//! loaded from a `.env` file. The registry schema is applied on startup and
//! the server stops gracefully on Ctrl-C.

use std::sync::Arc;

use concierge::config::{ConfigError, GatewayConfig};
use concierge::http::{AppState, router};
use concierge::invocation::adapters::http::ReqwestAgentClient;
use concierge::registry::adapters::postgres::PostgresMetadataStore;
use concierge::registry::ports::MetadataStoreError;
use concierge::telemetry;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use mockable::DefaultClock;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::util::TryInitError;

/// Reasons the gateway failed to start or stopped abnormally.
#[derive(Debug, Error)]
enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to install log subscriber: {0}")]
    Telemetry(#[from] TryInitError),
    #[error("failed to build database pool: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to apply registry schema: {0}")]
    Migration(#[from] MetadataStoreError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), BootstrapError> {
    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env()?;
    telemetry::init(config.log_format)?;

    info!(
        bind_addr = %config.bind_addr,
        public_base_url = config.public_base_url.as_deref().unwrap_or("<unset>"),
        invoke_timeout_ms = u64::try_from(config.invoke_timeout.as_millis()).unwrap_or(u64::MAX),
        "configuration loaded"
    );

    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    let pool = Pool::builder()
        .max_size(config.db_pool_size)
        .build(manager)?;
    let store = Arc::new(PostgresMetadataStore::new(pool));
    store.migrate().await?;
    info!("registry schema ready");

    let client = Arc::new(ReqwestAgentClient::new()?);
    let state = AppState::from_config(store, client, Arc::new(DefaultClock), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "concierge listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => warn!(error = %err, "failed to listen for Ctrl-C"),
    }
}
