//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the configured store
//! - Start background tasks (metrics exporter)
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener starts last (traffic only when ready)

use tokio::net::TcpListener;

use crate::config::ApiConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::store::{self, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to create store client: {0}")]
    Store(#[from] StoreError),

    #[error("{address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Serve the API until `shutdown` fires.
pub async fn run(config: ApiConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let store = store::from_config(&config.store)?;
    tracing::info!(
        backend = ?config.store.backend,
        consul_address = %config.store.consul_address,
        "Store initialized"
    );

    if config.observability.metrics_enabled {
        // validated at load time
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let server = HttpServer::new(config, store);
    let bind_address = server.config().listener.bind_address.clone();
    let tls = server.config().listener.tls.clone();

    match tls {
        None => {
            let listener = TcpListener::bind(&bind_address)
                .await
                .map_err(|source| StartupError::Bind {
                    address: bind_address.clone(),
                    source,
                })?;
            server.run(listener, shutdown.subscribe()).await?;
        }
        Some(tls) => {
            let addr = tokio::net::lookup_host(&bind_address)
                .await
                .map_err(|source| StartupError::Bind {
                    address: bind_address.clone(),
                    source,
                })?
                .next()
                .ok_or_else(|| StartupError::Bind {
                    address: bind_address.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "address did not resolve"),
                })?;
            server.run_tls(addr, &tls, shutdown.subscribe()).await?;
        }
    }
    Ok(())
}
