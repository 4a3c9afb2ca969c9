//! LLM Gateway - request-routing gateway for LLM backends
//!
//! For each incoming chat request the gateway classifies the prompt, orders
//! the candidate providers by the caller's priority (cost, speed, quality)
//! with a specialty boost, enforces per-request and per-user cost caps, and
//! invokes candidates in order with fallback. Provider health is tracked by
//! a per-provider circuit breaker and a sliding-window rate limit; every
//! attempt feeds the metrics served over the REST API.
//!
//! # Architecture
//!
//! ```text
//!                  +----------------+
//!                  |   hub/ (API)   |
//!                  +-------+--------+
//!                          |
//!       +------------------+------------------+
//!       |                  |                  |
//! +-----v-----+     +------v------+    +------v------+
//! |  config/  |     |   route/    |    |  metrics/   |
//! +-----------+     +------+------+    +-------------+
//!                          |
//!       +---------+--------+--------+----------+
//!       |         |                 |          |
//! +-----v----+ +--v-------+  +-----v----+ +---v------+
//! | classify/| | breaker/ |  | limiter/ | | provider/|
//! +----------+ +----+-----+  +----+-----+ +----------+
//!                   |             |
//!                +--v-------------v--+
//!                |      store/       |
//!                +-------------------+
//! ```

pub mod breaker;
pub mod classify;
pub mod common;
pub mod config;
pub mod cost;
pub mod hub;
pub mod limiter;
pub mod metrics;
pub mod provider;
pub mod route;
pub mod store;

pub use common::error::{Error, Result};
pub use config::Config;

use common::SystemClock;
use config::ProviderSpec;
use hub::AppState;
use provider::ClientRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use store::StateStore;
use tracing::{info, warn};

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gateway instance managing all components
pub struct Gateway {
    config: Config,
    router: Arc<route::Router>,
    api_addr: SocketAddr,
}

impl Gateway {
    /// Create a new Gateway from configuration
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing LLM Gateway v{}", VERSION);

        let api_addr: SocketAddr = config.listen.parse().map_err(|e| {
            Error::config(format!("Invalid listen address {}: {}", config.listen, e))
        })?;

        let specs: Vec<Arc<ProviderSpec>> =
            config.providers.iter().cloned().map(Arc::new).collect();

        let registry = ClientRegistry::from_specs(&specs)?;
        info!("Loaded {} providers", registry.len());

        let store = Arc::new(StateStore::new());
        let classifier = config.classifier.build();

        let router = Arc::new(route::Router::new(
            specs,
            registry,
            store,
            classifier,
            Arc::new(SystemClock),
        ));

        Ok(Gateway {
            config,
            router,
            api_addr,
        })
    }

    /// Start the REST API server and block until shutdown
    pub async fn run(&self) -> Result<()> {
        info!("Starting gateway...");

        let state = self.create_app_state();
        let addr = self.api_addr;
        let server = tokio::spawn(async move {
            if let Err(e) = hub::start_server(state, addr).await {
                warn!("REST API server error: {}", e);
            }
        });
        info!("REST API server started on {}", addr);

        // Wait for shutdown signal
        tokio::signal::ctrl_c().await?;
        info!("Received shutdown signal");

        server.abort();
        info!("Gateway stopped");
        Ok(())
    }

    /// Create AppState for the REST API
    fn create_app_state(&self) -> AppState {
        AppState::new(self.router.clone())
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the routing engine
    pub fn router(&self) -> &Arc<route::Router> {
        &self.router
    }
}
