//! API server builder and router

use std::sync::Arc;

use axum::Router;
use axum::response::Json;
use axum::routing::get;
use serde_json::json;

use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::mirror::Mirror;
use crate::service::RegistryService;
use crate::storage::TickerStorage;

/// Default storage namespace for ticker records.
pub const DEFAULT_NAMESPACE: &str = "tickers";

/// Shared state for the request handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) service: RegistryService,
    pub(crate) mirror: Option<Arc<dyn Mirror>>,
}

/// Registry builder for configuring and creating the ticker registry service
#[derive(Debug)]
pub struct RegistryBuilder {
    storage: Option<storage::Storage>,
    namespace: Option<String>,
    config: RegistryConfig,
    clock: Option<Arc<dyn Clock>>,
    mirror: Option<Arc<dyn Mirror>>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// Create a new registry builder
    pub fn new() -> Self {
        Self {
            storage: None,
            namespace: None,
            config: RegistryConfig::default(),
            clock: None,
            mirror: None,
        }
    }

    /// Set the storage backend
    pub fn storage(mut self, storage: storage::Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the storage namespace for ticker records
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the registry configuration
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the time source, defaulting to the wall clock
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Forward successful registrations to `mirror`
    pub fn mirror(mut self, mirror: impl Mirror + 'static) -> Self {
        self.mirror = Some(Arc::new(mirror));
        self
    }

    /// Build the registry service and its router
    pub fn build(self) -> RegistryResult<Registry> {
        let storage = self.storage.ok_or_else(|| {
            RegistryError::InvalidConfig("storage backend must be configured".into())
        })?;
        let namespace = self
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let tickers = TickerStorage::new(storage, namespace);
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let service = RegistryService::with_clock(tickers, self.config, clock)?;

        Ok(Registry {
            state: AppState {
                service,
                mirror: self.mirror,
            },
        })
    }
}

/// A configured registry: the service plus its HTTP surface.
#[derive(Debug, Clone)]
pub struct Registry {
    state: AppState,
}

impl Registry {
    /// The registry service, e.g. to hand to a [`Sweeper`](crate::Sweeper).
    pub fn service(&self) -> &RegistryService {
        &self.state.service
    }

    /// The router serving the registry API.
    ///
    /// Serve it with any tower-compatible server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .merge(crate::ticker::router())
            .with_state(self.state.clone())
    }
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({}))
}
