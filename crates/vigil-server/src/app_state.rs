//! Shared application state for the vigil server.
//!
//! Built once at bootstrap and cloned into every handler. The metrics
//! registry lives here, so handlers reach it by reference and never own it.

use std::sync::Arc;

use vigil_core::error::Result;
use vigil_core::metrics::Registry;

use crate::config::ServerConfig;
use crate::obs::metrics::ServerMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    metrics: ServerMetrics,
}

impl AppState {
    /// Build application state with a fresh registry.
    /// Returns Result so main can report a duplicate metric instead of panicking.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build application state on a caller-provided registry.
    pub fn with_registry(cfg: ServerConfig, registry: Arc<Registry>) -> Result<Self> {
        let metrics = ServerMetrics::register(registry)?;
        tracing::debug!(families = metrics.registry().len(), "metrics registry ready");

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, metrics }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.inner.metrics
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.inner.metrics.registry()
    }
}
