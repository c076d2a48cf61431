//! Metric families owned by the server.
//!
//! All families are registered once in [`ServerMetrics::register`]; handlers
//! update them through the returned handles, so an update can never name an
//! unregistered metric.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use vigil_core::error::{Result, VigilError};
use vigil_core::metrics::{CounterVec, GaugeVec, Registry, Snapshot};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const PROCESS_START_TIME: &str = "process_start_time_seconds";
pub const PROCESS_UPTIME: &str = "process_uptime_seconds";

const FAMILIES: [&str; 3] = [HTTP_REQUESTS_TOTAL, PROCESS_START_TIME, PROCESS_UPTIME];

pub struct ServerMetrics {
    registry: Arc<Registry>,
    pub http_requests: CounterVec,
    uptime: GaugeVec,
    started: Instant,
}

impl ServerMetrics {
    /// Register every server family on `registry`. Fails on a duplicate name
    /// before touching the registry, so a failed call leaves it unchanged.
    pub fn register(registry: Arc<Registry>) -> Result<Self> {
        if let Some(taken) = FAMILIES.iter().find(|name| registry.contains(name)) {
            return Err(VigilError::DuplicateMetric(taken.to_string()));
        }

        let http_requests = registry.register_counter(
            HTTP_REQUESTS_TOTAL,
            "Total number of HTTP requests",
            &["method", "route", "status"],
        )?;
        let start_time = registry.register_gauge(
            PROCESS_START_TIME,
            "Start time of the process since unix epoch in seconds",
            &[],
        )?;
        let uptime = registry.register_gauge(
            PROCESS_UPTIME,
            "Seconds since the process started",
            &[],
        )?;

        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        start_time.set(&[], i64::try_from(epoch_secs).unwrap_or(i64::MAX))?;
        uptime.set(&[], 0)?;

        Ok(Self {
            registry,
            http_requests,
            uptime,
            started: Instant::now(),
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Refresh scrape-time gauges, then capture the registry.
    pub fn snapshot(&self) -> Snapshot {
        let secs = i64::try_from(self.started.elapsed().as_secs()).unwrap_or(i64::MAX);
        if let Err(e) = self.uptime.set(&[], secs) {
            tracing::error!(error = %e, "uptime gauge update failed");
        }
        self.registry.snapshot()
    }
}
