use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, VigilError};

use super::family::Family;
use super::name;
use super::snapshot::Snapshot;
use super::Metric;

/// Process-wide metric store.
///
/// Construct once at startup and share by reference (usually behind an `Arc`
/// in application state). Names are unique: the first registration wins and
/// later attempts fail with [`VigilError::DuplicateMetric`].
#[derive(Default)]
pub struct Registry {
    families: DashMap<String, Arc<Family>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            families: DashMap::new(),
        }
    }

    /// Add a metric definition.
    pub fn register(&self, metric: Metric) -> Result<()> {
        self.register_family(metric).map(|_| ())
    }

    fn register_family(&self, metric: Metric) -> Result<Arc<Family>> {
        name::validate(&metric)?;

        match self.families.entry(metric.name().to_string()) {
            Entry::Occupied(_) => Err(VigilError::DuplicateMetric(metric.name().to_string())),
            Entry::Vacant(slot) => {
                tracing::debug!(
                    metric = %metric.name(),
                    kind = metric.kind().as_str(),
                    labels = ?metric.labels(),
                    "metric registered"
                );
                let family = Arc::new(Family::new(metric));
                slot.insert(Arc::clone(&family));
                Ok(family)
            }
        }
    }

    /// Register a counter and return a handle bound to it.
    pub fn register_counter(&self, name: &str, help: &str, labels: &[&str]) -> Result<CounterVec> {
        let family = self.register_family(Metric::counter(name, help).with_labels(labels))?;
        Ok(CounterVec { family })
    }

    /// Register a gauge and return a handle bound to it.
    pub fn register_gauge(&self, name: &str, help: &str, labels: &[&str]) -> Result<GaugeVec> {
        let family = self.register_family(Metric::gauge(name, help).with_labels(labels))?;
        Ok(GaugeVec { family })
    }

    /// Register a histogram (microsecond buckets) and return a handle bound to it.
    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<HistogramVec> {
        let family = self.register_family(Metric::histogram(name, help).with_labels(labels))?;
        Ok(HistogramVec { family })
    }

    fn family(&self, name: &str) -> Result<Arc<Family>> {
        self.families
            .get(name)
            .map(|f| Arc::clone(f.value()))
            .ok_or_else(|| VigilError::UnknownMetric(name.to_string()))
    }

    /// Add `delta` to a counter series, creating it at 0 if unseen.
    pub fn increment(&self, name: &str, labels: &[(&str, &str)], delta: u64) -> Result<()> {
        self.family(name)?.add_counter(labels, delta)
    }

    /// Increment a counter series by 1.
    pub fn inc(&self, name: &str, labels: &[(&str, &str)]) -> Result<()> {
        self.increment(name, labels, 1)
    }

    pub fn add_gauge(&self, name: &str, labels: &[(&str, &str)], delta: i64) -> Result<()> {
        self.family(name)?.add_gauge(labels, delta)
    }

    pub fn set_gauge(&self, name: &str, labels: &[(&str, &str)], value: i64) -> Result<()> {
        self.family(name)?.set_gauge(labels, value)
    }

    pub fn observe(&self, name: &str, labels: &[(&str, &str)], duration: Duration) -> Result<()> {
        self.family(name)?.observe(labels, duration)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.families.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Capture all families, sorted by name. Does not mutate any series.
    pub fn snapshot(&self) -> Snapshot {
        let mut families: Vec<Arc<Family>> =
            self.families.iter().map(|r| Arc::clone(r.value())).collect();
        families.sort_by(|a, b| a.name().cmp(b.name()));

        Snapshot {
            families: families.iter().map(|f| f.snapshot()).collect(),
        }
    }
}

/// Handle to a registered counter.
#[derive(Clone)]
pub struct CounterVec {
    family: Arc<Family>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, 1)
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) -> Result<()> {
        self.family.add_counter(labels, v)
    }
}

/// Handle to a registered gauge.
#[derive(Clone)]
pub struct GaugeVec {
    family: Arc<Family>,
}

impl GaugeVec {
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, 1)
    }

    pub fn dec(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, -1)
    }

    pub fn add(&self, labels: &[(&str, &str)], v: i64) -> Result<()> {
        self.family.add_gauge(labels, v)
    }

    pub fn set(&self, labels: &[(&str, &str)], v: i64) -> Result<()> {
        self.family.set_gauge(labels, v)
    }
}

/// Handle to a registered histogram.
#[derive(Clone)]
pub struct HistogramVec {
    family: Arc<Family>,
}

impl HistogramVec {
    /// Observe a duration (recorded in microseconds).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) -> Result<()> {
        self.family.observe(labels, duration)
    }
}
