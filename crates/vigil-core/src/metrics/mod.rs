//! In-process metrics registry with Prometheus text exposition.
//!
//! Families are stored in a `DashMap` keyed by name; each family keeps its
//! series in a second `DashMap` keyed by label values (in declaration order)
//! with atomic cells, so concurrent updates never lose increments.
//! Histogram buckets are fixed in microseconds to avoid floating point math.

mod family;
mod name;
mod registry;
mod snapshot;

pub use registry::{CounterVec, GaugeVec, HistogramVec, Registry};
pub use snapshot::{FamilySnapshot, SampleValue, SeriesSnapshot, Snapshot};

/// Content type of the text exposition format rendered by [`Snapshot::render`].
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s
pub const BUCKETS_MICROS: [u64; 9] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000,
];

/// Metric kind, as written on the `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Metric definition: name, help text, kind and declared label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    name: String,
    help: String,
    kind: MetricKind,
    labels: Vec<String>,
}

impl Metric {
    pub fn new(name: impl Into<String>, help: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind,
            labels: Vec::new(),
        }
    }

    pub fn counter(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(name, help, MetricKind::Counter)
    }

    pub fn gauge(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(name, help, MetricKind::Gauge)
    }

    pub fn histogram(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(name, help, MetricKind::Histogram)
    }

    /// Declare the label dimensions. Order here is the order used on output.
    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
