use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{Result, VigilError};

use super::snapshot::{FamilySnapshot, SampleValue, SeriesSnapshot};
use super::{Metric, MetricKind, BUCKETS_MICROS};

pub(crate) struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; BUCKETS_MICROS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

impl AtomicHistogram {
    // Writers bump `count`, then buckets from widest to narrowest with Release;
    // readers Acquire buckets narrowest first and read `count` last. A scrape
    // therefore never sees a bucket above a wider one or above `count`.
    fn observe(&self, micros: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(micros, Ordering::Relaxed);

        // Cumulative: every bucket at or above the value.
        for (i, &le) in BUCKETS_MICROS.iter().enumerate().rev() {
            if micros <= le {
                self.buckets[i].fetch_add(1, Ordering::Release);
            }
        }
    }

    fn load(&self) -> SampleValue {
        let buckets: [u64; BUCKETS_MICROS.len()] =
            std::array::from_fn(|i| self.buckets[i].load(Ordering::Acquire));
        SampleValue::Histogram {
            buckets,
            count: self.count.load(Ordering::Relaxed),
            sum: self.sum.load(Ordering::Relaxed),
        }
    }
}

enum Series {
    Counter(DashMap<Vec<String>, AtomicU64>),
    Gauge(DashMap<Vec<String>, AtomicI64>),
    Histogram(DashMap<Vec<String>, AtomicHistogram>),
}

/// One registered metric and all of its series.
pub(crate) struct Family {
    desc: Metric,
    series: Series,
}

impl Family {
    pub(crate) fn new(desc: Metric) -> Self {
        let series = match desc.kind() {
            MetricKind::Counter => Series::Counter(DashMap::new()),
            MetricKind::Gauge => Series::Gauge(DashMap::new()),
            MetricKind::Histogram => Series::Histogram(DashMap::new()),
        };
        Self { desc, series }
    }

    pub(crate) fn name(&self) -> &str {
        self.desc.name()
    }

    /// Normalise `(name, value)` pairs into declaration order.
    fn key(&self, labels: &[(&str, &str)]) -> Result<Vec<String>> {
        let declared = self.desc.labels();
        let mismatch = || VigilError::LabelMismatch {
            name: self.desc.name().to_string(),
            expected: declared.to_vec(),
            got: labels.iter().map(|(k, _)| k.to_string()).collect(),
        };

        if labels.len() != declared.len() {
            return Err(mismatch());
        }
        declared
            .iter()
            .map(|name| {
                labels
                    .iter()
                    .find(|(k, _)| *k == name.as_str())
                    .map(|(_, v)| v.to_string())
                    .ok_or_else(mismatch)
            })
            .collect()
    }

    fn kind_mismatch(&self, expected: MetricKind) -> VigilError {
        VigilError::KindMismatch {
            name: self.desc.name().to_string(),
            expected: expected.as_str(),
            actual: self.desc.kind().as_str(),
        }
    }

    pub(crate) fn add_counter(&self, labels: &[(&str, &str)], v: u64) -> Result<()> {
        let Series::Counter(map) = &self.series else {
            return Err(self.kind_mismatch(MetricKind::Counter));
        };
        let key = self.key(labels)?;
        let cell = map.entry(key).or_insert_with(|| AtomicU64::new(0));
        cell.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn add_gauge(&self, labels: &[(&str, &str)], v: i64) -> Result<()> {
        let Series::Gauge(map) = &self.series else {
            return Err(self.kind_mismatch(MetricKind::Gauge));
        };
        let key = self.key(labels)?;
        let cell = map.entry(key).or_insert_with(|| AtomicI64::new(0));
        cell.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn set_gauge(&self, labels: &[(&str, &str)], v: i64) -> Result<()> {
        let Series::Gauge(map) = &self.series else {
            return Err(self.kind_mismatch(MetricKind::Gauge));
        };
        let key = self.key(labels)?;
        let cell = map.entry(key).or_insert_with(|| AtomicI64::new(0));
        cell.store(v, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn observe(&self, labels: &[(&str, &str)], duration: Duration) -> Result<()> {
        let Series::Histogram(map) = &self.series else {
            return Err(self.kind_mismatch(MetricKind::Histogram));
        };
        let key = self.key(labels)?;
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        map.entry(key).or_default().observe(micros);
        Ok(())
    }

    /// Copy out current values, series sorted by label values.
    pub(crate) fn snapshot(&self) -> FamilySnapshot {
        let mut samples: Vec<SeriesSnapshot> = match &self.series {
            Series::Counter(map) => map
                .iter()
                .map(|r| SeriesSnapshot {
                    label_values: r.key().clone(),
                    value: SampleValue::Counter(r.value().load(Ordering::Relaxed)),
                })
                .collect(),
            Series::Gauge(map) => map
                .iter()
                .map(|r| SeriesSnapshot {
                    label_values: r.key().clone(),
                    value: SampleValue::Gauge(r.value().load(Ordering::Relaxed)),
                })
                .collect(),
            Series::Histogram(map) => map
                .iter()
                .map(|r| SeriesSnapshot {
                    label_values: r.key().clone(),
                    value: r.value().load(),
                })
                .collect(),
        };
        samples.sort_by(|a, b| a.label_values.cmp(&b.label_values));

        FamilySnapshot {
            name: self.desc.name().to_string(),
            help: self.desc.help().to_string(),
            kind: self.desc.kind(),
            label_names: self.desc.labels().to_vec(),
            samples,
        }
    }
}
