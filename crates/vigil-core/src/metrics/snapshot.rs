//! Point-in-time copy of the registry and its text rendering.

use std::fmt;
use std::iter;

use super::{MetricKind, BUCKETS_MICROS};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// `{k="v",...}` or the empty string when there is nothing to print.
fn label_block(names: &[String], values: &[String], le: Option<&str>) -> String {
    let mut pairs: Vec<String> = names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some(le) = le {
        pairs.push(format!("le=\"{}\"", le));
    }
    if pairs.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", pairs.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleValue {
    Counter(u64),
    Gauge(i64),
    /// Cumulative bucket counts aligned with `BUCKETS_MICROS`, sum in micros.
    Histogram {
        buckets: [u64; BUCKETS_MICROS.len()],
        count: u64,
        sum: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSnapshot {
    pub label_values: Vec<String>,
    pub value: SampleValue,
}

impl SeriesSnapshot {
    fn lines(&self, name: &str, label_names: &[String]) -> Vec<String> {
        let labels = label_block(label_names, &self.label_values, None);
        match &self.value {
            SampleValue::Counter(v) => vec![format!("{name}{labels} {v}")],
            SampleValue::Gauge(v) => vec![format!("{name}{labels} {v}")],
            SampleValue::Histogram {
                buckets,
                count,
                sum,
            } => {
                let mut out = Vec::with_capacity(buckets.len() + 3);
                for (le, n) in BUCKETS_MICROS.iter().zip(buckets) {
                    let le = le.to_string();
                    let bucket_labels = label_block(label_names, &self.label_values, Some(le.as_str()));
                    out.push(format!("{name}_bucket{bucket_labels} {n}"));
                }
                let inf = label_block(label_names, &self.label_values, Some("+Inf"));
                out.push(format!("{name}_bucket{inf} {count}"));
                out.push(format!("{name}_sum{labels} {sum}"));
                out.push(format!("{name}_count{labels} {count}"));
                out
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilySnapshot {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
    pub samples: Vec<SeriesSnapshot>,
}

impl FamilySnapshot {
    /// `# HELP`, `# TYPE`, then one block per series.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        let help = format!("# HELP {} {}", self.name, escape_help(&self.help));
        let ty = format!("# TYPE {} {}", self.name, self.kind.as_str());
        iter::once(help).chain(iter::once(ty)).chain(
            self.samples
                .iter()
                .flat_map(|s| s.lines(&self.name, &self.label_names)),
        )
    }

    /// Find a series by `(name, value)` label pairs, in any order.
    pub fn sample(&self, labels: &[(&str, &str)]) -> Option<&SampleValue> {
        if labels.len() != self.label_names.len() {
            return None;
        }
        self.samples
            .iter()
            .find(|s| {
                self.label_names
                    .iter()
                    .zip(&s.label_values)
                    .all(|(k, v)| {
                        labels
                            .iter()
                            .any(|(lk, lv)| *lk == k.as_str() && *lv == v.as_str())
                    })
            })
            .map(|s| &s.value)
    }
}

/// Owned copy of every family, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub families: Vec<FamilySnapshot>,
}

impl Snapshot {
    /// Lazily produce exposition lines (no trailing newlines).
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.families.iter().flat_map(|f| f.lines())
    }

    /// Full exposition body, newline-terminated.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn family(&self, name: &str) -> Option<&FamilySnapshot> {
        self.families.iter().find(|f| f.name == name)
    }

    /// Current value of a counter series, if it has been touched.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        match self.family(name)?.sample(labels)? {
            SampleValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Current value of a gauge series, if it has been touched.
    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<i64> {
        match self.family(name)?.sample(labels)? {
            SampleValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
