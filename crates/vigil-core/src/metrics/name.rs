//! Metric and label name validation.

use crate::error::{Result, VigilError};

use super::{Metric, MetricKind};

fn is_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    // `__` prefix is reserved for internal use.
    !s.starts_with("__") && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Reject definitions that would render an unparsable exposition.
pub(crate) fn validate(metric: &Metric) -> Result<()> {
    if !is_metric_name(metric.name()) {
        return Err(VigilError::InvalidName(format!(
            "metric name {:?}",
            metric.name()
        )));
    }

    for (i, label) in metric.labels().iter().enumerate() {
        if !is_label_name(label) {
            return Err(VigilError::InvalidName(format!(
                "label {:?} on {}",
                label,
                metric.name()
            )));
        }
        if metric.labels()[..i].contains(label) {
            return Err(VigilError::InvalidName(format!(
                "label {:?} declared twice on {}",
                label,
                metric.name()
            )));
        }
        if metric.kind() == MetricKind::Histogram && label == "le" {
            return Err(VigilError::InvalidName(format!(
                "label \"le\" is reserved on histogram {}",
                metric.name()
            )));
        }
    }
    Ok(())
}
