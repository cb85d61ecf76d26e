//! Metric registry and dispatch
//!
//! The recognized metric names form a closed set, validated against
//! configuration before any decoding starts. Every calculator is a pure
//! function over a [`ClassView`]; `Ok(None)` is the documented
//! not-applicable sentinel for degenerate classes (fewer than two scored
//! methods, or no declared attributes where the formula needs them), so no
//! metric ever returns NaN or divides by zero.

use crate::disjoint::UnknownElement;
use crate::skeleton::Skeleton;
use crate::usage::{ClassView, Filters};
use crate::{ccm, connectivity, lcom, mmac, nhd};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of recognized cohesion metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricName {
    Lcom,
    Lcom2,
    Lcom5,
    Nhd,
    Ccm,
    Mmac,
    Pcc,
    Tcc,
    Lcc,
}

impl MetricName {
    pub const ALL: [Self; 9] = [
        Self::Lcom,
        Self::Lcom2,
        Self::Lcom5,
        Self::Nhd,
        Self::Ccm,
        Self::Mmac,
        Self::Pcc,
        Self::Tcc,
        Self::Lcc,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lcom => "LCOM",
            Self::Lcom2 => "LCOM2",
            Self::Lcom5 => "LCOM5",
            Self::Nhd => "NHD",
            Self::Ccm => "CCM",
            Self::Mmac => "MMAC",
            Self::Pcc => "PCC",
            Self::Tcc => "TCC",
            Self::Lcc => "LCC",
        }
    }

    /// Maps a raw value onto a [0,1] cohesion score (1 = fully cohesive),
    /// used by the report aggregator to average across metrics.
    pub fn cohesion_score(self, value: f64) -> f64 {
        match self {
            // Unbounded pair deficit; 0 is perfect.
            Self::Lcom => 1.0 / (1.0 + value),
            // Lack metrics already in [0,1]; invert.
            Self::Lcom2 | Self::Lcom5 => (1.0 - value).clamp(0.0, 1.0),
            // Component count; 1 is perfect.
            Self::Ccm => 1.0 / value.max(1.0),
            // Cohesion metrics already in [0,1].
            Self::Nhd | Self::Mmac | Self::Pcc | Self::Tcc | Self::Lcc => {
                value.clamp(0.0, 1.0)
            }
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a metric name outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetric(pub String);

impl fmt::Display for UnknownMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized metric name '{}' (expected one of LCOM, LCOM2, LCOM5, NHD, CCM, MMAC, PCC, TCC, LCC)",
            self.0
        )
    }
}

impl std::error::Error for UnknownMetric {}

impl FromStr for MetricName {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Contract violation inside the calculus engine; fatal for the one
/// metric/class pair it occurred in, reported rather than propagated.
#[derive(Debug)]
pub struct MetricError {
    pub message: String,
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for MetricError {}

impl From<UnknownElement> for MetricError {
    fn from(err: UnknownElement) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Computes one metric for one class view.
pub fn compute(metric: MetricName, view: &ClassView) -> Result<Option<f64>, MetricError> {
    // Interfaces carry no state; cohesion is undefined for them.
    if view.is_interface {
        return Ok(None);
    }
    match metric {
        MetricName::Lcom => lcom::lcom(view),
        MetricName::Lcom2 => lcom::lcom2(view),
        MetricName::Lcom5 => lcom::lcom5(view),
        MetricName::Nhd => nhd::nhd(view),
        MetricName::Ccm => ccm::ccm(view),
        MetricName::Mmac => mmac::mmac(view),
        MetricName::Pcc => connectivity::pcc(view),
        MetricName::Tcc => connectivity::tcc(view),
        MetricName::Lcc => connectivity::lcc(view),
    }
}

/// Per-class scores for one metric. `None` is the not-applicable sentinel.
#[derive(Debug, Clone, Serialize)]
pub struct MetricResult {
    pub metric: MetricName,
    pub classes: BTreeMap<String, Option<f64>>,
}

/// One failed metric/class computation.
#[derive(Debug, Clone, Serialize)]
pub struct MetricFailure {
    pub metric: MetricName,
    pub class: String,
    pub message: String,
}

/// Runs one metric over every class of the skeleton. Failures are collected
/// per class; the remaining classes still score.
pub fn compute_over(
    metric: MetricName,
    skeleton: &Skeleton,
    filters: &Filters,
) -> (MetricResult, Vec<MetricFailure>) {
    let mut classes = BTreeMap::new();
    let mut failures = Vec::new();
    for class in skeleton.classes() {
        let view = ClassView::new(class, filters);
        match compute(metric, &view) {
            Ok(value) => {
                classes.insert(class.name.clone(), value);
            }
            Err(err) => failures.push(MetricFailure {
                metric,
                class: class.name.clone(),
                message: err.message,
            }),
        }
    }
    (MetricResult { metric, classes }, failures)
}
