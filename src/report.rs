//! Report aggregation
//!
//! Pure reduction of per-metric results into per-class, per-package and
//! application summaries. Nothing here recomputes or mutates a metric
//! value; the same inputs always produce an identical report.

use crate::metrics::{MetricName, MetricResult};
use crate::skeleton::package_of;
use serde::Serialize;
use std::collections::BTreeMap;

/// Weight of one metric in the combined class score, from the `params`
/// map (`"LCOM.weight" = 2.0`); unlisted metrics weigh 1.
fn weight_of(metric: MetricName, params: &BTreeMap<String, f64>) -> f64 {
    params
        .get(&format!("{}.weight", metric.as_str()))
        .copied()
        .unwrap_or(1.0)
}

/// Min/max/mean over the defined values of one metric in one scope.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Aggregate {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Aggregate {
    /// Folds defined values; `None` when no class had a defined value.
    pub fn over<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for v in values {
            count += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            count,
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

/// One class's report row.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    pub class: String,
    /// Raw value per requested metric; `None` is the not-applicable sentinel.
    pub values: BTreeMap<String, Option<f64>>,
    /// Mean normalized cohesion over the defined metrics, in [0,1].
    pub score: Option<f64>,
    /// True when the score falls below the configured threshold.
    pub flagged: bool,
}

/// Per-metric aggregates plus the mean class score for one scope
/// (a package or the whole application).
#[derive(Debug, Clone, Serialize)]
pub struct ScopeSummary {
    pub metrics: BTreeMap<String, Option<Aggregate>>,
    pub score: Option<f64>,
    pub classes: usize,
    pub flagged: usize,
}

/// The aggregated report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub classes: BTreeMap<String, ClassSummary>,
    pub packages: BTreeMap<String, ScopeSummary>,
    pub application: ScopeSummary,
}

/// Combines per-metric results into the report. `threshold` is the mean
/// normalized score below which a class is flagged for refactoring;
/// `params` may carry per-metric `<NAME>.weight` entries for the mean.
pub fn aggregate(
    results: &[MetricResult],
    threshold: f64,
    params: &BTreeMap<String, f64>,
) -> Report {
    let mut classes: BTreeMap<String, ClassSummary> = BTreeMap::new();
    for result in results {
        for (class, value) in &result.classes {
            let row = classes
                .entry(class.clone())
                .or_insert_with(|| ClassSummary {
                    class: class.clone(),
                    values: BTreeMap::new(),
                    score: None,
                    flagged: false,
                });
            row.values
                .insert(result.metric.as_str().to_string(), *value);
        }
    }

    for row in classes.values_mut() {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for result in results {
            let Some(value) = row.values.get(result.metric.as_str()).copied().flatten() else {
                continue;
            };
            let weight = weight_of(result.metric, params);
            weighted += weight * result.metric.cohesion_score(value);
            total_weight += weight;
        }
        if total_weight > 0.0 {
            let score = weighted / total_weight;
            row.score = Some(score);
            row.flagged = score < threshold;
        }
    }

    let mut by_package: BTreeMap<String, Vec<&ClassSummary>> = BTreeMap::new();
    for row in classes.values() {
        by_package
            .entry(package_of(&row.class).to_string())
            .or_default()
            .push(row);
    }

    let metrics: Vec<MetricName> = results.iter().map(|r| r.metric).collect();
    let packages = by_package
        .into_iter()
        .map(|(package, rows)| (package, summarize(&metrics, &rows)))
        .collect();
    let all: Vec<&ClassSummary> = classes.values().collect();
    let application = summarize(&metrics, &all);

    Report {
        classes,
        packages,
        application,
    }
}

fn summarize(metrics: &[MetricName], rows: &[&ClassSummary]) -> ScopeSummary {
    let aggregates = metrics
        .iter()
        .map(|metric| {
            let values = rows
                .iter()
                .filter_map(|row| row.values.get(metric.as_str()).copied().flatten());
            (metric.as_str().to_string(), Aggregate::over(values))
        })
        .collect();
    let scores: Vec<f64> = rows.iter().filter_map(|row| row.score).collect();
    ScopeSummary {
        metrics: aggregates,
        score: if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        },
        classes: rows.len(),
        flagged: rows.iter().filter(|row| row.flagged).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(metric: MetricName, values: &[(&str, Option<f64>)]) -> MetricResult {
        MetricResult {
            metric,
            classes: values
                .iter()
                .map(|(class, value)| (class.to_string(), *value))
                .collect(),
        }
    }

    #[test]
    fn aggregates_min_max_mean_per_scope() {
        let results = [result(
            MetricName::Tcc,
            &[
                ("a.One", Some(1.0)),
                ("a.Two", Some(0.5)),
                ("b.Three", Some(0.0)),
            ],
        )];
        let report = aggregate(&results, 0.4, &BTreeMap::new());
        let app = report.application.metrics["TCC"].unwrap();
        assert_eq!(app.count, 3);
        assert_eq!(app.min, 0.0);
        assert_eq!(app.max, 1.0);
        assert_eq!(app.mean, 0.5);

        let a = report.packages["a"].metrics["TCC"].unwrap();
        assert_eq!((a.count, a.min, a.max), (2, 0.5, 1.0));
        assert_eq!(report.packages["b"].flagged, 1);
    }

    #[test]
    fn sentinels_are_kept_but_not_averaged() {
        let results = [result(MetricName::Lcc, &[("a.X", None), ("a.Y", Some(1.0))])];
        let report = aggregate(&results, 0.5, &BTreeMap::new());
        assert_eq!(report.classes["a.X"].values["LCC"], None);
        assert_eq!(report.classes["a.X"].score, None);
        assert!(!report.classes["a.X"].flagged);
        let agg = report.application.metrics["LCC"].unwrap();
        assert_eq!(agg.count, 1);
    }

    #[test]
    fn class_score_mixes_polarities() {
        // LCOM 0 (perfect, score 1) and TCC 1 (perfect, score 1).
        let results = [
            result(MetricName::Lcom, &[("p.C", Some(0.0))]),
            result(MetricName::Tcc, &[("p.C", Some(1.0))]),
        ];
        let report = aggregate(&results, 0.5, &BTreeMap::new());
        assert_eq!(report.classes["p.C"].score, Some(1.0));
        assert!(!report.classes["p.C"].flagged);

        // LCOM 3 scores 0.25, CCM 4 scores 0.25: flagged.
        let bad = [
            result(MetricName::Lcom, &[("p.D", Some(3.0))]),
            result(MetricName::Ccm, &[("p.D", Some(4.0))]),
        ];
        let report = aggregate(&bad, 0.5, &BTreeMap::new());
        assert_eq!(report.classes["p.D"].score, Some(0.25));
        assert!(report.classes["p.D"].flagged);
    }

    #[test]
    fn params_weight_the_class_score() {
        // LCOM 3 scores 0.25, TCC 1.0 scores 1.0; unweighted mean 0.625.
        let results = [
            result(MetricName::Lcom, &[("p.W", Some(3.0))]),
            result(MetricName::Tcc, &[("p.W", Some(1.0))]),
        ];
        let unweighted = aggregate(&results, 0.5, &BTreeMap::new());
        assert_eq!(unweighted.classes["p.W"].score, Some(0.625));

        let params = BTreeMap::from([("LCOM.weight".to_string(), 3.0)]);
        let weighted = aggregate(&results, 0.5, &params);
        // (3·0.25 + 1·1.0) / 4
        assert_eq!(weighted.classes["p.W"].score, Some(0.4375));
        assert!(weighted.classes["p.W"].flagged);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let results = [
            result(MetricName::Lcom, &[("p.A", Some(1.0)), ("q.B", Some(2.0))]),
            result(MetricName::Nhd, &[("p.A", Some(0.25)), ("q.B", None)]),
        ];
        let first = serde_json::to_string(&aggregate(&results, 0.5, &BTreeMap::new())).unwrap();
        let second = serde_json::to_string(&aggregate(&results, 0.5, &BTreeMap::new())).unwrap();
        assert_eq!(first, second);
    }
}
