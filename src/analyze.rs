//! Batch analysis orchestration
//!
//! Decode every class blob (in parallel, each independent), publish the
//! immutable skeleton, run the requested metrics over it (in parallel, each
//! reading only), then reduce to the report. Per-class and per-metric
//! failures are collected in the result set; they never abort the batch.

use crate::classfile::decode_class;
use crate::config::Config;
use crate::metrics::{self, MetricFailure, MetricResult};
use crate::report::{self, Report};
use crate::skeleton::{Skeleton, SkeletonBuilder};
use rayon::prelude::*;
use serde::Serialize;

/// One class input: an identifier (usually the file path) plus raw bytes.
#[derive(Debug, Clone)]
pub struct ClassBlob {
    pub id: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFailureKind {
    /// The blob was readable but is not a valid class file.
    Decode,
    /// The input could not be read at the I/O boundary.
    Resource,
}

/// A recorded per-input failure.
#[derive(Debug, Clone, Serialize)]
pub struct InputFailure {
    pub id: String,
    pub kind: InputFailureKind,
    pub message: String,
}

/// Everything one run produces.
#[derive(Debug)]
pub struct Analysis {
    pub skeleton: Skeleton,
    pub results: Vec<MetricResult>,
    pub report: Report,
    pub input_failures: Vec<InputFailure>,
    pub metric_failures: Vec<MetricFailure>,
}

/// Runs the full pipeline over a set of class blobs. Configuration is
/// already validated by construction; a corrupt blob costs only its own
/// class.
pub fn analyze(blobs: &[ClassBlob], config: &Config) -> Analysis {
    let decoded: Vec<Result<Skeleton, InputFailure>> = blobs
        .par_iter()
        .map(|blob| {
            let mut builder = SkeletonBuilder::new();
            decode_class(&blob.bytes, &mut builder)
                .map(|()| builder.build())
                .map_err(|err| InputFailure {
                    id: blob.id.clone(),
                    kind: InputFailureKind::Decode,
                    message: err.to_string(),
                })
        })
        .collect();

    let mut input_failures = Vec::new();
    let mut merged = SkeletonBuilder::new().build();
    for result in decoded {
        match result {
            Ok(skeleton) => merge(&mut merged, skeleton),
            Err(failure) => input_failures.push(failure),
        }
    }
    let skeleton = merged;

    // The skeleton is now published; every calculator below only reads it.
    let per_metric: Vec<(MetricResult, Vec<MetricFailure>)> = config
        .metrics
        .par_iter()
        .map(|&metric| metrics::compute_over(metric, &skeleton, &config.filters))
        .collect();

    let mut results = Vec::with_capacity(per_metric.len());
    let mut metric_failures = Vec::new();
    for (result, failures) in per_metric {
        results.push(result);
        metric_failures.extend(failures);
    }

    let report = report::aggregate(&results, config.score_threshold, &config.params);
    Analysis {
        skeleton,
        results,
        report,
        input_failures,
        metric_failures,
    }
}

/// Folds `extra`'s packages into `target`.
fn merge(target: &mut Skeleton, extra: Skeleton) {
    for (name, package) in extra.packages {
        let entry = target
            .packages
            .entry(name)
            .or_insert_with(|| crate::skeleton::Package {
                name: package.name.clone(),
                classes: std::collections::BTreeMap::new(),
            });
        entry.classes.extend(package.classes);
    }
}
