//! knit - Cohesion metrics for compiled JVM classes

// Pipeline modules
pub mod analyze;
pub mod classfile;
pub mod descriptor;
pub mod discovery;
pub mod skeleton;
pub mod usage;

// Metric calculus
pub mod ccm;
pub mod connectivity;
pub mod disjoint;
pub mod lcom;
pub mod metrics;
pub mod mmac;
pub mod nhd;

// Shared modules
pub mod cli_output;
pub mod config;
pub mod report;
pub mod test_utils;

// Re-export main types and functions for easy access
pub use analyze::{Analysis, ClassBlob, InputFailure, InputFailureKind, analyze};
pub use classfile::{ClassSink, DecodeError, OpKind, decode_class};
pub use cli_output::{
    print_class_table, print_failures, print_json, print_no_files_message, print_summaries,
};
pub use config::{Config, ConfigError};
pub use discovery::{find_class_files, load_class_files};
pub use disjoint::{ConnectedComponents, UnionFind, UnknownElement};
pub use metrics::{MetricFailure, MetricName, MetricResult, UnknownMetric, compute, compute_over};
pub use report::{Aggregate, ClassSummary, Report, ScopeSummary, aggregate};
pub use skeleton::{
    Attribute, Class, Method, Operation, Package, Skeleton, SkeletonBuilder, Visibility,
};
pub use usage::{ClassView, Filters, MethodUsage};
