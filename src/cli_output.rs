//! CLI output formatting functions

use crate::analyze::Analysis;
use crate::metrics::MetricName;
use crate::report::ScopeSummary;
use std::path::Path;

pub fn print_no_files_message(root: &Path) {
    println!("No class files in {}", root.display());
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

/// Per-class table: one row per class, one column per requested metric,
/// then the normalized score and the refactor flag.
pub fn print_class_table(analysis: &Analysis, metrics: &[MetricName]) {
    print!("{:<48}", "class");
    for metric in metrics {
        print!(" {:>8}", metric.as_str());
    }
    println!(" {:>8}", "score");
    for row in analysis.report.classes.values() {
        print!("{:<48}", row.class);
        for metric in metrics {
            let value = row.values.get(metric.as_str()).copied().flatten();
            print!(" {:>8}", fmt_value(value));
        }
        print!(" {:>8}", fmt_value(row.score));
        if row.flagged {
            print!("  REFACTOR");
        }
        println!();
    }
}

fn print_scope(name: &str, summary: &ScopeSummary, metrics: &[MetricName]) {
    print!("{name:<48}");
    for metric in metrics {
        let mean = summary
            .metrics
            .get(metric.as_str())
            .copied()
            .flatten()
            .map(|agg| agg.mean);
        print!(" {:>8}", fmt_value(mean));
    }
    println!(" {:>8}", fmt_value(summary.score));
}

/// Package and application rows (mean per metric).
pub fn print_summaries(analysis: &Analysis, metrics: &[MetricName]) {
    println!("\nPer-package mean:");
    for (package, summary) in &analysis.report.packages {
        let label = if package.is_empty() {
            "(default)"
        } else {
            package
        };
        print_scope(label, summary, metrics);
    }
    println!("\nApplication mean:");
    print_scope("(all)", &analysis.report.application, metrics);
    let app = &analysis.report.application;
    println!(
        "\n{} classes analyzed, {} flagged for refactoring.",
        app.classes, app.flagged
    );
}

/// Decode/resource/calculus failures, one line each.
pub fn print_failures(analysis: &Analysis) {
    for failure in &analysis.input_failures {
        eprintln!("Error reading {}: {}", failure.id, failure.message);
    }
    for failure in &analysis.metric_failures {
        eprintln!(
            "Error computing {} for {}: {}",
            failure.metric, failure.class, failure.message
        );
    }
}

/// The whole analysis as one JSON document.
pub fn print_json(analysis: &Analysis) {
    let doc = serde_json::json!({
        "report": analysis.report,
        "input_failures": analysis.input_failures,
        "metric_failures": analysis.metric_failures,
    });
    println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
}
