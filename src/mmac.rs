//! MMAC: Method-Method through Attributes Cohesion
//!
//! The fraction of ordered method pairs agreeing on each attribute,
//! averaged over attributes:
//!
//! `MMAC = Σ_j c_j·(c_j − 1) / (a·m·(m−1))`
//!
//! 1 when every method touches every attribute, 0 when no attribute is
//! shared by any two methods.

use crate::metrics::MetricError;
use crate::usage::ClassView;

pub fn mmac(view: &ClassView) -> Result<Option<f64>, MetricError> {
    let m = view.method_count();
    let a = view.attribute_count();
    if m < 2 || a == 0 {
        return Ok(None);
    }
    let agreements: usize = view
        .attribute_usage_counts()
        .iter()
        .map(|&c| c * c.saturating_sub(1))
        .sum();
    let normalizer = (a * m * (m - 1)) as f64;
    Ok(Some(agreements as f64 / normalizer))
}
