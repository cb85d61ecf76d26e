//! NHD: Normalized Hamming Distance
//!
//! Treats each method as a bit-vector over the class's declared attributes
//! (bit set when the method touches the attribute) and averages the
//! agreement between all method pairs:
//!
//! `NHD = 1 − 2/(a·m·(m−1)) · Σ_j c_j·(m − c_j)`
//!
//! where `c_j` is the number of methods touching attribute `j`. 1 means all
//! methods have identical attribute vectors; 0 means maximal disagreement.

use crate::metrics::MetricError;
use crate::usage::ClassView;

pub fn nhd(view: &ClassView) -> Result<Option<f64>, MetricError> {
    let m = view.method_count();
    let a = view.attribute_count();
    if m < 2 || a == 0 {
        return Ok(None);
    }
    let disagreements: usize = view
        .attribute_usage_counts()
        .iter()
        .map(|&c| c * (m - c))
        .sum();
    let normalizer = (a * m * (m - 1)) as f64;
    Ok(Some(1.0 - 2.0 * disagreements as f64 / normalizer))
}
