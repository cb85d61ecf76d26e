//! TCC, LCC and PCC: connectivity-fraction cohesion
//!
//! All three score the fraction of method pairs that are "connected" over
//! the total number of pairs; they differ in what counts as connected:
//!
//! - **TCC** — pairs connected *directly* (shared own attribute or a call
//!   between the two).
//! - **LCC** — pairs connected directly or *transitively*; this is exactly
//!   same-component membership under the connected-components traversal.
//! - **PCC** — the pessimistic variant: only a direct call between the two
//!   methods connects a pair; attribute-mediated relations are ignored.

use crate::disjoint::ConnectedComponents;
use crate::metrics::MetricError;
use crate::usage::ClassView;

/// Tight Class Cohesion: directly-connected pairs over total pairs.
pub fn tcc(view: &ClassView) -> Result<Option<f64>, MetricError> {
    fraction(view, |v, i, j| v.connected(i, j))
}

/// Pessimistic Class Cohesion: call-connected pairs over total pairs.
pub fn pcc(view: &ClassView) -> Result<Option<f64>, MetricError> {
    fraction(view, |v, i, j| v.call_between(i, j))
}

fn fraction(
    view: &ClassView,
    related: impl Fn(&ClassView, usize, usize) -> bool,
) -> Result<Option<f64>, MetricError> {
    let m = view.method_count();
    if m < 2 {
        return Ok(None);
    }
    let mut connected = 0usize;
    for i in 0..m {
        for j in (i + 1)..m {
            if related(view, i, j) {
                connected += 1;
            }
        }
    }
    Ok(Some(connected as f64 / view.pair_count() as f64))
}

/// Loose Class Cohesion: same-component pairs over total pairs. A pair is
/// connected iff the traversal puts both methods in one component, so the
/// transitive closure comes straight from the graph primitive.
pub fn lcc(view: &ClassView) -> Result<Option<f64>, MetricError> {
    let m = view.method_count();
    if m < 2 {
        return Ok(None);
    }
    let mut graph = ConnectedComponents::new(m);
    for i in 0..m {
        for j in (i + 1)..m {
            if view.connected(i, j) {
                graph.add_edge(i, j)?;
            }
        }
    }
    let components = graph.components();
    let mut sizes = vec![0usize; m];
    for &component in &components {
        sizes[component] += 1;
    }
    let connected_pairs: usize = sizes.iter().map(|&s| s * s.saturating_sub(1) / 2).sum();
    Ok(Some(connected_pairs as f64 / view.pair_count() as f64))
}
