//! CCM: connected-component count of the method graph
//!
//! Methods are nodes; an edge joins two methods that share an own attribute
//! or call one another. The score is the number of connected components —
//! 1 for a class whose methods all hang together, higher for classes that
//! fall apart into unrelated clusters. Computed with the union-find
//! primitive; the traversal formulation in [`crate::connectivity`] must
//! agree on the same edge set.

use crate::disjoint::UnionFind;
use crate::metrics::MetricError;
use crate::usage::ClassView;

pub fn ccm(view: &ClassView) -> Result<Option<f64>, MetricError> {
    let m = view.method_count();
    if m < 2 {
        return Ok(None);
    }
    let mut sets = UnionFind::new(m);
    for i in 0..m {
        for j in (i + 1)..m {
            if view.connected(i, j) {
                sets.unite(i, j)?;
            }
        }
    }
    Ok(Some(sets.count() as f64))
}
