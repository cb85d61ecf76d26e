//! LCOM family: Lack of Cohesion in Methods
//!
//! Three published variants over the method × attribute usage relation.
//! All return the not-applicable sentinel for classes with fewer than two
//! scored methods; LCOM2/LCOM5 also need at least one declared attribute.

use crate::metrics::MetricError;
use crate::usage::ClassView;

/// Chidamber–Kemerer LCOM: the number of method pairs with disjoint
/// attribute sets, reduced by the pairs sharing at least one attribute and
/// floored at zero. Unbounded; 0 means perfectly cohesive.
pub fn lcom(view: &ClassView) -> Result<Option<f64>, MetricError> {
    if view.method_count() < 2 {
        return Ok(None);
    }
    let (sharing, disjoint) = sharing_pairs(view);
    Ok(Some((disjoint as f64 - sharing as f64).max(0.0)))
}

/// Counts method pairs that do and do not share an own attribute.
pub fn sharing_pairs(view: &ClassView) -> (usize, usize) {
    let mut sharing = 0;
    let mut disjoint = 0;
    for i in 0..view.method_count() {
        for j in (i + 1)..view.method_count() {
            if view.share_attribute(i, j) {
                sharing += 1;
            } else {
                disjoint += 1;
            }
        }
    }
    (sharing, disjoint)
}

/// LCOM2: one minus the density of the method–attribute incidence,
/// `1 − (Σ_j c_j) / (m·a)`. Bounded to [0,1]; 0 means every method touches
/// every attribute.
pub fn lcom2(view: &ClassView) -> Result<Option<f64>, MetricError> {
    let m = view.method_count();
    let a = view.attribute_count();
    if m < 2 || a == 0 {
        return Ok(None);
    }
    let sum: usize = view.attribute_usage_counts().iter().sum();
    Ok(Some(1.0 - sum as f64 / (m as f64 * a as f64)))
}

/// Henderson-Sellers LCOM5: `(Σ_j c_j − m·a) / (a − m·a)`, clamped to
/// [0,1]. 0 when every method uses every attribute, 1 when each attribute
/// is used by at most one method.
pub fn lcom5(view: &ClassView) -> Result<Option<f64>, MetricError> {
    let m = view.method_count();
    let a = view.attribute_count();
    if m < 2 || a == 0 {
        return Ok(None);
    }
    let sum: usize = view.attribute_usage_counts().iter().sum();
    let (m, a) = (m as f64, a as f64);
    let value = (sum as f64 - m * a) / (a - m * a);
    Ok(Some(value.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::{OpKind, decode_class};
    use crate::skeleton::SkeletonBuilder;
    use crate::test_utils::ClassBytes;
    use crate::usage::Filters;

    fn view_of(bytes: Vec<u8>) -> ClassView {
        let mut builder = SkeletonBuilder::new();
        decode_class(&bytes, &mut builder).unwrap();
        let skeleton = builder.build();
        ClassView::new(skeleton.classes().next().unwrap(), &Filters::default())
    }

    fn cohesive_pair() -> ClassView {
        view_of(
            ClassBytes::new("t.Cohesive")
                .field("shared", "I")
                .method("a", "()V", &[("t.Cohesive", "shared", OpKind::Get)])
                .method("b", "()V", &[("t.Cohesive", "shared", OpKind::Get)])
                .build(),
        )
    }

    fn disjoint_pair() -> ClassView {
        view_of(
            ClassBytes::new("t.Disjoint")
                .field("x", "I")
                .field("y", "I")
                .method("a", "()V", &[("t.Disjoint", "x", OpKind::Get)])
                .method("b", "()V", &[("t.Disjoint", "y", OpKind::Get)])
                .build(),
        )
    }

    #[test]
    fn lcom_is_zero_for_a_sharing_pair() {
        assert_eq!(lcom(&cohesive_pair()).unwrap(), Some(0.0));
    }

    #[test]
    fn lcom_counts_the_disjoint_pair() {
        assert_eq!(lcom(&disjoint_pair()).unwrap(), Some(1.0));
    }

    #[test]
    fn lcom_never_goes_negative() {
        // Three methods all sharing: 3 sharing pairs, 0 disjoint.
        let view = view_of(
            ClassBytes::new("t.Neg")
                .field("s", "I")
                .method("a", "()V", &[("t.Neg", "s", OpKind::Get)])
                .method("b", "()V", &[("t.Neg", "s", OpKind::Put)])
                .method("c", "()V", &[("t.Neg", "s", OpKind::Get)])
                .build(),
        );
        assert_eq!(lcom(&view).unwrap(), Some(0.0));
    }

    #[test]
    fn lcom2_measures_incidence_density() {
        // Fully dense: every method touches the one attribute.
        assert_eq!(lcom2(&cohesive_pair()).unwrap(), Some(0.0));
        // Half dense: 2 incidences over m*a = 4.
        assert_eq!(lcom2(&disjoint_pair()).unwrap(), Some(0.5));
    }

    #[test]
    fn lcom5_bounds() {
        assert_eq!(lcom5(&cohesive_pair()).unwrap(), Some(0.0));
        assert_eq!(lcom5(&disjoint_pair()).unwrap(), Some(1.0));
    }

    #[test]
    fn lcom5_clamps_unused_attributes() {
        // No method touches any attribute: the raw formula exceeds 1.
        let view = view_of(
            ClassBytes::new("t.Unused")
                .field("dead", "I")
                .method("a", "()V", &[])
                .method("b", "()V", &[])
                .build(),
        );
        assert_eq!(lcom5(&view).unwrap(), Some(1.0));
    }

    #[test]
    fn degenerate_classes_get_the_sentinel() {
        let one_method = view_of(
            ClassBytes::new("t.One")
                .field("x", "I")
                .method("only", "()V", &[("t.One", "x", OpKind::Get)])
                .build(),
        );
        assert_eq!(lcom(&one_method).unwrap(), None);
        assert_eq!(lcom2(&one_method).unwrap(), None);
        assert_eq!(lcom5(&one_method).unwrap(), None);

        let no_attrs = view_of(
            ClassBytes::new("t.Bare")
                .method("a", "()V", &[])
                .method("b", "()V", &[])
                .build(),
        );
        // LCOM stays defined (it is pair-based); the normalized variants
        // need at least one attribute.
        assert_eq!(lcom(&no_attrs).unwrap(), Some(1.0));
        assert_eq!(lcom2(&no_attrs).unwrap(), None);
        assert_eq!(lcom5(&no_attrs).unwrap(), None);
    }
}
