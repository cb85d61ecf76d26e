//! Scored per-class view for the metric calculators
//!
//! Projects one skeleton [`Class`] into the data every cohesion formula
//! consumes: for each scored method, the set of *own* attributes it touches
//! and the sibling methods it calls. An operation counts as an own-attribute
//! access only when its owner is the enclosing class and the name matches a
//! declared, non-compiler-generated attribute; everything else is a foreign
//! access and never contributes to cohesion.

use crate::classfile::OpKind;
use crate::skeleton::{Class, Method, Visibility};
use std::collections::BTreeSet;

/// Which declared methods take part in cohesion scoring. Constructors,
/// static methods, private methods and compiler-generated (bridge or
/// synthetic) methods are excluded unless opted in, matching the original
/// tool's default filter layers. Methods without a body never score.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filters {
    pub include_ctors: bool,
    pub include_statics: bool,
    pub include_private: bool,
    pub include_bridges: bool,
}

impl Filters {
    fn scores(&self, method: &Method) -> bool {
        if method.is_abstract {
            return false;
        }
        if method.is_ctor && !self.include_ctors {
            return false;
        }
        if method.is_static && !self.include_statics {
            return false;
        }
        if method.visibility == Visibility::Private && !self.include_private {
            return false;
        }
        if (method.is_bridge || method.is_synthetic) && !self.include_bridges {
            return false;
        }
        true
    }
}

/// One scored method's usage data.
#[derive(Debug, Clone)]
pub struct MethodUsage {
    pub name: String,
    pub signature: String,
    /// Own declared attributes this method reads or writes.
    pub attrs: BTreeSet<String>,
    /// Names of same-class methods this method calls.
    pub calls: BTreeSet<String>,
}

/// The scored projection of one class.
#[derive(Debug, Clone)]
pub struct ClassView {
    pub class_name: String,
    pub is_interface: bool,
    /// Declared attributes considered by attribute-based metrics, sorted.
    pub attributes: Vec<String>,
    pub methods: Vec<MethodUsage>,
}

impl ClassView {
    pub fn new(class: &Class, filters: &Filters) -> Self {
        let attributes: Vec<String> = class
            .attributes
            .iter()
            .filter(|a| !a.name.contains('$'))
            .map(|a| a.name.clone())
            .collect();
        let declared: BTreeSet<&str> = attributes.iter().map(String::as_str).collect();

        let methods = class
            .methods
            .iter()
            .filter(|m| filters.scores(m))
            .map(|m| {
                let mut attrs = BTreeSet::new();
                let mut calls = BTreeSet::new();
                for op in &m.ops {
                    if op.owner != class.name {
                        continue;
                    }
                    match op.kind {
                        OpKind::Call => {
                            calls.insert(op.name.clone());
                        }
                        _ => {
                            if declared.contains(op.name.as_str()) {
                                attrs.insert(op.name.clone());
                            }
                        }
                    }
                }
                MethodUsage {
                    name: m.name.clone(),
                    signature: m.signature(),
                    attrs,
                    calls,
                }
            })
            .collect();

        Self {
            class_name: class.name.clone(),
            is_interface: class.is_interface,
            attributes,
            methods,
        }
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Number of unordered method pairs.
    pub fn pair_count(&self) -> usize {
        self.methods.len() * self.methods.len().saturating_sub(1) / 2
    }

    /// True when methods `i` and `j` touch at least one common own attribute.
    pub fn share_attribute(&self, i: usize, j: usize) -> bool {
        self.methods[i]
            .attrs
            .intersection(&self.methods[j].attrs)
            .next()
            .is_some()
    }

    /// True when method `i` calls method `j` or vice versa. Call targets are
    /// recorded by name, so every overload of the callee matches.
    pub fn call_between(&self, i: usize, j: usize) -> bool {
        i != j
            && (self.methods[i].calls.contains(&self.methods[j].name)
                || self.methods[j].calls.contains(&self.methods[i].name))
    }

    /// Direct connection: shared attribute or call in either direction.
    pub fn connected(&self, i: usize, j: usize) -> bool {
        self.share_attribute(i, j) || self.call_between(i, j)
    }

    /// For each declared attribute, how many scored methods touch it.
    pub fn attribute_usage_counts(&self) -> Vec<usize> {
        self.attributes
            .iter()
            .map(|attr| {
                self.methods
                    .iter()
                    .filter(|m| m.attrs.contains(attr))
                    .count()
            })
            .collect()
    }
}
