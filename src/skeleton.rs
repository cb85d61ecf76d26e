//! The skeleton: an immutable structural model of an analyzed class corpus
//!
//! Application → Packages → Classes → {Attributes, Methods → Operations}.
//! Built once per run by folding decoder events, then read-only for every
//! metric calculator. Iteration order is stable by identifier (packages and
//! classes in `BTreeMap`s, attributes sorted by name, methods by name and
//! descriptor), so the same input set always yields a byte-identical
//! skeleton.

use crate::classfile::{ClassDecl, ClassSink, FieldDecl, MethodDecl, OpDecl, OpKind, access};
use crate::descriptor;
use serde::Serialize;
use std::collections::BTreeMap;

/// Member visibility, from access flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Default,
    Private,
}

impl Visibility {
    pub fn from_access(acc: u16) -> Self {
        if acc & access::PUBLIC != 0 {
            Self::Public
        } else if acc & access::PROTECTED != 0 {
            Self::Protected
        } else if acc & access::PRIVATE != 0 {
            Self::Private
        } else {
            Self::Default
        }
    }
}

/// One recorded field-access or method-call event inside a method body.
/// Bytecode order and duplicates are retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub kind: OpKind,
    pub owner: String,
    pub name: String,
}

impl Operation {
    /// Fully-qualified target, `owner.name`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }

    pub fn is_field_access(&self) -> bool {
        self.kind != OpKind::Call
    }
}

/// A field declared on a class.
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
}

/// A declared method or constructor. Overloads are distinct entities.
#[derive(Debug, Clone, Serialize)]
pub struct Method {
    pub name: String,
    pub descriptor: String,
    pub args: Vec<String>,
    pub ret: String,
    pub visibility: Visibility,
    pub is_ctor: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_bridge: bool,
    pub is_synthetic: bool,
    pub ops: Vec<Operation>,
}

impl Method {
    /// Name + descriptor, unique within a class.
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.descriptor)
    }
}

/// One analyzed class. Nested classes are separate entities; `enclosing`
/// records containment without implying attribute sharing.
#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub name: String,
    pub is_interface: bool,
    pub enclosing: Option<String>,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
}

impl Class {
    /// Namespace portion of the class identifier; empty for the default
    /// package.
    pub fn package(&self) -> &str {
        package_of(&self.name)
    }

    pub fn declares_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }
}

pub fn package_of(class_name: &str) -> &str {
    class_name
        .rfind('.')
        .map_or("", |dot| &class_name[..dot])
}

/// A package and its classes, keyed by fully-qualified class name.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub name: String,
    pub classes: BTreeMap<String, Class>,
}

/// The application root. Immutable once built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Skeleton {
    pub packages: BTreeMap<String, Package>,
}

impl Skeleton {
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.packages.values().flat_map(|p| p.classes.values())
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.packages
            .get(package_of(name))
            .and_then(|p| p.classes.get(name))
    }

    pub fn class_count(&self) -> usize {
        self.packages.values().map(|p| p.classes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Folds decoder events for N classes into a [`Skeleton`].
#[derive(Default)]
pub struct SkeletonBuilder {
    packages: BTreeMap<String, Package>,
    current: Option<Class>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finishes the class under construction and files it under its package.
    fn flush(&mut self) {
        let Some(mut class) = self.current.take() else {
            return;
        };
        class.attributes.sort_by(|a, b| a.name.cmp(&b.name));
        class
            .methods
            .sort_by(|a, b| (&a.name, &a.descriptor).cmp(&(&b.name, &b.descriptor)));
        let package = class.package().to_string();
        self.packages
            .entry(package.clone())
            .or_insert_with(|| Package {
                name: package,
                classes: BTreeMap::new(),
            })
            .classes
            .insert(class.name.clone(), class);
    }

    pub fn build(mut self) -> Skeleton {
        self.flush();
        Skeleton {
            packages: self.packages,
        }
    }
}

impl ClassSink for SkeletonBuilder {
    fn start_class(&mut self, class: &ClassDecl) {
        self.flush();
        self.current = Some(Class {
            name: class.name.clone(),
            is_interface: class.access & access::INTERFACE != 0,
            enclosing: class
                .name
                .rsplit_once('$')
                .map(|(outer, _)| outer.to_string()),
            attributes: Vec::new(),
            methods: Vec::new(),
        });
    }

    fn field(&mut self, field: &FieldDecl) {
        let Some(class) = self.current.as_mut() else {
            return;
        };
        class.attributes.push(Attribute {
            name: field.name.clone(),
            type_name: descriptor::field_type(&field.descriptor)
                .unwrap_or_else(|| field.descriptor.clone()),
            visibility: Visibility::from_access(field.access),
            is_static: field.access & access::STATIC != 0,
            is_final: field.access & access::FINAL != 0,
        });
    }

    fn method(&mut self, method: &MethodDecl) {
        let Some(class) = self.current.as_mut() else {
            return;
        };
        let types = descriptor::method_types(&method.descriptor);
        class.methods.push(Method {
            name: method.name.clone(),
            descriptor: method.descriptor.clone(),
            args: types.as_ref().map(|t| t.args.clone()).unwrap_or_default(),
            ret: types.map_or_else(|| "?".to_string(), |t| t.ret),
            visibility: Visibility::from_access(method.access),
            is_ctor: method.name == "<init>" || method.name == "<clinit>",
            is_static: method.access & access::STATIC != 0,
            is_abstract: method.access & access::ABSTRACT != 0,
            is_bridge: method.access & access::BRIDGE != 0,
            is_synthetic: method.access & access::SYNTHETIC != 0,
            ops: Vec::new(),
        });
    }

    fn op(&mut self, op: &OpDecl) {
        let Some(method) = self
            .current
            .as_mut()
            .and_then(|c| c.methods.last_mut())
        else {
            return;
        };
        method.ops.push(Operation {
            kind: op.kind,
            owner: op.owner.clone(),
            name: op.name.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::OpKind;
    use crate::classfile::decode_class;
    use crate::test_utils::ClassBytes;

    fn skeleton_of(blobs: &[Vec<u8>]) -> Skeleton {
        let mut builder = SkeletonBuilder::new();
        for bytes in blobs {
            decode_class(bytes, &mut builder).unwrap();
        }
        builder.build()
    }

    #[test]
    fn groups_classes_by_package() {
        let skeleton = skeleton_of(&[
            ClassBytes::new("com.a.One").build(),
            ClassBytes::new("com.b.Two").build(),
            ClassBytes::new("Three").build(),
        ]);
        let packages: Vec<&str> = skeleton.packages.keys().map(String::as_str).collect();
        assert_eq!(packages, ["", "com.a", "com.b"]);
        assert!(skeleton.class("com.a.One").is_some());
        assert!(skeleton.class("Three").is_some());
    }

    #[test]
    fn overloads_are_distinct_methods() {
        let bytes = ClassBytes::new("p.Over")
            .method("run", "()V", &[])
            .method("run", "(I)V", &[])
            .method("run", "(II)V", &[])
            .method("run", "(Ljava/lang/String;)V", &[])
            .build();
        let skeleton = skeleton_of(&[bytes]);
        let class = skeleton.class("p.Over").unwrap();
        assert_eq!(class.methods.len(), 4);
        assert!(class.methods.iter().all(|m| m.name == "run"));
        let descriptors: Vec<&str> =
            class.methods.iter().map(|m| m.descriptor.as_str()).collect();
        assert_eq!(descriptors, ["()V", "(I)V", "(II)V", "(Ljava/lang/String;)V"]);
    }

    #[test]
    fn constructors_are_tagged() {
        let bytes = ClassBytes::new("p.Ctor")
            .method("<init>", "()V", &[])
            .method("work", "()V", &[])
            .build();
        let skeleton = skeleton_of(&[bytes]);
        let class = skeleton.class("p.Ctor").unwrap();
        assert!(class.methods.iter().find(|m| m.name == "<init>").unwrap().is_ctor);
        assert!(!class.methods.iter().find(|m| m.name == "work").unwrap().is_ctor);
    }

    #[test]
    fn nested_class_records_enclosing() {
        let skeleton = skeleton_of(&[ClassBytes::new("p.Outer$Inner").build()]);
        let class = skeleton.class("p.Outer$Inner").unwrap();
        assert_eq!(class.enclosing.as_deref(), Some("p.Outer"));
    }

    #[test]
    fn ops_keep_bytecode_order_and_duplicates() {
        let bytes = ClassBytes::new("p.Dup")
            .field("n", "I")
            .method(
                "bump",
                "()V",
                &[
                    ("p.Dup", "n", OpKind::Get),
                    ("p.Dup", "n", OpKind::Put),
                    ("p.Dup", "n", OpKind::Get),
                ],
            )
            .build();
        let skeleton = skeleton_of(&[bytes]);
        let method = &skeleton.class("p.Dup").unwrap().methods[0];
        let kinds: Vec<OpKind> = method.ops.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, [OpKind::Get, OpKind::Put, OpKind::Get]);
        assert_eq!(method.ops[0].qualified(), "p.Dup.n");
    }

    #[test]
    fn skeleton_is_identical_across_input_orders() {
        let a = ClassBytes::new("p.A").field("x", "I").build();
        let b = ClassBytes::new("q.B").method("m", "()V", &[]).build();
        let forward = serde_json::to_string(&skeleton_of(&[a.clone(), b.clone()])).unwrap();
        let reverse = serde_json::to_string(&skeleton_of(&[b, a])).unwrap();
        assert_eq!(forward, reverse);
    }
}
