//! Test support: synthesize real `.class` bytes in memory.
//!
//! Tests describe a class (fields, methods, the field accesses and calls
//! inside each body) and get back a spec-valid class file, so decoder and
//! metric tests run against genuine bytecode without fixtures on disk.

use crate::classfile::{OpKind, access};
use std::collections::HashMap;

/// Builder for one synthetic class file.
pub struct ClassBytes {
    name: String,
    access: u16,
    fields: Vec<(String, String, u16)>,
    methods: Vec<MethodSpec>,
    long_constants: Vec<i64>,
}

struct MethodSpec {
    name: String,
    descriptor: String,
    access: u16,
    body: Body,
}

enum Body {
    /// Generated from op specs: (owner, member, kind) triples.
    Ops(Vec<(String, String, OpKind)>),
    /// Hand-written instruction stream.
    Raw(Vec<u8>),
    /// No Code attribute (abstract/native).
    None,
}

impl ClassBytes {
    /// New public class with the given dotted name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            access: access::PUBLIC,
            fields: Vec::new(),
            methods: Vec::new(),
            long_constants: Vec::new(),
        }
    }

    #[must_use]
    pub fn access(mut self, acc: u16) -> Self {
        self.access = acc;
        self
    }

    /// Private instance field.
    #[must_use]
    pub fn field(self, name: &str, descriptor: &str) -> Self {
        self.field_with(name, descriptor, access::PRIVATE)
    }

    #[must_use]
    pub fn field_with(mut self, name: &str, descriptor: &str, acc: u16) -> Self {
        self.fields.push((name.to_string(), descriptor.to_string(), acc));
        self
    }

    /// Public instance method whose body performs the given ops in order.
    #[must_use]
    pub fn method(self, name: &str, descriptor: &str, ops: &[(&str, &str, OpKind)]) -> Self {
        self.method_with(name, descriptor, access::PUBLIC, ops)
    }

    #[must_use]
    pub fn method_with(
        mut self,
        name: &str,
        descriptor: &str,
        acc: u16,
        ops: &[(&str, &str, OpKind)],
    ) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: acc,
            body: Body::Ops(
                ops.iter()
                    .map(|(owner, member, kind)| (owner.to_string(), member.to_string(), *kind))
                    .collect(),
            ),
        });
        self
    }

    /// Public method with a hand-written instruction stream (for exercising
    /// switches, wide forms and other operand shapes).
    #[must_use]
    pub fn method_code(mut self, name: &str, descriptor: &str, code: Vec<u8>) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: access::PUBLIC,
            body: Body::Raw(code),
        });
        self
    }

    /// Method without a Code attribute.
    #[must_use]
    pub fn abstract_method(mut self, name: &str, descriptor: &str, acc: u16) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: acc,
            body: Body::None,
        });
        self
    }

    /// Interns a CONSTANT_Long, which occupies two constant pool slots.
    #[must_use]
    pub fn long_constant(mut self, value: i64) -> Self {
        self.long_constants.push(value);
        self
    }

    /// Assembles the class file.
    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::default();
        for &value in &self.long_constants {
            pool.long(value);
        }
        let this_class = pool.class(&self.name);
        let super_class = pool.class("java.lang.Object");
        let code_attr = pool.utf8("Code");

        struct FieldIdx {
            access: u16,
            name: u16,
            descriptor: u16,
        }
        let fields: Vec<FieldIdx> = self
            .fields
            .iter()
            .map(|(name, descriptor, acc)| FieldIdx {
                access: *acc,
                name: pool.utf8(name),
                descriptor: pool.utf8(descriptor),
            })
            .collect();

        struct MethodIdx {
            access: u16,
            name: u16,
            descriptor: u16,
            code: Option<Vec<u8>>,
        }
        let methods: Vec<MethodIdx> = self
            .methods
            .iter()
            .map(|m| MethodIdx {
                access: m.access,
                name: pool.utf8(&m.name),
                descriptor: pool.utf8(&m.descriptor),
                code: match &m.body {
                    Body::Ops(ops) => Some(assemble_ops(&mut pool, ops)),
                    Body::Raw(code) => Some(code.clone()),
                    Body::None => None,
                },
            })
            .collect();

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&52u16.to_be_bytes()); // major (Java 8)
        out.extend_from_slice(&pool.count().to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces

        out.extend_from_slice(&(fields.len() as u16).to_be_bytes());
        for f in &fields {
            out.extend_from_slice(&f.access.to_be_bytes());
            out.extend_from_slice(&f.name.to_be_bytes());
            out.extend_from_slice(&f.descriptor.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes()); // attributes
        }

        out.extend_from_slice(&(methods.len() as u16).to_be_bytes());
        for m in &methods {
            out.extend_from_slice(&m.access.to_be_bytes());
            out.extend_from_slice(&m.name.to_be_bytes());
            out.extend_from_slice(&m.descriptor.to_be_bytes());
            match &m.code {
                Some(code) => {
                    out.extend_from_slice(&1u16.to_be_bytes());
                    out.extend_from_slice(&code_attr.to_be_bytes());
                    let info_len = 2 + 2 + 4 + code.len() + 2 + 2;
                    out.extend_from_slice(&(info_len as u32).to_be_bytes());
                    out.extend_from_slice(&8u16.to_be_bytes()); // max_stack
                    out.extend_from_slice(&8u16.to_be_bytes()); // max_locals
                    out.extend_from_slice(&(code.len() as u32).to_be_bytes());
                    out.extend_from_slice(code);
                    out.extend_from_slice(&0u16.to_be_bytes()); // exception table
                    out.extend_from_slice(&0u16.to_be_bytes()); // code attributes
                }
                None => out.extend_from_slice(&0u16.to_be_bytes()),
            }
        }

        out.extend_from_slice(&0u16.to_be_bytes()); // class attributes
        out
    }
}

/// Turns op specs into instructions: field accesses and invokevirtual calls
/// against pool references, closed with a `return`.
fn assemble_ops(pool: &mut Pool, ops: &[(String, String, OpKind)]) -> Vec<u8> {
    let mut code = Vec::new();
    for (owner, member, kind) in ops {
        let (opcode, index) = match kind {
            OpKind::Get => (0xb4, pool.field_ref(owner, member, "I")),
            OpKind::Put => (0xb5, pool.field_ref(owner, member, "I")),
            OpKind::GetStatic => (0xb2, pool.field_ref(owner, member, "I")),
            OpKind::PutStatic => (0xb3, pool.field_ref(owner, member, "I")),
            OpKind::Call => (0xb6, pool.method_ref(owner, member, "()V")),
        };
        if matches!(kind, OpKind::Get | OpKind::Put | OpKind::Call) {
            code.push(0x2a); // aload_0
        }
        code.push(opcode);
        code.extend_from_slice(&index.to_be_bytes());
    }
    code.push(0xb1); // return
    code
}

/// Interning constant pool writer.
#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    next: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    nats: HashMap<(u16, u16), u16>,
    members: HashMap<(u8, u16, u16), u16>,
}

impl Pool {
    fn count(&self) -> u16 {
        self.next + 1
    }

    fn push(&mut self, wide: bool) -> u16 {
        let index = self.next + 1;
        self.next += if wide { 2 } else { 1 };
        index
    }

    fn utf8(&mut self, s: &str) -> u16 {
        if let Some(&index) = self.utf8.get(s) {
            return index;
        }
        self.bytes.push(1);
        self.bytes
            .extend_from_slice(&(s.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(s.as_bytes());
        let index = self.push(false);
        self.utf8.insert(s.to_string(), index);
        index
    }

    /// CONSTANT_Class for a dotted name.
    fn class(&mut self, dotted: &str) -> u16 {
        if let Some(&index) = self.classes.get(dotted) {
            return index;
        }
        let name = self.utf8(&dotted.replace('.', "/"));
        self.bytes.push(7);
        self.bytes.extend_from_slice(&name.to_be_bytes());
        let index = self.push(false);
        self.classes.insert(dotted.to_string(), index);
        index
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        if let Some(&index) = self.nats.get(&(name, descriptor)) {
            return index;
        }
        self.bytes.push(12);
        self.bytes.extend_from_slice(&name.to_be_bytes());
        self.bytes.extend_from_slice(&descriptor.to_be_bytes());
        let index = self.push(false);
        self.nats.insert((name, descriptor), index);
        index
    }

    fn member(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let nat = self.name_and_type(name, descriptor);
        if let Some(&index) = self.members.get(&(tag, class, nat)) {
            return index;
        }
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&class.to_be_bytes());
        self.bytes.extend_from_slice(&nat.to_be_bytes());
        let index = self.push(false);
        self.members.insert((tag, class, nat), index);
        index
    }

    fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member(9, owner, name, descriptor)
    }

    fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member(10, owner, name, descriptor)
    }

    fn long(&mut self, value: i64) -> u16 {
        self.bytes.push(5);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self.push(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::{ClassDecl, ClassSink, FieldDecl, MethodDecl, OpDecl, decode_class};

    #[derive(Default)]
    struct Counter {
        fields: usize,
        methods: usize,
        ops: usize,
    }

    impl ClassSink for Counter {
        fn start_class(&mut self, _: &ClassDecl) {}
        fn field(&mut self, _: &FieldDecl) {
            self.fields += 1;
        }
        fn method(&mut self, _: &MethodDecl) {
            self.methods += 1;
        }
        fn op(&mut self, _: &OpDecl) {
            self.ops += 1;
        }
    }

    #[test]
    fn built_bytes_decode_back() {
        let bytes = ClassBytes::new("t.Built")
            .field("a", "I")
            .field("b", "J")
            .method("m", "()V", &[("t.Built", "a", OpKind::Get)])
            .abstract_method("n", "()V", access::PUBLIC | access::ABSTRACT)
            .long_constant(42)
            .build();
        let mut sink = Counter::default();
        decode_class(&bytes, &mut sink).unwrap();
        assert_eq!((sink.fields, sink.methods, sink.ops), (2, 2, 1));
    }

    #[test]
    fn raw_code_with_a_tableswitch_decodes() {
        // iconst_0 at pc 0, tableswitch at pc 1: operands begin at pc 4
        // (padded to a 4-byte boundary), default/low/high plus two offsets.
        let mut code = vec![0x03, 0xaa, 0x00, 0x00];
        code.extend_from_slice(&24i32.to_be_bytes()); // default
        code.extend_from_slice(&0i32.to_be_bytes()); // low
        code.extend_from_slice(&1i32.to_be_bytes()); // high
        code.extend_from_slice(&24i32.to_be_bytes());
        code.extend_from_slice(&24i32.to_be_bytes());
        code.push(0xb1); // return
        let bytes = ClassBytes::new("t.Sw").method_code("s", "()V", code).build();
        let mut sink = Counter::default();
        decode_class(&bytes, &mut sink).unwrap();
        assert_eq!(sink.methods, 1);
    }

    #[test]
    fn raw_code_with_wide_and_lookupswitch_decodes() {
        // wide iload (4 bytes), wide iinc (6 bytes), then a lookupswitch
        // at pc 10 whose operands start at pc 12.
        let mut code = vec![
            0xc4, 0x15, 0x00, 0x05, // wide iload 5
            0xc4, 0x84, 0x00, 0x05, 0x00, 0x01, // wide iinc 5 by 1
        ];
        code.push(0xab); // lookupswitch at pc 10
        code.push(0x00); // pad to 12
        code.extend_from_slice(&16i32.to_be_bytes()); // default
        code.extend_from_slice(&1i32.to_be_bytes()); // npairs
        code.extend_from_slice(&7i32.to_be_bytes()); // match
        code.extend_from_slice(&16i32.to_be_bytes()); // offset
        code.push(0xb1);
        let bytes = ClassBytes::new("t.Wide").method_code("w", "()V", code).build();
        let mut sink = Counter::default();
        decode_class(&bytes, &mut sink).unwrap();
        assert_eq!(sink.methods, 1);
    }
}
