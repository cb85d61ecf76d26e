//! JVM class-file decoding
//!
//! Reads the raw bytes of one compiled class and pushes structural events
//! (class header, fields, methods, body operations) into a [`ClassSink`].
//! Decoding one class never touches another class's data; a malformed blob
//! yields a [`DecodeError`] for that class only.

use std::fmt;

/// Access flag bits shared by classes, fields and methods.
pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const BRIDGE: u16 = 0x0040;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
}

/// Error type for class-file decoding failures
#[derive(Debug)]
pub enum DecodeError {
    Truncated { offset: usize },
    BadMagic(u32),
    BadConstantTag { index: u16, tag: u8 },
    BadConstantRef { index: u16, expected: &'static str },
    BadInstruction { pc: usize, opcode: u8 },
    BadSwitch { pc: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset } => {
                write!(f, "class file truncated at byte {offset}")
            }
            Self::BadMagic(magic) => write!(f, "bad magic 0x{magic:08x}, not a class file"),
            Self::BadConstantTag { index, tag } => {
                write!(f, "unknown constant pool tag {tag} at index {index}")
            }
            Self::BadConstantRef { index, expected } => {
                write!(f, "constant pool index {index} is not a {expected}")
            }
            Self::BadInstruction { pc, opcode } => {
                write!(f, "unknown opcode 0x{opcode:02x} at pc {pc}")
            }
            Self::BadSwitch { pc } => write!(f, "malformed switch instruction at pc {pc}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Kind of a recorded body operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Get,
    Put,
    GetStatic,
    PutStatic,
    Call,
}

/// Class header event: binary name normalized to dotted form.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub access: u16,
    pub super_name: Option<String>,
}

/// One declared field.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
}

/// One declared method or constructor.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
}

/// One field-access or invoke instruction inside a method body.
#[derive(Debug, Clone)]
pub struct OpDecl {
    pub kind: OpKind,
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

/// Receiver for decoder events. Events arrive in file order; `op` calls
/// belong to the most recently announced `method`.
pub trait ClassSink {
    fn start_class(&mut self, class: &ClassDecl);
    fn field(&mut self, field: &FieldDecl);
    fn method(&mut self, method: &MethodDecl);
    fn op(&mut self, op: &OpDecl);
}

/// Big-endian cursor over the class-file bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or(DecodeError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(b)
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from(self.u8()?) << 8 | u16::from(self.u8()?))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from(self.u16()?) << 16 | u32::from(self.u16()?))
    }

    fn slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(DecodeError::Truncated { offset: self.pos })?;
        let s = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.slice(len).map(|_| ())
    }
}

/// Constant pool entry. Only the shapes the decoder resolves are kept
/// structurally; everything else is `Other`.
enum Constant {
    Utf8(String),
    Class(u16),
    MemberRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    Other,
    /// Second slot of a Long/Double entry.
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let count = r.u16()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        entries.push(Constant::Unusable); // index 0 is unused
        let mut index = 1u16;
        while index < count {
            let tag = r.u8()?;
            let entry = match tag {
                1 => {
                    let len = usize::from(r.u16()?);
                    // Names are modified UTF-8; lossy decoding keeps malformed
                    // sequences from aborting the class.
                    Constant::Utf8(String::from_utf8_lossy(r.slice(len)?).into_owned())
                }
                3 | 4 => {
                    r.skip(4)?;
                    Constant::Other
                }
                5 | 6 => {
                    r.skip(8)?;
                    Constant::Other
                }
                7 => Constant::Class(r.u16()?),
                8 | 16 | 19 | 20 => {
                    r.skip(2)?;
                    Constant::Other
                }
                9 | 10 | 11 => Constant::MemberRef {
                    class: r.u16()?,
                    name_and_type: r.u16()?,
                },
                12 => Constant::NameAndType {
                    name: r.u16()?,
                    descriptor: r.u16()?,
                },
                15 => {
                    r.skip(3)?;
                    Constant::Other
                }
                17 | 18 => {
                    r.skip(4)?;
                    Constant::Other
                }
                _ => return Err(DecodeError::BadConstantTag { index, tag }),
            };
            let wide = matches!(tag, 5 | 6);
            entries.push(entry);
            if wide {
                entries.push(Constant::Unusable);
                index += 1;
            }
            index += 1;
        }
        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, DecodeError> {
        self.entries
            .get(usize::from(index))
            .ok_or(DecodeError::BadConstantRef {
                index,
                expected: "valid entry",
            })
    }

    fn utf8(&self, index: u16) -> Result<&str, DecodeError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(DecodeError::BadConstantRef {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Binary class name at `index`, normalized to dotted form.
    fn class_name(&self, index: u16) -> Result<String, DecodeError> {
        match self.get(index)? {
            Constant::Class(name) => Ok(self.utf8(*name)?.replace('/', ".")),
            _ => Err(DecodeError::BadConstantRef {
                index,
                expected: "Class",
            }),
        }
    }

    /// Owner, member name and descriptor of a Fieldref/Methodref entry.
    fn member(&self, index: u16) -> Result<(String, String, String), DecodeError> {
        let Constant::MemberRef {
            class,
            name_and_type,
        } = self.get(index)?
        else {
            return Err(DecodeError::BadConstantRef {
                index,
                expected: "member reference",
            });
        };
        let owner = self.class_name(*class)?;
        let Constant::NameAndType { name, descriptor } = self.get(*name_and_type)? else {
            return Err(DecodeError::BadConstantRef {
                index: *name_and_type,
                expected: "NameAndType",
            });
        };
        Ok((
            owner,
            self.utf8(*name)?.to_string(),
            self.utf8(*descriptor)?.to_string(),
        ))
    }
}

/// Decodes one class and pushes its events into `sink`.
pub fn decode_class(bytes: &[u8], sink: &mut impl ClassSink) -> Result<(), DecodeError> {
    let mut r = Reader::new(bytes);
    let magic = r.u32()?;
    if magic != 0xCAFE_BABE {
        return Err(DecodeError::BadMagic(magic));
    }
    r.skip(4)?; // minor + major version
    let pool = ConstantPool::parse(&mut r)?;

    let class_access = r.u16()?;
    let this_class = r.u16()?;
    let super_class = r.u16()?;
    let super_name = if super_class == 0 {
        None
    } else {
        Some(pool.class_name(super_class)?)
    };
    sink.start_class(&ClassDecl {
        name: pool.class_name(this_class)?,
        access: class_access,
        super_name,
    });

    let interfaces = r.u16()?;
    r.skip(usize::from(interfaces) * 2)?;

    let field_count = r.u16()?;
    for _ in 0..field_count {
        let acc = r.u16()?;
        let name = pool.utf8(r.u16()?)?.to_string();
        let descriptor = pool.utf8(r.u16()?)?.to_string();
        skip_attributes(&mut r)?;
        sink.field(&FieldDecl {
            access: acc,
            name,
            descriptor,
        });
    }

    let method_count = r.u16()?;
    for _ in 0..method_count {
        let acc = r.u16()?;
        let name = pool.utf8(r.u16()?)?.to_string();
        let descriptor = pool.utf8(r.u16()?)?.to_string();
        sink.method(&MethodDecl {
            access: acc,
            name,
            descriptor,
        });
        let attr_count = r.u16()?;
        for _ in 0..attr_count {
            let attr_name = pool.utf8(r.u16()?)?.to_string();
            let len = r.u32()? as usize;
            let info = r.slice(len)?;
            if attr_name == "Code" {
                scan_code(info, &pool, sink)?;
            }
        }
    }
    // Class-level attributes follow; nothing structural for us there.
    Ok(())
}

fn skip_attributes(r: &mut Reader<'_>) -> Result<(), DecodeError> {
    let count = r.u16()?;
    for _ in 0..count {
        r.skip(2)?;
        let len = r.u32()? as usize;
        r.skip(len)?;
    }
    Ok(())
}

/// Walks the bytecode of one `Code` attribute, emitting an op event for
/// every field-access and invoke instruction.
fn scan_code(info: &[u8], pool: &ConstantPool, sink: &mut impl ClassSink) -> Result<(), DecodeError> {
    let mut r = Reader::new(info);
    r.skip(4)?; // max_stack + max_locals
    let code_len = r.u32()? as usize;
    let code = r.slice(code_len)?;

    let mut pc = 0usize;
    while pc < code.len() {
        let opcode = code[pc];
        match opcode {
            // getstatic, putstatic, getfield, putfield
            0xb2..=0xb5 => {
                let index = read_u16(code, pc + 1)?;
                let (owner, name, descriptor) = pool.member(index)?;
                let kind = match opcode {
                    0xb2 => OpKind::GetStatic,
                    0xb3 => OpKind::PutStatic,
                    0xb4 => OpKind::Get,
                    _ => OpKind::Put,
                };
                sink.op(&OpDecl {
                    kind,
                    owner,
                    name,
                    descriptor,
                });
                pc += 3;
            }
            // invokevirtual, invokespecial, invokestatic
            0xb6..=0xb8 => {
                let index = read_u16(code, pc + 1)?;
                let (owner, name, descriptor) = pool.member(index)?;
                sink.op(&OpDecl {
                    kind: OpKind::Call,
                    owner,
                    name,
                    descriptor,
                });
                pc += 3;
            }
            // invokeinterface: index u16, count, zero byte
            0xb9 => {
                let index = read_u16(code, pc + 1)?;
                let (owner, name, descriptor) = pool.member(index)?;
                sink.op(&OpDecl {
                    kind: OpKind::Call,
                    owner,
                    name,
                    descriptor,
                });
                pc += 5;
            }
            // invokedynamic carries no owner; no op is emitted for it
            0xba => pc += 5,
            0xaa => pc = switch_end(code, pc, true)?,
            0xab => pc = switch_end(code, pc, false)?,
            // wide: doubles the index width of the modified instruction
            0xc4 => {
                let modified = *code
                    .get(pc + 1)
                    .ok_or(DecodeError::Truncated { offset: pc + 1 })?;
                pc += if modified == 0x84 { 6 } else { 4 };
            }
            _ => {
                let operands =
                    operand_len(opcode).ok_or(DecodeError::BadInstruction { pc, opcode })?;
                pc += 1 + operands;
            }
        }
    }
    Ok(())
}

fn read_u16(code: &[u8], at: usize) -> Result<u16, DecodeError> {
    if at + 1 >= code.len() {
        return Err(DecodeError::Truncated { offset: at });
    }
    Ok(u16::from(code[at]) << 8 | u16::from(code[at + 1]))
}

fn read_i32(code: &[u8], at: usize) -> Result<i32, DecodeError> {
    if at + 3 >= code.len() {
        return Err(DecodeError::Truncated { offset: at });
    }
    Ok(i32::from_be_bytes([
        code[at],
        code[at + 1],
        code[at + 2],
        code[at + 3],
    ]))
}

/// End pc of a tableswitch/lookupswitch starting at `pc`.
fn switch_end(code: &[u8], pc: usize, table: bool) -> Result<usize, DecodeError> {
    // Operands start 4-byte aligned relative to the start of the code array.
    let base = pc + 1 + (4 - (pc + 1) % 4) % 4;
    if table {
        let low = read_i32(code, base + 4)?;
        let high = read_i32(code, base + 8)?;
        if high < low {
            return Err(DecodeError::BadSwitch { pc });
        }
        let entries = (i64::from(high) - i64::from(low) + 1) as usize;
        Ok(base + 12 + entries * 4)
    } else {
        let npairs = read_i32(code, base + 4)?;
        if npairs < 0 {
            return Err(DecodeError::BadSwitch { pc });
        }
        Ok(base + 8 + npairs as usize * 8)
    }
}

/// Operand byte count for fixed-width instructions. `None` for opcodes the
/// caller must handle itself and for bytes that are not JVM opcodes.
fn operand_len(opcode: u8) -> Option<usize> {
    match opcode {
        0x00..=0x0f | 0x1a..=0x35 | 0x3b..=0x83 | 0x85..=0x98 | 0xac..=0xb1 | 0xbe | 0xbf
        | 0xc2 | 0xc3 => Some(0),
        0x10 | 0x12 | 0x15..=0x19 | 0x36..=0x3a | 0xa9 | 0xbc => Some(1),
        0x11 | 0x13 | 0x14 | 0x84 | 0x99..=0xa8 | 0xbb | 0xbd | 0xc0 | 0xc1 | 0xc6 | 0xc7 => {
            Some(2)
        }
        0xc5 => Some(3),
        0xc8 | 0xc9 => Some(4),
        _ => None,
    }
}
