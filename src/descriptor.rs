//! Field and method descriptor parsing
//!
//! Descriptors are the JVM's compact type strings: `I` for int,
//! `Ljava/lang/String;` for a class type, `[J` for a long array,
//! `(Ljava/lang/String;I)V` for a method taking a String and an int and
//! returning void. Parsed types are kept in dotted source form.

/// Argument and return types of one method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTypes {
    pub args: Vec<String>,
    pub ret: String,
}

/// Parses a method descriptor like `(Ljava/lang/String;I)V`.
/// Returns `None` when the descriptor is malformed.
pub fn method_types(descriptor: &str) -> Option<MethodTypes> {
    let rest = descriptor.strip_prefix('(')?;
    let close = rest.find(')')?;
    let (params, ret_part) = (&rest[..close], &rest[close + 1..]);

    let mut args = Vec::new();
    let mut bytes = params.as_bytes();
    while !bytes.is_empty() {
        let (ty, len) = one_type(bytes)?;
        args.push(ty);
        bytes = &bytes[len..];
    }
    let (ret, len) = one_type(ret_part.as_bytes())?;
    if len != ret_part.len() {
        // Trailing garbage after the return type.
        return None;
    }
    Some(MethodTypes { args, ret })
}

/// Parses a field descriptor like `Ljava/lang/String;` or `[[I`.
pub fn field_type(descriptor: &str) -> Option<String> {
    let (ty, len) = one_type(descriptor.as_bytes())?;
    if len == descriptor.len() { Some(ty) } else { None }
}

/// Reads one type from the front of `bytes`, returning its source form and
/// its encoded length.
fn one_type(bytes: &[u8]) -> Option<(String, usize)> {
    let mut dims = 0usize;
    while bytes.get(dims) == Some(&b'[') {
        dims += 1;
    }
    let (base, len) = match *bytes.get(dims)? {
        b'B' => ("byte".to_string(), 1),
        b'C' => ("char".to_string(), 1),
        b'D' => ("double".to_string(), 1),
        b'F' => ("float".to_string(), 1),
        b'I' => ("int".to_string(), 1),
        b'J' => ("long".to_string(), 1),
        b'S' => ("short".to_string(), 1),
        b'Z' => ("boolean".to_string(), 1),
        b'V' => ("void".to_string(), 1),
        b'L' => {
            let rest = &bytes[dims + 1..];
            let end = rest.iter().position(|&b| b == b';')?;
            let name = std::str::from_utf8(&rest[..end]).ok()?.replace('/', ".");
            (name, end + 2)
        }
        _ => return None,
    };
    Some((format!("{}{}", base, "[]".repeat(dims)), dims + len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitives_and_objects() {
        let types = method_types("(Ljava/lang/String;I)V").unwrap();
        assert_eq!(types.args, ["java.lang.String", "int"]);
        assert_eq!(types.ret, "void");
    }

    #[test]
    fn parses_arrays() {
        let types = method_types("([[J[Ljava/lang/Object;)[B").unwrap();
        assert_eq!(types.args, ["long[][]", "java.lang.Object[]"]);
        assert_eq!(types.ret, "byte[]");
    }

    #[test]
    fn parses_empty_argument_list() {
        let types = method_types("()D").unwrap();
        assert!(types.args.is_empty());
        assert_eq!(types.ret, "double");
    }

    #[test]
    fn rejects_malformed_descriptors() {
        assert!(method_types("(I").is_none());
        assert!(method_types("(Q)V").is_none());
        assert!(method_types("()VX").is_none());
        assert!(field_type("Ljava/lang/String").is_none());
        assert!(field_type("II").is_none());
    }

    #[test]
    fn parses_field_descriptors() {
        assert_eq!(field_type("I").unwrap(), "int");
        assert_eq!(field_type("[Z").unwrap(), "boolean[]");
        assert_eq!(field_type("Ljava/util/Map;").unwrap(), "java.util.Map");
    }
}
