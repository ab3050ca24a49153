//! Encoded type descriptors and class-name mangling.
//!
//! `Z B C S I J F D V` are the primitive and void tags, `Lpkg/Name;` names a
//! class and `[T` is an array of `T`. Class names are mangled from a dotted
//! module name and a simple name: module `geo.shapes`, class `Circle` is
//! `Lgeo/shapes/Circle;`.

use crate::error::FormatError;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
    /// Mangled class name, `L...;` included.
    Class(String),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Parse a complete descriptor; trailing characters are an error.
    pub fn parse(text: &str) -> Result<TypeDescriptor, FormatError> {
        let (descriptor, rest) = Self::parse_prefix(text)?;
        if !rest.is_empty() {
            return Err(FormatError::BadDescriptor(text.to_string()));
        }
        Ok(descriptor)
    }

    fn parse_prefix(text: &str) -> Result<(TypeDescriptor, &str), FormatError> {
        let bad = || FormatError::BadDescriptor(text.to_string());
        let dims = text.bytes().take_while(|&b| b == b'[').count();
        let element_text = &text[dims..];
        let mut chars = element_text.chars();
        let tag = chars.next().ok_or_else(bad)?;
        let (mut descriptor, rest) = match tag {
            'Z' => (TypeDescriptor::Boolean, chars.as_str()),
            'B' => (TypeDescriptor::Byte, chars.as_str()),
            'C' => (TypeDescriptor::Char, chars.as_str()),
            'S' => (TypeDescriptor::Short, chars.as_str()),
            'I' => (TypeDescriptor::Int, chars.as_str()),
            'J' => (TypeDescriptor::Long, chars.as_str()),
            'F' => (TypeDescriptor::Float, chars.as_str()),
            'D' => (TypeDescriptor::Double, chars.as_str()),
            'V' if dims == 0 => (TypeDescriptor::Void, chars.as_str()),
            'L' => {
                let end = element_text.find(';').ok_or_else(bad)?;
                if end < 2 {
                    return Err(bad());
                }
                (
                    TypeDescriptor::Class(element_text[..=end].to_string()),
                    &element_text[end + 1..],
                )
            }
            _ => return Err(bad()),
        };
        for _ in 0..dims {
            descriptor = TypeDescriptor::Array(Box::new(descriptor));
        }
        Ok((descriptor, rest))
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Void)
    }

    /// Class and array descriptors.
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeDescriptor::Class(_) | TypeDescriptor::Array(_))
    }

    /// Mangled class name for class descriptors.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Class(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Boolean => f.write_str("Z"),
            TypeDescriptor::Byte => f.write_str("B"),
            TypeDescriptor::Char => f.write_str("C"),
            TypeDescriptor::Short => f.write_str("S"),
            TypeDescriptor::Int => f.write_str("I"),
            TypeDescriptor::Long => f.write_str("J"),
            TypeDescriptor::Float => f.write_str("F"),
            TypeDescriptor::Double => f.write_str("D"),
            TypeDescriptor::Void => f.write_str("V"),
            TypeDescriptor::Class(name) => f.write_str(name),
            TypeDescriptor::Array(element) => write!(f, "[{element}"),
        }
    }
}

/// `L<module with '/' separators>/<name>;`
pub fn mangle_class_name(module: &str, name: &str) -> String {
    if module.is_empty() {
        format!("L{name};")
    } else {
        format!("L{}/{name};", module.replace('.', "/"))
    }
}

/// Split a mangled class name into its dotted module name and simple name.
pub fn demangle_class_name(mangled: &str) -> Result<(String, String), FormatError> {
    let inner = mangled
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .filter(|inner| !inner.is_empty() && !inner.contains(';'))
        .ok_or_else(|| FormatError::BadClassName(mangled.to_string()))?;
    match inner.rsplit_once('/') {
        Some((module, name)) if !name.is_empty() => Ok((module.replace('/', "."), name.to_string())),
        Some(_) => Err(FormatError::BadClassName(mangled.to_string())),
        None => Ok((String::new(), inner.to_string())),
    }
}
