//! Encoded type descriptors to type nodes, and the runtime accessor family
//! each descriptor reads and writes through.

use crate::error::EvalError;
use dbgeval_debuginfo::{
    CORE_MODULE, OBJECT_DESCRIPTOR, STRING_DESCRIPTOR, TypeDescriptor, demangle_class_name,
};
use dbgeval_parser::parser::node::ArrayTypeData;
use dbgeval_parser::{NodeArena, NodeIndex, SyntaxKind};

/// Suffix of the `DebuggerAPI.getLocal*` / `setLocal*` pair used for a
/// value of a given descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessorTag {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object,
}

impl AccessorTag {
    pub fn of(descriptor: &TypeDescriptor) -> Option<AccessorTag> {
        Some(match descriptor {
            TypeDescriptor::Boolean => AccessorTag::Boolean,
            TypeDescriptor::Byte => AccessorTag::Byte,
            TypeDescriptor::Char => AccessorTag::Char,
            TypeDescriptor::Short => AccessorTag::Short,
            TypeDescriptor::Int => AccessorTag::Int,
            TypeDescriptor::Long => AccessorTag::Long,
            TypeDescriptor::Float => AccessorTag::Float,
            TypeDescriptor::Double => AccessorTag::Double,
            TypeDescriptor::Class(_) | TypeDescriptor::Array(_) => AccessorTag::Object,
            TypeDescriptor::Void => return None,
        })
    }

    fn suffix(self) -> &'static str {
        match self {
            AccessorTag::Boolean => "Boolean",
            AccessorTag::Byte => "Byte",
            AccessorTag::Char => "Char",
            AccessorTag::Short => "Short",
            AccessorTag::Int => "Int",
            AccessorTag::Long => "Long",
            AccessorTag::Float => "Float",
            AccessorTag::Double => "Double",
            AccessorTag::Object => "Object",
        }
    }

    pub fn getter(self) -> String {
        format!("getLocal{}", self.suffix())
    }

    pub fn setter(self) -> String {
        format!("setLocal{}", self.suffix())
    }

    /// Reference reads come back as `Object` and need a cast.
    pub fn needs_cast(self) -> bool {
        self == AccessorTag::Object
    }
}

/// Parse a descriptor from a binary; a malformed one means a corrupt binary.
pub(crate) fn parse_descriptor(text: &str) -> Result<TypeDescriptor, EvalError> {
    Ok(TypeDescriptor::parse(text)?)
}

/// Build the type node for `descriptor`.
///
/// Class references become type references named by the simple class name
/// and carrying the mangled name, so the plugin can later find the declaring
/// module even from a program that never imported it.
pub(crate) fn type_node(arena: &mut NodeArena, descriptor: &TypeDescriptor) -> Result<NodeIndex, EvalError> {
    let keyword = match descriptor {
        TypeDescriptor::Boolean => SyntaxKind::BooleanKeyword,
        TypeDescriptor::Byte => SyntaxKind::ByteKeyword,
        TypeDescriptor::Char => SyntaxKind::CharKeyword,
        TypeDescriptor::Short => SyntaxKind::ShortKeyword,
        TypeDescriptor::Int => SyntaxKind::IntKeyword,
        TypeDescriptor::Long => SyntaxKind::LongKeyword,
        TypeDescriptor::Float => SyntaxKind::FloatKeyword,
        TypeDescriptor::Double => SyntaxKind::NumberKeyword,
        TypeDescriptor::Void => SyntaxKind::VoidKeyword,
        TypeDescriptor::Array(element) => {
            let element_type = type_node(arena, element)?;
            return Ok(arena.add_array_type(0, 0, ArrayTypeData { element_type }));
        }
        TypeDescriptor::Class(name) => return class_type_node(arena, name),
    };
    Ok(arena.add_token(keyword, 0, 0))
}

fn class_type_node(arena: &mut NodeArena, mangled: &str) -> Result<NodeIndex, EvalError> {
    if mangled == OBJECT_DESCRIPTOR {
        return Ok(arena.synthesized_type_ref("Object", None));
    }
    if mangled == STRING_DESCRIPTOR {
        return Ok(arena.add_token(SyntaxKind::StringKeyword, 0, 0));
    }
    let (module, simple) = demangle_class_name(mangled)?;
    if module == CORE_MODULE {
        return Err(EvalError::UntranslatableType {
            descriptor: mangled.to_string(),
        });
    }
    Ok(arena.synthesized_type_ref(&simple, Some(mangled.to_string())))
}

/// Type node for a descriptor given as text.
pub(crate) fn type_node_from_text(arena: &mut NodeArena, text: &str) -> Result<NodeIndex, EvalError> {
    let descriptor = parse_descriptor(text)?;
    type_node(arena, &descriptor)
}
