//! Class declarations (and module globals) from debug-info descriptors.

use crate::error::EvalError;
use crate::method_builder::{access_modifiers, build_member};
use crate::type_translation::type_node_from_text;
use dbgeval_debuginfo::{ClassDescriptor, FieldDescriptor};
use dbgeval_parser::parser::node::{
    ClassData, PropertyDeclData, VariableData, VariableDeclarationData,
};
use dbgeval_parser::parser::{modifier_flags, node_flags};
use dbgeval_parser::{NodeArena, NodeIndex, NodeList};
use tracing::trace;

/// The superclass as seen from the program a class is declared in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SuperRef {
    /// Name the superclass is visible under (declared or import alias).
    pub name: String,
    /// Mangled name of the superclass.
    pub binary_name: String,
    /// Parameter descriptors of the superclass constructor that
    /// synthesized constructors call; empty for a no-argument constructor.
    pub constructor_parameters: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BuiltClass {
    pub node: NodeIndex,
    pub fields: usize,
    pub methods: usize,
}

fn field_modifiers(field: &FieldDescriptor<'_>) -> u32 {
    let mut modifiers = access_modifiers(field.access);
    if field.access.is_final() {
        modifiers |= modifier_flags::READONLY;
    }
    modifiers
}

/// `export declare [abstract] class Name [extends Super] { ... }`, detached.
pub(crate) fn build_class(
    arena: &mut NodeArena,
    class: &ClassDescriptor<'_>,
    super_ref: Option<&SuperRef>,
) -> Result<BuiltClass, EvalError> {
    let simple_name = class.simple_name()?;
    let is_abstract = class.is_abstract();
    let super_parameters: &[String] = super_ref.map_or(&[], |s| s.constructor_parameters.as_slice());

    let mut members = Vec::new();
    let fields = class.fields();
    for field in &fields {
        let name = arena.synthesized_identifier(field.name);
        let type_annotation = type_node_from_text(arena, field.type_descriptor)?;
        let property = arena.add_property_decl(
            0,
            0,
            PropertyDeclData {
                name,
                type_annotation,
                initializer: NodeIndex::NONE,
            },
        );
        arena.set_modifier_flags(property, field_modifiers(field));
        members.push(property);
    }
    let methods = class.methods();
    for method in &methods {
        members.push(build_member(arena, method, is_abstract, super_parameters)?);
    }

    let heritage = match super_ref {
        Some(super_ref) => arena.synthesized_type_ref(&super_ref.name, Some(super_ref.binary_name.clone())),
        None => NodeIndex::NONE,
    };
    let name = arena.synthesized_identifier(&simple_name);
    let node = arena.add_class(
        0,
        0,
        ClassData {
            name,
            heritage,
            members: NodeList::from_vec(members),
        },
    );
    let mut modifiers = modifier_flags::EXPORT | modifier_flags::DECLARE;
    if is_abstract {
        modifiers |= modifier_flags::ABSTRACT;
    }
    arena.set_modifier_flags(node, modifiers);
    trace!(
        class = %simple_name,
        fields = fields.len(),
        methods = methods.len(),
        "built class declaration"
    );
    Ok(BuiltClass {
        node,
        fields: fields.len(),
        methods: methods.len(),
    })
}

/// `export declare let name: T;` for a module-level variable.
pub(crate) fn build_global_variable(
    arena: &mut NodeArena,
    field: &FieldDescriptor<'_>,
) -> Result<NodeIndex, EvalError> {
    let name = arena.synthesized_identifier(field.name);
    let type_annotation = type_node_from_text(arena, field.type_descriptor)?;
    let declaration = arena.add_variable_declaration(
        0,
        0,
        VariableDeclarationData {
            name,
            type_annotation,
            initializer: NodeIndex::NONE,
        },
    );
    let flags = if field.access.is_final() {
        node_flags::CONST
    } else {
        node_flags::LET
    };
    let statement = arena.add_variable(
        0,
        0,
        flags,
        VariableData {
            declarations: NodeList::from_vec(vec![declaration]),
        },
    );
    arena.set_modifier_flags(statement, modifier_flags::EXPORT | modifier_flags::DECLARE);
    Ok(statement)
}
