//! Method, constructor and global-function declarations from method
//! descriptors.
//!
//! Bodies are placeholders that type-check: the evaluator never runs them,
//! the runtime dispatches to the real compiled method. A value-returning
//! body reads slot 0 through the runtime accessor and casts the result.

use crate::error::EvalError;
use crate::type_translation::{AccessorTag, parse_descriptor, type_node, type_node_from_text};
use dbgeval_debuginfo::{AccessFlags, MethodDescriptor, TypeDescriptor};
use dbgeval_parser::parser::modifier_flags;
use dbgeval_parser::parser::node::{
    AccessExprData, BlockData, CallExprData, ExprStatementData, FunctionData, LiteralData,
    ParameterData, WrappedExprData,
};
use dbgeval_parser::{NodeArena, NodeIndex, NodeList, SyntaxKind};
use smallvec::SmallVec;

/// Prelude class holding the local-variable accessors.
pub(crate) const DEBUGGER_API: &str = "DebuggerAPI";

/// Parameter descriptors of a prototype, receiver excluded.
pub(crate) fn parameter_descriptors<'a>(method: &MethodDescriptor<'a>) -> SmallVec<[&'a str; 4]> {
    let proto = method.signature_types();
    let skip = if method.is_static() { 1 } else { 2 };
    proto.into_iter().skip(skip).collect()
}

fn return_descriptor(method: &MethodDescriptor<'_>) -> Result<TypeDescriptor, EvalError> {
    let proto = method.signature_types();
    let Some(text) = proto.first() else {
        return Ok(TypeDescriptor::Void);
    };
    parse_descriptor(text)
}

pub(crate) fn access_modifiers(flags: AccessFlags) -> u32 {
    let mut modifiers = modifier_flags::NONE;
    if flags.contains(AccessFlags::PRIVATE) {
        modifiers |= modifier_flags::PRIVATE;
    } else if flags.contains(AccessFlags::PROTECTED) {
        modifiers |= modifier_flags::PROTECTED;
    }
    if flags.is_static() {
        modifiers |= modifier_flags::STATIC;
    }
    modifiers
}

fn parameters(arena: &mut NodeArena, descriptors: &[&str]) -> Result<NodeList, EvalError> {
    let mut nodes = Vec::with_capacity(descriptors.len());
    for (index, descriptor) in descriptors.iter().enumerate() {
        let name = arena.synthesized_identifier(format!("arg{index}"));
        let type_annotation = type_node_from_text(arena, descriptor)?;
        nodes.push(arena.add_parameter(
            0,
            0,
            ParameterData {
                name,
                type_annotation,
            },
        ));
    }
    Ok(NodeList::from_vec(nodes))
}

/// `DebuggerAPI.<accessor>(<arguments>)`
pub(crate) fn accessor_call(arena: &mut NodeArena, accessor: &str, arguments: Vec<NodeIndex>) -> NodeIndex {
    let api = arena.synthesized_identifier(DEBUGGER_API);
    let name = arena.synthesized_identifier(accessor);
    let expression = arena.add_access_expr(0, 0, AccessExprData { expression: api, name });
    arena.add_call_expr(
        SyntaxKind::CallExpression,
        0,
        0,
        CallExprData {
            expression,
            arguments: NodeList::from_vec(arguments),
        },
    )
}

pub(crate) fn int_literal(arena: &mut NodeArena, value: u32) -> NodeIndex {
    arena.add_literal(
        SyntaxKind::NumericLiteral,
        0,
        0,
        LiteralData {
            text: value.to_string(),
            value: Some(f64::from(value)),
        },
    )
}

/// `DebuggerAPI.getLocal<Tag>(slot) as T`
pub(crate) fn placeholder_value(
    arena: &mut NodeArena,
    descriptor: &TypeDescriptor,
    slot: u32,
) -> Result<NodeIndex, EvalError> {
    let Some(tag) = AccessorTag::of(descriptor) else {
        return Err(EvalError::UntranslatableType {
            descriptor: descriptor.to_string(),
        });
    };
    let slot = int_literal(arena, slot);
    let read = accessor_call(arena, &tag.getter(), vec![slot]);
    let type_node = type_node(arena, descriptor)?;
    Ok(arena.add_wrapped_expr(
        SyntaxKind::AsExpression,
        0,
        0,
        WrappedExprData {
            expression: read,
            type_node,
        },
    ))
}

fn return_statement(arena: &mut NodeArena, expression: NodeIndex) -> NodeIndex {
    arena.add_expr_statement(SyntaxKind::ReturnStatement, 0, 0, ExprStatementData { expression })
}

fn block(arena: &mut NodeArena, statements: Vec<NodeIndex>) -> NodeIndex {
    arena.add_block(
        0,
        0,
        BlockData {
            statements: NodeList::from_vec(statements),
        },
    )
}

fn value_body(arena: &mut NodeArena, returns: &TypeDescriptor) -> Result<NodeIndex, EvalError> {
    let value = if returns.is_void() {
        NodeIndex::NONE
    } else {
        placeholder_value(arena, returns, 0)?
    };
    let statement = return_statement(arena, value);
    Ok(block(arena, vec![statement]))
}

/// `super(<placeholders>); return;`
fn constructor_body(arena: &mut NodeArena, super_parameters: &[String]) -> Result<NodeIndex, EvalError> {
    let mut arguments = Vec::with_capacity(super_parameters.len());
    for (slot, text) in super_parameters.iter().enumerate() {
        let descriptor = parse_descriptor(text)?;
        arguments.push(placeholder_value(arena, &descriptor, slot as u32)?);
    }
    let callee = arena.add_token(SyntaxKind::SuperKeyword, 0, 0);
    let call = arena.add_call_expr(
        SyntaxKind::CallExpression,
        0,
        0,
        CallExprData {
            expression: callee,
            arguments: NodeList::from_vec(arguments),
        },
    );
    let call = arena.add_expr_statement(
        SyntaxKind::ExpressionStatement,
        0,
        0,
        ExprStatementData { expression: call },
    );
    let ret = return_statement(arena, NodeIndex::NONE);
    Ok(block(arena, vec![call, ret]))
}

/// Class member for `method`: a constructor, a static block, or a method.
/// `super_parameters` are the parameter descriptors of the superclass
/// constructor a synthesized constructor must call.
pub(crate) fn build_member(
    arena: &mut NodeArena,
    method: &MethodDescriptor<'_>,
    class_is_abstract: bool,
    super_parameters: &[String],
) -> Result<NodeIndex, EvalError> {
    if method.is_static_initializer() {
        let ret = return_statement(arena, NodeIndex::NONE);
        let body = block(arena, vec![ret]);
        return Ok(arena.add_function(
            SyntaxKind::ClassStaticBlockDeclaration,
            0,
            0,
            FunctionData {
                name: NodeIndex::NONE,
                parameters: NodeList::new(),
                type_annotation: NodeIndex::NONE,
                body,
            },
        ));
    }

    let parameters = parameters(arena, &parameter_descriptors(method))?;
    let mut modifiers = access_modifiers(method.access_flags());

    if method.is_constructor() {
        let body = constructor_body(arena, super_parameters)?;
        let ctor = arena.add_function(
            SyntaxKind::Constructor,
            0,
            0,
            FunctionData {
                name: NodeIndex::NONE,
                parameters,
                type_annotation: NodeIndex::NONE,
                body,
            },
        );
        arena.set_modifier_flags(ctor, modifiers & !modifier_flags::STATIC);
        return Ok(ctor);
    }

    let returns = return_descriptor(method)?;
    let type_annotation = type_node(arena, &returns)?;
    let body = if method.is_abstract() && class_is_abstract {
        modifiers |= modifier_flags::ABSTRACT;
        NodeIndex::NONE
    } else {
        value_body(arena, &returns)?
    };
    let name = arena.synthesized_identifier(method.name());
    let node = arena.add_function(
        SyntaxKind::MethodDeclaration,
        0,
        0,
        FunctionData {
            name,
            parameters,
            type_annotation,
            body,
        },
    );
    arena.set_modifier_flags(node, modifiers);
    Ok(node)
}

/// `export declare function name(arg0: T0, ...): R { ... }` for one
/// overload of a module-level function.
pub(crate) fn build_global_function(
    arena: &mut NodeArena,
    method: &MethodDescriptor<'_>,
) -> Result<NodeIndex, EvalError> {
    let parameters = parameters(arena, &parameter_descriptors(method))?;
    let returns = return_descriptor(method)?;
    let type_annotation = type_node(arena, &returns)?;
    let body = value_body(arena, &returns)?;
    let name = arena.synthesized_identifier(method.name());
    let node = arena.add_function(
        SyntaxKind::FunctionDeclaration,
        0,
        0,
        FunctionData {
            name,
            parameters,
            type_annotation,
            body,
        },
    );
    arena.set_modifier_flags(node, modifier_flags::EXPORT | modifier_flags::DECLARE);
    Ok(node)
}
