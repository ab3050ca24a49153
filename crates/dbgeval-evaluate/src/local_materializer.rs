//! Live local variables of the suspended frame.
//!
//! A reference to a local of the breakpoint's method becomes a declaration
//! that reads the local's register at the top of the enclosing block, and a
//! write-back that stores it again at the bottom:
//!
//! ```text
//! let count: int = DebuggerAPI.getLocalInt(3);
//! ...user statements...
//! DebuggerAPI.setLocalInt(3, count);
//! ```
//!
//! Reference-typed reads come back as `Object` and are cast to the declared
//! type. The statements are queued per block and inserted once the checker
//! has finished the block's own statements.

use crate::error::EvalError;
use crate::method_builder::{accessor_call, int_literal};
use crate::plugin::ScopedDebugInfoPlugin;
use crate::type_translation::{AccessorTag, parse_descriptor, type_node};
use dbgeval_binder::SymbolId;
use dbgeval_checker::CompilerContext;
use dbgeval_debuginfo::LocalVariable;
use dbgeval_parser::parser::node::{
    ExprStatementData, VariableData, VariableDeclarationData, WrappedExprData,
};
use dbgeval_parser::parser::node_flags;
use dbgeval_parser::{NodeIndex, NodeList, SyntaxKind};
use tracing::{debug, trace};

/// A local-variable table entry, detached from its binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveVariable {
    pub name: String,
    pub type_descriptor: String,
    pub register: u32,
    pub start_offset: u32,
    pub length: u32,
}

impl LiveVariable {
    pub fn covers(&self, offset: u32) -> bool {
        offset >= self.start_offset && offset - self.start_offset < self.length
    }
}

impl From<&LocalVariable<'_>> for LiveVariable {
    fn from(local: &LocalVariable<'_>) -> Self {
        LiveVariable {
            name: local.name.to_string(),
            type_descriptor: local.type_descriptor.to_string(),
            register: local.register,
            start_offset: local.start_offset,
            length: local.length,
        }
    }
}

/// The variable named `name` live at `offset`. Of several candidates the
/// one whose range starts last (the innermost scope) wins.
pub(crate) fn find_live_variable<'a>(
    locals: &'a [LiveVariable],
    name: &str,
    offset: u32,
) -> Option<&'a LiveVariable> {
    locals
        .iter()
        .filter(|local| local.name == name && local.covers(offset))
        .fold(None, |best: Option<&LiveVariable>, local| match best {
            Some(best) if best.start_offset >= local.start_offset => Some(best),
            _ => Some(local),
        })
}

/// Statements waiting to be inserted into one block, in demand order.
#[derive(Clone, Debug, Default)]
pub(crate) struct PrologueEpilogue {
    pub prologue: Vec<NodeIndex>,
    pub epilogue: Vec<NodeIndex>,
}

impl ScopedDebugInfoPlugin {
    /// Declare the live local `ident` names, if there is one, in the block
    /// enclosing `ident`.
    pub(crate) fn create_local_var_decl(
        &mut self,
        host: &mut CompilerContext,
        ident: NodeIndex,
    ) -> Result<Option<SymbolId>, EvalError> {
        let Some(name) = host.arena.identifier_text(ident).map(str::to_string) else {
            return Ok(None);
        };
        let offset = self.context.bytecode_offset;
        let Some(local) = find_live_variable(&self.locals, &name, offset).cloned() else {
            return Ok(None);
        };
        let Some(block) = host.arena.find_ancestor(ident, SyntaxKind::Block) else {
            return Ok(None);
        };

        let descriptor = parse_descriptor(&local.type_descriptor)?;
        let Some(tag) = AccessorTag::of(&descriptor) else {
            return Err(EvalError::UntranslatableType {
                descriptor: local.type_descriptor.clone(),
            });
        };

        let arena = &mut host.arena;

        let register = int_literal(arena, local.register);
        let mut initializer = accessor_call(arena, &tag.getter(), vec![register]);
        if tag.needs_cast() {
            let cast_type = type_node(arena, &descriptor)?;
            initializer = arena.add_wrapped_expr(
                SyntaxKind::AsExpression,
                0,
                0,
                WrappedExprData {
                    expression: initializer,
                    type_node: cast_type,
                },
            );
        }
        let declared_name = arena.synthesized_identifier(&local.name);
        let type_annotation = type_node(arena, &descriptor)?;
        let declaration = arena.add_variable_declaration(
            0,
            0,
            VariableDeclarationData {
                name: declared_name,
                type_annotation,
                initializer,
            },
        );
        let read = arena.add_variable(
            0,
            0,
            node_flags::LET,
            VariableData {
                declarations: NodeList::from_vec(vec![declaration]),
            },
        );

        let register = int_literal(arena, local.register);
        let value = arena.synthesized_identifier(&local.name);
        let store_call = accessor_call(arena, &tag.setter(), vec![register, value]);
        let write_back = arena.add_expr_statement(
            SyntaxKind::ExpressionStatement,
            0,
            0,
            ExprStatementData {
                expression: store_call,
            },
        );

        for statement in [read, write_back] {
            arena.strip_positions(statement);
            arena.reparent(statement, block);
        }

        let scope = host.binder.find_enclosing_scope(&host.arena, block);
        let symbol = host.binder.bind_in_scope(&host.arena, scope, read);
        let pending = self.pending_blocks.entry(block.0).or_default();
        pending.prologue.push(read);
        pending.epilogue.push(write_back);
        self.stats.locals += 1;
        debug!(
            %name,
            register = local.register,
            descriptor = %local.type_descriptor,
            block = block.0,
            "materialized live local"
        );
        Ok(symbol.is_some().then_some(symbol))
    }

    /// Insert the statements queued for `block`. Runs once per block, after
    /// the checker has gone through the block's own statements.
    pub(crate) fn flush_prologue_epilogue(&mut self, host: &mut CompilerContext, block: NodeIndex) {
        let Some(pending) = self.pending_blocks.remove(&block.0) else {
            return;
        };
        trace!(
            block = block.0,
            prologue = pending.prologue.len(),
            epilogue = pending.epilogue.len(),
            "flushing prologue/epilogue"
        );
        host.arena
            .insert_block_statements(block, &pending.prologue, &pending.epilogue);
    }
}
