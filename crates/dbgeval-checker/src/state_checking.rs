//! Statement and declaration checking, and the checker entry points.

use crate::context::{CompilerContext, FunctionContext};
use crate::hook::{CheckAbort, EvalHook};
use crate::types::TypeId;
use dbgeval_binder::ProgramId;
use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_parser::parser::modifier_flags;
use dbgeval_parser::{NodeIndex, SyntaxKind};
use tracing::{Level, debug, span};

impl CompilerContext {
    // =========================================================================
    // Entry Points
    // =========================================================================

    /// Check one top-level declaration or statement. Checking the same root
    /// twice is an invariant violation and aborts.
    pub fn check_node(&mut self, hook: &mut dyn EvalHook, node: NodeIndex) -> Result<(), CheckAbort> {
        if !self.checked_nodes.insert(node.0) {
            return Err(CheckAbort::DoubleCheck(node.0));
        }
        let _span = span!(Level::DEBUG, "check_node", node = node.0).entered();
        self.enter_check(node);
        let result = self.check_statement(hook, node);
        self.leave_check();
        result
    }

    /// Bind-side resolution, reference resolution and checking of every
    /// top-level statement of `program` not checked yet.
    pub fn check_program(&mut self, hook: &mut dyn EvalHook, program: ProgramId) -> Result<(), CheckAbort> {
        let statements = self.program_statements(program);
        debug!(program = program.0, statements = statements.len(), "check_program");
        for statement in statements {
            if self.is_checked(statement) {
                continue;
            }
            self.handle_custom_nodes(hook, statement)?;
            self.binder.resolve_references(&self.arena, statement);
            // A hook call during custom-node handling may have checked it already.
            if self.is_checked(statement) {
                continue;
            }
            self.check_node(hook, statement)?;
        }
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn check_statement(
        &mut self,
        hook: &mut dyn EvalHook,
        statement: NodeIndex,
    ) -> Result<(), CheckAbort> {
        if statement.is_none() || !self.checked_statements.insert(statement.0) {
            return Ok(());
        }
        let Some(kind) = self.arena.kind(statement) else {
            return Ok(());
        };
        match kind {
            SyntaxKind::VariableStatement => {
                let declarations = self
                    .arena
                    .get(statement)
                    .and_then(|n| self.arena.get_variable(n))
                    .map(|d| d.declarations.nodes.clone())
                    .unwrap_or_default();
                for declaration in declarations {
                    self.check_variable_declaration(hook, declaration)?;
                }
            }
            SyntaxKind::ExpressionStatement => {
                let expression = self.statement_expression(statement);
                self.check_expression(hook, expression)?;
            }
            SyntaxKind::ReturnStatement => self.check_return(hook, statement)?,
            SyntaxKind::IfStatement => {
                let Some((condition, then_statement, else_statement)) = self
                    .arena
                    .get(statement)
                    .and_then(|n| self.arena.get_if_statement(n))
                    .map(|d| (d.expression, d.then_statement, d.else_statement))
                else {
                    return Ok(());
                };
                self.check_expression(hook, condition)?;
                self.check_statement(hook, then_statement)?;
                self.check_statement(hook, else_statement)?;
            }
            SyntaxKind::Block => self.check_block(hook, statement)?,
            SyntaxKind::ClassDeclaration => self.check_class_declaration(hook, statement)?,
            SyntaxKind::FunctionDeclaration => self.check_function_like(hook, statement)?,
            SyntaxKind::ImportDeclaration => self.check_import_declaration(statement),
            _ => {}
        }
        Ok(())
    }

    fn statement_expression(&self, statement: NodeIndex) -> NodeIndex {
        self.arena
            .get(statement)
            .and_then(|n| self.arena.get_expr_statement(n))
            .map_or(NodeIndex::NONE, |d| d.expression)
    }

    fn check_variable_declaration(
        &mut self,
        hook: &mut dyn EvalHook,
        declaration: NodeIndex,
    ) -> Result<(), CheckAbort> {
        let Some((annotation, initializer)) = self
            .arena
            .get(declaration)
            .and_then(|n| self.arena.get_variable_declaration(n))
            .map(|d| (d.type_annotation, d.initializer))
        else {
            return Ok(());
        };
        let annotated = if annotation.is_some() {
            Some(self.type_from_type_node(hook, annotation)?)
        } else {
            None
        };
        let initialized = if initializer.is_some() {
            Some(self.check_expression(hook, initializer)?)
        } else {
            None
        };
        if let (Some(target), Some(source)) = (annotated, initialized)
            && !self.is_assignable(hook, source, target)?
        {
            self.report_not_assignable(initializer, source, target);
        }
        let declared = annotated.or(initialized).unwrap_or(TypeId::ERROR);
        self.node_types.insert(declaration.0, declared);
        if let Some(symbol) = self.binder.symbol_of_declaration(declaration) {
            self.symbol_types.insert(symbol, declared);
        }
        Ok(())
    }

    fn check_return(&mut self, hook: &mut dyn EvalHook, statement: NodeIndex) -> Result<(), CheckAbort> {
        let expression = self.statement_expression(statement);
        let Some(function) = self.function_stack.last().copied() else {
            self.error_at_node_msg(statement, diagnostic_codes::RETURN_OUTSIDE_FUNCTION, &[]);
            if expression.is_some() {
                self.check_expression(hook, expression)?;
            }
            return Ok(());
        };
        if expression.is_none() {
            if function.return_type != TypeId::VOID && !function.is_constructor {
                self.report_not_assignable(statement, TypeId::VOID, function.return_type);
            }
            return Ok(());
        }
        let returned = self.check_expression(hook, expression)?;
        if !self.is_assignable(hook, returned, function.return_type)? {
            self.report_not_assignable(expression, returned, function.return_type);
        }
        Ok(())
    }

    /// Check a block's statements, then let the hook add its prologue and
    /// epilogue, then check whatever the hook inserted.
    fn check_block(&mut self, hook: &mut dyn EvalHook, block: NodeIndex) -> Result<(), CheckAbort> {
        for statement in self.block_statements(block) {
            self.check_statement(hook, statement)?;
        }
        self.with_stable_state(|host| hook.add_prologue_epilogue(host, block))?;
        for statement in self.block_statements(block) {
            if !self.checked_statements.contains(&statement.0) {
                self.check_statement(hook, statement)?;
            }
        }
        Ok(())
    }

    fn block_statements(&self, block: NodeIndex) -> Vec<NodeIndex> {
        self.arena
            .get(block)
            .and_then(|n| self.arena.get_block(n))
            .map(|d| d.statements.nodes.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn check_class_declaration(
        &mut self,
        hook: &mut dyn EvalHook,
        class: NodeIndex,
    ) -> Result<(), CheckAbort> {
        let Some(symbol) = self.binder.symbol_of_declaration(class) else {
            return Ok(());
        };
        let info = self.class_info(hook, symbol)?;
        let members = self
            .arena
            .get(class)
            .and_then(|n| self.arena.get_class(n))
            .map(|d| d.members.nodes.clone())
            .unwrap_or_default();
        for member in members {
            match self.arena.kind(member) {
                Some(SyntaxKind::PropertyDeclaration) => {
                    let initializer = self
                        .arena
                        .get(member)
                        .and_then(|n| self.arena.get_property_decl(n))
                        .map_or(NodeIndex::NONE, |d| d.initializer);
                    if initializer.is_none() {
                        continue;
                    }
                    let source = self.check_expression(hook, initializer)?;
                    let target = self
                        .arena
                        .declaration_name(member)
                        .and_then(|name| info.fields.get(name))
                        .map_or(TypeId::ERROR, |field| field.type_id);
                    if !self.is_assignable(hook, source, target)? {
                        self.report_not_assignable(initializer, source, target);
                    }
                }
                Some(
                    SyntaxKind::MethodDeclaration
                    | SyntaxKind::Constructor
                    | SyntaxKind::ClassStaticBlockDeclaration,
                ) => self.check_function_like(hook, member)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Parameters and body of a function, method, constructor or static block.
    fn check_function_like(
        &mut self,
        hook: &mut dyn EvalHook,
        declaration: NodeIndex,
    ) -> Result<(), CheckAbort> {
        let Some(kind) = self.arena.kind(declaration) else {
            return Ok(());
        };
        let Some((parameters, annotation, body)) = self
            .arena
            .get(declaration)
            .and_then(|n| self.arena.get_function(n))
            .map(|d| (d.parameters.nodes.clone(), d.type_annotation, d.body))
        else {
            return Ok(());
        };
        for parameter in parameters {
            let ty = self.declared_type_of(hook, parameter)?;
            self.node_types.insert(parameter.0, ty);
            if let Some(symbol) = self.binder.symbol_of_declaration(parameter) {
                self.symbol_types.insert(symbol, ty);
            }
        }
        let return_type = if annotation.is_some() {
            self.type_from_type_node(hook, annotation)?
        } else {
            TypeId::VOID
        };
        if body.is_none() {
            return Ok(());
        }
        self.function_stack.push(FunctionContext {
            return_type,
            is_constructor: kind == SyntaxKind::Constructor,
            is_static: kind == SyntaxKind::ClassStaticBlockDeclaration
                || self.arena.has_modifier(declaration, modifier_flags::STATIC),
        });
        let result = self.check_statement(hook, body);
        self.function_stack.pop();
        result
    }
}
