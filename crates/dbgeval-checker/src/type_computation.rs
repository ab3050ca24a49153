//! Expression type computation.

use crate::class_type::SignatureInfo;
use crate::context::CompilerContext;
use crate::hook::{CheckAbort, EvalHook};
use crate::types::{TypeId, TypeKey};
use dbgeval_binder::SymbolId;
use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_common::limits::MAX_EXPR_CHECK_DEPTH;
use dbgeval_parser::{NodeIndex, SyntaxKind};
use tracing::trace;

impl CompilerContext {
    /// Type of an expression, computed once and cached per node.
    pub fn check_expression(
        &mut self,
        hook: &mut dyn EvalHook,
        expr: NodeIndex,
    ) -> Result<TypeId, CheckAbort> {
        if expr.is_none() {
            return Ok(TypeId::ERROR);
        }
        if let Some(&ty) = self.node_types.get(&expr.0) {
            return Ok(ty);
        }
        if self.expr_depth >= MAX_EXPR_CHECK_DEPTH {
            return Ok(TypeId::ERROR);
        }
        self.expr_depth += 1;
        let result = self.compute_expression_type(hook, expr);
        self.expr_depth -= 1;
        let ty = result?;
        self.node_types.insert(expr.0, ty);
        Ok(ty)
    }

    fn compute_expression_type(
        &mut self,
        hook: &mut dyn EvalHook,
        expr: NodeIndex,
    ) -> Result<TypeId, CheckAbort> {
        let Some(kind) = self.arena.kind(expr) else {
            return Ok(TypeId::ERROR);
        };
        match kind {
            SyntaxKind::NumericLiteral => Ok(self.numeric_literal_type(expr)),
            SyntaxKind::StringLiteral => Ok(TypeId::STRING),
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => Ok(TypeId::BOOLEAN),
            SyntaxKind::NullKeyword => Ok(TypeId::NULL),
            SyntaxKind::ThisKeyword => Ok(self.this_type(expr)),
            SyntaxKind::SuperKeyword => self.super_type(hook, expr),
            SyntaxKind::Identifier => match self.resolve_value_symbol(hook, expr)? {
                Some(symbol) => self.type_of_symbol(hook, symbol),
                None => Ok(TypeId::ERROR),
            },
            SyntaxKind::PropertyAccessExpression => self.check_property_access(hook, expr),
            SyntaxKind::CallExpression => self.check_call(hook, expr),
            SyntaxKind::NewExpression => self.check_new(hook, expr),
            SyntaxKind::BinaryExpression => self.check_binary(hook, expr),
            SyntaxKind::PrefixUnaryExpression => self.check_unary(hook, expr),
            SyntaxKind::ParenthesizedExpression => {
                let inner = self.wrapped_parts(expr).0;
                self.check_expression(hook, inner)
            }
            SyntaxKind::AsExpression => self.check_cast(hook, expr),
            _ => Ok(TypeId::ERROR),
        }
    }

    fn numeric_literal_type(&self, expr: NodeIndex) -> TypeId {
        let Some(literal) = self.arena.get(expr).and_then(|n| self.arena.get_literal(n)) else {
            return TypeId::ERROR;
        };
        if literal.text.contains(['.', 'e', 'E']) {
            return TypeId::DOUBLE;
        }
        match literal.text.parse::<i64>() {
            Ok(value) if i32::try_from(value).is_ok() => TypeId::INT,
            Ok(_) => TypeId::LONG,
            Err(_) => TypeId::DOUBLE,
        }
    }

    fn wrapped_parts(&self, expr: NodeIndex) -> (NodeIndex, NodeIndex) {
        self.arena
            .get(expr)
            .and_then(|n| self.arena.get_wrapped_expr(n))
            .map_or((NodeIndex::NONE, NodeIndex::NONE), |d| {
                (d.expression, d.type_node)
            })
    }

    fn enclosing_class_symbol(&self, at: NodeIndex) -> Option<SymbolId> {
        let class = self.binder.enclosing_class(&self.arena, at);
        self.binder.symbol_of_declaration(class)
    }

    // =========================================================================
    // this / super
    // =========================================================================

    fn this_type(&mut self, expr: NodeIndex) -> TypeId {
        let Some(class) = self.enclosing_class_symbol(expr) else {
            self.error_at_node_msg(expr, diagnostic_codes::THIS_OUTSIDE_CLASS, &[]);
            return TypeId::ERROR;
        };
        if self.function_stack.last().is_some_and(|f| f.is_static) {
            self.types.class_object(class)
        } else {
            self.types.class(class)
        }
    }

    fn super_type(&mut self, hook: &mut dyn EvalHook, expr: NodeIndex) -> Result<TypeId, CheckAbort> {
        let Some(class) = self.enclosing_class_symbol(expr) else {
            self.error_at_node_msg(expr, diagnostic_codes::THIS_OUTSIDE_CLASS, &[]);
            return Ok(TypeId::ERROR);
        };
        Ok(match self.class_base(hook, class)? {
            Some(base) => self.types.class(base),
            None => TypeId::ERROR,
        })
    }

    // =========================================================================
    // Member Access
    // =========================================================================

    fn check_property_access(
        &mut self,
        hook: &mut dyn EvalHook,
        expr: NodeIndex,
    ) -> Result<TypeId, CheckAbort> {
        let Some((object, name_node)) = self
            .arena
            .get(expr)
            .and_then(|n| self.arena.get_access_expr(n))
            .map(|d| (d.expression, d.name))
        else {
            return Ok(TypeId::ERROR);
        };
        let name = self
            .arena
            .identifier_text(name_node)
            .unwrap_or_default()
            .to_string();
        let object_type = self.check_expression(hook, object)?;
        if object_type.is_error() || name.is_empty() {
            return Ok(TypeId::ERROR);
        }

        let key = self.types.lookup(object_type).cloned();
        let found = match key {
            Some(TypeKey::Class(class)) => self.member_type(hook, class, &name, false)?,
            Some(TypeKey::ClassObject(class)) => self.member_type(hook, class, &name, true)?,
            Some(TypeKey::Namespace(alias)) => {
                return self.namespace_member_type(hook, name_node, alias, &name);
            }
            Some(TypeKey::Array(_)) if name == "length" => Some(TypeId::INT),
            _ if object_type == TypeId::STRING && name == "length" => Some(TypeId::INT),
            _ => None,
        };
        match found {
            Some(ty) => Ok(ty),
            None => {
                self.report_property_missing(name_node, &name, object_type);
                Ok(TypeId::ERROR)
            }
        }
    }

    fn member_type(
        &mut self,
        hook: &mut dyn EvalHook,
        class: SymbolId,
        name: &str,
        is_static: bool,
    ) -> Result<Option<TypeId>, CheckAbort> {
        if let Some(field) = self.find_field(hook, class, name, is_static)? {
            return Ok(Some(field.type_id));
        }
        Ok(self
            .find_method_owner(hook, class, name, is_static)?
            .map(|owner| self.types.method(owner, name, is_static)))
    }

    fn namespace_member_type(
        &mut self,
        hook: &mut dyn EvalHook,
        name_node: NodeIndex,
        alias: SymbolId,
        name: &str,
    ) -> Result<TypeId, CheckAbort> {
        let module = self
            .binder
            .get_symbol(alias)
            .and_then(|s| s.import_module.clone())
            .unwrap_or_default();
        let mut member = self.binder.module_export(&module, name);
        if member.is_none() {
            member = self.with_stable_state(|host| hook.find_exported_member(host, alias, name))?;
        }
        let Some(member) = member.and_then(|m| self.binder.resolve_alias(m)) else {
            self.error_at_node_msg(
                name_node,
                diagnostic_codes::MODULE_HAS_NO_EXPORTED_MEMBER,
                &[&module, name],
            );
            return Ok(TypeId::ERROR);
        };
        self.binder.record_reference(name_node, member);
        self.type_of_symbol(hook, member)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn call_parts(&self, expr: NodeIndex) -> (NodeIndex, Vec<NodeIndex>) {
        self.arena
            .get(expr)
            .and_then(|n| self.arena.get_call_expr(n))
            .map_or((NodeIndex::NONE, Vec::new()), |d| {
                (d.expression, d.arguments.nodes.clone())
            })
    }

    fn check_arguments(
        &mut self,
        hook: &mut dyn EvalHook,
        arguments: &[NodeIndex],
    ) -> Result<Vec<TypeId>, CheckAbort> {
        let mut types = Vec::with_capacity(arguments.len());
        for &argument in arguments {
            types.push(self.check_expression(hook, argument)?);
        }
        Ok(types)
    }

    fn check_call(&mut self, hook: &mut dyn EvalHook, expr: NodeIndex) -> Result<TypeId, CheckAbort> {
        let (callee, arguments) = self.call_parts(expr);
        if self.arena.kind(callee) == Some(SyntaxKind::SuperKeyword) {
            return self.check_super_call(hook, expr, &arguments);
        }
        let callee_type = self.check_expression(hook, callee)?;
        let argument_types = self.check_arguments(hook, &arguments)?;
        if callee_type.is_error() {
            return Ok(TypeId::ERROR);
        }
        let signatures = match self.types.lookup(callee_type).cloned() {
            Some(TypeKey::Method {
                class,
                name,
                is_static,
            }) => self.method_signatures(hook, class, &name, is_static)?,
            Some(TypeKey::Function(function)) => self.function_signatures(hook, function)?,
            _ => {
                let text = self.type_to_string(callee_type);
                self.error_at_node_msg(callee, diagnostic_codes::NOT_CALLABLE, &[&text]);
                return Ok(TypeId::ERROR);
            }
        };
        self.resolve_overload(hook, expr, &signatures, &arguments, &argument_types)
    }

    fn function_signatures(
        &mut self,
        hook: &mut dyn EvalHook,
        function: SymbolId,
    ) -> Result<Vec<SignatureInfo>, CheckAbort> {
        let declarations = self
            .binder
            .get_symbol(function)
            .map(|s| s.declarations.to_vec())
            .unwrap_or_default();
        let mut signatures = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            signatures.push(self.signature_of(hook, declaration)?);
        }
        Ok(signatures)
    }

    /// Pick the first signature whose arity and parameter types accept the
    /// arguments; report against the only signature, or as a failed overload set.
    fn resolve_overload(
        &mut self,
        hook: &mut dyn EvalHook,
        call: NodeIndex,
        signatures: &[SignatureInfo],
        arguments: &[NodeIndex],
        argument_types: &[TypeId],
    ) -> Result<TypeId, CheckAbort> {
        for signature in signatures {
            if signature.parameters.len() != argument_types.len() {
                continue;
            }
            let mut accepted = true;
            for (&argument, &parameter) in argument_types.iter().zip(&signature.parameters) {
                if !self.is_assignable(hook, argument, parameter)? {
                    accepted = false;
                    break;
                }
            }
            if accepted {
                trace!(call = call.0, declaration = signature.declaration.0, "overload selected");
                return Ok(signature.return_type);
            }
        }

        let [signature] = signatures else {
            self.error_at_node_msg(call, diagnostic_codes::NO_OVERLOAD_MATCHES, &[]);
            return Ok(TypeId::ERROR);
        };
        if signature.parameters.len() != argument_types.len() {
            let expected = signature.parameters.len().to_string();
            let got = argument_types.len().to_string();
            self.error_at_node_msg(call, diagnostic_codes::EXPECTED_ARGUMENTS, &[&expected, &got]);
        } else {
            for ((&argument, &argument_type), &parameter) in arguments
                .iter()
                .zip(argument_types)
                .zip(&signature.parameters)
            {
                if !self.is_assignable(hook, argument_type, parameter)? {
                    self.report_not_assignable(argument, argument_type, parameter);
                    break;
                }
            }
        }
        Ok(signature.return_type)
    }

    /// Check constructor arguments; a class without constructors takes none.
    fn check_constructor_arguments(
        &mut self,
        hook: &mut dyn EvalHook,
        call: NodeIndex,
        class: SymbolId,
        arguments: &[NodeIndex],
    ) -> Result<(), CheckAbort> {
        let argument_types = self.check_arguments(hook, arguments)?;
        let constructors = self.class_info(hook, class)?.constructors.clone();
        if constructors.is_empty() {
            if !argument_types.is_empty() {
                let got = argument_types.len().to_string();
                self.error_at_node_msg(call, diagnostic_codes::EXPECTED_ARGUMENTS, &["0", &got]);
            }
            return Ok(());
        }
        self.resolve_overload(hook, call, &constructors, arguments, &argument_types)?;
        Ok(())
    }

    fn check_super_call(
        &mut self,
        hook: &mut dyn EvalHook,
        expr: NodeIndex,
        arguments: &[NodeIndex],
    ) -> Result<TypeId, CheckAbort> {
        if !self.function_stack.last().is_some_and(|f| f.is_constructor) {
            self.error_at_node_msg(expr, diagnostic_codes::SUPER_CALL_OUTSIDE_CONSTRUCTOR, &[]);
            return Ok(TypeId::VOID);
        }
        let Some(class) = self.enclosing_class_symbol(expr) else {
            return Ok(TypeId::VOID);
        };
        if let Some(base) = self.class_base(hook, class)? {
            self.check_constructor_arguments(hook, expr, base, arguments)?;
        }
        Ok(TypeId::VOID)
    }

    fn check_new(&mut self, hook: &mut dyn EvalHook, expr: NodeIndex) -> Result<TypeId, CheckAbort> {
        let (callee, arguments) = self.call_parts(expr);
        let callee_type = self.check_expression(hook, callee)?;
        if callee_type.is_error() {
            self.check_arguments(hook, &arguments)?;
            return Ok(TypeId::ERROR);
        }
        let Some(TypeKey::ClassObject(class)) = self.types.lookup(callee_type).cloned() else {
            let text = self.type_to_string(callee_type);
            self.error_at_node_msg(callee, diagnostic_codes::NOT_CALLABLE, &[&text]);
            return Ok(TypeId::ERROR);
        };
        if self.class_info(hook, class)?.is_abstract {
            self.error_at_node_msg(expr, diagnostic_codes::CANNOT_CREATE_ABSTRACT_INSTANCE, &[]);
        }
        self.check_constructor_arguments(hook, expr, class, &arguments)?;
        Ok(self.types.class(class))
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn check_binary(&mut self, hook: &mut dyn EvalHook, expr: NodeIndex) -> Result<TypeId, CheckAbort> {
        let Some((left, operator, right)) = self
            .arena
            .get(expr)
            .and_then(|n| self.arena.get_binary_expr(n))
            .map(|d| (d.left, d.operator_token, d.right))
        else {
            return Ok(TypeId::ERROR);
        };

        if operator == SyntaxKind::EqualsToken {
            return self.check_assignment(hook, left, right);
        }

        let left_type = self.check_expression(hook, left)?;
        let right_type = self.check_expression(hook, right)?;
        if left_type.is_error() || right_type.is_error() {
            return Ok(match operator {
                SyntaxKind::PlusToken
                | SyntaxKind::MinusToken
                | SyntaxKind::AsteriskToken
                | SyntaxKind::SlashToken
                | SyntaxKind::PercentToken => TypeId::ERROR,
                _ => TypeId::BOOLEAN,
            });
        }

        let operator_text = operator.token_text().unwrap_or("?");
        match operator {
            SyntaxKind::PlusToken if left_type == TypeId::STRING || right_type == TypeId::STRING => {
                Ok(TypeId::STRING)
            }
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::SlashToken
            | SyntaxKind::PercentToken => match arithmetic_result(left_type, right_type) {
                Some(ty) => Ok(ty),
                None => {
                    self.report_operator(expr, operator_text, left_type, right_type);
                    Ok(TypeId::ERROR)
                }
            },
            SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken => {
                if !(left_type.is_numeric() && right_type.is_numeric()) {
                    self.report_operator(expr, operator_text, left_type, right_type);
                }
                Ok(TypeId::BOOLEAN)
            }
            _ => Ok(TypeId::BOOLEAN),
        }
    }

    fn check_assignment(
        &mut self,
        hook: &mut dyn EvalHook,
        left: NodeIndex,
        right: NodeIndex,
    ) -> Result<TypeId, CheckAbort> {
        if !matches!(
            self.arena.kind(left),
            Some(SyntaxKind::Identifier | SyntaxKind::PropertyAccessExpression)
        ) {
            self.error_at_node_msg(left, diagnostic_codes::INVALID_ASSIGNMENT_TARGET, &[]);
            self.check_expression(hook, right)?;
            return Ok(TypeId::ERROR);
        }
        let target = self.check_expression(hook, left)?;
        let source = self.check_expression(hook, right)?;
        if !self.is_assignable(hook, source, target)? {
            self.report_not_assignable(right, source, target);
        }
        Ok(target)
    }

    fn check_unary(&mut self, hook: &mut dyn EvalHook, expr: NodeIndex) -> Result<TypeId, CheckAbort> {
        let Some((operator, operand)) = self
            .arena
            .get(expr)
            .and_then(|n| self.arena.get_unary_expr(n))
            .map(|d| (d.operator, d.operand))
        else {
            return Ok(TypeId::ERROR);
        };
        let operand_type = self.check_expression(hook, operand)?;
        match operator {
            SyntaxKind::ExclamationToken => Ok(TypeId::BOOLEAN),
            _ if operand_type.is_error() => Ok(TypeId::ERROR),
            _ => match arithmetic_result(operand_type, operand_type) {
                Some(ty) => Ok(ty),
                None => {
                    let text = operator.token_text().unwrap_or("?");
                    self.report_operator(expr, text, operand_type, operand_type);
                    Ok(TypeId::ERROR)
                }
            },
        }
    }

    fn check_cast(&mut self, hook: &mut dyn EvalHook, expr: NodeIndex) -> Result<TypeId, CheckAbort> {
        let (inner, type_node) = self.wrapped_parts(expr);
        let source = self.check_expression(hook, inner)?;
        let target = self.type_from_type_node(hook, type_node)?;
        if !self.is_castable(hook, source, target)? {
            let from = self.type_to_string(source);
            let to = self.type_to_string(target);
            self.error_at_node_msg(
                expr,
                diagnostic_codes::CONVERSION_MAY_BE_A_MISTAKE,
                &[&from, &to],
            );
        }
        Ok(target)
    }
}

/// Binary numeric promotion: the wider operand, at least `int`.
fn arithmetic_result(left: TypeId, right: TypeId) -> Option<TypeId> {
    let rank = left.numeric_rank()?.max(right.numeric_rank()?);
    Some(match rank {
        0..=3 => TypeId::INT,
        4 => TypeId::LONG,
        5 => TypeId::FLOAT,
        _ => TypeId::DOUBLE,
    })
}
