//! Identifier and type-reference resolution, with the hook as the fallback
//! for names the scope chain does not know.

use crate::context::CompilerContext;
use crate::hook::{CheckAbort, EvalHook};
use crate::types::TypeId;
use dbgeval_binder::{SymbolId, symbol_flags};
use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_parser::{NodeIndex, SyntaxKind};
use tracing::{Level, debug, span};

impl CompilerContext {
    /// Resolve an identifier reference: recorded binding, then the scope
    /// chain, then the hook. Does not report misses.
    pub fn resolve_identifier(
        &mut self,
        hook: &mut dyn EvalHook,
        ident: NodeIndex,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        if let Some(symbol) = self.binder.resolved_reference(ident) {
            return Ok(Some(symbol));
        }
        let Some(name) = self.arena.identifier_text(ident).map(str::to_string) else {
            return Ok(None);
        };
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(symbol) = self.binder.resolve_name(&self.arena, ident, &name) {
            self.binder.record_reference(ident, symbol);
            return Ok(Some(symbol));
        }

        let _span = span!(Level::DEBUG, "hook_find_identifier", name = %name).entered();
        let found = self.with_stable_state(|host| hook.find_identifier(host, ident))?;
        if let Some(symbol) = found {
            debug!(name = %name, symbol = symbol.0, "identifier supplied by hook");
            self.binder.record_reference(ident, symbol);
        }
        Ok(found)
    }

    /// Resolve an identifier used as a value and follow import aliases.
    /// Reports a miss as `Cannot find name`.
    pub(crate) fn resolve_value_symbol(
        &mut self,
        hook: &mut dyn EvalHook,
        ident: NodeIndex,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        let Some(symbol) = self.resolve_identifier(hook, ident)? else {
            let name = self.arena.identifier_text(ident).unwrap_or_default().to_string();
            if !name.is_empty() {
                self.report_cannot_find_name(ident, &name);
            }
            return Ok(None);
        };
        Ok(self.follow_alias(ident, symbol))
    }

    /// Target of an import alias; reports a dangling alias at `at`.
    fn follow_alias(&mut self, at: NodeIndex, symbol: SymbolId) -> Option<SymbolId> {
        if let Some(target) = self.binder.resolve_alias(symbol) {
            return Some(target);
        }
        let (module, name) = self
            .binder
            .get_symbol(symbol)
            .map(|s| {
                (
                    s.import_module.clone().unwrap_or_default(),
                    s.import_name.clone().unwrap_or_default(),
                )
            })
            .unwrap_or_default();
        self.error_at_node_msg(
            at,
            diagnostic_codes::MODULE_HAS_NO_EXPORTED_MEMBER,
            &[&module, &name],
        );
        None
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Type denoted by a type node (keyword, array or class reference).
    pub fn type_from_type_node(
        &mut self,
        hook: &mut dyn EvalHook,
        node: NodeIndex,
    ) -> Result<TypeId, CheckAbort> {
        let Some(kind) = self.arena.kind(node) else {
            return Ok(TypeId::ERROR);
        };
        let ty = match kind {
            SyntaxKind::VoidKeyword => TypeId::VOID,
            SyntaxKind::NumberKeyword | SyntaxKind::DoubleKeyword => TypeId::DOUBLE,
            SyntaxKind::IntKeyword => TypeId::INT,
            SyntaxKind::LongKeyword => TypeId::LONG,
            SyntaxKind::ShortKeyword => TypeId::SHORT,
            SyntaxKind::ByteKeyword => TypeId::BYTE,
            SyntaxKind::CharKeyword => TypeId::CHAR,
            SyntaxKind::FloatKeyword => TypeId::FLOAT,
            SyntaxKind::BooleanKeyword => TypeId::BOOLEAN,
            SyntaxKind::StringKeyword => TypeId::STRING,
            SyntaxKind::ArrayType => {
                let element = self
                    .arena
                    .get(node)
                    .and_then(|n| self.arena.get_array_type(n))
                    .map_or(NodeIndex::NONE, |data| data.element_type);
                let element = self.type_from_type_node(hook, element)?;
                if element.is_error() {
                    TypeId::ERROR
                } else {
                    self.types.array(element)
                }
            }
            SyntaxKind::TypeReference => {
                let type_name = self
                    .arena
                    .get(node)
                    .and_then(|n| self.arena.get_type_ref(n))
                    .map_or(NodeIndex::NONE, |data| data.type_name);
                self.resolve_type_name(hook, type_name)?
            }
            _ => TypeId::ERROR,
        };
        self.node_types.insert(node.0, ty);
        Ok(ty)
    }

    fn resolve_type_name(
        &mut self,
        hook: &mut dyn EvalHook,
        type_name: NodeIndex,
    ) -> Result<TypeId, CheckAbort> {
        let name = self
            .arena
            .identifier_text(type_name)
            .unwrap_or_default()
            .to_string();
        let Some(symbol) = self.resolve_identifier(hook, type_name)? else {
            if !name.is_empty() {
                self.report_cannot_find_name(type_name, &name);
            }
            return Ok(TypeId::ERROR);
        };
        let Some(target) = self.follow_alias(type_name, symbol) else {
            return Ok(TypeId::ERROR);
        };
        let is_class = self
            .binder
            .get_symbol(target)
            .is_some_and(|s| s.has_any_flags(symbol_flags::CLASS));
        if !is_class {
            self.error_at_node_msg(type_name, diagnostic_codes::NOT_A_TYPE, &[&name]);
            return Ok(TypeId::ERROR);
        }
        Ok(self.types.class(target))
    }

    /// Value type of a symbol reached by a bare name.
    pub(crate) fn type_of_symbol(
        &mut self,
        hook: &mut dyn EvalHook,
        symbol: SymbolId,
    ) -> Result<TypeId, CheckAbort> {
        if let Some(&ty) = self.symbol_types.get(&symbol) {
            return Ok(ty);
        }
        let Some((flags, declaration)) = self
            .binder
            .get_symbol(symbol)
            .map(|s| (s.flags, s.value_declaration))
        else {
            return Ok(TypeId::ERROR);
        };
        let ty = if flags & symbol_flags::CLASS != 0 {
            self.types.class_object(symbol)
        } else if flags & symbol_flags::NAMESPACE_IMPORT != 0 {
            self.types.namespace(symbol)
        } else if flags & symbol_flags::FUNCTION != 0 {
            self.types.function(symbol)
        } else if flags & (symbol_flags::VARIABLE | symbol_flags::PARAMETER | symbol_flags::PROPERTY)
            != 0
        {
            if !self.symbols_in_progress.insert(symbol) {
                return Ok(TypeId::ERROR);
            }
            let declared = self.declared_type_of(hook, declaration);
            self.symbols_in_progress.remove(&symbol);
            declared?
        } else {
            TypeId::ERROR
        };
        self.symbol_types.insert(symbol, ty);
        Ok(ty)
    }

    /// Annotated type of a variable, parameter or property declaration,
    /// falling back to its initializer's type.
    pub(crate) fn declared_type_of(
        &mut self,
        hook: &mut dyn EvalHook,
        declaration: NodeIndex,
    ) -> Result<TypeId, CheckAbort> {
        let Some(node) = self.arena.get(declaration) else {
            return Ok(TypeId::ERROR);
        };
        let (annotation, initializer) = match node.kind {
            SyntaxKind::VariableDeclaration => self
                .arena
                .get_variable_declaration(node)
                .map_or((NodeIndex::NONE, NodeIndex::NONE), |d| {
                    (d.type_annotation, d.initializer)
                }),
            SyntaxKind::PropertyDeclaration => self
                .arena
                .get_property_decl(node)
                .map_or((NodeIndex::NONE, NodeIndex::NONE), |d| {
                    (d.type_annotation, d.initializer)
                }),
            SyntaxKind::Parameter => self
                .arena
                .get_parameter(node)
                .map_or((NodeIndex::NONE, NodeIndex::NONE), |d| {
                    (d.type_annotation, NodeIndex::NONE)
                }),
            _ => return Ok(TypeId::ERROR),
        };
        if annotation.is_some() {
            self.type_from_type_node(hook, annotation)
        } else if initializer.is_some() {
            self.check_expression(hook, initializer)
        } else {
            Ok(TypeId::ERROR)
        }
    }

    // =========================================================================
    // Custom Nodes
    // =========================================================================

    /// Resolution the binder cannot do on its own: class heritage and import
    /// targets. Either may reach the hook.
    pub fn handle_custom_nodes(
        &mut self,
        hook: &mut dyn EvalHook,
        node: NodeIndex,
    ) -> Result<(), CheckAbort> {
        match self.arena.kind(node) {
            Some(SyntaxKind::ClassDeclaration) => {
                if let Some(symbol) = self.binder.symbol_of_declaration(node) {
                    self.class_base(hook, symbol)?;
                }
            }
            Some(SyntaxKind::ImportDeclaration) => self.check_import_declaration(node),
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn check_import_declaration(&mut self, node: NodeIndex) {
        let Some((specifiers, module_specifier)) = self
            .arena
            .get(node)
            .and_then(|n| self.arena.get_import_decl(n))
            .map(|data| (data.specifiers.nodes.clone(), data.module_specifier))
        else {
            return;
        };
        let module = self
            .arena
            .get(module_specifier)
            .and_then(|n| self.arena.get_literal(n))
            .map(|literal| literal.text.clone())
            .unwrap_or_default();
        if self.binder.program_by_module(&module).is_none() {
            self.error_at_node_msg(
                module_specifier,
                diagnostic_codes::CANNOT_FIND_MODULE,
                &[&module],
            );
            return;
        }
        for specifier in specifiers {
            if self.arena.kind(specifier) != Some(SyntaxKind::ImportSpecifier) {
                continue;
            }
            if let Some(symbol) = self.binder.symbol_of_declaration(specifier) {
                self.follow_alias(specifier, symbol);
            }
        }
    }
}
