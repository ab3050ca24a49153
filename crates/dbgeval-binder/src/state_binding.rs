//! Declaration binding and scope creation.

use crate::{ProgramId, Scope, ScopeId, ScopeKind, Symbol, SymbolId, symbol_flags};
use dbgeval_common::diagnostics::{Diagnostic, diagnostic_codes};
use dbgeval_parser::parser::node::NodeArena;
use dbgeval_parser::parser::{modifier_flags, node_flags};
use dbgeval_parser::{NodeIndex, SyntaxKind};
use tracing::{debug, trace};

use super::state::BinderState;

impl BinderState {
    /// Bind every top-level statement of a program.
    pub fn bind_program(&mut self, arena: &NodeArena, program: ProgramId) {
        let Some(source_file) = self.program(program).map(|p| p.source_file) else {
            return;
        };
        let statements = arena
            .get(source_file)
            .and_then(|node| arena.get_source_file(node))
            .map(|data| data.statements.nodes.clone())
            .unwrap_or_default();
        debug!(program = program.0, statements = statements.len(), "bind_program");
        for statement in statements {
            self.bind_top_level(arena, program, statement);
        }
    }

    /// Bind one top-level statement of `program` (statements appended after the
    /// initial bind go through here). Binding the same statement twice is a no-op.
    /// Returns the symbol the statement declares, if any.
    pub fn bind_top_level(
        &mut self,
        arena: &NodeArena,
        program: ProgramId,
        statement: NodeIndex,
    ) -> SymbolId {
        if !self.bound_statements.insert(statement.0) {
            return self.declared_symbol_of(arena, statement);
        }
        let scope = self.program_scope(program);
        self.with_scope(scope, |binder| binder.bind_statement(arena, statement))
    }

    /// Bind a statement into an explicit scope (used for statements inserted into
    /// an existing block).
    pub fn bind_in_scope(
        &mut self,
        arena: &NodeArena,
        scope: ScopeId,
        statement: NodeIndex,
    ) -> SymbolId {
        if !self.bound_statements.insert(statement.0) {
            return self.declared_symbol_of(arena, statement);
        }
        self.with_scope(scope, |binder| binder.bind_statement(arena, statement))
    }

    /// The symbol an already-bound statement declared.
    fn declared_symbol_of(&self, arena: &NodeArena, statement: NodeIndex) -> SymbolId {
        let declaration = match arena.get(statement) {
            Some(node) if node.kind == SyntaxKind::VariableStatement => arena
                .get_variable(node)
                .and_then(|data| data.declarations.nodes.first().copied())
                .unwrap_or(NodeIndex::NONE),
            Some(node) if node.kind == SyntaxKind::ImportDeclaration => arena
                .get_import_decl(node)
                .and_then(|data| data.specifiers.nodes.first().copied())
                .unwrap_or(NodeIndex::NONE),
            Some(_) => statement,
            None => NodeIndex::NONE,
        };
        self.symbol_of_declaration(declaration)
            .unwrap_or(SymbolId::NONE)
    }

    fn current_program(&self) -> Option<ProgramId> {
        self.scope(self.current_scope_id)
            .and_then(|scope| scope.program)
    }

    fn enter_scope(&mut self, kind: ScopeKind, node: NodeIndex) -> ScopeId {
        let program = self.current_program();
        self.push_scope(Scope::new(self.current_scope_id, kind, node, program))
    }

    /// Declare `name` in the current scope. Overloadable declarations of the
    /// same kind merge into one symbol; anything else is a duplicate.
    pub(crate) fn declare_symbol(
        &mut self,
        arena: &NodeArena,
        name: &str,
        flags: u32,
        declaration: NodeIndex,
    ) -> SymbolId {
        let scope_id = self.current_scope_id;
        let program = self.current_program();
        let existing = self.scope(scope_id).and_then(|s| s.table.get(name));

        if let Some(existing) = existing
            && let Some(symbol) = self.symbols.get_mut(existing)
        {
            let kind_mask = symbol_flags::OVERLOADABLE;
            if symbol.flags & kind_mask != 0 && symbol.flags & kind_mask == flags & kind_mask {
                symbol.add_declaration(declaration);
                self.node_symbols.insert(declaration.0, existing);
                trace!(name, symbol = existing.0, "merged overload declaration");
                return existing;
            }
            self.report_duplicate(arena, declaration, name);
            // Keep the first declaration visible; the duplicate gets a detached symbol.
            let mut detached = Symbol::new(flags, name);
            detached.program = program;
            detached.add_declaration(declaration);
            let id = self.symbols.alloc(detached);
            self.node_symbols.insert(declaration.0, id);
            return id;
        }

        let mut symbol = Symbol::new(flags, name);
        symbol.program = program;
        symbol.add_declaration(declaration);
        let id = self.symbols.alloc(symbol);
        if let Some(scope) = self.scopes.get_mut(scope_id.0 as usize) {
            scope.table.set(name.to_string(), id);
        }
        self.node_symbols.insert(declaration.0, id);
        trace!(name, symbol = id.0, scope = scope_id.0, flags, "declared symbol");
        id
    }

    fn report_duplicate(&mut self, arena: &NodeArena, declaration: NodeIndex, name: &str) {
        let file = self
            .current_program()
            .and_then(|id| self.program(id))
            .map(|p| p.file_path.clone())
            .unwrap_or_default();
        let (start, length) = arena
            .get(declaration)
            .map_or((0, 0), |node| (node.pos, node.end.saturating_sub(node.pos)));
        debug!(name, file = %file, "duplicate identifier");
        self.diagnostics.push(Diagnostic::from_code(
            file,
            start,
            length,
            diagnostic_codes::DUPLICATE_IDENTIFIER,
            &[name],
        ));
    }

    fn set_exported(&mut self, symbol: SymbolId, exported: bool) {
        if exported && let Some(data) = self.symbols.get_mut(symbol) {
            data.is_exported = true;
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn bind_statement(&mut self, arena: &NodeArena, idx: NodeIndex) -> SymbolId {
        let Some(node) = arena.get(idx) else {
            return SymbolId::NONE;
        };
        let exported = arena.has_modifier(idx, modifier_flags::EXPORT);
        match node.kind {
            SyntaxKind::VariableStatement => {
                let Some(data) = arena.get_variable(node) else {
                    return SymbolId::NONE;
                };
                let mut flags = symbol_flags::VARIABLE;
                if node.has_flag(node_flags::CONST) {
                    flags |= symbol_flags::CONST;
                }
                let mut first = SymbolId::NONE;
                for declaration in data.declarations.iter() {
                    let Some(name) = arena.declaration_name(declaration) else {
                        continue;
                    };
                    if name.is_empty() {
                        continue;
                    }
                    let symbol = self.declare_symbol(arena, name, flags, declaration);
                    self.set_exported(symbol, exported);
                    if first.is_none() {
                        first = symbol;
                    }
                }
                first
            }
            SyntaxKind::FunctionDeclaration => {
                let symbol = match arena.declaration_name(idx) {
                    Some(name) if !name.is_empty() => {
                        self.declare_symbol(arena, name, symbol_flags::FUNCTION, idx)
                    }
                    _ => SymbolId::NONE,
                };
                self.set_exported(symbol, exported);
                self.bind_function_like(arena, idx);
                symbol
            }
            SyntaxKind::ClassDeclaration => self.bind_class(arena, idx, exported),
            SyntaxKind::ImportDeclaration => self.bind_import(arena, idx),
            SyntaxKind::Block => {
                self.bind_block(arena, idx);
                SymbolId::NONE
            }
            SyntaxKind::IfStatement => {
                if let Some(data) = arena.get_if_statement(node) {
                    let (then_statement, else_statement) = (data.then_statement, data.else_statement);
                    self.bind_statement(arena, then_statement);
                    self.bind_statement(arena, else_statement);
                }
                SymbolId::NONE
            }
            _ => SymbolId::NONE,
        }
    }

    fn bind_block(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(data) = arena.get(idx).and_then(|node| arena.get_block(node)) else {
            return;
        };
        let statements = data.statements.nodes.clone();
        let scope = self.enter_scope(ScopeKind::Block, idx);
        self.with_scope(scope, |binder| {
            for statement in statements {
                binder.bind_statement(arena, statement);
            }
        });
    }

    /// Parameters and body of a function, method, constructor or static block.
    fn bind_function_like(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(data) = arena.get(idx).and_then(|node| arena.get_function(node)) else {
            return;
        };
        let parameters = data.parameters.nodes.clone();
        let body = data.body;
        let scope = self.enter_scope(ScopeKind::Function, idx);
        if body.is_some() {
            self.node_scope_ids.insert(body.0, scope);
        }
        self.with_scope(scope, |binder| {
            for parameter in parameters {
                if let Some(name) = arena.declaration_name(parameter)
                    && !name.is_empty()
                {
                    binder.declare_symbol(arena, name, symbol_flags::PARAMETER, parameter);
                }
            }
            let statements = arena
                .get(body)
                .and_then(|node| arena.get_block(node))
                .map(|block| block.statements.nodes.clone())
                .unwrap_or_default();
            for statement in statements {
                binder.bind_statement(arena, statement);
            }
        });
    }

    fn bind_class(&mut self, arena: &NodeArena, idx: NodeIndex, exported: bool) -> SymbolId {
        let Some(data) = arena.get(idx).and_then(|node| arena.get_class(node)) else {
            return SymbolId::NONE;
        };
        let members = data.members.nodes.clone();
        let mut flags = symbol_flags::CLASS;
        if arena.has_modifier(idx, modifier_flags::ABSTRACT) {
            flags |= symbol_flags::ABSTRACT;
        }
        let class_symbol = match arena.declaration_name(idx) {
            Some(name) if !name.is_empty() => self.declare_symbol(arena, name, flags, idx),
            _ => SymbolId::NONE,
        };
        self.set_exported(class_symbol, exported);

        let scope = self.enter_scope(ScopeKind::Class, idx);
        self.with_scope(scope, |binder| {
            for member in members {
                binder.bind_class_member(arena, member, class_symbol);
            }
        });
        class_symbol
    }

    fn bind_class_member(&mut self, arena: &NodeArena, member: NodeIndex, class_symbol: SymbolId) {
        let Some(node) = arena.get(member) else {
            return;
        };
        let mut flags = match node.kind {
            SyntaxKind::PropertyDeclaration => symbol_flags::PROPERTY,
            SyntaxKind::MethodDeclaration => symbol_flags::METHOD,
            SyntaxKind::Constructor => symbol_flags::CONSTRUCTOR,
            SyntaxKind::ClassStaticBlockDeclaration => {
                self.bind_function_like(arena, member);
                return;
            }
            _ => return,
        };
        if arena.has_modifier(member, modifier_flags::STATIC) {
            flags |= symbol_flags::STATIC;
        }
        if arena.has_modifier(member, modifier_flags::ABSTRACT) {
            flags |= symbol_flags::ABSTRACT;
        }
        if let Some(name) = arena.declaration_name(member)
            && !name.is_empty()
        {
            let symbol = self.declare_symbol(arena, name, flags, member);
            if let Some(data) = self.symbols.get_mut(symbol) {
                data.parent = class_symbol;
            }
        }
        if node.kind != SyntaxKind::PropertyDeclaration {
            self.bind_function_like(arena, member);
        }
    }

    fn bind_import(&mut self, arena: &NodeArena, idx: NodeIndex) -> SymbolId {
        let Some(data) = arena.get(idx).and_then(|node| arena.get_import_decl(node)) else {
            return SymbolId::NONE;
        };
        let module = arena
            .get(data.module_specifier)
            .and_then(|node| arena.get_literal(node))
            .map(|literal| literal.text.clone())
            .unwrap_or_default();
        let mut first = SymbolId::NONE;
        for specifier in data.specifiers.iter() {
            let Some(spec_node) = arena.get(specifier) else {
                continue;
            };
            let Some(spec) = arena.get_specifier(spec_node) else {
                continue;
            };
            let Some(local_name) = arena.identifier_text(spec.name) else {
                continue;
            };
            let (flags, import_name) = if spec_node.kind == SyntaxKind::NamespaceImport {
                (
                    symbol_flags::ALIAS | symbol_flags::NAMESPACE_IMPORT,
                    "*".to_string(),
                )
            } else {
                let imported = arena
                    .identifier_text(spec.property_name)
                    .unwrap_or(local_name);
                (symbol_flags::ALIAS, imported.to_string())
            };
            let symbol = self.declare_symbol(arena, local_name, flags, specifier);
            if let Some(alias) = self.symbols.get_mut(symbol) {
                alias.import_module = Some(module.clone());
                alias.import_name = Some(import_name);
            }
            debug!(local = local_name, module = %module, "bound import alias");
            if first.is_none() {
                first = symbol;
            }
        }
        first
    }
}
