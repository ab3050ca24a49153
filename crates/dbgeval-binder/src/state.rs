//! Binder state: programs, scopes and name lookup.

use crate::{Program, ProgramId, Scope, ScopeId, ScopeKind, Symbol, SymbolArena, SymbolId, symbol_flags};
use dbgeval_common::diagnostics::Diagnostic;
use dbgeval_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use dbgeval_parser::parser::node::NodeArena;
use dbgeval_parser::{NodeIndex, SyntaxKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{Level, debug, span, trace};

/// Counters for name lookups, reported with evaluation statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub attempts: u64,
    pub scope_hits: u64,
    pub misses: u64,
}

/// Session-wide binder state.
pub struct BinderState {
    pub symbols: SymbolArena,
    pub scopes: Vec<Scope>,
    pub programs: Vec<Program>,
    /// Prelude scope; parent of every module scope.
    pub global_scope: ScopeId,
    /// Map from AST node (that creates a scope) to its ScopeId
    pub node_scope_ids: FxHashMap<u32, ScopeId>,
    /// Declaration node to its symbol
    pub node_symbols: FxHashMap<u32, SymbolId>,
    /// Identifier reference to the symbol it resolved to
    pub resolved_references: FxHashMap<u32, SymbolId>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ResolutionStats,
    pub(crate) program_by_module: FxHashMap<String, ProgramId>,
    pub(crate) program_by_source_file: FxHashMap<u32, ProgramId>,
    /// Top-level statements already bound (binding is idempotent per statement).
    pub(crate) bound_statements: FxHashSet<u32>,
    pub(crate) current_scope_id: ScopeId,
}

impl Default for BinderState {
    fn default() -> Self {
        Self::new()
    }
}

impl BinderState {
    pub fn new() -> BinderState {
        let mut binder = BinderState {
            symbols: SymbolArena::new(),
            scopes: Vec::new(),
            programs: Vec::new(),
            global_scope: ScopeId::NONE,
            node_scope_ids: FxHashMap::default(),
            node_symbols: FxHashMap::default(),
            resolved_references: FxHashMap::default(),
            diagnostics: Vec::new(),
            stats: ResolutionStats::default(),
            program_by_module: FxHashMap::default(),
            program_by_source_file: FxHashMap::default(),
            bound_statements: FxHashSet::default(),
            current_scope_id: ScopeId::NONE,
        };
        binder.global_scope = binder.push_scope(Scope::new(
            ScopeId::NONE,
            ScopeKind::Global,
            NodeIndex::NONE,
            None,
        ));
        binder.current_scope_id = binder.global_scope;
        binder
    }

    pub(crate) fn push_scope(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        if scope.node.is_some() {
            self.node_scope_ids.insert(scope.node.0, id);
        }
        self.scopes.push(scope);
        id
    }

    // =========================================================================
    // Programs
    // =========================================================================

    /// Register a program for `source_file` with its own module scope.
    pub fn create_program(
        &mut self,
        arena: &NodeArena,
        source_file: NodeIndex,
        file_path: &str,
    ) -> ProgramId {
        self.register_program(arena, source_file, file_path, false)
    }

    /// Register the prelude program; its declarations go straight into the global scope.
    pub fn create_prelude_program(
        &mut self,
        arena: &NodeArena,
        source_file: NodeIndex,
        file_path: &str,
    ) -> ProgramId {
        self.register_program(arena, source_file, file_path, true)
    }

    fn register_program(
        &mut self,
        arena: &NodeArena,
        source_file: NodeIndex,
        file_path: &str,
        prelude: bool,
    ) -> ProgramId {
        let id = ProgramId(self.programs.len() as u32);
        let module_name = arena
            .get(source_file)
            .and_then(|node| arena.get_source_file(node))
            .map(|data| data.module_name.clone())
            .unwrap_or_default();
        let scope = if prelude {
            self.node_scope_ids.insert(source_file.0, self.global_scope);
            if let Some(global) = self.scopes.get_mut(self.global_scope.0 as usize) {
                global.node = source_file;
                global.program = Some(id);
            }
            self.global_scope
        } else {
            self.push_scope(Scope::new(
                self.global_scope,
                ScopeKind::Module,
                source_file,
                Some(id),
            ))
        };
        debug!(
            program = id.0,
            module = %module_name,
            file = %file_path,
            prelude,
            "create_program"
        );
        self.program_by_module.insert(module_name.clone(), id);
        self.program_by_source_file.insert(source_file.0, id);
        self.programs.push(Program {
            id,
            source_file,
            module_name,
            file_path: file_path.to_string(),
            scope,
        });
        id
    }

    #[inline]
    pub fn program(&self, id: ProgramId) -> Option<&Program> {
        self.programs.get(id.0 as usize)
    }

    pub fn program_by_module(&self, module_name: &str) -> Option<ProgramId> {
        self.program_by_module.get(module_name).copied()
    }

    /// The program containing `node`.
    pub fn program_of_node(&self, arena: &NodeArena, node: NodeIndex) -> Option<ProgramId> {
        let source_file = arena.source_file_of(node)?;
        self.program_by_source_file.get(&source_file.0).copied()
    }

    pub fn program_scope(&self, id: ProgramId) -> ScopeId {
        self.program(id).map_or(ScopeId::NONE, |program| program.scope)
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    #[inline]
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        if id.is_none() {
            None
        } else {
            self.scopes.get(id.0 as usize)
        }
    }

    #[inline]
    pub fn current_scope(&self) -> ScopeId {
        self.current_scope_id
    }

    /// Run `body` with `scope` as the current scope, restoring the previous one after.
    pub fn with_scope<R, F>(&mut self, scope: ScopeId, body: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let prev = self.current_scope_id;
        self.current_scope_id = scope;
        let result = body(self);
        self.current_scope_id = prev;
        result
    }

    /// Find the enclosing scope for a given node by walking up the AST.
    /// Returns the ScopeId of the nearest scope-creating ancestor node.
    pub fn find_enclosing_scope(&self, arena: &NodeArena, node_idx: NodeIndex) -> ScopeId {
        let mut current = node_idx;
        let mut iterations = 0usize;
        while current.is_some() && iterations < MAX_SCOPE_WALK_ITERATIONS {
            iterations += 1;
            if let Some(&scope_id) = self.node_scope_ids.get(&current.0) {
                return scope_id;
            }
            current = arena.parent_of(current);
        }
        self.global_scope
    }

    /// Nearest enclosing class declaration node of `node`.
    pub fn enclosing_class(&self, arena: &NodeArena, node: NodeIndex) -> NodeIndex {
        arena
            .find_ancestor(node, SyntaxKind::ClassDeclaration)
            .unwrap_or(NodeIndex::NONE)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Look `name` up starting at `scope`, walking parents. Class scopes are
    /// skipped: members are only reachable through `this` or the class name.
    pub fn resolve_name_in_scope(&mut self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.stats.attempts += 1;
        let mut current = scope;
        let mut iterations = 0usize;
        while let Some(scope_data) = self.scope(current) {
            iterations += 1;
            if iterations > MAX_SCOPE_WALK_ITERATIONS {
                break;
            }
            let hit = if scope_data.kind == ScopeKind::Class {
                None
            } else {
                scope_data.table.get(name)
            };
            let parent = scope_data.parent;
            if let Some(symbol) = hit {
                self.stats.scope_hits += 1;
                trace!(name, scope = current.0, symbol = symbol.0, "resolved in scope");
                return Some(symbol);
            }
            current = parent;
        }
        self.stats.misses += 1;
        None
    }

    /// Resolve a bare name as seen from `at`.
    pub fn resolve_name(&mut self, arena: &NodeArena, at: NodeIndex, name: &str) -> Option<SymbolId> {
        let scope = self.find_enclosing_scope(arena, at);
        self.resolve_name_in_scope(scope, name)
    }

    /// Symbol declared directly in a program's module scope.
    pub fn program_local(&self, program: ProgramId, name: &str) -> Option<SymbolId> {
        self.scope(self.program_scope(program))?.table.get(name)
    }

    /// Exported top-level symbol of the program registered under `module_name`.
    pub fn module_export(&self, module_name: &str, name: &str) -> Option<SymbolId> {
        let program = self.program_by_module(module_name)?;
        let symbol = self.program_local(program, name)?;
        self.symbols
            .get(symbol)
            .filter(|s| s.is_exported)
            .map(|_| symbol)
    }

    /// Follow import aliases to the exported declaration. Namespace imports
    /// resolve to themselves. Returns `None` for a dangling alias.
    pub fn resolve_alias(&self, symbol: SymbolId) -> Option<SymbolId> {
        let _span = span!(Level::DEBUG, "resolve_alias", symbol = symbol.0).entered();
        let mut visited = FxHashSet::default();
        let mut current = symbol;
        loop {
            if !visited.insert(current) {
                debug!(symbol = symbol.0, "alias cycle");
                return None;
            }
            let data = self.symbols.get(current)?;
            if !data.has_any_flags(symbol_flags::ALIAS)
                || data.has_any_flags(symbol_flags::NAMESPACE_IMPORT)
            {
                return Some(current);
            }
            let module = data.import_module.as_deref()?;
            let name = data.import_name.as_deref()?;
            current = self.module_export(module, name)?;
        }
    }

    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Symbol recorded for a declaration node.
    pub fn symbol_of_declaration(&self, node: NodeIndex) -> Option<SymbolId> {
        self.node_symbols.get(&node.0).copied()
    }

    /// Symbol recorded for a resolved identifier reference.
    pub fn resolved_reference(&self, node: NodeIndex) -> Option<SymbolId> {
        self.resolved_references.get(&node.0).copied()
    }

    pub fn record_reference(&mut self, node: NodeIndex, symbol: SymbolId) {
        self.resolved_references.insert(node.0, symbol);
    }
}
