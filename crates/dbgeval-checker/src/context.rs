//! Compiler context: the host state an evaluation session drives.
//!
//! One context owns the node arena, the binder and the checker's caches for
//! every program of a session. Checker entry points are `impl CompilerContext`
//! blocks spread over the sibling modules.

use crate::class_type::ClassInfo;
use crate::types::{TypeId, TypeInterner};
use dbgeval_binder::{BinderState, ProgramId, SymbolId, symbol_flags};
use dbgeval_common::diagnostics::Diagnostic;
use dbgeval_parser::parser::node::{NodeArena, SourceFileData};
use dbgeval_parser::{NodeIndex, NodeList, parse_source};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::debug;

/// The function-like declaration whose body is being checked.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FunctionContext {
    pub return_type: TypeId,
    pub is_constructor: bool,
    pub is_static: bool,
}

pub struct CompilerContext {
    pub arena: NodeArena,
    pub binder: BinderState,
    pub types: TypeInterner,
    pub diagnostics: Vec<Diagnostic>,
    pub(crate) function_stack: Vec<FunctionContext>,
    /// Roots passed to `check_node`.
    pub(crate) checked_nodes: FxHashSet<u32>,
    /// Every statement checked, nested ones included.
    pub(crate) checked_statements: FxHashSet<u32>,
    pub(crate) class_infos: FxHashMap<SymbolId, Rc<ClassInfo>>,
    /// Validated (acyclic) direct superclass of each class.
    pub(crate) class_bases: FxHashMap<SymbolId, Option<SymbolId>>,
    /// Circularity guard for class resolution.
    pub(crate) classes_in_progress: FxHashSet<SymbolId>,
    pub(crate) symbol_types: FxHashMap<SymbolId, TypeId>,
    pub(crate) symbols_in_progress: FxHashSet<SymbolId>,
    pub(crate) node_types: FxHashMap<u32, TypeId>,
    /// (node, code) pairs already reported.
    pub(crate) reported: FxHashSet<(u32, u32)>,
    pub(crate) expr_depth: u32,
    check_depth: u32,
    max_check_depth: u32,
    check_order: Vec<NodeIndex>,
}

impl Default for CompilerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerContext {
    pub fn new() -> CompilerContext {
        CompilerContext {
            arena: NodeArena::new(),
            binder: BinderState::new(),
            types: TypeInterner::new(),
            diagnostics: Vec::new(),
            function_stack: Vec::new(),
            checked_nodes: FxHashSet::default(),
            checked_statements: FxHashSet::default(),
            class_infos: FxHashMap::default(),
            class_bases: FxHashMap::default(),
            classes_in_progress: FxHashSet::default(),
            symbol_types: FxHashMap::default(),
            symbols_in_progress: FxHashSet::default(),
            node_types: FxHashMap::default(),
            reported: FxHashSet::default(),
            expr_depth: 0,
            check_depth: 0,
            max_check_depth: 0,
            check_order: Vec::new(),
        }
    }

    // =========================================================================
    // Programs
    // =========================================================================

    /// Parse and bind prelude declarations into the global scope.
    pub fn add_prelude(&mut self, file_path: &str, text: &str) -> ProgramId {
        let (root, parse_diagnostics) = parse_source(&mut self.arena, file_path, "", text);
        self.diagnostics.extend(parse_diagnostics);
        let program = self
            .binder
            .create_prelude_program(&self.arena, root, file_path);
        self.binder.bind_program(&self.arena, program);
        program
    }

    /// Parse and bind a source file as its own program.
    pub fn add_source(&mut self, file_path: &str, module_name: &str, text: &str) -> ProgramId {
        let (root, parse_diagnostics) = parse_source(&mut self.arena, file_path, module_name, text);
        self.diagnostics.extend(parse_diagnostics);
        let program = self.binder.create_program(&self.arena, root, file_path);
        self.binder.bind_program(&self.arena, program);
        program
    }

    /// A program with no statements; declarations are appended later.
    pub fn create_empty_program(&mut self, file_path: &str, module_name: &str) -> ProgramId {
        let root = self.arena.add_source_file(
            0,
            0,
            SourceFileData {
                file_name: file_path.to_string(),
                module_name: module_name.to_string(),
                statements: NodeList::new(),
            },
        );
        debug!(file = %file_path, module = %module_name, "create_empty_program");
        self.binder.create_program(&self.arena, root, file_path)
    }

    /// Append a top-level statement to `program` and bind it.
    pub fn append_statement(&mut self, program: ProgramId, statement: NodeIndex) -> SymbolId {
        let Some(source_file) = self.binder.program(program).map(|p| p.source_file) else {
            return SymbolId::NONE;
        };
        if !self.arena.push_statement(source_file, statement) {
            return SymbolId::NONE;
        }
        self.binder.bind_top_level(&self.arena, program, statement)
    }

    /// Top-level statements of a program, in order.
    pub fn program_statements(&self, program: ProgramId) -> Vec<NodeIndex> {
        self.binder
            .program(program)
            .and_then(|p| self.arena.get(p.source_file))
            .and_then(|node| self.arena.get_source_file(node))
            .map(|data| data.statements.nodes.clone())
            .unwrap_or_default()
    }

    /// The prelude `Object` class, top of every class hierarchy.
    pub fn object_class(&self) -> Option<SymbolId> {
        let global = self.binder.scope(self.binder.global_scope)?;
        let symbol = global.table.get("Object")?;
        self.binder
            .get_symbol(symbol)
            .filter(|s| s.has_any_flags(symbol_flags::CLASS))
            .map(|_| symbol)
    }

    // =========================================================================
    // Reentrancy
    // =========================================================================

    /// Run `body` with the per-check traversal state cleared, restoring it
    /// afterwards. Synthesis triggered from inside a check goes through here
    /// so nested declaration checks start from a clean context.
    pub fn with_stable_state<R, F>(&mut self, body: F) -> R
    where
        F: FnOnce(&mut CompilerContext) -> R,
    {
        let saved_functions = std::mem::take(&mut self.function_stack);
        let saved_depth = std::mem::replace(&mut self.expr_depth, 0);
        let result = body(self);
        self.function_stack = saved_functions;
        self.expr_depth = saved_depth;
        result
    }

    pub(crate) fn enter_check(&mut self, node: NodeIndex) {
        self.check_depth += 1;
        self.max_check_depth = self.max_check_depth.max(self.check_depth);
        self.check_order.push(node);
    }

    pub(crate) fn leave_check(&mut self) {
        self.check_depth = self.check_depth.saturating_sub(1);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_checked(&self, node: NodeIndex) -> bool {
        self.checked_nodes.contains(&node.0)
    }

    /// Roots in the order `check_node` received them.
    pub fn check_order(&self) -> &[NodeIndex] {
        &self.check_order
    }

    /// Deepest nesting of `check_node` calls seen so far.
    pub fn max_check_depth(&self) -> u32 {
        self.max_check_depth
    }

    /// Type recorded for an expression or declaration during checking.
    pub fn node_type(&self, node: NodeIndex) -> Option<TypeId> {
        self.node_types.get(&node.0).copied()
    }

    /// Checker and binder diagnostics together.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.clone();
        all.extend(self.binder.diagnostics.iter().cloned());
        all
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
            || self.binder.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// File path of the program containing `node`.
    pub fn file_of_node(&self, node: NodeIndex) -> String {
        self.binder
            .program_of_node(&self.arena, node)
            .and_then(|id| self.binder.program(id))
            .map(|p| p.file_path.clone())
            .unwrap_or_default()
    }
}
