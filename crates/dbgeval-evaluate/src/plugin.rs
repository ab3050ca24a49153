//! The evaluator plugin: session state for declaration synthesis and the
//! `EvalHook` the checker calls.
//!
//! `ScopedDebugInfoPlugin` owns every piece of synthesis state for one
//! evaluation: proxy programs, registries, the check queue, pending
//! prologue/epilogue statements and the live locals at the breakpoint. Its
//! behavior is spread over `impl` blocks in sibling modules:
//!
//! - `declarator`: declare once, import across programs
//! - `chain_resolver`: base-first superclass materialization
//! - `check_coordinator`: the flat check queue
//! - `local_materializer`: live-local reads and write-backs
//! - `deserializer`: the `create_*` entry points and name lookup

use crate::check_coordinator::CheckCoordinator;
use crate::error::EvalError;
use crate::local_materializer::{LiveVariable, PrologueEpilogue};
use crate::proxy_cache::ProxyProgramCache;
use crate::registry::EntityRegistries;
use crate::store::DebugInfoStore;
use dbgeval_binder::{ProgramId, SymbolId, symbol_flags};
use dbgeval_checker::{CheckAbort, CompilerContext, EvalHook};
use dbgeval_parser::NodeIndex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::rc::Rc;
use tracing::{debug, trace};

/// Where the debuggee is suspended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalContext {
    /// Source path of the module containing the breakpoint.
    pub source_path: String,
    pub module_name: String,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub bytecode_offset: u32,
}

/// Counts of synthesized declarations, for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisStats {
    pub classes: usize,
    pub methods: usize,
    pub fields: usize,
    pub imports: usize,
    pub locals: usize,
    pub global_variables: usize,
    pub global_functions: usize,
}

pub struct ScopedDebugInfoPlugin {
    pub(crate) store: Rc<DebugInfoStore>,
    pub(crate) context: EvalContext,
    pub(crate) eval_program: Option<ProgramId>,
    pub(crate) proxies: ProxyProgramCache,
    pub(crate) registries: EntityRegistries,
    pub(crate) coordinator: CheckCoordinator,
    /// Pending statements per block, keyed by block node.
    pub(crate) pending_blocks: FxHashMap<u32, PrologueEpilogue>,
    pub(crate) locals: Rc<[LiveVariable]>,
    pub(crate) stats: SynthesisStats,
}

impl ScopedDebugInfoPlugin {
    pub fn new(store: Rc<DebugInfoStore>, context: EvalContext) -> Self {
        ScopedDebugInfoPlugin {
            store,
            context,
            eval_program: None,
            proxies: ProxyProgramCache::new(),
            registries: EntityRegistries::default(),
            coordinator: CheckCoordinator::default(),
            pending_blocks: FxHashMap::default(),
            locals: Rc::from(Vec::new()),
            stats: SynthesisStats::default(),
        }
    }

    /// The program holding the user's expression. Names it cannot resolve
    /// are looked up in the breakpoint's module and may be live locals.
    pub fn set_eval_program(&mut self, program: ProgramId) {
        self.eval_program = Some(program);
    }

    pub fn set_live_variables(&mut self, locals: Vec<LiveVariable>) {
        self.locals = Rc::from(locals);
    }

    pub fn store(&self) -> &DebugInfoStore {
        &self.store
    }

    pub fn context(&self) -> &EvalContext {
        &self.context
    }

    pub fn stats(&self) -> SynthesisStats {
        self.stats
    }

    pub fn proxies(&self) -> &ProxyProgramCache {
        &self.proxies
    }

    pub fn registries(&self) -> &EntityRegistries {
        &self.registries
    }

    /// Source path a program's names are looked up in: the breakpoint's
    /// module for the evaluation program, the module itself for a proxy.
    pub(crate) fn requesting_path(&self, program: ProgramId) -> Option<String> {
        if self.eval_program == Some(program) {
            return Some(self.context.source_path.clone());
        }
        self.proxies.path_of(program).map(str::to_string)
    }

    // =========================================================================
    // Hook Bodies
    // =========================================================================

    fn find_identifier_impl(
        &mut self,
        host: &mut CompilerContext,
        ident: NodeIndex,
    ) -> Result<Option<SymbolId>, EvalError> {
        let Some(name) = host.arena.identifier_text(ident).map(str::to_string) else {
            return Ok(None);
        };
        let Some(program) = host.binder.program_of_node(&host.arena, ident) else {
            return Ok(None);
        };
        let Some(path) = self.requesting_path(program) else {
            trace!(%name, program = program.0, "identifier outside synthesized programs");
            return Ok(None);
        };
        debug!(%name, %path, program = program.0, "find_identifier");

        if host.arena.is_in_type_position(ident) {
            if let Some(symbol) = self.find_class_by_binary_name(host, ident, program)? {
                return Ok(Some(symbol));
            }
            return self.find_class(host, &path, &name, program);
        }

        if self.eval_program == Some(program)
            && let Some(symbol) = self.create_local_variable(host, ident)?
        {
            return Ok(Some(symbol));
        }
        if let Some(symbol) = self.find_class(host, &path, &name, program)? {
            return Ok(Some(symbol));
        }
        if let Some(symbol) = self.find_global_variable(host, &path, &name, program)? {
            return Ok(Some(symbol));
        }
        if let Some(&symbol) = self.find_global_functions(host, &path, &name, program)?.first() {
            return Ok(Some(symbol));
        }
        self.find_namespace_import(host, &path, &name, program)
    }

    fn find_exported_member_impl(
        &mut self,
        host: &mut CompilerContext,
        namespace: SymbolId,
        name: &str,
    ) -> Result<Option<SymbolId>, EvalError> {
        let Some(module) = host
            .binder
            .get_symbol(namespace)
            .filter(|s| s.has_any_flags(symbol_flags::NAMESPACE_IMPORT))
            .and_then(|s| s.import_module.clone())
        else {
            return Ok(None);
        };
        let store = Rc::clone(&self.store);
        let Some(path) = store.by_module_name(&module).map(|info| info.source_path()) else {
            return Ok(None);
        };
        debug!(%module, %name, "find_exported_member");
        self.find_exported_member_in(host, path, name)
    }
}

impl EvalHook for ScopedDebugInfoPlugin {
    fn find_identifier(
        &mut self,
        host: &mut CompilerContext,
        ident: NodeIndex,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        Ok(self.find_identifier_impl(host, ident)?)
    }

    fn find_exported_member(
        &mut self,
        host: &mut CompilerContext,
        namespace: SymbolId,
        name: &str,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        Ok(self.find_exported_member_impl(host, namespace, name)?)
    }

    fn add_prologue_epilogue(
        &mut self,
        host: &mut CompilerContext,
        block: NodeIndex,
    ) -> Result<(), CheckAbort> {
        self.flush_prologue_epilogue(host, block);
        Ok(())
    }
}
