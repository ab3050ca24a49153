//! One proxy program per source module.
//!
//! Declarations synthesized for a module live in that module's proxy
//! program, so every reference to the module, from the evaluation program or
//! from other proxies, sees the same declarations.

use crate::error::EvalError;
use crate::store::DebugInfoStore;
use dbgeval_binder::ProgramId;
use dbgeval_checker::CompilerContext;
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ProxyProgramCache {
    by_path: FxHashMap<String, ProgramId>,
    paths: FxHashMap<ProgramId, String>,
}

impl ProxyProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_program(&self, path: &str) -> Option<ProgramId> {
        self.by_path.get(path).copied()
    }

    /// Register the proxy for `path`. Each module gets exactly one.
    pub fn add_program(&mut self, path: &str, program: ProgramId) -> Result<(), EvalError> {
        if self.by_path.contains_key(path) {
            return Err(EvalError::DuplicateProgram {
                path: path.to_string(),
            });
        }
        self.by_path.insert(path.to_string(), program);
        self.paths.insert(program, path.to_string());
        Ok(())
    }

    /// Source path a proxy program stands for.
    pub fn path_of(&self, program: ProgramId) -> Option<&str> {
        self.paths.get(&program).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// The proxy for `path`, creating an empty one named after the module
    /// the store records for that path.
    pub fn get_or_create(
        &mut self,
        host: &mut CompilerContext,
        store: &DebugInfoStore,
        path: &str,
    ) -> Result<ProgramId, EvalError> {
        if let Some(program) = self.get_program(path) {
            return Ok(program);
        }
        let module = store
            .get_module_name(path)
            .ok_or_else(|| EvalError::UnknownSourcePath(path.to_string()))?;
        let program = host.create_empty_program(path, module);
        debug!(%path, %module, program = program.0, "created proxy program");
        self.add_program(path, program)?;
        Ok(program)
    }
}
