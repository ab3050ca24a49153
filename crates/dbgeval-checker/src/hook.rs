//! Extension seam between the checker and an evaluator plugin.
//!
//! The checker owns no knowledge of debug information. When a name does not
//! resolve, when a namespace import lacks a member, and after a block's
//! statements have been checked, it asks the installed hook. The hook gets
//! the whole `CompilerContext` back and may synthesize, bind and check new
//! declarations before returning.

use crate::context::CompilerContext;
use dbgeval_binder::SymbolId;
use dbgeval_parser::NodeIndex;

/// Fatal abort of a check. Recoverable problems are diagnostics; this is
/// for invariant violations and hook failures that must stop evaluation.
#[derive(Debug, thiserror::Error)]
pub enum CheckAbort {
    #[error("node {0} was checked twice")]
    DoubleCheck(u32),
    #[error(transparent)]
    Hook(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub trait EvalHook {
    /// Called for an identifier the scope chain could not resolve. Returns
    /// the symbol the identifier should bind to, declared somewhere the
    /// identifier's program can see it.
    fn find_identifier(
        &mut self,
        host: &mut CompilerContext,
        ident: NodeIndex,
    ) -> Result<Option<SymbolId>, CheckAbort>;

    /// Called when `namespace.name` finds no export named `name`.
    fn find_exported_member(
        &mut self,
        _host: &mut CompilerContext,
        _namespace: SymbolId,
        _name: &str,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        Ok(None)
    }

    /// Called once per block after its statements have been checked.
    fn add_prologue_epilogue(
        &mut self,
        _host: &mut CompilerContext,
        _block: NodeIndex,
    ) -> Result<(), CheckAbort> {
        Ok(())
    }
}

/// Hook that never finds anything; plain compilation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHook;

impl EvalHook for NoopHook {
    fn find_identifier(
        &mut self,
        _host: &mut CompilerContext,
        _ident: NodeIndex,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        Ok(None)
    }
}
