//! Fatal evaluation errors.
//!
//! Anything that leaves synthesized state possibly inconsistent ends the
//! session with an `EvalError`. Lookups that simply find nothing return
//! `None` instead, and problems in the user's expression are checker
//! diagnostics.

use dbgeval_checker::CheckAbort;
use dbgeval_debuginfo::FormatError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("failed to load debug information from {path}")]
    BinaryLoad {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("two binaries describe source path {path}")]
    DuplicateBinary { path: String },

    #[error("no binary provides module {0}")]
    ModuleNotFound(String),

    #[error("type descriptor {descriptor} has no source-level equivalent")]
    UntranslatableType { descriptor: String },

    #[error("malformed debug information: {0}")]
    CorruptBinary(#[from] FormatError),

    #[error("superclass chain of {class} does not terminate")]
    InheritanceCycle { class: String },

    #[error("{name} is already registered in this program")]
    DuplicateRegistration { name: String },

    #[error("a proxy program for {path} already exists")]
    DuplicateProgram { path: String },

    #[error("no binary describes source path {0}")]
    UnknownSourcePath(String),

    #[error("node {node} was checked twice")]
    DoubleCheck { node: u32 },

    #[error("check coordinator finished with {pending} pending requests")]
    CheckerNotIdle { pending: usize },

    #[error("invalid evaluation options")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("host checker failed: {0}")]
    Host(String),
}

impl From<EvalError> for CheckAbort {
    fn from(error: EvalError) -> Self {
        CheckAbort::Hook(Box::new(error))
    }
}

impl From<CheckAbort> for EvalError {
    fn from(abort: CheckAbort) -> Self {
        match abort {
            CheckAbort::DoubleCheck(node) => EvalError::DoubleCheck { node },
            CheckAbort::Hook(source) => match source.downcast::<EvalError>() {
                Ok(error) => *error,
                Err(other) => EvalError::Host(other.to_string()),
            },
        }
    }
}
