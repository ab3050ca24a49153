//! Type checker for the dbgeval evaluator.
//!
//! `CompilerContext` is the host compiler state an evaluation session
//! drives: arena, binder, type interner and the checker's caches. The
//! checker reaches an evaluator plugin through the `EvalHook` trait when a
//! name is unresolved, when a namespace import lacks a member, and after
//! each block.

mod assignability_checker;
pub mod class_type;
pub mod context;
mod error_reporter;
pub mod hook;
mod state_checking;
mod symbol_resolver;
mod type_computation;
pub mod types;

pub use class_type::{ClassInfo, FieldInfo, SignatureInfo};
pub use context::CompilerContext;
pub use hook::{CheckAbort, EvalHook, NoopHook};
pub use types::{TypeId, TypeInterner, TypeKey};
