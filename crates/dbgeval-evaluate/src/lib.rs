//! Declaration synthesis from debug information.
//!
//! An expression typed into a debugger is compiled against a program that
//! has no source: only compiled binaries with embedded debug information.
//! This crate reconstructs the declarations the expression needs (classes,
//! their ancestors, fields and methods, module globals, live locals and the
//! imports that make cross-module references visible) on demand, as the
//! host checker meets names it cannot resolve.
//!
//! Layers, leaves first:
//!
//! - `store`: binaries by source path and by module name, with lazily built
//!   import/export tables and class indices
//! - `path_resolver`: import and re-export following over those tables
//! - `proxy_cache` and `registry`: one proxy program per module, one
//!   declaration per name
//! - `type_translation`, `class_builder`, `method_builder`: node synthesis
//! - `declarator`, `chain_resolver`: dedup, cross-program imports and
//!   base-first ancestor materialization
//! - `check_coordinator`: the queue that keeps reentrant checks flat
//! - `local_materializer`: live-local read and write-back statements
//! - `deserializer` and `plugin`: the façade queries and the `EvalHook`
//!   the checker calls
//! - `session`: prelude, evaluation program and the check driver

mod chain_resolver;
mod check_coordinator;
mod class_builder;
mod declarator;
mod deserializer;
pub mod error;
mod local_materializer;
mod method_builder;
pub mod options;
pub mod path_resolver;
mod plugin;
mod proxy_cache;
mod registry;
pub mod session;
pub mod store;
mod type_translation;

pub use check_coordinator::CheckRequest;
pub use deserializer::DebugInfoDeserializer;
pub use error::EvalError;
pub use local_materializer::LiveVariable;
pub use options::EvaluateOptions;
pub use plugin::{EvalContext, ScopedDebugInfoPlugin, SynthesisStats};
pub use proxy_cache::ProxyProgramCache;
pub use registry::{EntityRegistries, EntityRegistry, ImportEntry, ImportOrigin};
pub use session::{EvaluationOutcome, EvaluationSession, PRELUDE};
pub use store::{DebugInfoStore, EntityRef, FileDebugInfo, ImportExportTable};
pub use type_translation::AccessorTag;
