//! Per-program registries of synthesized entities.
//!
//! A name is registered the moment its declaration is bound, before the
//! declaration is checked, so a lookup that re-enters synthesis for the same
//! name finds it instead of building it twice.
//!
//! Declarations and import aliases are kept apart: a class may extend a
//! same-named class of another module, and the alias it imports must never
//! pass for the class itself.

use crate::error::EvalError;
use dbgeval_binder::{ProgramId, SymbolId};
use rustc_hash::FxHashMap;

/// Where an import alias points: a name declared in another program, or
/// the whole program for a namespace import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOrigin {
    pub program: ProgramId,
    /// `None` for `import * as alias`.
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportEntry {
    pub symbol: SymbolId,
    pub origin: ImportOrigin,
}

#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    declarations: FxHashMap<String, SymbolId>,
    imports: FxHashMap<String, ImportEntry>,
}

impl EntityRegistry {
    pub fn declaration(&self, name: &str) -> Option<SymbolId> {
        self.declarations.get(name).copied()
    }

    pub fn import(&self, alias: &str) -> Option<&ImportEntry> {
        self.imports.get(alias)
    }

    /// Insert-once; a second declaration of a name is an invariant
    /// violation.
    pub fn insert_declaration(&mut self, name: &str, symbol: SymbolId) -> Result<(), EvalError> {
        if self.declarations.contains_key(name) {
            return Err(EvalError::DuplicateRegistration {
                name: name.to_string(),
            });
        }
        self.declarations.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Insert-once, like declarations.
    pub fn insert_import(&mut self, alias: &str, entry: ImportEntry) -> Result<(), EvalError> {
        if self.imports.contains_key(alias) {
            return Err(EvalError::DuplicateRegistration {
                name: alias.to_string(),
            });
        }
        self.imports.insert(alias.to_string(), entry);
        Ok(())
    }

    pub fn declaration_count(&self) -> usize {
        self.declarations.len()
    }

    pub fn import_count(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.imports.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct EntityRegistries {
    programs: FxHashMap<ProgramId, EntityRegistry>,
}

impl EntityRegistries {
    pub fn get(&self, program: ProgramId) -> Option<&EntityRegistry> {
        self.programs.get(&program)
    }

    pub fn get_or_create(&mut self, program: ProgramId) -> &mut EntityRegistry {
        self.programs.entry(program).or_default()
    }

    /// Symbol of a name synthesized into `program` itself.
    pub fn declaration(&self, program: ProgramId, name: &str) -> Option<SymbolId> {
        self.get(program).and_then(|registry| registry.declaration(name))
    }

    pub fn import(&self, program: ProgramId, alias: &str) -> Option<&ImportEntry> {
        self.get(program).and_then(|registry| registry.import(alias))
    }

    pub fn is_declared(&self, program: ProgramId, name: &str) -> bool {
        self.declaration(program, name).is_some()
    }

    pub fn is_imported(&self, program: ProgramId, alias: &str) -> bool {
        self.import(program, alias).is_some()
    }
}
