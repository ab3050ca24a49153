//! Name binder for the dbgeval evaluator.
//!
//! One `BinderState` serves a whole evaluation session: every program
//! (prelude, proxy programs, the evaluation program) gets a module scope
//! parented to the shared global scope, and all symbols live in one arena.

use dbgeval_parser::NodeIndex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

mod state;
mod state_binding;
mod state_references;

pub use state::{BinderState, ResolutionStats};
pub use state_references::is_reference_position;

/// Symbol flags.
pub mod symbol_flags {
    pub const NONE: u32 = 0;
    pub const VARIABLE: u32 = 1 << 0;
    pub const PARAMETER: u32 = 1 << 1;
    pub const PROPERTY: u32 = 1 << 2;
    pub const METHOD: u32 = 1 << 3;
    pub const CONSTRUCTOR: u32 = 1 << 4;
    pub const FUNCTION: u32 = 1 << 5;
    pub const CLASS: u32 = 1 << 6;
    /// Import specifier bound to an export of another program.
    pub const ALIAS: u32 = 1 << 7;
    /// `import * as M`.
    pub const NAMESPACE_IMPORT: u32 = 1 << 8;
    pub const STATIC: u32 = 1 << 9;
    pub const CONST: u32 = 1 << 10;
    pub const ABSTRACT: u32 = 1 << 11;

    pub const VALUE: u32 = VARIABLE | PARAMETER | PROPERTY | METHOD | FUNCTION | CLASS;
    pub const TYPE: u32 = CLASS;
    /// Flags whose declarations may merge into one symbol (overloads).
    pub const OVERLOADABLE: u32 = FUNCTION | METHOD | CONSTRUCTOR;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const NONE: ScopeId = ScopeId(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }
}

/// A compilation unit: one source file node bound into its own module scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProgramId(pub u32);

#[derive(Clone, Debug)]
pub struct Symbol {
    pub flags: u32,
    pub escaped_name: String,
    pub declarations: SmallVec<[NodeIndex; 2]>,
    pub value_declaration: NodeIndex,
    /// Program whose scope declares this symbol.
    pub program: Option<ProgramId>,
    /// Owning class for members.
    pub parent: SymbolId,
    pub is_exported: bool,
    /// Module specifier of an import alias.
    pub import_module: Option<String>,
    /// Exported name an alias refers to (`*` for namespace imports).
    pub import_name: Option<String>,
}

impl Symbol {
    pub fn new(flags: u32, name: impl Into<String>) -> Symbol {
        Symbol {
            flags,
            escaped_name: name.into(),
            declarations: SmallVec::new(),
            value_declaration: NodeIndex::NONE,
            program: None,
            parent: SymbolId::NONE,
            is_exported: false,
            import_module: None,
            import_name: None,
        }
    }

    #[inline]
    pub fn has_any_flags(&self, flags: u32) -> bool {
        self.flags & flags != 0
    }

    pub fn add_declaration(&mut self, declaration: NodeIndex) {
        if !self.declarations.contains(&declaration) {
            self.declarations.push(declaration);
        }
        if self.value_declaration.is_none() {
            self.value_declaration = declaration;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena::default()
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        if id.is_none() {
            None
        } else {
            self.symbols.get(id.0 as usize)
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        if id.is_none() {
            None
        } else {
            self.symbols.get_mut(id.0 as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Name to symbol map for one scope.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn set(&mut self, name: String, symbol: SymbolId) {
        self.symbols.insert(name, symbol);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolId)> {
        self.symbols.iter()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    /// Prelude declarations, visible from every program.
    Global,
    Module,
    /// Class members; skipped by bare-name lookup.
    Class,
    Function,
    Block,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: ScopeId,
    pub kind: ScopeKind,
    pub table: SymbolTable,
    /// Node that created this scope.
    pub node: NodeIndex,
    pub program: Option<ProgramId>,
}

impl Scope {
    pub fn new(parent: ScopeId, kind: ScopeKind, node: NodeIndex, program: Option<ProgramId>) -> Scope {
        Scope {
            parent,
            kind,
            table: SymbolTable::new(),
            node,
            program,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Program {
    pub id: ProgramId,
    pub source_file: NodeIndex,
    pub module_name: String,
    pub file_path: String,
    pub scope: ScopeId,
}
