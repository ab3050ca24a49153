//! Debug-info store: the session's binaries, indexed by source path and by
//! module name.
//!
//! Binaries are read when the store is built; everything derived from them
//! (import/export tables, class indices) is computed on first use and kept
//! for the session.

use crate::error::EvalError;
use dbgeval_debuginfo::{
    BinaryFile, ClassId, FieldDescriptor, GLOBAL_CLASS_NAME, MethodDescriptor, mangle_class_name,
};
use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace};

/// An entity named by an import or export record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// Source path of the module holding the entity.
    pub path: String,
    /// Entity name in that module; `*` for the whole module.
    pub name: String,
}

impl EntityRef {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        EntityRef {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// Import and export records of one module, grouped by alias. Alias `*`
/// collects wildcard imports and `export * from` records.
#[derive(Clone, Debug, Default)]
pub struct ImportExportTable {
    pub imports: FxHashMap<String, Vec<EntityRef>>,
    pub exports: FxHashMap<String, Vec<EntityRef>>,
}

impl ImportExportTable {
    fn from_binary(binary: &BinaryFile) -> Self {
        let mut table = ImportExportTable::default();
        for entry in binary.imports() {
            table
                .imports
                .entry(entry.alias.to_string())
                .or_default()
                .push(EntityRef::new(entry.path, entry.name));
        }
        for entry in binary.exports() {
            table
                .exports
                .entry(entry.alias.to_string())
                .or_default()
                .push(EntityRef::new(entry.path, entry.name));
        }
        table
    }

    pub fn imports_of(&self, alias: &str) -> &[EntityRef] {
        self.imports.get(alias).map_or(&[], Vec::as_slice)
    }

    pub fn exports_of(&self, alias: &str) -> &[EntityRef] {
        self.exports.get(alias).map_or(&[], Vec::as_slice)
    }
}

/// One module's binary plus the lazily derived lookup tables.
#[derive(Debug)]
pub struct FileDebugInfo {
    binary: Arc<BinaryFile>,
    module_name: String,
    source_path: String,
    global_class: OnceCell<ClassId>,
    table: OnceCell<ImportExportTable>,
    /// Mangled class name to class id.
    class_index: OnceCell<FxHashMap<String, ClassId>>,
}

impl FileDebugInfo {
    fn new(binary: Arc<BinaryFile>) -> Self {
        FileDebugInfo {
            module_name: binary.module_name().to_string(),
            source_path: binary.source_path().to_string(),
            binary,
            global_class: OnceCell::new(),
            table: OnceCell::new(),
            class_index: OnceCell::new(),
        }
    }

    pub fn binary(&self) -> &Arc<BinaryFile> {
        &self.binary
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn import_export_table(&self) -> &ImportExportTable {
        self.table.get_or_init(|| {
            trace!(path = %self.source_path, "building import/export table");
            ImportExportTable::from_binary(&self.binary)
        })
    }

    fn class_index(&self) -> &FxHashMap<String, ClassId> {
        self.class_index.get_or_init(|| {
            let index: FxHashMap<_, _> = self
                .binary
                .classes()
                .map(|class| (class.name().to_string(), class.id()))
                .collect();
            trace!(path = %self.source_path, classes = index.len(), "building class index");
            index
        })
    }

    fn lookup_mangled(&self, mangled: &str) -> ClassId {
        self.class_index()
            .get(mangled)
            .copied()
            .unwrap_or(ClassId::INVALID)
    }

    /// Class named `name` in this module: a simple name, a dotted
    /// `module.Name`, or a mangled `Lmodule/Name;`. `ClassId::INVALID` when
    /// absent. The global holder class is never a match.
    pub fn find_class(&self, name: &str) -> ClassId {
        let mangled = if name.starts_with('L') && name.ends_with(';') {
            name.to_string()
        } else if let Some((module, simple)) = name.rsplit_once('.') {
            mangle_class_name(module, simple)
        } else {
            mangle_class_name(&self.module_name, name)
        };
        let id = self.lookup_mangled(&mangled);
        if id.is_valid() && id == self.global_class() {
            return ClassId::INVALID;
        }
        id
    }

    /// The module's global holder class, `ClassId::INVALID` if it has none.
    pub fn global_class(&self) -> ClassId {
        *self.global_class.get_or_init(|| {
            self.lookup_mangled(&mangle_class_name(&self.module_name, GLOBAL_CLASS_NAME))
        })
    }
}

#[derive(Debug, Default)]
pub struct DebugInfoStore {
    files: Vec<FileDebugInfo>,
    by_path: FxHashMap<String, usize>,
    by_module: FxHashMap<String, usize>,
}

impl DebugInfoStore {
    /// Read every binary in `paths`. A binary that cannot be read or parsed
    /// ends the session.
    pub fn load(paths: &[PathBuf]) -> Result<Self, EvalError> {
        let mut store = DebugInfoStore::default();
        for path in paths {
            let binary = BinaryFile::open(path).map_err(|source| EvalError::BinaryLoad {
                path: path.clone(),
                source,
            })?;
            debug!(
                binary = %path.display(),
                module = binary.module_name(),
                source = binary.source_path(),
                "loaded debug info"
            );
            store.insert(Arc::new(binary))?;
        }
        Ok(store)
    }

    pub fn from_binaries(binaries: impl IntoIterator<Item = BinaryFile>) -> Result<Self, EvalError> {
        let mut store = DebugInfoStore::default();
        for binary in binaries {
            store.insert(Arc::new(binary))?;
        }
        Ok(store)
    }

    fn insert(&mut self, binary: Arc<BinaryFile>) -> Result<(), EvalError> {
        let info = FileDebugInfo::new(binary);
        if self.by_path.contains_key(info.source_path()) {
            return Err(EvalError::DuplicateBinary {
                path: info.source_path().to_string(),
            });
        }
        let index = self.files.len();
        self.by_path.insert(info.source_path().to_string(), index);
        self.by_module.insert(info.module_name().to_string(), index);
        self.files.push(info);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    // =========================================================================
    // By Source Path
    // =========================================================================

    pub fn debug_info(&self, path: &str) -> Option<&FileDebugInfo> {
        self.by_path.get(path).and_then(|&index| self.files.get(index))
    }

    pub fn get_binary(&self, path: &str) -> Option<&Arc<BinaryFile>> {
        self.debug_info(path).map(FileDebugInfo::binary)
    }

    pub fn get_module_name(&self, path: &str) -> Option<&str> {
        self.debug_info(path).map(FileDebugInfo::module_name)
    }

    pub fn get_import_export_table(&self, path: &str) -> Option<&ImportExportTable> {
        self.debug_info(path).map(FileDebugInfo::import_export_table)
    }

    /// Class `name` declared by the module at `path`; `ClassId::INVALID`
    /// when either is unknown.
    pub fn find_class(&self, path: &str, name: &str) -> ClassId {
        self.debug_info(path)
            .map_or(ClassId::INVALID, |info| info.find_class(name))
    }

    pub fn global_class(&self, path: &str) -> ClassId {
        self.debug_info(path)
            .map_or(ClassId::INVALID, FileDebugInfo::global_class)
    }

    /// Global variable `name` of the module at `path`.
    pub fn find_global_field(&self, path: &str, name: &str) -> Option<FieldDescriptor<'_>> {
        let info = self.debug_info(path)?;
        let global = info.global_class();
        info.binary
            .fields(global)
            .into_iter()
            .find(|field| field.name == name && field.access.is_static())
    }

    /// Every global function overload named `name` in the module at `path`.
    pub fn find_global_methods(&self, path: &str, name: &str) -> Vec<MethodDescriptor<'_>> {
        let Some(info) = self.debug_info(path) else {
            return Vec::new();
        };
        let global = info.global_class();
        info.binary
            .methods(global)
            .into_iter()
            .filter(|method| method.name() == name && method.is_static())
            .collect()
    }

    // =========================================================================
    // By Module Name
    // =========================================================================

    pub fn by_module_name(&self, module: &str) -> Option<&FileDebugInfo> {
        self.by_module
            .get(module)
            .and_then(|&index| self.files.get(index))
    }

    /// Module lookup for references the binary itself makes (superclasses).
    /// A miss means the binaries are incomplete or inconsistent.
    pub fn get_debug_info_by_module_name(&self, module: &str) -> Result<&FileDebugInfo, EvalError> {
        self.by_module_name(module)
            .ok_or_else(|| EvalError::ModuleNotFound(module.to_string()))
    }
}
