//! Name lookup against debug information, and the `DebugInfoDeserializer`
//! façade over it.
//!
//! A name is looked up in the requesting module first and then through that
//! module's imports. Whatever is found is declared in its owning module's
//! proxy program and imported into the requesting program.

use crate::class_builder::build_global_variable;
use crate::error::EvalError;
use crate::method_builder::build_global_function;
use crate::path_resolver::{find_exported_entity, find_imported_entity, find_imported_functions, find_named_import_all};
use crate::plugin::ScopedDebugInfoPlugin;
use crate::registry::{ImportEntry, ImportOrigin};
use crate::store::{DebugInfoStore, EntityRef};
use dbgeval_binder::{ProgramId, SymbolId};
use dbgeval_checker::CompilerContext;
use dbgeval_debuginfo::{ClassId, demangle_class_name};
use dbgeval_parser::parser::node::{ImportDeclData, LiteralData, SpecifierData};
use dbgeval_parser::{NodeIndex, NodeList, SyntaxKind};
use std::rc::Rc;
use tracing::{debug, instrument};

/// Where a name was found: the owning module and the name there.
fn locate(store: &DebugInfoStore, path: &str, name: &str, found_locally: impl Fn(&str, &str) -> bool) -> Option<EntityRef> {
    if found_locally(path, name) {
        return Some(EntityRef::new(path, name));
    }
    find_imported_entity(store, path, name).filter(|entity| found_locally(&entity.path, &entity.name))
}

impl ScopedDebugInfoPlugin {
    // =========================================================================
    // Classes
    // =========================================================================

    /// Class `name` as seen from the module at `path`, declared and made
    /// visible in `importer` under `name`.
    pub(crate) fn find_class(
        &mut self,
        host: &mut CompilerContext,
        path: &str,
        name: &str,
        importer: ProgramId,
    ) -> Result<Option<SymbolId>, EvalError> {
        let store = Rc::clone(&self.store);
        let Some(entity) = locate(&store, path, name, |path, name| {
            store.find_class(path, name).is_valid()
        }) else {
            return Ok(None);
        };
        let class = store.find_class(&entity.path, &entity.name);
        self.declare_class(host, &entity.path, class, importer, name).map(Some)
    }

    /// A type reference carrying a mangled class name resolves through the
    /// module that name encodes, whether or not `importer` imports it.
    pub(crate) fn find_class_by_binary_name(
        &mut self,
        host: &mut CompilerContext,
        ident: NodeIndex,
        importer: ProgramId,
    ) -> Result<Option<SymbolId>, EvalError> {
        let parent = host.arena.parent_of(ident);
        let Some(binary_name) = host
            .arena
            .get(parent)
            .and_then(|node| host.arena.get_type_ref(node))
            .and_then(|data| data.binary_name.clone())
        else {
            return Ok(None);
        };
        let Some(imported_name) = host.arena.identifier_text(ident).map(str::to_string) else {
            return Ok(None);
        };
        let (module, _) = demangle_class_name(&binary_name)?;
        let store = Rc::clone(&self.store);
        let info = store.get_debug_info_by_module_name(&module)?;
        let class = info.find_class(&binary_name);
        if !class.is_valid() {
            return Ok(None);
        }
        self.declare_class(host, info.source_path(), class, importer, &imported_name)
            .map(Some)
    }

    // =========================================================================
    // Globals
    // =========================================================================

    pub(crate) fn find_global_variable(
        &mut self,
        host: &mut CompilerContext,
        path: &str,
        name: &str,
        importer: ProgramId,
    ) -> Result<Option<SymbolId>, EvalError> {
        let store = Rc::clone(&self.store);
        let Some(entity) = locate(&store, path, name, |path, name| {
            store.find_global_field(path, name).is_some()
        }) else {
            return Ok(None);
        };
        self.declare_global_variable(host, &entity, importer, name).map(Some)
    }

    fn declare_global_variable(
        &mut self,
        host: &mut CompilerContext,
        entity: &EntityRef,
        importer: ProgramId,
        imported_name: &str,
    ) -> Result<SymbolId, EvalError> {
        let path = entity.path.clone();
        let name = entity.name.clone();
        self.import_global_entity(host, &entity.path, &entity.name, importer, imported_name, move |this, host, _| {
            let store = Rc::clone(&this.store);
            let field = store
                .find_global_field(&path, &name)
                .ok_or_else(|| EvalError::Host(format!("global {name} disappeared from {path}")))?;
            let statement = build_global_variable(&mut host.arena, &field)?;
            this.stats.global_variables += 1;
            Ok(vec![statement])
        })
    }

    /// Function `name` with all its overloads, one symbol per declaring
    /// module. Functions of the requesting module shadow imported ones.
    /// Otherwise every module the import reaches declares its own overloads
    /// in its own proxy; the first is imported into `importer` under `name`
    /// and the rest are returned as declared.
    pub(crate) fn find_global_functions(
        &mut self,
        host: &mut CompilerContext,
        path: &str,
        name: &str,
        importer: ProgramId,
    ) -> Result<Vec<SymbolId>, EvalError> {
        let store = Rc::clone(&self.store);
        let entities: Vec<EntityRef> = if store.find_global_methods(path, name).is_empty() {
            find_imported_functions(&store, path, name)
                .into_iter()
                .filter(|entity| !store.find_global_methods(&entity.path, &entity.name).is_empty())
                .collect()
        } else {
            vec![EntityRef::new(path, name)]
        };
        let mut symbols = Vec::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            let symbol = if index == 0 {
                self.declare_global_functions(host, entity, importer, name)?
            } else {
                let declaring = self.proxies.get_or_create(host, &store, &entity.path)?;
                self.declare_global_functions(host, entity, declaring, &entity.name)?
            };
            symbols.push(symbol);
        }
        if symbols.len() > 1 {
            debug!(%name, %path, modules = symbols.len(), "overloads split across modules");
        }
        Ok(symbols)
    }

    fn declare_global_functions(
        &mut self,
        host: &mut CompilerContext,
        entity: &EntityRef,
        importer: ProgramId,
        imported_name: &str,
    ) -> Result<SymbolId, EvalError> {
        let path = entity.path.clone();
        let name = entity.name.clone();
        self.import_global_entity(host, &entity.path, &entity.name, importer, imported_name, move |this, host, _| {
            let store = Rc::clone(&this.store);
            let mut statements = Vec::new();
            for method in store.find_global_methods(&path, &name) {
                statements.push(build_global_function(&mut host.arena, &method)?);
            }
            this.stats.global_functions += statements.len();
            Ok(statements)
        })
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    /// `import * as name from "..."` in the requesting module becomes the
    /// same namespace import in `importer`, over the target's proxy program.
    pub(crate) fn find_namespace_import(
        &mut self,
        host: &mut CompilerContext,
        path: &str,
        name: &str,
        importer: ProgramId,
    ) -> Result<Option<SymbolId>, EvalError> {
        let store = Rc::clone(&self.store);
        let Some(target) = find_named_import_all(&store, path, name) else {
            return Ok(None);
        };
        let program = self.proxies.get_or_create(host, &store, target)?;
        let origin = ImportOrigin { program, name: None };
        if let Some(existing) = self.registries.import(importer, name) {
            if existing.origin == origin {
                return Ok(Some(existing.symbol));
            }
            return Err(EvalError::DuplicateRegistration { name: name.to_string() });
        }
        let module = host
            .binder
            .program(program)
            .map(|p| p.module_name.clone())
            .unwrap_or_default();

        let symbol = host.with_stable_state(|host| -> Result<SymbolId, EvalError> {
            let alias = host.arena.synthesized_identifier(name);
            let specifier = host.arena.add_specifier(
                SyntaxKind::NamespaceImport,
                0,
                0,
                SpecifierData {
                    property_name: NodeIndex::NONE,
                    name: alias,
                },
            );
            let module_specifier = host.arena.add_literal(
                SyntaxKind::StringLiteral,
                0,
                0,
                LiteralData {
                    text: module.clone(),
                    value: None,
                },
            );
            let import = host.arena.add_import_decl(
                0,
                0,
                ImportDeclData {
                    specifiers: NodeList::from_vec(vec![specifier]),
                    module_specifier,
                },
            );
            host.arena.strip_positions(import);
            let symbol = host.append_statement(importer, import);
            self.registries
                .get_or_create(importer)
                .insert_import(name, ImportEntry { symbol, origin })?;
            self.stats.imports += 1;
            let scope = host.binder.program_scope(importer);
            self.check_new_node(
                host,
                crate::check_coordinator::CheckRequest {
                    node: import,
                    scope,
                    parent_class: NodeIndex::NONE,
                    program: importer,
                },
            )?;
            Ok(symbol)
        })?;
        debug!(%name, %module, importer = importer.0, "imported namespace");
        Ok(Some(symbol))
    }

    /// Member `name` of the module at `path`, reached through a namespace
    /// import. Declared in its owning module's program and returned as is.
    pub(crate) fn find_exported_member_in(
        &mut self,
        host: &mut CompilerContext,
        path: &str,
        name: &str,
    ) -> Result<Option<SymbolId>, EvalError> {
        let store = Rc::clone(&self.store);
        let Some(entity) = find_exported_entity(&store, path, name) else {
            return Ok(None);
        };
        let declaring = self.proxies.get_or_create(host, &store, &entity.path)?;

        let class = store.find_class(&entity.path, &entity.name);
        if class.is_valid() {
            return self
                .declare_class(host, &entity.path, class, declaring, &entity.name)
                .map(Some);
        }
        if store.find_global_field(&entity.path, &entity.name).is_some() {
            return self
                .declare_global_variable(host, &entity, declaring, &entity.name)
                .map(Some);
        }
        if !store.find_global_methods(&entity.path, &entity.name).is_empty() {
            return self
                .declare_global_functions(host, &entity, declaring, &entity.name)
                .map(Some);
        }
        Ok(None)
    }

    // =========================================================================
    // Locals
    // =========================================================================

    pub(crate) fn create_local_variable(
        &mut self,
        host: &mut CompilerContext,
        ident: NodeIndex,
    ) -> Result<Option<SymbolId>, EvalError> {
        if host.arena.is_in_type_position(ident) {
            return Ok(None);
        }
        self.create_local_var_decl(host, ident)
    }

    /// Façade over this plugin's synthesis entry points.
    pub fn deserializer<'a>(&'a mut self, host: &'a mut CompilerContext) -> DebugInfoDeserializer<'a> {
        DebugInfoDeserializer { plugin: self, host }
    }
}

/// Entry points for synthesizing declarations directly, outside a checker
/// callback. Each returns the symbol to bind to in the requesting program,
/// or `None` when the debug information has no such entity.
pub struct DebugInfoDeserializer<'a> {
    plugin: &'a mut ScopedDebugInfoPlugin,
    host: &'a mut CompilerContext,
}

impl DebugInfoDeserializer<'_> {
    /// Class `class` of the module at `path`, visible in `importer` under
    /// its simple name.
    #[instrument(level = "debug", skip(self))]
    pub fn create_class(
        &mut self,
        path: &str,
        class: ClassId,
        importer: ProgramId,
    ) -> Result<Option<SymbolId>, EvalError> {
        let store = Rc::clone(&self.plugin.store);
        let Some(descriptor) = store.get_binary(path).and_then(|binary| binary.class(class)) else {
            return Ok(None);
        };
        let name = descriptor.simple_name()?;
        self.plugin
            .declare_class(self.host, path, class, importer, &name)
            .map(Some)
    }

    /// The live local `ident` names, declared in its enclosing block.
    #[instrument(level = "debug", skip(self))]
    pub fn create_local_variable(&mut self, ident: NodeIndex) -> Result<Option<SymbolId>, EvalError> {
        self.plugin.create_local_variable(self.host, ident)
    }

    /// Global variable `name` as seen from the module at `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn create_global_variable(
        &mut self,
        path: &str,
        name: &str,
        importer: ProgramId,
    ) -> Result<Option<SymbolId>, EvalError> {
        self.plugin.find_global_variable(self.host, path, name, importer)
    }

    /// Every overload of global function `name` as seen from the module at
    /// `path`: one symbol per declaring module, the first bound in
    /// `importer`. Empty when no module declares it.
    #[instrument(level = "debug", skip(self))]
    pub fn create_global_function_overloads(
        &mut self,
        path: &str,
        name: &str,
        importer: ProgramId,
    ) -> Result<Vec<SymbolId>, EvalError> {
        self.plugin.find_global_functions(self.host, path, name, importer)
    }
}
