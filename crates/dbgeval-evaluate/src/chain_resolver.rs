//! Superclass chain materialization.
//!
//! A class can only be declared once its superclass is. Declaring a class
//! walks up its superclass chain until it reaches an ancestor that is
//! already declared (or the `Object` root), then declares the collected
//! classes base-first, so every `extends` clause names a declaration that
//! exists. Ancestors in other modules are declared in their own proxy
//! programs and imported into the program of the class that extends them,
//! under an alias spelled from the mangled name when the simple name is
//! taken there (`app.Widget extends lib.Widget` imports `lib$Widget`).

use crate::class_builder::{SuperRef, build_class};
use crate::error::EvalError;
use crate::method_builder::parameter_descriptors;
use crate::plugin::ScopedDebugInfoPlugin;
use crate::registry::ImportOrigin;
use crate::store::DebugInfoStore;
use dbgeval_binder::{ProgramId, SymbolId};
use dbgeval_checker::CompilerContext;
use dbgeval_debuginfo::{ClassId, FormatError, OBJECT_DESCRIPTOR, demangle_class_name};
use rustc_hash::FxHashSet;
use std::rc::Rc;
use tracing::{Level, debug, span, trace};

/// One class of a chain being materialized.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ChainEntry {
    source_path: String,
    name: String,
    class_id: ClassId,
    binary_name: String,
}

impl ScopedDebugInfoPlugin {
    /// Declare class `class` of the module at `path` (with any undeclared
    /// ancestors) and make it visible in `importer` as `imported_name`.
    pub(crate) fn declare_class(
        &mut self,
        host: &mut CompilerContext,
        path: &str,
        class: ClassId,
        importer: ProgramId,
        imported_name: &str,
    ) -> Result<SymbolId, EvalError> {
        let store = Rc::clone(&self.store);
        let entry = chain_entry(&store, path, class)?;
        let _span = span!(Level::DEBUG, "declare_class", class = %entry.name, %path).entered();

        let declared = self
            .proxies
            .get_program(path)
            .and_then(|program| self.registries.declaration(program, &entry.name));
        if declared.is_none() {
            let chain = self.collect_chain(&store, entry.clone())?;
            self.materialize_chain(host, &store, &chain)?;
        }

        // Every link is declared now; this only adds the import.
        self.import_global_entity(host, path, &entry.name, importer, imported_name, |_, _, _| {
            Err(EvalError::Host(format!("class {} vanished after materialization", entry.name)))
        })
    }

    /// Walk from `start` up the superclass chain, stopping after the first
    /// ancestor that is already declared or at the root. The last entry is
    /// that declared ancestor when the walk stopped early. Meeting a class
    /// twice means the class table is cyclic.
    fn collect_chain(&self, store: &DebugInfoStore, start: ChainEntry) -> Result<Vec<ChainEntry>, EvalError> {
        let mut visited = FxHashSet::default();
        visited.insert(start.binary_name.clone());
        let mut chain = vec![start];
        loop {
            let Some(current) = chain.last() else {
                break;
            };
            if chain.len() > 1 && self.is_class_declared(current) {
                trace!(class = %current.name, "chain stops at declared ancestor");
                break;
            }
            let Some(next) = super_entry(store, current)? else {
                break;
            };
            if !visited.insert(next.binary_name.clone()) {
                return Err(EvalError::InheritanceCycle {
                    class: chain[0].binary_name.clone(),
                });
            }
            chain.push(next);
        }
        debug!(
            class = %chain[0].name,
            length = chain.len(),
            "collected superclass chain"
        );
        Ok(chain)
    }

    fn is_class_declared(&self, entry: &ChainEntry) -> bool {
        self.proxies
            .get_program(&entry.source_path)
            .is_some_and(|program| self.registries.is_declared(program, &entry.name))
    }

    /// Declare the chain base-first. `chain[0]` is the most derived class.
    fn materialize_chain(
        &mut self,
        host: &mut CompilerContext,
        store: &DebugInfoStore,
        chain: &[ChainEntry],
    ) -> Result<(), EvalError> {
        let _span = span!(Level::DEBUG, "materialize_chain", length = chain.len()).entered();
        for index in (0..chain.len()).rev() {
            let entry = &chain[index];
            if self.is_class_declared(entry) {
                continue;
            }
            let parent = chain.get(index + 1);
            let target = self.proxies.get_or_create(host, store, &entry.source_path)?;
            let super_ref = match parent {
                Some(parent) => Some(self.super_ref_in(host, store, parent, &entry.source_path, target)?),
                None => None,
            };
            let class_id = entry.class_id;
            let source_path = entry.source_path.clone();
            self.declare_entity(host, &entry.source_path, &entry.name, move |this, host, _| {
                let binary = this
                    .store
                    .get_binary(&source_path)
                    .cloned()
                    .ok_or_else(|| EvalError::UnknownSourcePath(source_path.clone()))?;
                let class = binary
                    .class(class_id)
                    .ok_or(EvalError::CorruptBinary(FormatError::BadClassName(source_path.clone())))?;
                let built = build_class(&mut host.arena, &class, super_ref.as_ref())?;
                this.stats.classes += 1;
                this.stats.fields += built.fields;
                this.stats.methods += built.methods;
                Ok(vec![built.node])
            })?;
        }
        Ok(())
    }

    /// The superclass `parent` as named from program `target` (the proxy of
    /// `target_path`), importing it when it lives in another module.
    fn super_ref_in(
        &mut self,
        host: &mut CompilerContext,
        store: &DebugInfoStore,
        parent: &ChainEntry,
        target_path: &str,
        target: ProgramId,
    ) -> Result<SuperRef, EvalError> {
        let declaring = self.proxies.get_or_create(host, store, &parent.source_path)?;
        let mut name = parent.name.clone();
        if declaring != target {
            if self.super_name_taken(store, parent, declaring, target_path, target) {
                name = mangled_alias(&parent.binary_name);
            }
            self.import_entity(host, declaring, &parent.name, target, &name)?;
        }
        trace!(superclass = %parent.binary_name, alias = %name, "superclass reference");
        Ok(SuperRef {
            name,
            binary_name: parent.binary_name.clone(),
            constructor_parameters: constructor_parameters(store, parent),
        })
    }
}

impl ScopedDebugInfoPlugin {
    /// Whether `parent`'s simple name already means something else in the
    /// module at `target_path`: an entity of its own, or an import of a
    /// different entity.
    fn super_name_taken(
        &self,
        store: &DebugInfoStore,
        parent: &ChainEntry,
        declaring: ProgramId,
        target_path: &str,
        target: ProgramId,
    ) -> bool {
        let name = parent.name.as_str();
        if store.find_class(target_path, name).is_valid()
            || store.find_global_field(target_path, name).is_some()
            || !store.find_global_methods(target_path, name).is_empty()
            || self.registries.is_declared(target, name)
        {
            return true;
        }
        let origin = ImportOrigin {
            program: declaring,
            name: Some(parent.name.clone()),
        };
        self.registries
            .import(target, name)
            .is_some_and(|existing| existing.origin != origin)
    }
}

/// `Lapp.main/Widget;` becomes `app$main$Widget`.
fn mangled_alias(binary_name: &str) -> String {
    binary_name
        .trim_start_matches('L')
        .trim_end_matches(';')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '$' })
        .collect()
}

fn chain_entry(store: &DebugInfoStore, path: &str, class: ClassId) -> Result<ChainEntry, EvalError> {
    let binary = store
        .get_binary(path)
        .ok_or_else(|| EvalError::UnknownSourcePath(path.to_string()))?;
    let descriptor = binary
        .class(class)
        .ok_or_else(|| EvalError::CorruptBinary(FormatError::BadClassName(format!("#{}", class.0))))?;
    Ok(ChainEntry {
        source_path: path.to_string(),
        name: descriptor.simple_name()?,
        class_id: class,
        binary_name: descriptor.name().to_string(),
    })
}

/// The direct superclass of `entry`, `None` at the root.
fn super_entry(store: &DebugInfoStore, entry: &ChainEntry) -> Result<Option<ChainEntry>, EvalError> {
    let binary = store
        .get_binary(&entry.source_path)
        .ok_or_else(|| EvalError::UnknownSourcePath(entry.source_path.clone()))?;
    let Some(super_name) = binary.super_class_name(entry.class_id) else {
        return Ok(None);
    };
    if super_name == OBJECT_DESCRIPTOR {
        return Ok(None);
    }
    let (module, simple) = demangle_class_name(super_name)?;
    let info = store.get_debug_info_by_module_name(&module)?;
    let class_id = info.find_class(super_name);
    if !class_id.is_valid() {
        return Err(EvalError::CorruptBinary(FormatError::BadClassName(super_name.to_string())));
    }
    Ok(Some(ChainEntry {
        source_path: info.source_path().to_string(),
        name: simple,
        class_id,
        binary_name: super_name.to_string(),
    }))
}

/// Parameters a derived constructor passes to `parent`'s constructor:
/// none when `parent` has no constructor or a no-argument one, otherwise
/// those of its first constructor.
fn constructor_parameters(store: &DebugInfoStore, parent: &ChainEntry) -> Vec<String> {
    let Some(binary) = store.get_binary(&parent.source_path) else {
        return Vec::new();
    };
    let constructors: Vec<_> = binary
        .methods(parent.class_id)
        .into_iter()
        .filter(|method| method.is_constructor())
        .collect();
    if constructors.iter().any(|ctor| parameter_descriptors(ctor).is_empty()) {
        return Vec::new();
    }
    constructors
        .first()
        .map(|ctor| parameter_descriptors(ctor).iter().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}
