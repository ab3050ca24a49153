//! Import/export path resolution.
//!
//! Maps a name visible in one module to the module that actually declares it,
//! following `import { a as b }`, `export { a as b }`, and `export * from`
//! records. Every function here is a pure query over the store's tables.
//!
//! `export * from` chains may form cycles between modules. The walk threads a
//! visited set of `(path, name)` pairs; a revisited pair contributes nothing.

use crate::store::{DebugInfoStore, EntityRef};
use dbgeval_debuginfo::WILDCARD;
use rustc_hash::FxHashSet;
use tracing::{Level, span, trace};

type Visited = FxHashSet<(String, String)>;

/// Target module of `import * as <alias>` in the module at `path`.
pub fn find_named_import_all<'s>(store: &'s DebugInfoStore, path: &str, alias: &str) -> Option<&'s str> {
    let table = store.get_import_export_table(path)?;
    table
        .imports_of(alias)
        .iter()
        .find(|entry| entry.name == WILDCARD)
        .map(|entry| entry.path.as_str())
}

/// Declaring module and name of the entity `name` imports into `path`.
///
/// `None` when nothing is imported under that name, when more than one
/// import provides it, or when the only import is a namespace import.
pub fn find_imported_entity(store: &DebugInfoStore, path: &str, name: &str) -> Option<EntityRef> {
    let table = store.get_import_export_table(path)?;
    let [import] = table.imports_of(name) else {
        return None;
    };
    if import.name == WILDCARD {
        return None;
    }
    trace!(%path, %name, from = %import.path, original = %import.name, "following import");
    find_exported_entity(store, &import.path, &import.name)
}

/// Declaring module and name of the entity the module at `path` exports as
/// `name`. Requires a single resolution: ambiguous exports yield `None`.
pub fn find_exported_entity(store: &DebugInfoStore, path: &str, name: &str) -> Option<EntityRef> {
    let mut visited = Visited::default();
    find_exported_entity_inner(store, path, name, &mut visited)
}

fn find_exported_entity_inner(
    store: &DebugInfoStore,
    path: &str,
    name: &str,
    visited: &mut Visited,
) -> Option<EntityRef> {
    let _span = span!(Level::TRACE, "find_exported_entity", %path, %name).entered();

    if !visited.insert((path.to_string(), name.to_string())) {
        trace!("export cycle, branch abandoned");
        return None;
    }
    let table = store.get_import_export_table(path)?;

    match table.exports_of(name) {
        [] => {}
        [export] if export.path == path => return Some(EntityRef::new(path, &export.name)),
        [export] => return find_exported_entity_inner(store, &export.path, &export.name, visited),
        _ => return None,
    }

    // `export * from`: exactly one source may provide the name.
    let mut found: Option<EntityRef> = None;
    for source in table.exports_of(WILDCARD) {
        let Some(entity) = find_exported_entity_inner(store, &source.path, name, visited) else {
            continue;
        };
        match &found {
            None => found = Some(entity),
            Some(previous) if *previous == entity => {}
            Some(_) => return None,
        }
    }
    found
}

/// Every declaration of function `name` reachable from the exports of the
/// module at `path`. Overloads may come from several modules; duplicates
/// are reported once.
pub fn find_exported_functions(store: &DebugInfoStore, path: &str, name: &str) -> Vec<EntityRef> {
    let mut visited = Visited::default();
    let mut found = Vec::new();
    collect_exported_functions(store, path, name, &mut visited, &mut found);
    found
}

fn collect_exported_functions(
    store: &DebugInfoStore,
    path: &str,
    name: &str,
    visited: &mut Visited,
    found: &mut Vec<EntityRef>,
) {
    if !visited.insert((path.to_string(), name.to_string())) {
        return;
    }
    let Some(table) = store.get_import_export_table(path) else {
        return;
    };
    for export in table.exports_of(name) {
        if export.path == path {
            let entity = EntityRef::new(path, &export.name);
            if !found.contains(&entity) {
                found.push(entity);
            }
        } else {
            collect_exported_functions(store, &export.path, &export.name, visited, found);
        }
    }
    for source in table.exports_of(WILDCARD) {
        collect_exported_functions(store, &source.path, name, visited, found);
    }
}

/// Overload counterpart of [`find_imported_entity`]: every function
/// declaration the import of `name` into `path` can reach.
pub fn find_imported_functions(store: &DebugInfoStore, path: &str, name: &str) -> Vec<EntityRef> {
    let Some(table) = store.get_import_export_table(path) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for import in table.imports_of(name) {
        if import.name == WILDCARD {
            continue;
        }
        for entity in find_exported_functions(store, &import.path, &import.name) {
            if !found.contains(&entity) {
                found.push(entity);
            }
        }
    }
    found
}
