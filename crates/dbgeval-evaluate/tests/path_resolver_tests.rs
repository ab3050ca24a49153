//! Tests for import/export path resolution, including `export *` cycles.

#[path = "fixtures/mod.rs"]
mod fixtures;

use dbgeval_debuginfo::{AccessFlags, BinaryBuilder, OBJECT_DESCRIPTOR};
use dbgeval_evaluate::path_resolver::{
    find_exported_entity, find_exported_functions, find_imported_entity, find_imported_functions,
    find_named_import_all,
};
use dbgeval_evaluate::{DebugInfoStore, EntityRef};
use fixtures::store_of;
use std::rc::Rc;

const A: &str = "src/a.ets";
const B: &str = "src/b.ets";
const C: &str = "src/c.ets";
const D: &str = "src/d.ets";
const E: &str = "src/e.ets";
const F: &str = "src/f.ets";
const G: &str = "src/g.ets";
const USER: &str = "src/user.ets";

/// - `b` declares class `X` and function `run`
/// - `a` re-exports `b.X` as `Y`
/// - `c` re-exports everything from `b` and `d`; `d` re-exports `c` (cycle)
///   and declares `Z`
/// - `f` declares its own `X` and `run`; `e` re-exports both `b` and `f`
/// - `g` reaches `b.X` twice, directly and through `c`
fn resolver_store() -> Rc<DebugInfoStore> {
    let mut a = BinaryBuilder::new("a", A);
    a.export("Y", B, "X");

    let mut b = BinaryBuilder::new("b", B);
    b.export("X", B, "X").export("run", B, "run");
    b.class("X", Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC);
    b.global_function("run", "V", &[]);

    let mut c = BinaryBuilder::new("c", C);
    c.export("*", B, "*").export("*", D, "*");

    let mut d = BinaryBuilder::new("d", D);
    d.export("*", C, "*").export("Z", D, "Z");
    d.class("Z", Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC);

    let mut e = BinaryBuilder::new("e", E);
    e.export("*", B, "*").export("*", F, "*");

    let mut f = BinaryBuilder::new("f", F);
    f.export("X", F, "X").export("run", F, "run");
    f.class("X", Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC);
    f.global_function("run", "I", &["I"]);

    let mut g = BinaryBuilder::new("g", G);
    g.export("*", B, "*").export("*", C, "*");

    let mut user = BinaryBuilder::new("user", USER);
    user.import("Local", A, "Y")
        .import("Deep", C, "Z")
        .import("Twice", B, "X")
        .import("Twice", F, "X")
        .import("ns", C, "*")
        .import("run", E, "run");

    store_of(&[a, b, c, d, e, f, g, user])
}

#[test]
fn test_renamed_export_resolves_to_declaration() {
    let store = resolver_store();
    assert_eq!(find_exported_entity(&store, A, "Y"), Some(EntityRef::new(B, "X")));
    assert_eq!(find_exported_entity(&store, A, "X"), None, "a only exports the alias");
}

#[test]
fn test_export_star_is_transitive() {
    let store = resolver_store();
    assert_eq!(find_exported_entity(&store, C, "X"), Some(EntityRef::new(B, "X")));
    assert_eq!(find_exported_entity(&store, C, "Z"), Some(EntityRef::new(D, "Z")));
    // d reaches b only through its cycle back to c.
    assert_eq!(find_exported_entity(&store, D, "X"), Some(EntityRef::new(B, "X")));
}

#[test]
fn test_export_star_cycle_terminates() {
    let store = resolver_store();
    assert_eq!(find_exported_entity(&store, C, "Missing"), None);
    assert_eq!(find_exported_entity(&store, D, "Missing"), None);
}

#[test]
fn test_ambiguous_export_star_yields_nothing() {
    let store = resolver_store();
    assert_eq!(find_exported_entity(&store, E, "X"), None);
}

#[test]
fn test_same_entity_through_two_routes_is_not_ambiguous() {
    let store = resolver_store();
    assert_eq!(find_exported_entity(&store, G, "X"), Some(EntityRef::new(B, "X")));
}

#[test]
fn test_imports_follow_exports() {
    let store = resolver_store();
    assert_eq!(find_imported_entity(&store, USER, "Local"), Some(EntityRef::new(B, "X")));
    assert_eq!(find_imported_entity(&store, USER, "Deep"), Some(EntityRef::new(D, "Z")));
    assert_eq!(find_imported_entity(&store, USER, "Twice"), None, "two imports under one alias");
    assert_eq!(find_imported_entity(&store, USER, "ns"), None, "namespace import is not an entity");
    assert_eq!(find_imported_entity(&store, USER, "Unknown"), None);
    assert_eq!(find_imported_entity(&store, "src/none.ets", "Local"), None);
}

#[test]
fn test_namespace_import_target() {
    let store = resolver_store();
    assert_eq!(find_named_import_all(&store, USER, "ns"), Some(C));
    assert_eq!(find_named_import_all(&store, USER, "Local"), None);
}

#[test]
fn test_function_overloads_are_collected_across_modules() {
    let store = resolver_store();
    let exported = find_exported_functions(&store, E, "run");
    assert_eq!(exported, vec![EntityRef::new(B, "run"), EntityRef::new(F, "run")]);

    let imported = find_imported_functions(&store, USER, "run");
    assert_eq!(imported, exported);
    assert!(find_imported_functions(&store, USER, "ns").is_empty());
}
