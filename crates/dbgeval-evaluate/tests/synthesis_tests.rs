//! Tests for declaration synthesis: classes, superclass chains across
//! modules, globals, overloads, namespace imports and the façade.

#[path = "fixtures/mod.rs"]
mod fixtures;

use dbgeval_binder::ProgramId;
use dbgeval_checker::CompilerContext;
use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_debuginfo::{AccessFlags, BinaryBuilder, CONSTRUCTOR_NAME, OBJECT_DESCRIPTOR};
use dbgeval_evaluate::{DebugInfoStore, EvalContext, PRELUDE, ScopedDebugInfoPlugin};
use dbgeval_parser::parser::printer::print_node;
use fixtures::*;
use std::rc::Rc;

fn proxy_text(outcome: &dbgeval_evaluate::EvaluationOutcome, path: &str) -> String {
    let program = outcome
        .proxy_program(path)
        .unwrap_or_else(|| panic!("no proxy program for {path}"));
    outcome.program_text(program)
}

fn occurrences(text: &str, needle: &str) -> usize {
    text.matches(needle).count()
}

#[test]
fn test_class_and_superclass_declared_base_first() {
    let outcome = evaluate("let b: B = new B(); let v: int = b.x + b.get();");
    assert_clean(&outcome);

    let main = proxy_text(&outcome, MAIN_PATH);
    let a = main.find("export declare class A {").expect("A declared");
    let b = main.find("export declare class B extends A {").expect("B declared");
    assert!(a < b, "A must precede B:\n{main}");
    assert!(main.contains("x: int;"));
    assert!(main.contains("get(): int {"));
    assert!(main.contains("private secret(): long {"));
    assert!(main.contains("return DebuggerAPI.getLocalInt(0) as int;"));

    let eval = outcome.program_text(outcome.eval_program);
    assert!(eval.contains("import { B as B } from \"main\";"), "{eval}");
    assert!(!eval.contains("import { A"), "A is never named by the expression");

    assert_eq!(outcome.stats.classes, 2);
    assert_eq!(outcome.stats.imports, 1);
    assert_eq!(outcome.stats.fields, 1);
}

#[test]
fn test_each_class_is_declared_once() {
    let outcome = evaluate("let b1: B = new B(); let b2: B = new B(); let a: A = b1; let a2: A = b2;");
    assert_clean(&outcome);

    let main = proxy_text(&outcome, MAIN_PATH);
    assert_eq!(occurrences(&main, "declare class A "), 1);
    assert_eq!(occurrences(&main, "declare class B "), 1);
    let eval = outcome.program_text(outcome.eval_program);
    assert_eq!(occurrences(&eval, "import { B as B }"), 1);
    assert_eq!(occurrences(&eval, "import { A as A }"), 1);
    assert_eq!(outcome.stats.classes, 2);
    assert_eq!(outcome.stats.imports, 2);
}

#[test]
fn test_superclass_in_another_module_is_imported_once() {
    let outcome = evaluate(
        "let c1: Circle = new Circle(1.5); let c2: Circle = new Circle(2.5);
         let s: Shape = c1; let r: number = c2.area(); let i: int = c1.id;",
    );
    assert_clean(&outcome);

    let geo = proxy_text(&outcome, GEO_PATH);
    assert!(geo.contains("export declare abstract class Shape {"), "{geo}");
    assert!(geo.contains("readonly id: int;"));
    assert!(geo.contains("abstract area(): number;"));

    let main = proxy_text(&outcome, MAIN_PATH);
    assert_eq!(occurrences(&main, "import { Shape as Shape } from \"geo\";"), 1, "{main}");
    assert!(main.contains("export declare class Circle extends Shape {"));
    assert!(
        main.contains("super(DebuggerAPI.getLocalInt(0) as int);"),
        "Circle's constructor must satisfy Shape's:\n{main}"
    );

    let eval = outcome.program_text(outcome.eval_program);
    assert_eq!(occurrences(&eval, "import { Circle as Circle } from \"main\";"), 1);
    assert_eq!(occurrences(&eval, "import { Shape as Shape } from \"geo\";"), 1);
    assert_eq!(outcome.stats.imports, 3);
}

const LIB_PATH: &str = "src/lib.ets";
const APP_PATH: &str = "src/app.ets";

/// `app.Widget extends lib.Widget`: the subclass shares its superclass's
/// simple name.
fn widget_store() -> Rc<DebugInfoStore> {
    let mut lib = BinaryBuilder::new("lib", LIB_PATH);
    lib.export("Widget", LIB_PATH, "Widget");
    let base = lib.class("Widget", Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC);
    lib.field(base, "b", "I", AccessFlags::PUBLIC);
    lib.method(base, CONSTRUCTOR_NAME, AccessFlags::PUBLIC, "V", &[]);

    let mut app = BinaryBuilder::new("app", APP_PATH);
    let derived = app.class("Widget", Some("Llib/Widget;"), AccessFlags::PUBLIC);
    app.field(derived, "a", "I", AccessFlags::PUBLIC);
    app.method(derived, CONSTRUCTOR_NAME, AccessFlags::PUBLIC, "V", &[]);
    app.global_function("main", "V", &[]);
    store_of(&[lib, app])
}

#[test]
fn test_subclass_named_like_its_superclass_is_declared() {
    let session = dbgeval_evaluate::EvaluationSession::with_store(options_at(APP_PATH, 0), widget_store())
        .expect("session");
    let outcome = session
        .evaluate("let w: Widget = new Widget(); let n: int = w.b + w.a;")
        .expect("evaluation completes");
    assert_clean(&outcome);

    let app = proxy_text(&outcome, APP_PATH);
    assert_eq!(occurrences(&app, "import { Widget as lib$Widget } from \"lib\";"), 1, "{app}");
    assert!(app.contains("export declare class Widget extends lib$Widget {"), "{app}");
    assert!(app.contains("a: int;"));
    assert!(!app.contains("import { Widget as Widget }"), "{app}");

    let lib = proxy_text(&outcome, LIB_PATH);
    assert!(lib.contains("export declare class Widget {"), "{lib}");

    let eval = outcome.program_text(outcome.eval_program);
    assert!(eval.contains("import { Widget as Widget } from \"app\";"), "{eval}");
    assert_eq!(outcome.stats.classes, 2);

    let app_program = outcome.proxy_program(APP_PATH).expect("app proxy");
    assert!(outcome.plugin.is_entity_declared(app_program, "Widget"));
    assert!(outcome.plugin.is_entity_imported(app_program, "lib$Widget"));
    assert!(!outcome.plugin.is_entity_imported(app_program, "Widget"));
}

#[test]
fn test_abstract_class_is_not_instantiable() {
    let outcome = evaluate("new Shape(1);");
    assert_eq!(
        outcome.diagnostic_codes(),
        vec![diagnostic_codes::CANNOT_CREATE_ABSTRACT_INSTANCE]
    );
}

#[test]
fn test_globals_and_overloads() {
    let outcome = evaluate("let n: number = counter + twice(3) + twice(1.5);");
    assert_clean(&outcome);

    let main = proxy_text(&outcome, MAIN_PATH);
    assert!(main.contains("export declare let counter: int;"), "{main}");
    assert_eq!(occurrences(&main, "export declare function twice("), 2);
    assert!(main.contains("function twice(arg0: int): int {"));
    assert!(main.contains("function twice(arg0: number): number {"));

    let eval = outcome.program_text(outcome.eval_program);
    assert!(eval.contains("import { counter as counter } from \"main\";"));
    assert_eq!(occurrences(&eval, "import { twice as twice }"), 1);
    assert_eq!(outcome.stats.global_variables, 1);
    assert_eq!(outcome.stats.global_functions, 2);
}

#[test]
fn test_renamed_imports_keep_the_local_alias() {
    let outcome = evaluate("let o: Point = Origin; let x: number = o.x + scale(2.0);");
    assert_clean(&outcome);

    let geo = proxy_text(&outcome, GEO_PATH);
    assert!(geo.contains("export declare let origin: Point;"), "{geo}");
    assert!(geo.contains("export declare class Point {"));

    let eval = outcome.program_text(outcome.eval_program);
    assert!(eval.contains("import { origin as Origin } from \"geo\";"), "{eval}");
    assert!(eval.contains("import { Point as Point } from \"geo\";"));
    assert!(eval.contains("import { scale as scale } from \"geo\";"));
    assert!(outcome.proxy_program(MAIN_PATH).is_none(), "nothing of main was needed");
}

#[test]
fn test_namespace_import_members() {
    let outcome = evaluate("let p: number = geo.origin.x + geo.scale(1.5);");
    assert_clean(&outcome);

    let eval = outcome.program_text(outcome.eval_program);
    assert!(eval.contains("import * as geo from \"geo\";"), "{eval}");
    let geo = proxy_text(&outcome, GEO_PATH);
    assert!(geo.contains("export declare let origin: Point;"));
    assert_eq!(occurrences(&geo, "export declare function scale("), 2);
    // Members are declared where they live and not imported by name.
    assert!(!eval.contains("import { origin"));
}

#[test]
fn test_unknown_names_stay_diagnostics() {
    let outcome = evaluate("let v: int = nothing; let w: Nowhere = null;");
    assert_eq!(
        outcome.diagnostic_codes(),
        vec![diagnostic_codes::CANNOT_FIND_NAME, diagnostic_codes::CANNOT_FIND_NAME]
    );
    assert_eq!(outcome.stats.classes, 0);
    assert!(outcome.proxy_program(MAIN_PATH).is_none());
}

// =============================================================================
// Façade
// =============================================================================

fn facade_host() -> (CompilerContext, ScopedDebugInfoPlugin, ProgramId) {
    facade_host_over(program_store(), MAIN_PATH, MAIN_MODULE)
}

fn facade_host_over(
    store: Rc<DebugInfoStore>,
    path: &str,
    module: &str,
) -> (CompilerContext, ScopedDebugInfoPlugin, ProgramId) {
    let mut host = CompilerContext::new();
    host.add_prelude("<prelude>.ets", PRELUDE);
    let eval = host.add_source(
        &format!("{path}#eval"),
        &format!("{module}.__eval"),
        "function __evaluate(): void {}",
    );
    let context = EvalContext {
        source_path: path.to_string(),
        module_name: module.to_string(),
        ..EvalContext::default()
    };
    let mut plugin = ScopedDebugInfoPlugin::new(store, context);
    plugin.set_eval_program(eval);
    plugin.pre_check(&mut host).expect("pre_check");
    (host, plugin, eval)
}

fn program_source(host: &CompilerContext, program: ProgramId) -> String {
    host.program_statements(program)
        .into_iter()
        .map(|statement| print_node(&host.arena, statement))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_facade_create_class_is_idempotent() {
    let (mut host, mut plugin, eval) = facade_host();
    let store = program_store();
    let class = store.find_class(MAIN_PATH, "B");

    let first = plugin
        .deserializer(&mut host)
        .create_class(MAIN_PATH, class, eval)
        .expect("create_class")
        .expect("B exists");
    let second = plugin
        .deserializer(&mut host)
        .create_class(MAIN_PATH, class, eval)
        .expect("create_class again")
        .expect("B exists");
    assert_eq!(first, second);

    let main = plugin.proxies().get_program(MAIN_PATH).expect("main proxy");
    assert!(plugin.is_entity_declared(main, "A"));
    assert!(plugin.is_entity_declared(main, "B"));
    assert!(plugin.is_entity_imported(eval, "B"));
    assert!(!plugin.is_entity_declared(eval, "B"), "an import alias is not a declaration");
    assert!(!plugin.is_entity_imported(eval, "A"));
    assert_eq!(plugin.stats().classes, 2);
    assert_eq!(plugin.pending_checks(), 0);
    assert!(!host.has_errors(), "{:?}", host.all_diagnostics());
}

#[test]
fn test_facade_globals() {
    let (mut host, mut plugin, eval) = facade_host();

    let counter = plugin
        .deserializer(&mut host)
        .create_global_variable(MAIN_PATH, "counter", eval)
        .expect("create_global_variable");
    assert!(counter.is_some());

    let twice = plugin
        .deserializer(&mut host)
        .create_global_function_overloads(MAIN_PATH, "twice", eval)
        .expect("create_global_function_overloads");
    assert_eq!(twice.len(), 1, "both overloads live in main");

    let missing = plugin
        .deserializer(&mut host)
        .create_global_variable(MAIN_PATH, "missing", eval)
        .expect("lookup");
    assert!(missing.is_none());

    let main = plugin.proxies().get_program(MAIN_PATH).expect("main proxy");
    let text = program_source(&host, main);
    assert_eq!(occurrences(&text, "export declare function twice("), 2, "{text}");
    assert_eq!(plugin.stats().global_functions, 2);
    assert_eq!(plugin.stats().global_variables, 1);
    assert!(!host.has_errors(), "{:?}", host.all_diagnostics());
}

const P_PATH: &str = "src/p.ets";
const Q_PATH: &str = "src/q.ets";
const X_PATH: &str = "src/x.ets";
const USER_PATH: &str = "src/user.ets";

/// `run` is declared in both `p` and `q`; `x` re-exports both and `user`
/// imports `run` from `x`.
fn split_overload_store() -> Rc<DebugInfoStore> {
    let mut p = BinaryBuilder::new("p", P_PATH);
    p.export("run", P_PATH, "run");
    p.global_function("run", "V", &[]);

    let mut q = BinaryBuilder::new("q", Q_PATH);
    q.export("run", Q_PATH, "run");
    q.global_function("run", "I", &["I"]);
    q.global_function("run", "D", &["D", "D"]);

    let mut x = BinaryBuilder::new("x", X_PATH);
    x.export("*", P_PATH, "*").export("*", Q_PATH, "*");

    let mut user = BinaryBuilder::new("user", USER_PATH);
    user.import("run", X_PATH, "run");
    user.global_function("main", "V", &[]);
    store_of(&[p, q, x, user])
}

#[test]
fn test_facade_overloads_split_across_modules() {
    let (mut host, mut plugin, eval) = facade_host_over(split_overload_store(), USER_PATH, "user");

    let run = plugin
        .deserializer(&mut host)
        .create_global_function_overloads(USER_PATH, "run", eval)
        .expect("create_global_function_overloads");
    assert_eq!(run.len(), 2, "one symbol per declaring module");

    let p = plugin.proxies().get_program(P_PATH).expect("p proxy");
    let q = plugin.proxies().get_program(Q_PATH).expect("q proxy");
    let p_text = program_source(&host, p);
    let q_text = program_source(&host, q);
    assert_eq!(occurrences(&p_text, "export declare function run("), 1, "{p_text}");
    assert_eq!(occurrences(&q_text, "export declare function run("), 2, "{q_text}");
    assert!(q_text.contains("function run(arg0: int): int {"), "{q_text}");
    assert!(plugin.is_entity_declared(p, "run"));
    assert!(plugin.is_entity_declared(q, "run"));
    assert!(plugin.is_entity_imported(eval, "run"));
    assert_eq!(plugin.stats().global_functions, 3);

    let again = plugin
        .deserializer(&mut host)
        .create_global_function_overloads(USER_PATH, "run", eval)
        .expect("again");
    assert_eq!(again, run);
    assert_eq!(plugin.stats().global_functions, 3);
    assert!(!host.has_errors(), "{:?}", host.all_diagnostics());
}

#[test]
fn test_unknown_function_has_no_overloads() {
    let (mut host, mut plugin, eval) = facade_host();
    let none = plugin
        .deserializer(&mut host)
        .create_global_function_overloads(MAIN_PATH, "missing", eval)
        .expect("lookup");
    assert!(none.is_empty());
}
