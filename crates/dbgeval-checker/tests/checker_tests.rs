//! Tests for statement/expression checking on plain programs.

use dbgeval_binder::ProgramId;
use dbgeval_checker::{CheckAbort, CompilerContext, NoopHook, TypeId};
use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_parser::NodeIndex;

const PRELUDE: &str = "declare class Object {}";

fn context_with(module: &str, text: &str) -> (CompilerContext, ProgramId) {
    let mut ctx = CompilerContext::new();
    ctx.add_prelude("prelude.ets", PRELUDE);
    let program = ctx.add_source(&format!("{module}.ets"), module, text);
    assert!(ctx.diagnostics.is_empty(), "parse diagnostics: {:?}", ctx.diagnostics);
    (ctx, program)
}

fn check(text: &str) -> CompilerContext {
    let (mut ctx, program) = context_with("app", text);
    ctx.check_program(&mut NoopHook, program).expect("check aborted");
    ctx
}

fn codes(ctx: &CompilerContext) -> Vec<u32> {
    ctx.all_diagnostics().iter().map(|d| d.code).collect()
}

#[test]
fn test_well_typed_program_has_no_diagnostics() {
    let ctx = check(
        "class A { x: int; constructor() {} get(): int { return this.x; } }
         class B extends A { y: double; }
         function f(): double { let b: B = new B(); return b.x + b.y + b.get(); }",
    );
    assert!(codes(&ctx).is_empty(), "unexpected: {:?}", ctx.all_diagnostics());
}

#[test]
fn test_unknown_name_is_reported() {
    let ctx = check("function f(): void { let v: int = missing; }");
    assert_eq!(codes(&ctx), vec![diagnostic_codes::CANNOT_FIND_NAME]);
    assert!(ctx.diagnostics[0].message_text.contains("missing"));
}

#[test]
fn test_unknown_type_is_reported() {
    let ctx = check("let v: Nowhere = null;");
    assert_eq!(codes(&ctx), vec![diagnostic_codes::CANNOT_FIND_NAME]);
}

#[test]
fn test_numeric_widening_only() {
    let ok = check("let l: long = 1; let d: double = l; let f: float = 2;");
    assert!(codes(&ok).is_empty(), "unexpected: {:?}", ok.all_diagnostics());

    let narrowing = check("let i: int = 1.5;");
    assert_eq!(codes(&narrowing), vec![diagnostic_codes::TYPE_NOT_ASSIGNABLE]);
    assert_eq!(
        narrowing.diagnostics[0].message_text,
        "Type 'number' is not assignable to type 'int'."
    );
}

#[test]
fn test_string_is_not_numeric() {
    let ctx = check("let s: string = 1;");
    assert_eq!(codes(&ctx), vec![diagnostic_codes::TYPE_NOT_ASSIGNABLE]);
}

#[test]
fn test_class_assignability_follows_inheritance() {
    let ok = check(
        "class A {} class B extends A {}
         let a: A = new B(); let o: Object = a; let n: A = null;",
    );
    assert!(codes(&ok).is_empty(), "unexpected: {:?}", ok.all_diagnostics());

    let bad = check("class A {} class B extends A {} let b: B = new A();");
    assert_eq!(codes(&bad), vec![diagnostic_codes::TYPE_NOT_ASSIGNABLE]);
}

#[test]
fn test_casts() {
    let ok = check(
        "class A {} let o: Object = new A(); let a: A = o as A; let i: int = 1.5 as int;",
    );
    assert!(codes(&ok).is_empty(), "unexpected: {:?}", ok.all_diagnostics());

    let bad = check("class A {} let s: string = new A() as string;");
    assert_eq!(codes(&bad), vec![diagnostic_codes::CONVERSION_MAY_BE_A_MISTAKE]);
}

#[test]
fn test_abstract_class_cannot_be_instantiated() {
    let ctx = check("abstract class Shape {} let s: Shape = new Shape();");
    assert_eq!(codes(&ctx), vec![diagnostic_codes::CANNOT_CREATE_ABSTRACT_INSTANCE]);
}

#[test]
fn test_overloaded_function_selects_matching_signature() {
    let ctx = check(
        "declare function g(a: int): int;
         declare function g(a: string): string;
         let r: string = g(\"x\");
         let n: int = g(1);",
    );
    assert!(codes(&ctx).is_empty(), "unexpected: {:?}", ctx.all_diagnostics());

    let bad = check(
        "declare function g(a: int): int;
         declare function g(a: string): string;
         let r: int = g(true);",
    );
    assert_eq!(codes(&bad), vec![diagnostic_codes::NO_OVERLOAD_MATCHES]);
}

#[test]
fn test_single_signature_arity_and_argument_errors() {
    let arity = check("class A { m(a: int): void {} } function f(): void { new A().m(); }");
    assert_eq!(codes(&arity), vec![diagnostic_codes::EXPECTED_ARGUMENTS]);
    assert_eq!(arity.diagnostics[0].message_text, "Expected 1 arguments, but got 0.");

    let argument = check("class A { m(a: int): void {} } function f(): void { new A().m(\"s\"); }");
    assert_eq!(codes(&argument), vec![diagnostic_codes::TYPE_NOT_ASSIGNABLE]);
}

#[test]
fn test_static_members_through_class_name() {
    let ok = check(
        "class Counter { static count: int; static bump(): int { return Counter.count + 1; } }
         let c: int = Counter.bump();",
    );
    assert!(codes(&ok).is_empty(), "unexpected: {:?}", ok.all_diagnostics());

    let instance_only = check("class A { x: int; } let v: int = A.x;");
    assert_eq!(codes(&instance_only), vec![diagnostic_codes::PROPERTY_DOES_NOT_EXIST]);
}

#[test]
fn test_missing_property() {
    let ctx = check("class A {} function f(): void { let v: int = new A().nope; }");
    assert_eq!(codes(&ctx), vec![diagnostic_codes::PROPERTY_DOES_NOT_EXIST]);
    assert_eq!(
        ctx.diagnostics[0].message_text,
        "Property 'nope' does not exist on type 'A'."
    );
}

#[test]
fn test_circular_base_is_reported_once() {
    let ctx = check("class C extends D {} class D extends C {}");
    let circular = codes(&ctx)
        .into_iter()
        .filter(|&c| c == diagnostic_codes::CIRCULAR_BASE_REFERENCE)
        .count();
    assert!(circular >= 1);
}

#[test]
fn test_super_call_outside_constructor() {
    let ctx = check("class A {} class B extends A { m(): void { super(); } }");
    assert_eq!(codes(&ctx), vec![diagnostic_codes::SUPER_CALL_OUTSIDE_CONSTRUCTOR]);

    let ok = check("class A { constructor(v: int) {} } class B extends A { constructor() { super(1); } }");
    assert!(codes(&ok).is_empty(), "unexpected: {:?}", ok.all_diagnostics());
}

#[test]
fn test_this_outside_class_and_return_outside_function() {
    let ctx = check("let v: int = this; return;");
    assert_eq!(
        codes(&ctx),
        vec![
            diagnostic_codes::THIS_OUTSIDE_CLASS,
            diagnostic_codes::RETURN_OUTSIDE_FUNCTION
        ]
    );
}

#[test]
fn test_return_type_mismatch() {
    let ctx = check("function f(): int { return \"s\"; } function g(): void { return 1; }");
    assert_eq!(
        codes(&ctx),
        vec![
            diagnostic_codes::TYPE_NOT_ASSIGNABLE,
            diagnostic_codes::TYPE_NOT_ASSIGNABLE
        ]
    );
}

#[test]
fn test_operators() {
    let ok = check(
        "let s: string = \"a\" + 1; let b: boolean = 1 < 2.5 && !false; let l: long = 1 + (2 as long);",
    );
    assert!(codes(&ok).is_empty(), "unexpected: {:?}", ok.all_diagnostics());

    let bad = check("let v: int = true - 1;");
    assert_eq!(codes(&bad), vec![diagnostic_codes::OPERATOR_CANNOT_BE_APPLIED]);
}

#[test]
fn test_assignment_target() {
    let ctx = check("function f(): void { let a: int = 1; a = 2; 1 = a; }");
    assert_eq!(codes(&ctx), vec![diagnostic_codes::INVALID_ASSIGNMENT_TARGET]);
}

#[test]
fn test_imports_across_programs() {
    let mut ctx = CompilerContext::new();
    ctx.add_prelude("prelude.ets", PRELUDE);
    ctx.add_source(
        "lib.ets",
        "lib",
        "export class A { v: int; } export function make(): A { return new A(); }",
    );
    let app = ctx.add_source(
        "app.ets",
        "app",
        "import { A as Alias, make } from \"lib\";
         import * as L from \"lib\";
         let a: Alias = make();
         let b: Alias = L.make();
         let v: int = a.v + b.v;",
    );
    ctx.check_program(&mut NoopHook, app).expect("check");
    assert!(codes(&ctx).is_empty(), "unexpected: {:?}", ctx.all_diagnostics());
}

#[test]
fn test_bad_imports() {
    let mut ctx = CompilerContext::new();
    ctx.add_prelude("prelude.ets", PRELUDE);
    ctx.add_source("lib.ets", "lib", "export class A {} class Hidden {}");
    let app = ctx.add_source(
        "app.ets",
        "app",
        "import { Hidden } from \"lib\"; import { A } from \"nowhere\";",
    );
    ctx.check_program(&mut NoopHook, app).expect("check");
    assert_eq!(
        codes(&ctx),
        vec![
            diagnostic_codes::MODULE_HAS_NO_EXPORTED_MEMBER,
            diagnostic_codes::CANNOT_FIND_MODULE
        ]
    );
}

#[test]
fn test_double_check_aborts() {
    let (mut ctx, program) = context_with("app", "class A {}");
    let class = ctx.program_statements(program)[0];
    ctx.check_node(&mut NoopHook, class).expect("first check");
    let err = ctx.check_node(&mut NoopHook, class).expect_err("second check");
    assert!(matches!(err, CheckAbort::DoubleCheck(n) if n == class.0));
}

#[test]
fn test_check_program_skips_checked_roots_and_records_order() {
    let (mut ctx, program) = context_with("app", "class A {} class B {} class C {}");
    let statements = ctx.program_statements(program);
    ctx.check_node(&mut NoopHook, statements[1]).expect("check B");
    ctx.check_program(&mut NoopHook, program).expect("check program");
    assert_eq!(ctx.check_order(), &[statements[1], statements[0], statements[2]]);
    assert_eq!(ctx.max_check_depth(), 1);
}

#[test]
fn test_expression_types_are_recorded() {
    let (mut ctx, program) = context_with("app", "let v = 1; let w = 3000000000; let s = \"x\";");
    ctx.check_program(&mut NoopHook, program).expect("check");
    let statements = ctx.program_statements(program);
    let declaration_of = |ctx: &CompilerContext, statement: NodeIndex| {
        let node = ctx.arena.get(statement).expect("statement");
        ctx.arena.get_variable(node).expect("variable").declarations.nodes[0]
    };
    let v = declaration_of(&ctx, statements[0]);
    let w = declaration_of(&ctx, statements[1]);
    let s = declaration_of(&ctx, statements[2]);
    assert_eq!(ctx.node_type(v), Some(TypeId::INT));
    assert_eq!(ctx.node_type(w), Some(TypeId::LONG));
    assert_eq!(ctx.node_type(s), Some(TypeId::STRING));
}
