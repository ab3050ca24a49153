//! Tests for the checker's callbacks into an `EvalHook`.

use dbgeval_binder::{ProgramId, SymbolId};
use dbgeval_checker::{CheckAbort, CompilerContext, EvalHook};
use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_parser::NodeIndex;
use dbgeval_parser::parser::ParserState;

const PRELUDE: &str = "declare class Object {}";

/// Declares classes on demand into the program that asked for them.
#[derive(Default)]
struct DeclaringHook {
    requested: Vec<String>,
    exported_requests: Vec<String>,
    blocks: Vec<NodeIndex>,
    prologue: Option<&'static str>,
}

fn parse_statement(host: &mut CompilerContext, text: &str) -> NodeIndex {
    let mut parser = ParserState::new(&mut host.arena, "synthesized.ets", text);
    let statement = parser.parse_statement();
    assert!(parser.diagnostics().is_empty());
    statement
}

impl EvalHook for DeclaringHook {
    fn find_identifier(
        &mut self,
        host: &mut CompilerContext,
        ident: NodeIndex,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        let name = host.arena.identifier_text(ident).unwrap_or_default().to_string();
        self.requested.push(name.clone());
        if name != "Late" {
            return Ok(None);
        }
        let Some(program) = host.binder.program_of_node(&host.arena, ident) else {
            return Ok(None);
        };
        let class = parse_statement(host, "class Late { v: int; }");
        let symbol = host.append_statement(program, class);
        host.check_node(self, class)?;
        Ok(Some(symbol))
    }

    fn find_exported_member(
        &mut self,
        host: &mut CompilerContext,
        namespace: SymbolId,
        name: &str,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        self.exported_requests.push(name.to_string());
        let module = host
            .binder
            .get_symbol(namespace)
            .and_then(|s| s.import_module.clone())
            .unwrap_or_default();
        let Some(program) = host.binder.program_by_module(&module) else {
            return Ok(None);
        };
        let statement = parse_statement(host, &format!("export let {name}: int = 5;"));
        Ok(Some(host.append_statement(program, statement)))
    }

    fn add_prologue_epilogue(
        &mut self,
        host: &mut CompilerContext,
        block: NodeIndex,
    ) -> Result<(), CheckAbort> {
        self.blocks.push(block);
        if let Some(text) = self.prologue.take() {
            let statement = parse_statement(host, text);
            let scope = host.binder.find_enclosing_scope(&host.arena, block);
            host.arena.reparent(statement, block);
            host.binder.bind_in_scope(&host.arena, scope, statement);
            host.arena.insert_block_statements(block, &[statement], &[]);
        }
        Ok(())
    }
}

fn setup(text: &str) -> (CompilerContext, ProgramId) {
    let mut ctx = CompilerContext::new();
    ctx.add_prelude("prelude.ets", PRELUDE);
    let program = ctx.add_source("app.ets", "app", text);
    (ctx, program)
}

#[test]
fn test_hook_supplies_unresolved_class() {
    let (mut ctx, program) = setup("function f(): int { let l: Late = new Late(); return l.v; }");
    let mut hook = DeclaringHook::default();
    ctx.check_program(&mut hook, program).expect("check");
    assert!(ctx.all_diagnostics().is_empty(), "unexpected: {:?}", ctx.all_diagnostics());
    // Declared once; the second reference resolves through the scope.
    assert_eq!(hook.requested, vec!["Late".to_string()]);
    assert_eq!(ctx.check_order().len(), 2);
    assert_eq!(ctx.max_check_depth(), 2);
}

#[test]
fn test_unhelpful_hook_falls_back_to_diagnostic() {
    let (mut ctx, program) = setup("let v: int = unknownThing;");
    let mut hook = DeclaringHook::default();
    ctx.check_program(&mut hook, program).expect("check");
    assert_eq!(hook.requested, vec!["unknownThing".to_string()]);
    let codes: Vec<u32> = ctx.all_diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![diagnostic_codes::CANNOT_FIND_NAME]);
}

#[test]
fn test_prologue_epilogue_called_once_per_block() {
    let (mut ctx, program) = setup(
        "function f(): void { let a: int = 1; if (a > 0) { a = 2; } else { a = 3; } }",
    );
    let mut hook = DeclaringHook::default();
    ctx.check_program(&mut hook, program).expect("check");
    assert_eq!(hook.blocks.len(), 3);
    let mut unique = hook.blocks.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3);
}

#[test]
fn test_inserted_prologue_is_checked() {
    let (mut ctx, program) = setup("function f(): void { let a: int = 1; }");
    let mut hook = DeclaringHook {
        prologue: Some("let injected: int = \"text\";"),
        ..DeclaringHook::default()
    };
    ctx.check_program(&mut hook, program).expect("check");
    let codes: Vec<u32> = ctx.all_diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![diagnostic_codes::TYPE_NOT_ASSIGNABLE]);
}

#[test]
fn test_namespace_member_supplied_by_hook() {
    let mut ctx = CompilerContext::new();
    ctx.add_prelude("prelude.ets", PRELUDE);
    ctx.add_source("lib.ets", "lib", "export let base: int = 1;");
    let app = ctx.add_source(
        "app.ets",
        "app",
        "import * as L from \"lib\"; let v: int = L.base + L.extra;",
    );
    let mut hook = DeclaringHook::default();
    ctx.check_program(&mut hook, app).expect("check");
    assert!(ctx.all_diagnostics().is_empty(), "unexpected: {:?}", ctx.all_diagnostics());
    assert_eq!(hook.exported_requests, vec!["extra".to_string()]);
}

struct FailingHook;

#[derive(Debug, thiserror::Error)]
#[error("debug info unavailable")]
struct Unavailable;

impl EvalHook for FailingHook {
    fn find_identifier(
        &mut self,
        _host: &mut CompilerContext,
        _ident: NodeIndex,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        Err(CheckAbort::Hook(Box::new(Unavailable)))
    }
}

#[test]
fn test_hook_failure_aborts_check() {
    let (mut ctx, program) = setup("let v: int = unknownThing;");
    let err = ctx
        .check_program(&mut FailingHook, program)
        .expect_err("abort");
    assert_eq!(err.to_string(), "debug info unavailable");
    let CheckAbort::Hook(inner) = err else {
        panic!("expected hook error");
    };
    assert!(inner.downcast::<Unavailable>().is_ok());
}
