//! Tests for the check queue: flat nesting for long superclass chains,
//! base-first order, early stop at declared ancestors, and deferral before
//! `pre_check`.

#[path = "fixtures/mod.rs"]
mod fixtures;

use dbgeval_checker::CompilerContext;
use dbgeval_evaluate::{EvalContext, EvalError, EvaluationOutcome, PRELUDE, ScopedDebugInfoPlugin};
use dbgeval_parser::parser::printer::print_node;
use fixtures::*;

const CHAIN_PATH: &str = "src/chain.ets";

fn evaluate_chain(length: usize, source: &str) -> EvaluationOutcome {
    let store = store_of(&[chain_builder("chain", CHAIN_PATH, length)]);
    let session = dbgeval_evaluate::EvaluationSession::with_store(options_at(CHAIN_PATH, 0), store)
        .expect("session");
    session.evaluate(source).expect("evaluation completes")
}

/// First line of each checked declaration, in check order.
fn checked_heads(outcome: &EvaluationOutcome) -> Vec<String> {
    outcome
        .plugin
        .checked_order()
        .iter()
        .map(|&node| {
            print_node(&outcome.host.arena, node)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

fn assert_flat_chain(length: usize) {
    let leaf = length - 1;
    let outcome = evaluate_chain(length, &format!("let c: C{leaf} = new C{leaf}(); let f: int = c.f0;"));
    assert_clean(&outcome);
    assert_eq!(outcome.stats.classes, length);
    assert_eq!(
        outcome.host.max_check_depth(),
        2,
        "chain of {length}: evaluation program plus one declaration at a time"
    );
    assert_eq!(outcome.plugin.max_depth(), 2);
    assert_eq!(outcome.plugin.pending_checks(), 0);

    let heads = checked_heads(&outcome);
    assert_eq!(heads.len(), length + 1, "every class, then the import: {heads:#?}");
    for (index, head) in heads.iter().take(length).enumerate() {
        assert!(
            head.starts_with(&format!("export declare class C{index} ")),
            "position {index} holds {head}"
        );
    }
    assert!(heads[length].starts_with("import { "), "{}", heads[length]);
}

#[test]
fn test_single_class_chain() {
    assert_flat_chain(1);
}

#[test]
fn test_short_chain_stays_flat() {
    assert_flat_chain(5);
}

#[test]
fn test_long_chain_stays_flat() {
    assert_flat_chain(50);
}

#[test]
fn test_chain_stops_at_declared_ancestor() {
    let outcome = evaluate_chain(6, "let a: C2 = new C2(); let b: C5 = new C5();");
    assert_clean(&outcome);
    assert_eq!(outcome.stats.classes, 6);

    let heads = checked_heads(&outcome);
    let classes: Vec<_> = heads
        .iter()
        .filter(|head| head.starts_with("export declare class "))
        .map(|head| head.split_whitespace().nth(3).unwrap_or_default().to_string())
        .collect();
    assert_eq!(classes, vec!["C0", "C1", "C2", "C3", "C4", "C5"]);
    let c2_import = heads.iter().position(|h| h.contains("C2 as C2")).expect("C2 import");
    let c3 = heads
        .iter()
        .position(|h| h.starts_with("export declare class C3 "))
        .expect("C3");
    assert!(c2_import < c3, "second walk starts after the first finished: {heads:#?}");
}

#[test]
fn test_checks_are_deferred_until_pre_check() {
    let store = store_of(&[chain_builder("chain", CHAIN_PATH, 3)]);
    let mut host = CompilerContext::new();
    host.add_prelude("<prelude>.ets", PRELUDE);
    let eval = host.add_source("src/chain.ets#eval", "chain.__eval", "function __evaluate(): void {}");
    let context = EvalContext {
        source_path: CHAIN_PATH.to_string(),
        module_name: "chain".to_string(),
        ..EvalContext::default()
    };
    let mut plugin = ScopedDebugInfoPlugin::new(store.clone(), context);
    plugin.set_eval_program(eval);

    let class = store.find_class(CHAIN_PATH, "C2");
    plugin
        .deserializer(&mut host)
        .create_class(CHAIN_PATH, class, eval)
        .expect("create_class")
        .expect("C2 exists");

    assert!(!plugin.is_prechecked());
    assert_eq!(plugin.pending_checks(), 4, "three classes and one import queued");
    assert!(plugin.checked_order().is_empty());
    assert_eq!(host.max_check_depth(), 0);
    assert!(matches!(
        plugin.post_check(),
        Err(EvalError::CheckerNotIdle { pending: 4 })
    ));

    plugin.pre_check(&mut host).expect("pre_check");
    assert!(plugin.is_prechecked());
    assert_eq!(plugin.pending_checks(), 0);
    assert_eq!(plugin.checked_order().len(), 4);
    assert_eq!(host.max_check_depth(), 1);
    plugin.post_check().expect("idle after pre_check");
    assert!(!host.has_errors(), "{:?}", host.all_diagnostics());
}

#[test]
fn test_cyclic_superclasses_abort_evaluation() {
    let mut builder = dbgeval_debuginfo::BinaryBuilder::new("cyc", "src/cyc.ets");
    let access = dbgeval_debuginfo::AccessFlags::PUBLIC;
    builder.class("P", Some("Lcyc/Q;"), access);
    builder.class("Q", Some("Lcyc/P;"), access);
    builder.global_function("main", "V", &[]);
    let session = dbgeval_evaluate::EvaluationSession::with_store(
        options_at("src/cyc.ets", 0),
        store_of(&[builder]),
    )
    .expect("session");

    let result = session.evaluate("let p: P = null;");
    assert!(
        matches!(result, Err(EvalError::InheritanceCycle { ref class }) if class == "Lcyc/P;"),
        "expected an inheritance cycle, got {:?}",
        result.as_ref().err()
    );
}

#[test]
fn test_class_extending_itself_is_a_cycle() {
    let mut builder = dbgeval_debuginfo::BinaryBuilder::new("selfish", "src/selfish.ets");
    builder.class("S", Some("Lselfish/S;"), dbgeval_debuginfo::AccessFlags::PUBLIC);
    builder.global_function("main", "V", &[]);
    let session = dbgeval_evaluate::EvaluationSession::with_store(
        options_at("src/selfish.ets", 0),
        store_of(&[builder]),
    )
    .expect("session");

    let result = session.evaluate("let s: S = null;");
    assert!(
        matches!(result, Err(EvalError::InheritanceCycle { ref class }) if class == "Lselfish/S;"),
        "expected an inheritance cycle, got {:?}",
        result.as_ref().err()
    );
}

#[test]
fn test_missing_superclass_module_aborts_evaluation() {
    let mut builder = dbgeval_debuginfo::BinaryBuilder::new("orphan", "src/orphan.ets");
    builder.class("Child", Some("Lnowhere/Parent;"), dbgeval_debuginfo::AccessFlags::PUBLIC);
    builder.global_function("main", "V", &[]);
    let session = dbgeval_evaluate::EvaluationSession::with_store(
        options_at("src/orphan.ets", 0),
        store_of(&[builder]),
    )
    .expect("session");

    let result = session.evaluate("let c: Child = null;");
    assert!(
        matches!(result, Err(EvalError::ModuleNotFound(ref module)) if module == "nowhere"),
        "got {:?}",
        result.as_ref().err()
    );
}
