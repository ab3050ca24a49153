//! Tests for live-local materialization: reads, write-backs, live ranges
//! and the innermost-scope tie-break.

#[path = "fixtures/mod.rs"]
mod fixtures;

use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_debuginfo::{BinaryBuilder, LocalVariableSpec};
use dbgeval_evaluate::{EvaluateOptions, EvaluationOutcome, EvaluationSession};
use fixtures::*;

fn eval_text(outcome: &EvaluationOutcome) -> String {
    outcome.program_text(outcome.eval_program)
}

#[test]
fn test_primitive_local_is_read_and_written_back() {
    let outcome = evaluate("count = count + 1;");
    assert_clean(&outcome);

    let text = eval_text(&outcome);
    assert!(text.contains("let count: int = DebuggerAPI.getLocalInt(0);"), "{text}");
    assert!(text.contains("DebuggerAPI.setLocalInt(0, count);"));
    let read = text.find("let count").expect("read");
    let user = text.find("count = count + 1;").expect("user statement");
    let write = text.find("setLocalInt(0, count)").expect("write-back");
    assert!(read < user && user < write, "read, statement, write-back:\n{text}");
    assert_eq!(outcome.stats.locals, 1);
}

#[test]
fn test_repeated_references_share_one_declaration() {
    let outcome = evaluate("count = count + count; let c: int = count;");
    assert_clean(&outcome);
    let text = eval_text(&outcome);
    assert_eq!(text.matches("let count: int").count(), 1, "{text}");
    assert_eq!(text.matches("setLocalInt(0, count)").count(), 1);
    assert_eq!(outcome.stats.locals, 1);
}

#[test]
fn test_every_accessor_family() {
    let outcome = evaluate("ratio = ratio * 2.0; flag = !flag;");
    assert_clean(&outcome);
    let text = eval_text(&outcome);
    assert!(text.contains("let ratio: number = DebuggerAPI.getLocalDouble(1);"), "{text}");
    assert!(text.contains("DebuggerAPI.setLocalDouble(1, ratio);"));
    assert!(text.contains("let flag: boolean = DebuggerAPI.getLocalBoolean(3);"));
    assert!(text.contains("DebuggerAPI.setLocalBoolean(3, flag);"));
    assert_eq!(outcome.stats.locals, 2);
}

#[test]
fn test_reference_local_is_cast_and_its_class_synthesized() {
    let outcome = evaluate("let v: int = b.get() + b.x;");
    assert_clean(&outcome);

    let text = eval_text(&outcome);
    assert!(text.contains("let b: B = DebuggerAPI.getLocalObject(2) as B;"), "{text}");
    assert!(text.contains("DebuggerAPI.setLocalObject(2, b);"));
    assert!(text.contains("import { B as B } from \"main\";"));
    assert_eq!(outcome.stats.classes, 2, "B and its superclass A");
}

#[test]
fn test_local_outside_its_live_range_is_unknown() {
    let outcome = evaluate("let v: int = late;");
    assert_eq!(outcome.diagnostic_codes(), vec![diagnostic_codes::CANNOT_FIND_NAME]);
    assert_eq!(outcome.stats.locals, 0);
}

#[test]
fn test_local_in_nested_block_goes_to_that_block() {
    let outcome = evaluate("if (flag) { count = 1; }");
    assert_clean(&outcome);
    let text = eval_text(&outcome);
    let branch = text.find("if (flag) {").expect("if statement");
    let read = text.find("let count: int").expect("count read");
    assert!(branch < read, "count is declared inside the branch:\n{text}");
    let flag = text.find("let flag: boolean").expect("flag read");
    assert!(flag < branch, "flag is declared in the function body:\n{text}");
}

#[test]
fn test_no_method_location_means_no_locals() {
    let options = EvaluateOptions::new(MAIN_PATH);
    let session = EvaluationSession::with_store(options, program_store()).expect("session");
    assert!(session.live_variables().is_empty());
    let outcome = session.evaluate("count = 1;").expect("evaluate");
    assert_eq!(outcome.diagnostic_codes(), vec![diagnostic_codes::CANNOT_FIND_NAME]);
}

/// `i` lives in register 0 over the whole method and is shadowed by a
/// register-5 `i` over [10, 30). `j` has two entries with the same range.
fn shadowing_session(offset: u32) -> EvaluationSession {
    let mut builder = BinaryBuilder::new("loops", "src/loops.ets");
    let entry = builder.global_function("main", "V", &[]);
    builder
        .local(entry, LocalVariableSpec::new("i", "I", 0, 0, 100))
        .local(entry, LocalVariableSpec::new("i", "I", 5, 10, 20))
        .local(entry, LocalVariableSpec::new("j", "J", 1, 0, 100))
        .local(entry, LocalVariableSpec::new("j", "J", 2, 0, 100));
    EvaluationSession::with_store(options_at("src/loops.ets", offset), store_of(&[builder])).expect("session")
}

#[test]
fn test_innermost_scope_wins() {
    let inner = shadowing_session(15).evaluate("i = i + 1;").expect("evaluate");
    assert_clean(&inner);
    assert!(eval_text(&inner).contains("getLocalInt(5)"), "{}", eval_text(&inner));

    let outer = shadowing_session(40).evaluate("i = i + 1;").expect("evaluate");
    assert_clean(&outer);
    assert!(eval_text(&outer).contains("getLocalInt(0)"));
    assert!(!eval_text(&outer).contains("getLocalInt(5)"));
}

#[test]
fn test_equal_ranges_keep_the_first_entry() {
    let outcome = shadowing_session(50).evaluate("j = j + 1;").expect("evaluate");
    assert_clean(&outcome);
    let text = eval_text(&outcome);
    assert!(text.contains("let j: long = DebuggerAPI.getLocalLong(1);"), "{text}");
    assert!(!text.contains("getLocalLong(2)"));
}
