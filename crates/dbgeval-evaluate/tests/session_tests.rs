//! End-to-end evaluation sessions.

#[path = "fixtures/mod.rs"]
mod fixtures;

use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_evaluate::{EvalError, EvaluateOptions, EvaluationSession, SynthesisStats};
use fixtures::*;

#[test]
fn test_expression_over_synthesized_hierarchy() {
    let outcome = evaluate("new B().x + new B().get();");
    assert_clean(&outcome);
    assert_eq!(
        outcome.stats,
        SynthesisStats {
            classes: 2,
            methods: 4,
            fields: 1,
            imports: 1,
            ..SynthesisStats::default()
        }
    );
    assert!(outcome.proxy_program(GEO_PATH).is_none());

    let main = outcome
        .proxy_program(MAIN_PATH)
        .map(|program| outcome.program_text(program))
        .expect("main proxy");
    assert_eq!(main.matches("declare class A ").count(), 1, "{main}");
    assert_eq!(main.matches("declare class B extends A ").count(), 1, "{main}");
    // One constructor each for A and B.
    assert_eq!(main.matches("constructor(").count(), 2, "{main}");
    assert_eq!(main.matches("get(): int {").count(), 1, "{main}");
}

#[test]
fn test_each_evaluation_starts_from_a_fresh_host() {
    let session = session_over(program_store());
    let first = session.evaluate("let b: B = new B();").expect("first");
    let second = session.evaluate("let b: B = new B();").expect("second");
    assert_clean(&first);
    assert_clean(&second);
    assert_eq!(first.stats, second.stats);
    assert_eq!(second.stats.classes, 2, "nothing carries over between evaluations");
}

#[test]
fn test_user_errors_are_diagnostics() {
    let outcome = evaluate("let v: int = new B().missing;");
    assert_eq!(
        outcome.diagnostic_codes(),
        vec![diagnostic_codes::PROPERTY_DOES_NOT_EXIST]
    );

    let mistyped = evaluate("let s: string = count;");
    assert_eq!(
        mistyped.diagnostic_codes(),
        vec![diagnostic_codes::TYPE_NOT_ASSIGNABLE]
    );
}

#[test]
fn test_syntax_errors_are_diagnostics() {
    let outcome = evaluate("let = ;");
    assert!(outcome.has_errors());
    assert_eq!(outcome.stats, SynthesisStats::default());
}

#[test]
fn test_session_from_binaries_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let main = dir.path().join("main.dbgi");
    let geo = dir.path().join("geo.dbgi");
    main_builder().write_to(&main).expect("write main");
    geo_builder().write_to(&geo).expect("write geo");

    let mut options = options_at(MAIN_PATH, BREAKPOINT);
    options.context_binaries = vec![main, geo];
    let session = EvaluationSession::new(options).expect("session");
    assert_eq!(session.context().module_name, MAIN_MODULE);
    assert_eq!(session.live_variables().len(), 5);

    let outcome = session.evaluate("count = count + new B().get();").expect("evaluate");
    assert_clean(&outcome);
    assert_eq!(outcome.stats.locals, 1);
}

#[test]
fn test_unknown_source_path_is_fatal() {
    let result = EvaluationSession::with_store(EvaluateOptions::new("src/elsewhere.ets"), program_store());
    assert!(matches!(
        result,
        Err(EvalError::UnknownSourcePath(ref path)) if path == "src/elsewhere.ets"
    ));
}

#[test]
fn test_module_name_override_names_the_eval_program() {
    let mut options = options_at(MAIN_PATH, BREAKPOINT);
    options.module_name = Some("app.main".to_string());
    let session = EvaluationSession::with_store(options, program_store()).expect("session");
    let outcome = session.evaluate("count = 1;").expect("evaluate");
    assert_clean(&outcome);
    let program = outcome
        .host
        .binder
        .program(outcome.eval_program)
        .expect("eval program");
    assert_eq!(program.module_name, "app.main.__eval");
}
