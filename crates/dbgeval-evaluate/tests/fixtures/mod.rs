//! Debug-info binaries shared by the evaluator tests.
//!
//! Two small programs: `main` (`src/main.ets`) stopped in its global `main`
//! function, and `geo` (`src/geo.ets`) which `main` imports from.

#![allow(dead_code)]

use dbgeval_debuginfo::{
    AccessFlags, BinaryBuilder, BinaryFile, CONSTRUCTOR_NAME, GLOBAL_CLASS_NAME, LocalVariableSpec,
    OBJECT_DESCRIPTOR,
};
use dbgeval_evaluate::{DebugInfoStore, EvaluateOptions, EvaluationOutcome, EvaluationSession};
use std::rc::Rc;

pub const MAIN_MODULE: &str = "main";
pub const MAIN_PATH: &str = "src/main.ets";
pub const GEO_MODULE: &str = "geo";
pub const GEO_PATH: &str = "src/geo.ets";

/// Offset inside `main` where every local of the table below is live
/// except `late`.
pub const BREAKPOINT: u32 = 20;

pub fn build(builder: &BinaryBuilder) -> BinaryFile {
    builder.build().expect("fixture binary parses")
}

pub fn store_of(builders: &[BinaryBuilder]) -> Rc<DebugInfoStore> {
    let store = DebugInfoStore::from_binaries(builders.iter().map(build)).expect("fixture store");
    Rc::new(store)
}

/// `geo`: an abstract `Shape`, a `Point`, an `origin` global and an
/// overloaded `scale` function, all exported.
pub fn geo_builder() -> BinaryBuilder {
    let mut geo = BinaryBuilder::new(GEO_MODULE, GEO_PATH);
    geo.export("Shape", GEO_PATH, "Shape")
        .export("Point", GEO_PATH, "Point")
        .export("origin", GEO_PATH, "origin")
        .export("scale", GEO_PATH, "scale");

    let shape = geo.class("Shape", Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC | AccessFlags::ABSTRACT);
    geo.field(shape, "id", "I", AccessFlags::PUBLIC | AccessFlags::FINAL);
    geo.method(shape, CONSTRUCTOR_NAME, AccessFlags::PUBLIC, "V", &["I"]);
    geo.method(shape, "area", AccessFlags::PUBLIC | AccessFlags::ABSTRACT, "D", &[]);

    let point = geo.class("Point", Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC);
    geo.field(point, "x", "D", AccessFlags::PUBLIC);
    geo.field(point, "y", "D", AccessFlags::PUBLIC);

    geo.global_variable("origin", "Lgeo/Point;");
    geo.global_function("scale", "D", &["D"]);
    geo.global_function("scale", "Lgeo/Point;", &["Lgeo/Point;", "D"]);
    geo
}

/// `main`: `A` and `B extends A` locally, `Circle extends geo.Shape`, a few
/// globals, imports from `geo`, and the breakpoint method `main` with its
/// local-variable table.
pub fn main_builder() -> BinaryBuilder {
    let mut main = BinaryBuilder::new(MAIN_MODULE, MAIN_PATH);
    main.import("Point", GEO_PATH, "Point")
        .import("Shape", GEO_PATH, "Shape")
        .import("Origin", GEO_PATH, "origin")
        .import("scale", GEO_PATH, "scale")
        .import("geo", GEO_PATH, "*")
        .export("B", MAIN_PATH, "B");

    let a = main.class("A", Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC);
    main.field(a, "x", "I", AccessFlags::PUBLIC);
    main.method(a, CONSTRUCTOR_NAME, AccessFlags::PUBLIC, "V", &[]);

    let b = main.class("B", Some("Lmain/A;"), AccessFlags::PUBLIC);
    main.method(b, CONSTRUCTOR_NAME, AccessFlags::PUBLIC, "V", &[]);
    main.method(b, "get", AccessFlags::PUBLIC, "I", &[]);
    main.method(b, "secret", AccessFlags::PRIVATE, "J", &[]);

    let circle = main.class("Circle", Some("Lgeo/Shape;"), AccessFlags::PUBLIC);
    main.field(circle, "radius", "D", AccessFlags::PUBLIC);
    main.method(circle, CONSTRUCTOR_NAME, AccessFlags::PUBLIC, "V", &["D"]);
    main.method(circle, "area", AccessFlags::PUBLIC, "D", &[]);

    main.global_variable("counter", "I");
    main.global_function("twice", "I", &["I"]);
    main.global_function("twice", "D", &["D"]);

    let entry = main.global_function("main", "V", &[]);
    main.local(entry, LocalVariableSpec::new("count", "I", 0, 0, 100))
        .local(entry, LocalVariableSpec::new("ratio", "D", 1, 4, 60))
        .local(entry, LocalVariableSpec::new("b", "Lmain/B;", 2, 8, 40))
        .local(entry, LocalVariableSpec::new("flag", "Z", 3, 0, 100))
        .local(entry, LocalVariableSpec::new("late", "I", 4, 50, 10));
    main
}

pub fn program_store() -> Rc<DebugInfoStore> {
    store_of(&[main_builder(), geo_builder()])
}

pub fn options_at(path: &str, offset: u32) -> EvaluateOptions {
    EvaluateOptions {
        source_path: path.to_string(),
        class_name: Some(GLOBAL_CLASS_NAME.to_string()),
        method_name: Some("main".to_string()),
        bytecode_offset: offset,
        ..EvaluateOptions::default()
    }
}

pub fn session_over(store: Rc<DebugInfoStore>) -> EvaluationSession {
    EvaluationSession::with_store(options_at(MAIN_PATH, BREAKPOINT), store).expect("session")
}

/// Evaluate `source` at the breakpoint in `main`.
pub fn evaluate(source: &str) -> EvaluationOutcome {
    session_over(program_store())
        .evaluate(source)
        .expect("evaluation completes")
}

pub fn assert_clean(outcome: &EvaluationOutcome) {
    assert!(
        !outcome.has_errors(),
        "unexpected diagnostics: {:#?}\neval program:\n{}",
        outcome.diagnostics,
        outcome.program_text(outcome.eval_program)
    );
}

/// A single-module chain `C0 <- C1 <- ... <- C{length-1}`, each class with
/// one field `f<i>: int`.
pub fn chain_builder(module: &str, path: &str, length: usize) -> BinaryBuilder {
    let mut builder = BinaryBuilder::new(module, path);
    let mut parent: Option<String> = None;
    for index in 0..length {
        let name = format!("C{index}");
        let class = builder.class(
            &name,
            Some(parent.as_deref().unwrap_or(OBJECT_DESCRIPTOR)),
            AccessFlags::PUBLIC,
        );
        builder.field(class, &format!("f{index}"), "I", AccessFlags::PUBLIC);
        parent = builder.class_name(class).map(str::to_string);
    }
    builder.global_function("main", "V", &[]);
    builder
}
