//! The options-file entry point, end to end over binaries on disk.

use dbgeval::{diagnostics_json, evaluate_with_config};
use dbgeval_debuginfo::{AccessFlags, BinaryBuilder, CONSTRUCTOR_NAME, LocalVariableSpec, OBJECT_DESCRIPTOR};
use std::path::{Path, PathBuf};

fn write_program(dir: &Path) -> PathBuf {
    let mut shop = BinaryBuilder::new("shop", "src/shop.ets");
    let item = shop.class("Item", Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC);
    shop.field(item, "price", "D", AccessFlags::PUBLIC);
    shop.method(item, CONSTRUCTOR_NAME, AccessFlags::PUBLIC, "V", &[]);
    let entry = shop.global_function("checkout", "V", &[]);
    shop.local(entry, LocalVariableSpec::new("total", "D", 0, 0, 64))
        .local(entry, LocalVariableSpec::new("item", "Lshop/Item;", 1, 0, 64));
    shop.write_to(&dir.join("shop.dbgi")).expect("write binary");

    let config = dir.join("evaluate.json");
    std::fs::write(
        &config,
        r#"{
            "contextBinaries": ["shop.dbgi"],
            "sourcePath": "src/shop.ets",
            "className": "ETSGLOBAL",
            "methodName": "checkout",
            "bytecodeOffset": 8
        }"#,
    )
    .expect("write options");
    config
}

#[test]
fn test_evaluates_with_relative_binary_paths() {
    dbgeval::tracing_config::init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_program(dir.path());

    let outcome = evaluate_with_config(&config, "total = total + item.price;").expect("evaluate");
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
    assert_eq!(outcome.stats.classes, 1);
    assert_eq!(outcome.stats.locals, 2);
    assert_eq!(diagnostics_json(&outcome).expect("json"), "[]");
}

#[test]
fn test_expression_errors_are_reported_not_raised() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_program(dir.path());

    let outcome = evaluate_with_config(&config, "let s: Basket = null;").expect("evaluate");
    assert!(outcome.has_errors());
    let json = diagnostics_json(&outcome).expect("json");
    assert!(json.contains("\"code\":2304"), "{json}");
}

#[test]
fn test_missing_options_file_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.json");
    let Err(error) = evaluate_with_config(&missing, "1;") else {
        panic!("evaluation without an options file succeeded");
    };
    assert!(format!("{error:#}").contains("absent.json"), "{error:#}");
}

#[test]
fn test_missing_binary_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_program(dir.path());
    std::fs::remove_file(dir.path().join("shop.dbgi")).expect("remove binary");

    let Err(error) = evaluate_with_config(&config, "1;") else {
        panic!("evaluation without its binary succeeded");
    };
    let message = format!("{error:#}");
    assert!(message.contains("src/shop.ets"), "{message}");
}
