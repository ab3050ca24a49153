//! Tests for assignability, casts and type display.

use dbgeval_checker::{CompilerContext, NoopHook, TypeId};

fn context() -> CompilerContext {
    let mut ctx = CompilerContext::new();
    ctx.add_prelude("prelude.ets", "declare class Object {}");
    ctx.add_source(
        "shapes.ets",
        "shapes",
        "export class Shape {} export class Circle extends Shape {} export class Square extends Shape {}",
    );
    ctx
}

fn class_type(ctx: &mut CompilerContext, name: &str) -> TypeId {
    let symbol = ctx.binder.module_export("shapes", name).expect("class");
    ctx.types.class(symbol)
}

#[test]
fn test_numeric_widening_ladder() {
    let mut ctx = context();
    let ladder = [
        TypeId::BYTE,
        TypeId::SHORT,
        TypeId::INT,
        TypeId::LONG,
        TypeId::FLOAT,
        TypeId::DOUBLE,
    ];
    for (i, &narrow) in ladder.iter().enumerate() {
        for &wide in &ladder[i..] {
            assert!(ctx.is_assignable(&mut NoopHook, narrow, wide).expect("assignable"));
        }
        for &wider in &ladder[i + 1..] {
            assert!(!ctx.is_assignable(&mut NoopHook, wider, narrow).expect("assignable"));
        }
    }
    assert!(ctx.is_assignable(&mut NoopHook, TypeId::CHAR, TypeId::INT).expect("char"));
    assert!(!ctx.is_assignable(&mut NoopHook, TypeId::BOOLEAN, TypeId::INT).expect("bool"));
}

#[test]
fn test_error_type_is_compatible_with_everything() {
    let mut ctx = context();
    let circle = class_type(&mut ctx, "Circle");
    for ty in [TypeId::INT, TypeId::STRING, TypeId::VOID, circle] {
        assert!(ctx.is_assignable(&mut NoopHook, TypeId::ERROR, ty).expect("from error"));
        assert!(ctx.is_assignable(&mut NoopHook, ty, TypeId::ERROR).expect("to error"));
    }
}

#[test]
fn test_class_hierarchy_and_object_top() {
    let mut ctx = context();
    let shape = class_type(&mut ctx, "Shape");
    let circle = class_type(&mut ctx, "Circle");
    let square = class_type(&mut ctx, "Square");
    let object = ctx.object_class().expect("Object");
    let object = ctx.types.class(object);

    assert!(ctx.is_assignable(&mut NoopHook, circle, shape).expect("up"));
    assert!(!ctx.is_assignable(&mut NoopHook, shape, circle).expect("down"));
    assert!(!ctx.is_assignable(&mut NoopHook, circle, square).expect("sibling"));
    for ty in [shape, circle, TypeId::STRING, TypeId::INT, TypeId::NULL] {
        assert!(ctx.is_assignable(&mut NoopHook, ty, object).expect("to Object"));
    }
    assert!(!ctx.is_assignable(&mut NoopHook, TypeId::VOID, object).expect("void"));
}

#[test]
fn test_null_goes_to_reference_types_only() {
    let mut ctx = context();
    let shape = class_type(&mut ctx, "Shape");
    let shapes = ctx.types.array(shape);
    assert!(ctx.is_assignable(&mut NoopHook, TypeId::NULL, shape).expect("class"));
    assert!(ctx.is_assignable(&mut NoopHook, TypeId::NULL, shapes).expect("array"));
    assert!(ctx.is_assignable(&mut NoopHook, TypeId::NULL, TypeId::STRING).expect("string"));
    assert!(!ctx.is_assignable(&mut NoopHook, TypeId::NULL, TypeId::INT).expect("int"));
}

#[test]
fn test_arrays_are_invariant() {
    let mut ctx = context();
    let shape = class_type(&mut ctx, "Shape");
    let circle = class_type(&mut ctx, "Circle");
    let shapes = ctx.types.array(shape);
    let circles = ctx.types.array(circle);
    assert_eq!(ctx.types.array(shape), shapes, "arrays are interned");
    assert!(!ctx.is_assignable(&mut NoopHook, circles, shapes).expect("covariance"));
    assert!(ctx.is_assignable(&mut NoopHook, shapes, shapes).expect("identity"));
}

#[test]
fn test_casts_between_related_types() {
    let mut ctx = context();
    let shape = class_type(&mut ctx, "Shape");
    let circle = class_type(&mut ctx, "Circle");
    let square = class_type(&mut ctx, "Square");
    assert!(ctx.is_castable(&mut NoopHook, shape, circle).expect("downcast"));
    assert!(ctx.is_castable(&mut NoopHook, TypeId::DOUBLE, TypeId::BYTE).expect("numeric"));
    assert!(!ctx.is_castable(&mut NoopHook, circle, square).expect("sibling"));
    assert!(!ctx.is_castable(&mut NoopHook, TypeId::BOOLEAN, TypeId::INT).expect("bool"));
}

#[test]
fn test_type_display() {
    let mut ctx = context();
    let circle = class_type(&mut ctx, "Circle");
    let circles = ctx.types.array(circle);
    assert_eq!(ctx.type_to_string(TypeId::DOUBLE), "number");
    assert_eq!(ctx.type_to_string(TypeId::INT), "int");
    assert_eq!(ctx.type_to_string(circles), "Circle[]");
}
