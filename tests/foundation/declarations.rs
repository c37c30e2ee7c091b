//! Integration tests for TypeDeclaration
//!
//! Tests construction rules, transferability, namespaces, and child order.

use std::sync::Arc;

use flatbind_foundation::{
    DeclarationKind, ErrorKind, Field, Malformation, ParamMode, Parameter, Primitive,
    TypeDeclaration,
};

fn prim(name: &str) -> Arc<TypeDeclaration> {
    Arc::new(TypeDeclaration::primitive(Primitive::recognize(name).unwrap()))
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn primitive_is_named_canonically() {
    let decl = prim("VARCHAR2(12)");
    assert_eq!(decl.name(), "varchar2(12)");
    assert_eq!(decl.as_primitive(), Some(Primitive::Varchar2(12)));
    assert_eq!(decl.kind_name(), "primitive");
}

#[test]
fn empty_record_rejected() {
    let err = TypeDeclaration::record("pkg.r", Vec::new()).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::MalformedDeclaration {
            problem: Malformation::EmptyRecord,
            ..
        }
    ));
}

#[test]
fn index_by_table_key_restricted() {
    let ok = TypeDeclaration::index_by_table("pkg.t", prim("date"), prim("binary_integer"));
    assert!(ok.is_ok());

    let err = TypeDeclaration::index_by_table("pkg.t", prim("date"), prim("number(5)")).unwrap_err();
    assert!(matches!(&err.kind, ErrorKind::InvalidIndexKeyType { key, .. } if key == "number(5)"));
}

#[test]
fn index_by_table_rejects_composite_key() {
    let rec = Arc::new(TypeDeclaration::record("r", vec![Field::new("a", prim("integer"))]).unwrap());
    let err = TypeDeclaration::index_by_table("pkg.t", prim("date"), rec).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidIndexKeyType { .. }));
}

// =============================================================================
// Transferability and Namespaces
// =============================================================================

#[test]
fn transferable_only_outside_namespaces() {
    let top = TypeDeclaration::varray("nums", prim("integer"));
    let scoped = TypeDeclaration::varray("pkg.nums", prim("integer"));
    assert!(top.is_transferable());
    assert!(!scoped.is_transferable());
    assert_eq!(top.namespace(), None);
    assert_eq!(scoped.namespace(), Some("pkg"));
}

#[test]
fn index_by_table_never_transferable() {
    let table =
        TypeDeclaration::index_by_table("assoc", prim("clob"), prim("pls_integer")).unwrap();
    assert!(!table.is_transferable());
    assert!(table.is_collection());
}

#[test]
fn namespace_uses_last_separator() {
    let decl = TypeDeclaration::varray("schema.pkg.nums", prim("integer"));
    assert_eq!(decl.namespace(), Some("schema.pkg"));
}

// =============================================================================
// Children
// =============================================================================

#[test]
fn function_children_start_with_return() {
    let f = TypeDeclaration::function(
        "pkg.f",
        prim("date"),
        vec![
            Parameter::new("a", ParamMode::In, prim("integer")),
            Parameter::new("b", ParamMode::InOut, prim("clob")),
        ],
    );
    let names: Vec<&str> = f.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["date", "integer", "clob"]);
    assert!(f.is_signature());
    assert_eq!(f.parameters().unwrap().len(), 2);
}

#[test]
fn index_by_children_are_element_then_key() {
    let table = TypeDeclaration::index_by_table("pkg.t", prim("date"), prim("long")).unwrap();
    let names: Vec<&str> = table.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["date", "long"]);
    assert_eq!(table.index_key().unwrap().name(), "long");
}

#[test]
fn repeated_field_types_repeat_in_children() {
    let rec = TypeDeclaration::record(
        "pkg.r",
        vec![Field::new("a", prim("integer")), Field::new("b", prim("integer"))],
    )
    .unwrap();
    assert_eq!(rec.children().len(), 2);
    assert!(matches!(rec.kind(), DeclarationKind::Record(fields) if fields.len() == 2));
}

// =============================================================================
// Parameter Modes
// =============================================================================

#[test]
fn parameter_modes() {
    assert_eq!(ParamMode::parse("in"), Some(ParamMode::In));
    assert_eq!(ParamMode::parse("IN OUT"), Some(ParamMode::InOut));
    assert_eq!(ParamMode::parse("out"), Some(ParamMode::Out));
    assert_eq!(ParamMode::parse("through"), None);
    assert!(ParamMode::InOut.is_input() && ParamMode::InOut.is_output());
    assert!(!ParamMode::Out.is_input());
    assert_eq!(ParamMode::InOut.to_string(), "IN OUT");
}
