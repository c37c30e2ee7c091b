//! Integration tests for occurrence trees
//!
//! Tests positional ids, reverse parsing, and id uniqueness.

use std::collections::HashSet;

use flatbind_foundation::ErrorKind;
use flatbind_graph::{Catalog, Definition, TypeGraph};
use flatbind_transfer::{Label, OccurrencePath, OccurrenceTree, Step};
use proptest::prelude::*;

fn tree(catalog: &Catalog, root: &str) -> OccurrenceTree {
    let graph = TypeGraph::build(catalog, [root]).unwrap();
    OccurrenceTree::build(graph.declaration(root).unwrap()).unwrap()
}

fn wide_record(width: usize, last: &str) -> Definition {
    let names: Vec<String> = (1..=width).map(|i| format!("f{i}")).collect();
    Definition::record(
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), if i + 1 == width { last } else { "integer" })),
    )
}

// =============================================================================
// Positional Ids
// =============================================================================

#[test]
fn single_scalar_parameter() {
    let catalog = Catalog::new().with("pkg.p", Definition::procedure([("x", "in", "varchar2(100)")]));
    let occ = tree(&catalog, "pkg.p");
    assert_eq!(occ.len(), 2);
    let x = occ.find("1").unwrap();
    assert_eq!(occ[x].declaration().name(), "varchar2(100)");
    assert_eq!(occ[x].depth(), 1);
}

#[test]
fn documented_nested_id() {
    let catalog = Catalog::new()
        .with("pkg.inner", Definition::nested_table("integer"))
        .with("pkg.rec", wide_record(11, "pkg.inner"))
        .with("pkg.outer", Definition::varray("pkg.rec"))
        .with("pkg.p", Definition::procedure([("a", "in", "date"), ("b", "in", "pkg.outer")]));
    let occ = tree(&catalog, "pkg.p");
    let handle = occ.find("2e_11_e").unwrap();
    assert_eq!(occ[handle].declaration().name(), "integer");

    let mut ancestors = Vec::new();
    let mut current = occ[handle].parent();
    while let Some(parent) = current {
        ancestors.push(occ[parent].id().to_string());
        current = occ[parent].parent();
    }
    assert_eq!(ancestors, vec!["2e_11_", "2e", "2", ""]);
}

#[test]
fn function_return_is_zero() {
    let catalog = Catalog::new()
        .with("point", Definition::record([("x", "integer"), ("y", "integer")]))
        .with("pkg.f", Definition::function("point", [("scale", "in", "number")]));
    let occ = tree(&catalog, "pkg.f");
    let ret = occ.find("0").unwrap();
    assert_eq!(occ[occ.root()].child(&Label::Return), Some(ret));
    assert_eq!(occ[ret].declaration().name(), "point");
    assert!(occ.find("01").is_some());
    assert!(occ.find("1").is_some());
}

#[test]
fn same_declaration_at_two_positions() {
    let catalog = Catalog::new()
        .with("pkg.r", Definition::record([("d", "date")]))
        .with("pkg.p", Definition::procedure([("a", "in", "pkg.r"), ("b", "in", "pkg.r")]));
    let occ = tree(&catalog, "pkg.p");
    let a = occ.find("11").unwrap();
    let b = occ.find("21").unwrap();
    assert_ne!(a, b);
    assert_eq!(occ[a].declaration(), occ[b].declaration());
}

#[test]
fn non_signature_is_invalid_root() {
    let catalog = Catalog::new().with("pkg.t", Definition::varray("integer"));
    let graph = TypeGraph::build(&catalog, ["pkg.t"]).unwrap();
    let err = OccurrenceTree::build(graph.declaration("pkg.t").unwrap()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidRoot(_)));
}

// =============================================================================
// Reverse Parsing
// =============================================================================

#[test]
fn parse_mixed_ordinals() {
    let path = OccurrencePath::parse("_10_e3_25_").unwrap();
    assert_eq!(
        path.steps(),
        &[Step::Member(10), Step::Element, Step::Member(3), Step::Member(25)]
    );
    assert_eq!(path.to_string(), "_10_e3_25_");
}

#[test]
fn parse_rejects_ids_the_algorithm_never_emits() {
    for bad in ["_9_", "_10", "10_", "_1a_", "E", "1 2"] {
        let err = OccurrencePath::parse(bad).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedOccurrenceId(_)), "{bad}");
    }
}

#[test]
fn resolve_walks_from_root() {
    let catalog = Catalog::new()
        .with("pkg.rec", wide_record(12, "varchar2(5)"))
        .with("pkg.t", Definition::index_by_table("pkg.rec", "pls_integer"))
        .with("pkg.p", Definition::procedure([("t", "in out", "pkg.t")]));
    let occ = tree(&catalog, "pkg.p");
    let path = OccurrencePath::parse("1e_12_").unwrap();
    let handle = occ.resolve(&path).unwrap();
    assert_eq!(occ[handle].declaration().name(), "varchar2(5)");
    assert_eq!(occ.resolve(&OccurrencePath::parse("1e_13_").unwrap()), None);
    assert_eq!(occ.resolve(&OccurrencePath::parse("0").unwrap()), None);
}

// =============================================================================
// Id Properties
// =============================================================================

/// A procedure with `params` parameters, each a record of `width` fields whose
/// last field is a nested table of that record's predecessor.
fn layered(params: usize, width: usize, depth: usize) -> Catalog {
    let mut catalog = Catalog::new();
    let mut previous = "integer".to_string();
    for level in 0..depth {
        let table = format!("gen.tab{level}");
        catalog.insert(&table, Definition::nested_table(&previous));
        let rec = format!("gen.rec{level}");
        catalog.insert(&rec, wide_record(width, &table));
        previous = rec;
    }
    let names: Vec<String> = (0..params).map(|i| format!("p{i}")).collect();
    catalog.insert(
        "gen.entry",
        Definition::procedure(names.iter().map(|n| (n.as_str(), "in", previous.as_str()))),
    );
    catalog
}

mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn ids_unique_and_extend_parent(params in 1usize..14, width in 1usize..14, depth in 0usize..3) {
            let occ = tree(&layered(params, width, depth), "gen.entry");
            let mut seen = HashSet::new();
            for (handle, node) in occ.iter() {
                prop_assert!(seen.insert(node.id().to_string()));
                prop_assert_eq!(occ.find(node.id()), Some(handle));

                let path = OccurrencePath::parse(node.id()).unwrap();
                prop_assert_eq!(path.to_string(), node.id());
                if let Some(parent) = node.parent() {
                    let parent_id = occ[parent].id();
                    prop_assert!(node.id().len() > parent_id.len());
                    prop_assert!(node.id().starts_with(parent_id));
                    prop_assert_eq!(path.parent().unwrap().to_string(), parent_id);
                }
            }
        }
    }
}
