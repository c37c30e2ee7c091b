//! Integration tests for topological ordering
//!
//! Tests the documented order on fixed catalogs and the dependency property
//! on generated acyclic catalogs.

use std::collections::HashMap;

use flatbind_graph::{Catalog, Definition, TypeGraph};
use proptest::prelude::*;
use proptest::sample::Index;

fn names(graph: &TypeGraph) -> Vec<String> {
    graph
        .topological_order()
        .iter()
        .map(|d| d.name().to_string())
        .collect()
}

// =============================================================================
// Fixed Orders
// =============================================================================

#[test]
fn dependents_precede_dependencies() {
    let catalog = Catalog::new()
        .with("pkg.leaf", Definition::record([("v", "date")]))
        .with("pkg.mid", Definition::varray("pkg.leaf"))
        .with("pkg.p", Definition::procedure([("a", "in", "pkg.leaf"), ("b", "in", "pkg.mid")]));
    let graph = TypeGraph::build(&catalog, ["pkg.p"]).unwrap();
    assert_eq!(names(&graph), vec!["pkg.p", "pkg.mid", "pkg.leaf", "date"]);
}

#[test]
fn repeated_member_types_counted_once() {
    let catalog = Catalog::new().with(
        "pkg.r",
        Definition::record([("a", "integer"), ("b", "integer"), ("c", "integer")]),
    );
    let graph = TypeGraph::build(&catalog, ["pkg.r"]).unwrap();
    assert_eq!(names(&graph), vec!["pkg.r", "integer"]);
    assert_eq!(graph.children_of("pkg.r").len(), 3);
}

#[test]
fn index_key_is_a_dependency() {
    let catalog = Catalog::new()
        .with("pkg.t", Definition::index_by_table("clob", "varchar2(10)"))
        .with("pkg.p", Definition::procedure([("t", "in", "pkg.t")]));
    let graph = TypeGraph::build(&catalog, ["pkg.p"]).unwrap();
    assert_eq!(names(&graph), vec!["pkg.p", "pkg.t", "clob", "varchar2(10)"]);
}

#[test]
fn order_is_memoized_and_stable() {
    let catalog = Catalog::new().with("pkg.p", Definition::procedure([("a", "in", "integer")]));
    let graph = TypeGraph::build(&catalog, ["pkg.p"]).unwrap();
    let first = names(&graph);
    let cloned = graph.clone();
    assert_eq!(first, names(&graph));
    assert_eq!(first, names(&cloned));
}

// =============================================================================
// Generated Catalogs
// =============================================================================

const SCALARS: [&str; 4] = ["integer", "date", "varchar2(30)", "clob"];

/// One generated composite: a kind selector and member references.
/// `None` picks a scalar; `Some(index)` picks an earlier composite.
type Shape = (u8, Vec<Option<Index>>);

fn catalog_from(shapes: &[Shape]) -> Catalog {
    let mut catalog = Catalog::new();
    let mut defined: Vec<String> = Vec::new();
    for (i, (kind, members)) in shapes.iter().enumerate() {
        let refs: Vec<String> = members
            .iter()
            .enumerate()
            .map(|(m, pick)| match pick {
                Some(index) if !defined.is_empty() => defined[index.index(defined.len())].clone(),
                _ => SCALARS[m % SCALARS.len()].to_string(),
            })
            .collect();
        let definition = match kind % 4 {
            0 => Definition::varray(&refs[0]),
            1 => Definition::nested_table(&refs[0]),
            2 => Definition::index_by_table(&refs[0], "pls_integer"),
            _ => {
                let fields: Vec<(String, &str)> = refs
                    .iter()
                    .enumerate()
                    .map(|(f, r)| (format!("f{f}"), r.as_str()))
                    .collect();
                Definition::record(fields.iter().map(|(n, r)| (n.as_str(), *r)))
            }
        };
        let name = format!("gen.t{i}");
        catalog.insert(&name, definition);
        defined.push(name);
    }
    let params: Vec<(String, String)> = defined
        .iter()
        .enumerate()
        .map(|(i, ty)| (format!("p{i}"), ty.clone()))
        .collect();
    catalog.insert(
        "gen.entry",
        Definition::procedure(params.iter().map(|(n, t)| (n.as_str(), "in", t.as_str()))),
    );
    catalog
}

fn shapes() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(
        (any::<u8>(), prop::collection::vec(any::<Option<Index>>(), 1..5)),
        1..24,
    )
}

mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn every_edge_points_forward(shapes in shapes()) {
            let graph = TypeGraph::build(&catalog_from(&shapes), ["gen.entry"]).unwrap();
            let order = names(&graph);
            let position: HashMap<&str, usize> =
                order.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

            prop_assert_eq!(order.len(), graph.len());
            for decl in graph.declarations() {
                for child in graph.children_of(decl.name()) {
                    prop_assert!(position[decl.name()] < position[child.name()]);
                }
            }
        }

        #[test]
        fn order_is_deterministic(shapes in shapes()) {
            let first = TypeGraph::build(&catalog_from(&shapes), ["gen.entry"]).unwrap();
            let second = TypeGraph::build(&catalog_from(&shapes), ["gen.entry"]).unwrap();
            prop_assert_eq!(names(&first), names(&second));
        }
    }
}
