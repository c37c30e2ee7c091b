//! Integration tests for cycle detection
//!
//! Every cyclic declaration set must fail construction outright.

use flatbind_foundation::ErrorKind;
use flatbind_graph::{Catalog, Definition, TypeGraph};

fn circular_name(catalog: &Catalog, root: &str) -> String {
    match TypeGraph::build(catalog, [root]) {
        Ok(_) => panic!("cyclic catalog built a graph"),
        Err(err) => match err.kind {
            ErrorKind::CircularDeclaration(name) => name,
            other => panic!("expected a circular declaration, got {other}"),
        },
    }
}

// =============================================================================
// Direct and Indirect Cycles
// =============================================================================

#[test]
fn self_referencing_record() {
    let catalog = Catalog::new().with("pkg.node", Definition::record([("next", "pkg.node")]));
    assert_eq!(circular_name(&catalog, "pkg.node"), "pkg.node");
}

#[test]
fn cycle_through_collection() {
    let catalog = Catalog::new()
        .with("pkg.tree", Definition::record([("label", "varchar2(10)"), ("kids", "pkg.forest")]))
        .with("pkg.forest", Definition::nested_table("pkg.tree"));
    assert_eq!(circular_name(&catalog, "pkg.tree"), "pkg.tree");
}

#[test]
fn reports_first_type_reentered() {
    let catalog = Catalog::new()
        .with("pkg.p", Definition::procedure([("x", "in", "pkg.a")]))
        .with("pkg.a", Definition::record([("b", "pkg.b")]))
        .with("pkg.b", Definition::varray("pkg.c"))
        .with("pkg.c", Definition::index_by_table("pkg.a", "pls_integer"));
    assert_eq!(circular_name(&catalog, "pkg.p"), "pkg.a");
}

#[test]
fn cycle_through_function_return() {
    let catalog = Catalog::new()
        .with("pkg.r", Definition::record([("f", "pkg.s")]))
        .with("pkg.s", Definition::varray("pkg.r"))
        .with("pkg.f", Definition::function("pkg.r", [("x", "in", "integer")]));
    assert_eq!(circular_name(&catalog, "pkg.f"), "pkg.r");
}

// =============================================================================
// Non-Cycles
// =============================================================================

#[test]
fn diamond_is_not_a_cycle() {
    let catalog = Catalog::new()
        .with("pkg.leaf", Definition::record([("v", "date")]))
        .with("pkg.left", Definition::varray("pkg.leaf"))
        .with("pkg.right", Definition::nested_table("pkg.leaf"))
        .with("pkg.top", Definition::record([("l", "pkg.left"), ("r", "pkg.right")]));
    let graph = TypeGraph::build(&catalog, ["pkg.top"]).unwrap();
    assert_eq!(graph.dependents_of("pkg.leaf").len(), 2);
}

#[test]
fn cycle_context_traces_path() {
    let catalog = Catalog::new()
        .with("pkg.a", Definition::record([("b", "pkg.b")]))
        .with("pkg.b", Definition::record([("c", "pkg.c")]))
        .with("pkg.c", Definition::varray("pkg.a"));
    let err = TypeGraph::build(&catalog, ["pkg.a"]).unwrap_err();
    let stack = err.context.unwrap().stack;
    assert_eq!(stack, vec!["pkg.a", "pkg.b", "pkg.c"]);
}
