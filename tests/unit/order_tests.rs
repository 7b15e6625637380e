//! Tests for dependency-safe table ordering

use pretty_assertions::assert_eq;
use rust_sqlorder::{extract_dependency_graph, order_tables, DependencyGraph, SqlOrderError};

use crate::common::{assert_dependencies_first, fixture};

fn graph(entries: &[(&str, &[&str])]) -> DependencyGraph {
    entries
        .iter()
        .map(|(table, deps)| (*table, deps.iter().copied()))
        .collect()
}

/// Deterministic acyclic graph: table `i` may only reference tables `j < i`,
/// and tables are declared in a shuffled order.
fn layered_graph(size: usize, seed: u64) -> DependencyGraph {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) as usize
    };

    let mut declared: Vec<usize> = (0..size).collect();
    for i in (1..declared.len()).rev() {
        let j = next() % (i + 1);
        declared.swap(i, j);
    }

    let mut g = DependencyGraph::new();
    for &i in &declared {
        g.declare_table(format!("T{:03}", i));
    }
    for &i in &declared {
        if i == 0 {
            continue;
        }
        for _ in 0..next() % 4 {
            let dep = next() % i;
            g.add_dependency(&format!("T{:03}", i), format!("T{:03}", dep));
        }
    }
    g
}

// ============================================================================
// Ordering properties
// ============================================================================

#[test]
fn test_every_table_appears_once() {
    for seed in 1..=20 {
        let g = layered_graph(60, seed);
        let order = order_tables(&g).unwrap();

        assert_eq!(order.len(), g.len());
        let mut sorted = order.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), g.len(), "duplicate tables in {:?}", order);
        assert!(g.tables().all(|t| order.iter().any(|o| o == t)));
    }
}

#[test]
fn test_dependencies_come_first() {
    for seed in 1..=20 {
        let g = layered_graph(60, seed);
        let order = order_tables(&g).unwrap();
        assert_dependencies_first(&g, &order);
    }
}

#[test]
fn test_ordering_is_deterministic() {
    let g = layered_graph(200, 42);
    let first = order_tables(&g).unwrap();
    let second = order_tables(&g.clone()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_independent_tables_keep_declaration_order() {
    let g = graph(&[("Zebra", &[]), ("Apple", &[]), ("Mango", &[])]);
    assert_eq!(order_tables(&g).unwrap(), vec!["Zebra", "Apple", "Mango"]);
}

#[test]
fn test_orders_after_customers() {
    let g = graph(&[
        ("Orders", &["Customers"]),
        ("Customers", &[]),
        ("Products", &[]),
    ]);
    assert_eq!(
        order_tables(&g).unwrap(),
        vec!["Customers", "Products", "Orders"]
    );
}

#[test]
fn test_empty_graph_gives_empty_order() {
    assert!(order_tables(&DependencyGraph::new()).unwrap().is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_cycle_is_rejected() {
    let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]);
    let err = order_tables(&g).unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Circular or unresolved dependency detected"));
}

#[test]
fn test_two_table_cycle_is_rejected() {
    let g = graph(&[("A", &["B"]), ("B", &["A"])]);
    assert!(matches!(
        order_tables(&g),
        Err(SqlOrderError::UnresolvedDependency { .. })
    ));
}

#[test]
fn test_self_reference_is_a_cycle() {
    let g = graph(&[("Lookup", &[]), ("Employee", &["Employee", "Lookup"])]);
    match order_tables(&g) {
        Err(SqlOrderError::UnresolvedDependency {
            table,
            remaining,
            undeclared,
        }) => {
            assert_eq!(table, "Employee");
            assert_eq!(remaining, vec!["Employee"]);
            assert!(undeclared.is_empty());
        }
        other => panic!("expected unresolved dependency, got {:?}", other),
    }
}

#[test]
fn test_reference_to_undeclared_table_is_unresolved() {
    let g = graph(&[("Invoice", &["Customer"])]);
    match order_tables(&g) {
        Err(SqlOrderError::UnresolvedDependency { undeclared, .. }) => {
            assert_eq!(undeclared, vec!["Customer"]);
        }
        other => panic!("expected unresolved dependency, got {:?}", other),
    }
}

#[test]
fn test_cycle_in_large_graph_is_rejected() {
    let mut g = layered_graph(100, 7);
    g.add_dependency("T000", "T099");
    g.add_dependency("T099", "T050");
    g.add_dependency("T050", "T000");
    assert!(order_tables(&g).is_err());
}

// ============================================================================
// Extraction followed by ordering
// ============================================================================

#[test]
fn test_generated_script_order() {
    let g = extract_dependency_graph(&fixture("shop_schema.sql"));
    let order = order_tables(&g).unwrap();
    assert_eq!(
        order,
        vec!["Customer", "Invoice", "Category", "Product", "InvoiceLine"]
    );
    assert_dependencies_first(&g, &order);
}
