//! Dependency-safe table ordering
//!
//! Tables are placed by rotating a work queue: the table at the front is
//! emitted once all of its dependencies have been emitted, otherwise it goes
//! to the back. A full lap over the queue without emitting anything means
//! the remaining tables can never be placed (a cycle, a self-reference, or a
//! reference to an undeclared table).

use std::collections::{HashSet, VecDeque};

use crate::error::SqlOrderError;
use crate::model::DependencyGraph;

/// Order the tables of `graph` so every table follows the tables it references.
///
/// Ready tables are emitted in declaration order, with tables that had to
/// wait rejoining behind the ones that did not. The result is deterministic
/// for a given graph. The graph itself is not modified.
///
/// # Errors
///
/// Returns [`SqlOrderError::UnresolvedDependency`] when no complete order
/// exists. No partial order is returned.
pub fn order_tables(graph: &DependencyGraph) -> Result<Vec<String>, SqlOrderError> {
    let mut queue: VecDeque<&str> = graph.tables().collect();
    let mut ordered: Vec<String> = Vec::with_capacity(queue.len());
    let mut placed: HashSet<&str> = HashSet::with_capacity(queue.len());
    let mut stalls = 0usize;

    while let Some(&table) = queue.front() {
        let ready = graph
            .dependencies(table)
            .map(|deps| deps.iter().all(|dep| placed.contains(dep.as_str())))
            .unwrap_or(true);

        if ready {
            queue.pop_front();
            placed.insert(table);
            ordered.push(table.to_string());
            stalls = 0;
            continue;
        }

        queue.rotate_left(1);
        stalls += 1;
        if stalls >= queue.len() {
            return Err(unresolved(graph, &queue));
        }
    }

    tracing::debug!(tables = ordered.len(), "ordered tables");
    Ok(ordered)
}

/// Build the error for a queue in which nothing can be placed.
///
/// After a full lap the queue is back in the order it had at the last
/// successful placement, so its front is the first table that got stuck.
fn unresolved(graph: &DependencyGraph, queue: &VecDeque<&str>) -> SqlOrderError {
    let remaining: Vec<String> = queue.iter().map(|t| t.to_string()).collect();

    // A table with an undeclared dependency can never be placed, so these
    // all belong to tables still in the queue
    SqlOrderError::UnresolvedDependency {
        table: remaining.first().cloned().unwrap_or_default(),
        remaining,
        undeclared: graph
            .undeclared_dependencies()
            .into_iter()
            .map(String::from)
            .collect(),
    }
}
