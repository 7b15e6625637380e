//! Table dependency model

mod dependency_graph;

pub use dependency_graph::DependencyGraph;
