//! Foreign-key dependency graph between tables

use indexmap::{IndexMap, IndexSet};

/// Tables and the tables they reference through foreign keys.
///
/// Both tables and their dependencies keep insertion order. Table order is
/// the order tables were declared in the schema, and it decides which of
/// several ready tables the sorter emits first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    tables: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with no dependencies.
    ///
    /// Returns `false` if the table was already declared, in which case the
    /// existing entry (and its position) is kept.
    pub fn declare_table(&mut self, table: impl Into<String>) -> bool {
        let table = table.into();
        if self.tables.contains_key(&table) {
            return false;
        }
        self.tables.insert(table, IndexSet::new());
        true
    }

    /// Record that `table` references `dependency`.
    ///
    /// Returns `false` when `table` has not been declared; the edge is not
    /// recorded. `dependency` does not need to be declared.
    pub fn add_dependency(&mut self, table: &str, dependency: impl Into<String>) -> bool {
        match self.tables.get_mut(table) {
            Some(deps) => {
                deps.insert(dependency.into());
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn dependencies(&self, table: &str) -> Option<&IndexSet<String>> {
        self.tables.get(table)
    }

    /// Declared tables in declaration order
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.tables.iter().map(|(table, deps)| (table.as_str(), deps))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of distinct (table, dependency) edges
    pub fn edge_count(&self) -> usize {
        self.tables.values().map(IndexSet::len).sum()
    }

    /// Dependencies that do not name any declared table, in first-seen order
    pub fn undeclared_dependencies(&self) -> Vec<&str> {
        let mut undeclared: IndexSet<&str> = IndexSet::new();
        for deps in self.tables.values() {
            for dep in deps {
                if !self.tables.contains_key(dep) {
                    undeclared.insert(dep.as_str());
                }
            }
        }
        undeclared.into_iter().collect()
    }
}

impl<T, D, I> FromIterator<(T, I)> for DependencyGraph
where
    T: Into<String>,
    D: Into<String>,
    I: IntoIterator<Item = D>,
{
    /// Build a graph from `(table, dependencies)` pairs.
    ///
    /// A repeated table merges its dependencies into the first entry.
    fn from_iter<It: IntoIterator<Item = (T, I)>>(iter: It) -> Self {
        let mut graph = DependencyGraph::new();
        for (table, deps) in iter {
            let table = table.into();
            graph.declare_table(table.clone());
            for dep in deps {
                graph.add_dependency(&table, dep);
            }
        }
        graph
    }
}
