//! rust-sqlorder: foreign-key safe table ordering for SQL Server schema scripts
//!
//! This library reads a schema script (for example one produced by
//! "Generate Scripts" in SQL Server Management Studio), extracts the
//! foreign-key dependencies between its tables, and orders the tables so
//! every table comes after the tables it references.

pub mod error;
pub mod model;
pub mod order;
pub mod parser;
pub mod source;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use error::SqlOrderError;
pub use model::DependencyGraph;
pub use order::order_tables;
pub use parser::{extract_dependency_graph, extract_dependency_graph_with, ExtractOptions};

/// Options for ordering the tables of a schema
#[derive(Debug, Clone, Default)]
pub struct OrderOptions {
    /// Path to the schema script, or a directory of `.sql` files
    pub schema_path: PathBuf,
    /// Output file for the result (defaults to stdout)
    pub output_path: Option<PathBuf>,
    /// Encoding label of the schema files (detected when `None`)
    pub encoding: Option<String>,
    /// Fail on foreign keys whose owning table is never declared
    pub strict: bool,
    /// Identify tables as `schema.table` instead of by bare table name
    pub qualified_names: bool,
}

impl OrderOptions {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            unknown_tables: if self.strict {
                parser::UnknownTablePolicy::Reject
            } else {
                parser::UnknownTablePolicy::Ignore
            },
            name_style: if self.qualified_names {
                parser::NameStyle::Qualified
            } else {
                parser::NameStyle::TableName
            },
        }
    }
}

/// Read a schema and extract its dependency graph
pub fn load_dependency_graph(options: &OrderOptions) -> Result<DependencyGraph> {
    let sql = source::read_schema(&options.schema_path, options.encoding.as_deref())?;

    let graph = extract_dependency_graph_with(&sql, &options.extract_options())
        .with_context(|| format!("Failed to extract tables from {}", options.schema_path.display()))?;

    tracing::debug!(
        tables = graph.len(),
        dependencies = graph.edge_count(),
        "built dependency graph"
    );
    Ok(graph)
}

/// Read a schema and return its tables in dependency order
pub fn order_schema(options: &OrderOptions) -> Result<Vec<String>> {
    let graph = load_dependency_graph(options)?;
    let ordered = order_tables(&graph)
        .with_context(|| format!("Failed to order tables of {}", options.schema_path.display()))?;
    Ok(ordered)
}

/// Render a graph as `table: dep1, dep2` lines in declaration order
pub fn format_graph(graph: &DependencyGraph) -> Vec<String> {
    graph
        .iter()
        .map(|(table, deps)| {
            if deps.is_empty() {
                format!("{}:", table)
            } else {
                let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
                format!("{}: {}", table, deps.join(", "))
            }
        })
        .collect()
}

/// Write one line per entry to `output_path`, or to stdout when `None`
pub fn write_lines(lines: &[String], output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let mut writer = std::io::BufWriter::new(file);
            write_all_lines(&mut writer, lines)
                .with_context(|| format!("Failed to write output file {}", path.display()))
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            write_all_lines(&mut writer, lines).context("Failed to write to stdout")
        }
    }
}

fn write_all_lines(writer: &mut impl Write, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()
}
