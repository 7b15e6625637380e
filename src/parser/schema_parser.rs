//! Dependency graph extraction from schema scripts
//!
//! Two recognizers run over the table statements of a script:
//!
//! - `CREATE TABLE <name>` declares a table.
//! - `ALTER TABLE <name> ... FOREIGN KEY ... REFERENCES <name>` adds the
//!   referenced table to the owner's dependencies.
//!
//! All declarations are collected before any constraint is applied, so a
//! constraint may appear before the declaration of its table.

use std::sync::LazyLock;

use regex::Regex;

use super::batch::{
    blank_identifiers, mask_comments_and_literals, split_batches, split_table_statements,
};
use super::identifier_utils::{table_identifier, NameStyle};
use crate::error::SqlOrderError;
use crate::model::DependencyGraph;

/// A bracketed, quoted or bare name part
const NAME_PART: &str = r#"(?:\[(?:[^\]]|\]\])+\]|"(?:[^"]|"")+"|[\w@#$]+)"#;

/// One to three dot-separated name parts. The middle part of a three-part
/// name may be empty (`Shop..Orders`).
fn qualified_name() -> String {
    format!(r"{p}(?:(?:\s*\.\s*(?:{p})?)?\s*\.\s*{p})?", p = NAME_PART)
}

static CREATE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^CREATE\s+TABLE\s+({})", qualified_name())).unwrap()
});

static ALTER_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^ALTER\s+TABLE\s+({})", qualified_name())).unwrap()
});

static FOREIGN_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bFOREIGN\s+KEY\b").unwrap());

static REFERENCES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bREFERENCES\s+").unwrap());

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}", qualified_name())).unwrap());

/// What to do with a foreign key whose owning table was never declared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownTablePolicy {
    /// Drop the constraint and log a warning
    #[default]
    Ignore,
    /// Fail extraction with [`SqlOrderError::UnknownOwningTable`]
    Reject,
}

/// Options for dependency graph extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub unknown_tables: UnknownTablePolicy,
    pub name_style: NameStyle,
}

/// A foreign key found in the script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyReference {
    /// Table the constraint is added to
    pub table: String,
    /// Table the constraint references
    pub referenced: String,
    /// 1-based line of the `ALTER TABLE` statement
    pub line: usize,
}

/// Tables and foreign keys recognized in a script, before graph assembly
#[derive(Debug, Clone, Default)]
pub struct SchemaStatements {
    pub tables: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyReference>,
}

/// Scan a schema script for table declarations and foreign keys.
///
/// Everything that is not one of the two recognized statement shapes is
/// skipped. No statement is matched across a `GO` separator.
pub fn scan_schema(sql: &str, name_style: NameStyle) -> SchemaStatements {
    let masked = mask_comments_and_literals(sql);
    let batches = split_batches(&masked);
    let mut scanned = SchemaStatements::default();

    for batch in &batches {
        for statement in split_table_statements(batch.content) {
            if let Some(caps) = CREATE_TABLE_RE.captures(statement) {
                scanned.tables.push(table_identifier(&caps[1], name_style));
                continue;
            }

            let Some(caps) = ALTER_TABLE_RE.captures(statement) else {
                continue;
            };
            // Keywords are searched with identifier contents blanked, names
            // are read from the statement itself
            let keywords = blank_identifiers(statement);
            let Some(fk) = FOREIGN_KEY_RE.find(&keywords) else {
                continue;
            };
            let table = table_identifier(&caps[1], name_style);
            let line = batch.start_line + line_offset(batch.content, statement);
            for reference in REFERENCES_RE.find_iter(&keywords[fk.end()..]) {
                let name_start = fk.end() + reference.end();
                let Some(name) = NAME_RE.find(&statement[name_start..]) else {
                    continue;
                };
                scanned.foreign_keys.push(ForeignKeyReference {
                    table: table.clone(),
                    referenced: table_identifier(name.as_str(), name_style),
                    line,
                });
            }
        }
    }

    tracing::debug!(
        batches = batches.len(),
        tables = scanned.tables.len(),
        foreign_keys = scanned.foreign_keys.len(),
        "scanned schema script"
    );
    scanned
}

/// Number of newlines before `statement` within `batch`
fn line_offset(batch: &str, statement: &str) -> usize {
    let start = statement.as_ptr() as usize - batch.as_ptr() as usize;
    batch[..start].matches('\n').count()
}

/// Assemble a dependency graph from scanned statements.
///
/// Returns the graph and the foreign keys whose owning table was not declared.
fn assemble_graph(scanned: SchemaStatements) -> (DependencyGraph, Vec<ForeignKeyReference>) {
    let mut graph = DependencyGraph::new();
    for table in scanned.tables {
        if !graph.declare_table(table.clone()) {
            tracing::debug!(table = %table, "duplicate table declaration ignored");
        }
    }

    let mut orphans = Vec::new();
    for fk in scanned.foreign_keys {
        if !graph.add_dependency(&fk.table, fk.referenced.clone()) {
            orphans.push(fk);
        }
    }

    (graph, orphans)
}

fn warn_orphan(fk: &ForeignKeyReference) {
    tracing::warn!(
        table = %fk.table,
        referenced = %fk.referenced,
        line = fk.line,
        "foreign key on undeclared table dropped"
    );
}

/// Extract the dependency graph of a schema script with default options.
///
/// Foreign keys on undeclared tables are dropped with a warning.
pub fn extract_dependency_graph(sql: &str) -> DependencyGraph {
    let (graph, orphans) = assemble_graph(scan_schema(sql, NameStyle::default()));
    orphans.iter().for_each(warn_orphan);
    graph
}

/// Extract the dependency graph of a schema script.
///
/// # Errors
///
/// With [`UnknownTablePolicy::Reject`], returns
/// [`SqlOrderError::UnknownOwningTable`] for the first foreign key whose
/// owning table has no `CREATE TABLE` statement.
pub fn extract_dependency_graph_with(
    sql: &str,
    options: &ExtractOptions,
) -> Result<DependencyGraph, SqlOrderError> {
    let (graph, orphans) = assemble_graph(scan_schema(sql, options.name_style));

    if options.unknown_tables == UnknownTablePolicy::Reject {
        if let Some(fk) = orphans.into_iter().next() {
            return Err(SqlOrderError::UnknownOwningTable {
                table: fk.table,
                referenced: fk.referenced,
            });
        }
        return Ok(graph);
    }

    orphans.iter().for_each(warn_orphan);
    Ok(graph)
}
