//! Identifier handling for SQL Server object names.
//!
//! Object names in schema scripts show up as `[dbo].[Invoice]`,
//! `dbo.Invoice`, `"dbo"."Invoice"`, `Invoice`, or with a database prefix.
//! These helpers split such names into parts and turn them into the table
//! identifiers stored in the dependency graph.

/// Schema assumed for unqualified names
pub const DEFAULT_SCHEMA: &str = "dbo";

/// How table identifiers are formed from qualified names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameStyle {
    /// Bare table name: `[dbo].[Invoice]` becomes `Invoice`
    #[default]
    TableName,
    /// Schema and table: `[dbo].[Invoice]` becomes `dbo.Invoice`, and an
    /// unqualified `Invoice` also becomes `dbo.Invoice`
    Qualified,
}

/// Strips one level of brackets `[]` or double quotes `""` from an identifier.
///
/// Escaped closing brackets (`]]`) and quotes (`""`) inside are unescaped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_identifier("[MyTable]"), "MyTable");
/// assert_eq!(normalize_identifier("\"MyColumn\""), "MyColumn");
/// assert_eq!(normalize_identifier("  dbo  "), "dbo");
/// assert_eq!(normalize_identifier("[a]]b]"), "a]b");
/// ```
pub fn normalize_identifier(ident: &str) -> String {
    let trimmed = ident.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
        trimmed[1..trimmed.len() - 1].replace("]]", "]")
    } else if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

/// Splits a possibly qualified name into its dot-separated parts.
///
/// Dots inside brackets or quotes do not split, and whitespace around dots is
/// ignored. Parts are returned normalized.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(split_name_parts("[dbo].[Order.Lines]"), vec!["dbo", "Order.Lines"]);
/// assert_eq!(split_name_parts("db . dbo . t"), vec!["db", "dbo", "t"]);
/// ```
pub fn split_name_parts(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut closing: Option<char> = None;
    let mut chars = name.trim().chars().peekable();

    while let Some(c) = chars.next() {
        match closing {
            Some(close) => {
                current.push(c);
                if c == close {
                    if chars.peek() == Some(&close) {
                        current.push(close);
                        chars.next();
                    } else {
                        closing = None;
                    }
                }
            }
            None => match c {
                '[' => {
                    current.push(c);
                    closing = Some(']');
                }
                '"' => {
                    current.push(c);
                    closing = Some('"');
                }
                '.' => parts.push(normalize_identifier(&std::mem::take(&mut current))),
                _ => current.push(c),
            },
        }
    }
    parts.push(normalize_identifier(&current));

    parts
}

/// Splits a qualified name into schema and object name parts.
///
/// Returns `(schema, name)`. If no schema is present the default schema is
/// used. A leading database part is dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(split_qualified_name("[dbo].[MyTable]", "dbo"), ("dbo".into(), "MyTable".into()));
/// assert_eq!(split_qualified_name("Sales.Orders", "dbo"), ("Sales".into(), "Orders".into()));
/// assert_eq!(split_qualified_name("MyTable", "dbo"), ("dbo".into(), "MyTable".into()));
/// ```
pub fn split_qualified_name(name: &str, default_schema: &str) -> (String, String) {
    let mut parts = split_name_parts(name);
    let object = parts.pop().unwrap_or_default();
    let schema = parts
        .pop()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default_schema.to_string());
    (schema, object)
}

/// Converts a qualified name from a schema script to a table identifier.
pub fn table_identifier(name: &str, style: NameStyle) -> String {
    let (schema, table) = split_qualified_name(name, DEFAULT_SCHEMA);
    match style {
        NameStyle::TableName => table,
        NameStyle::Qualified => format!("{}.{}", schema, table),
    }
}
