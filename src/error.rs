//! Error types for rust-sqlorder

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a schema and ordering its tables
#[derive(Error, Debug)]
pub enum SqlOrderError {
    #[error("Failed to read schema file: {path}")]
    SchemaReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode schema file {path} as {encoding}")]
    SchemaDecodeError {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("Unknown text encoding: {label}")]
    UnknownEncoding { label: String },

    #[error("No .sql files found under {path}")]
    NoSchemaFiles { path: PathBuf },

    #[error("Foreign key on undeclared table {table} (references {referenced})")]
    UnknownOwningTable { table: String, referenced: String },

    #[error(
        "Circular or unresolved dependency detected at table {table} (unresolved: {})",
        .remaining.join(", ")
    )]
    UnresolvedDependency {
        /// First table that could not be placed
        table: String,
        /// Every table still waiting when the sort gave up, in queue order
        remaining: Vec<String>,
        /// Dependencies that name no declared table
        undeclared: Vec<String>,
    },
}
