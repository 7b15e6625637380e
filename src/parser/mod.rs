//! Schema script scanning

mod batch;
mod identifier_utils;
mod schema_parser;

pub use batch::{
    blank_identifiers, is_batch_separator, mask_comments_and_literals, split_batches,
    split_table_statements, Batch,
};
pub use identifier_utils::{
    normalize_identifier, split_name_parts, split_qualified_name, table_identifier, NameStyle,
    DEFAULT_SCHEMA,
};
pub use schema_parser::{
    extract_dependency_graph, extract_dependency_graph_with, scan_schema, ExtractOptions,
    ForeignKeyReference, SchemaStatements, UnknownTablePolicy,
};
