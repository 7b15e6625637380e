//! Schema script input

mod schema_reader;

pub use schema_reader::{detect_encoding, read_schema};
