//! Boundaries to external parser representations.

pub mod graphql_parser;

pub use self::graphql_parser::{parse_query_document, parse_schema_document};
