//! Schema construction, extension and validation.

pub mod builder;
pub(crate) mod builtin;
pub mod meta;
pub mod model;
pub mod translate;
pub mod validate;

pub use self::{
    builder::{
        build_schema, build_schema_unchecked, extend_schema, extend_schema_unchecked, SchemaError,
    },
    model::SchemaType,
};
