/*!

# larch

*larch* builds GraphQL type systems from SDL documents and executes
operations - including subscriptions - against them, entirely at runtime.

The crate covers the schema side of a GraphQL server:

* **Building**: [`build_schema`] lowers a parsed SDL document into a fully
  linked, validated [`SchemaType`] carrying the built-in scalars,
  introspection types and built-in directives.
* **Extending**: [`extend_schema`] produces a new schema from an existing
  one plus a document of additional definitions and `extend` clauses,
  without mutating its input.
* **Validating**: the schema validator collects every type-system invariant
  violation - interface implementation, argument compatibility, root
  operation types, directive legality - instead of stopping at the first.
* **Executing**: a resolver-driven executor handles queries and mutations,
  and [`resolve_into_stream`] drives a subscription into a lazy,
  cancellable stream of results mapped through that same executor.

Schemas built from SDL carry no behavior; resolvers and subscription
sources are attached afterwards and the schema stays immutable from then
on:

```rust
use larch::{ast::Document, build_schema, parse_schema_document, resolver, ResolveInfo, Value};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let document: Document = parse_schema_document(
    r#"
    type Query {
        hello: String
    }
"#,
)?;

let schema = build_schema(&document)?.with_resolver(
    "Query",
    "hello",
    resolver(|_: ResolveInfo<'_>| Ok(Value::scalar("world"))),
)?;

assert!(schema.query_type().is_some());
# Ok(())
# }
```

Parsing itself is delegated to the [`graphql-parser`](graphql_parser)
crate; [`parse_schema_document`] and [`parse_query_document`] translate its
output into this crate's AST. Network transports, JSON request plumbing and
executable-document validation rules are out of scope.

*/
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

#[allow(missing_docs)]
pub mod ast;
pub mod executor;
pub mod integrations;
pub mod parser;
pub mod resolve;
pub mod schema;
pub mod subscriptions;
pub mod validation;
pub mod value;

use std::fmt;

#[doc(inline)]
pub use futures::future::BoxFuture;

pub use crate::{
    ast::{InputValue, Name, OperationType, Type},
    executor::{
        build_execution_context, execute, ExecutionContext, ExecutionError, ExecutionOutput,
        ExecutionStrategy, FieldError, FieldResult, PathSegment, ValuesStream, Variables,
    },
    parser::{ParseError, SourcePosition, Span, Spanning},
    resolve::{
        async_resolver, async_stream_resolver, is_type_of, resolver, stream_resolver,
        type_resolver, Arguments, IsTypeOf, ResolveAbstractType, ResolveField, ResolveInfo,
        ResolveStream,
    },
    schema::{
        build_schema, build_schema_unchecked, extend_schema, extend_schema_unchecked, meta,
        model::{DirectiveLocation, DirectiveType, SchemaType, TypeType},
        translate::{parse_query_document, parse_schema_document},
        validate::validate_schema,
        SchemaError,
    },
    subscriptions::{resolve_into_stream, Connection, ResponseStream, SubscriptionConnection},
    validation::RuleError,
    value::{DefaultScalarValue, Object, ScalarValue, Value},
};

/// An error that prevented request execution as a whole.
#[derive(Debug, PartialEq)]
#[allow(missing_docs)]
pub enum GraphQLError {
    ParseError(ParseError),
    ValidationError(Vec<RuleError>),
    NoOperationProvided,
    MultipleOperationsProvided,
    UnknownOperationName,
    NotSubscription,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GraphQLError::ParseError(error) => write!(f, "{error}"),
            GraphQLError::ValidationError(errors) => {
                for error in errors {
                    writeln!(f, "{error}")?;
                }
                Ok(())
            }
            GraphQLError::NoOperationProvided => write!(f, "No operation provided"),
            GraphQLError::MultipleOperationsProvided => write!(f, "Multiple operations provided"),
            GraphQLError::UnknownOperationName => write!(f, "Unknown operation name"),
            GraphQLError::NotSubscription => write!(f, "Operation is not a subscription"),
        }
    }
}

impl std::error::Error for GraphQLError {}

impl From<ParseError> for GraphQLError {
    fn from(e: ParseError) -> GraphQLError {
        GraphQLError::ParseError(e)
    }
}
