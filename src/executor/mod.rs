//! Resolving documents to values.

mod resolve;

#[cfg(test)]
mod tests;

use std::{any::Any, cmp::Ordering, collections::HashMap, fmt, pin::Pin};

use fnv::FnvHashMap;
use futures::Stream;

use crate::{
    ast::{Definition, Document, Fragment, InputValue, Operation, OperationType},
    parser::{SourcePosition, Spanning},
    schema::model::SchemaType,
    validation::coerce_variable_values,
    value::{DefaultScalarValue, ScalarValue, Value},
    GraphQLError,
};

pub(crate) use self::resolve::{coerce_argument_values, collect_fields, execute_context};

/// Error type for errors that occur during field resolution.
///
/// Field errors are represented by a human-readable error message and an
/// optional `Value` structure containing additional information.
///
/// They can be converted to from any type that implements
/// [`std::fmt::Display`], which makes error chaining with the `?` operator
/// a breeze.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError<S = DefaultScalarValue> {
    message: String,
    extensions: Value<S>,
}

impl<T: fmt::Display, S> From<T> for FieldError<S> {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::Null,
        }
    }
}

impl<S> FieldError<S> {
    /// Constructs a new [`FieldError`] with additional data.
    ///
    /// The `extensions` parameter ends up in the `"extensions"` field of
    /// the error object in the response; [`Value::Null`] means no extra
    /// data.
    #[must_use]
    pub fn new<T: fmt::Display>(e: T, extensions: Value<S>) -> Self {
        Self {
            message: e.to_string(),
            extensions,
        }
    }

    /// Returns the `"message"` field of this [`FieldError`].
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the `"extensions"` field of this [`FieldError`].
    #[must_use]
    pub fn extensions(&self) -> &Value<S> {
        &self.extensions
    }

    /// Maps the [`FieldError::message`] with the given function.
    #[must_use]
    pub fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
        Self {
            message: f(self.message),
            extensions: self.extensions,
        }
    }
}

/// The result of resolving the value of a field of type `T`.
pub type FieldResult<T, S = DefaultScalarValue> = Result<T, FieldError<S>>;

/// The result of resolving an unspecified field.
pub type ExecutionResult<S = DefaultScalarValue> = Result<Value<S>, FieldError<S>>;

/// The map of variables used for substitution during query execution.
pub type Variables<S = DefaultScalarValue> = HashMap<String, InputValue<S>>;

/// Boxed stream of source events produced by a subscription resolver.
///
/// `None` from the underlying stream indicates end-of-stream; an [`Err`]
/// item carries a failed event that does not terminate the stream.
pub type ValuesStream<S = DefaultScalarValue> =
    Pin<Box<dyn Stream<Item = FieldResult<Value<S>, S>> + Send + 'static>>;

/// One segment of the response path an error occurred at.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// A response key of an object.
    Field(String),
    /// An index of a list item.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Error type for errors that occur during query execution.
///
/// All execution errors contain the source position in the query of the
/// field that failed to resolve, along with the response path leading to
/// it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError<S = DefaultScalarValue> {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError<S>,
}

impl<S> Eq for ExecutionError<S> where Self: PartialEq {}

impl<S> PartialOrd for ExecutionError<S>
where
    Self: PartialEq,
{
    fn partial_cmp(&self, other: &ExecutionError<S>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for ExecutionError<S>
where
    Self: Eq,
{
    fn cmp(&self, other: &ExecutionError<S>) -> Ordering {
        (&self.location, &self.path, &self.error.message).cmp(&(
            &other.location,
            &other.path,
            &other.error.message,
        ))
    }
}

impl<S> ExecutionError<S> {
    #[doc(hidden)]
    pub fn new(
        location: SourcePosition,
        path: Vec<PathSegment>,
        error: FieldError<S>,
    ) -> ExecutionError<S> {
        ExecutionError {
            location,
            path,
            error,
        }
    }

    /// Constructs a new execution error occurring at the beginning of the
    /// query.
    pub fn at_origin(error: FieldError<S>) -> ExecutionError<S> {
        ExecutionError {
            location: SourcePosition::new_origin(),
            path: Vec::new(),
            error,
        }
    }

    /// The wrapped field error.
    pub fn error(&self) -> &FieldError<S> {
        &self.error
    }

    /// The source location _in the query_ of the field that failed to
    /// resolve.
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The response path leading to the field that generated this error.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

/// The complete result of executing one operation, or of mapping one
/// subscription event: the resolved data plus every field error collected
/// along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionOutput<S = DefaultScalarValue> {
    /// The resolved response data.
    pub data: Value<S>,
    /// Field errors collected during execution, in source order.
    pub errors: Vec<ExecutionError<S>>,
}

impl<S> ExecutionOutput<S> {
    /// Wraps resolved data with no errors.
    pub fn from_data(data: Value<S>) -> Self {
        Self {
            data,
            errors: vec![],
        }
    }

    /// A `data: null` output carrying a single error.
    pub fn from_error(error: ExecutionError<S>) -> Self {
        Self {
            data: Value::Null,
            errors: vec![error],
        }
    }
}

impl<S> From<GraphQLError> for ExecutionOutput<S> {
    fn from(e: GraphQLError) -> Self {
        match e {
            GraphQLError::ValidationError(errs) => Self {
                data: Value::Null,
                errors: errs
                    .into_iter()
                    .map(|e| {
                        ExecutionError::new(
                            e.locations().first().copied().unwrap_or_default(),
                            vec![],
                            FieldError::from(e.message()),
                        )
                    })
                    .collect(),
            },
            e => Self::from_error(ExecutionError::at_origin(FieldError::from(e))),
        }
    }
}

/// How the fields of one selection set are dispatched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecutionStrategy {
    /// Field resolvers run concurrently; the response is reassembled in
    /// selection-set order.
    Parallel,
    /// Field resolvers run one at a time, in selection-set order.
    Serial,
}

impl ExecutionStrategy {
    /// The strategy the GraphQL specification prescribes for root fields of
    /// the given operation type: parallel for queries, serial for mutations
    /// and for subscription event processing.
    pub fn for_operation(op: OperationType) -> Self {
        match op {
            OperationType::Query => ExecutionStrategy::Parallel,
            OperationType::Mutation => ExecutionStrategy::Serial,
            OperationType::Subscription => ExecutionStrategy::Serial,
        }
    }
}

/// Everything one request needs to execute: the selected operation, the
/// coerced variables, the fragment map and the opaque user context.
///
/// Immutable once built; lives for a single operation.
pub struct ExecutionContext<'a, S = DefaultScalarValue> {
    pub(crate) schema: &'a SchemaType<S>,
    pub(crate) operation: &'a Spanning<Operation<S>>,
    pub(crate) fragments: FnvHashMap<&'a str, &'a Fragment<S>>,
    pub(crate) variables: Variables<S>,
    pub(crate) root_value: &'a Value<S>,
    pub(crate) context: &'a (dyn Any + Send + Sync),
}

impl<'a, S> ExecutionContext<'a, S> {
    /// The schema this request executes against.
    pub fn schema(&self) -> &'a SchemaType<S> {
        self.schema
    }

    /// The operation selected for execution.
    pub fn operation(&self) -> &'a Spanning<Operation<S>> {
        self.operation
    }

    /// The type of the selected operation.
    pub fn operation_type(&self) -> OperationType {
        self.operation.item.operation_type
    }

    /// The root-field dispatch strategy of the selected operation.
    pub fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::for_operation(self.operation_type())
    }

    /// The coerced variable map, with defaults applied.
    pub fn variables(&self) -> &Variables<S> {
        &self.variables
    }

    /// Looks a fragment definition up by name.
    pub fn fragment_by_name(&self, name: &str) -> Option<&'a Fragment<S>> {
        self.fragments.get(name).copied()
    }

    /// The root value the operation resolves against.
    pub fn root_value(&self) -> &'a Value<S> {
        self.root_value
    }

    /// The opaque user context.
    pub fn context(&self) -> &'a (dyn Any + Send + Sync) {
        self.context
    }
}

/// Selects the operation a request refers to.
pub(crate) fn get_operation<'b, S>(
    document: &'b Document<S>,
    operation_name: Option<&str>,
) -> Result<&'b Spanning<Operation<S>>, GraphQLError> {
    let mut operation = None;
    let mut count = 0;
    for def in document {
        if let Definition::Operation(op) = def {
            count += 1;
            match operation_name {
                None => {
                    if operation.is_some() {
                        return Err(GraphQLError::MultipleOperationsProvided);
                    }
                    operation = Some(op);
                }
                Some(name) => {
                    if op.item.name.as_ref().map(|s| s.item.as_str()) == Some(name) {
                        operation = Some(op);
                    }
                }
            }
        }
    }
    match operation {
        Some(op) => Ok(op),
        None if count == 0 => Err(GraphQLError::NoOperationProvided),
        None => Err(GraphQLError::UnknownOperationName),
    }
}

/// Builds the immutable per-request [`ExecutionContext`]: selects the
/// operation, indexes fragments and coerces the variable values against
/// their declared types.
pub fn build_execution_context<'a, S: ScalarValue>(
    schema: &'a SchemaType<S>,
    document: &'a Document<S>,
    operation_name: Option<&str>,
    variables: &Variables<S>,
    root_value: &'a Value<S>,
    context: &'a (dyn Any + Send + Sync),
) -> Result<ExecutionContext<'a, S>, GraphQLError> {
    let operation = get_operation(document, operation_name)?;

    let fragments = document
        .iter()
        .filter_map(|d| match d {
            Definition::Fragment(f) => Some((f.item.name.item.as_str(), &f.item)),
            _ => None,
        })
        .collect();

    let variables = coerce_variable_values(schema, operation, variables)
        .map_err(GraphQLError::ValidationError)?;

    Ok(ExecutionContext {
        schema,
        operation,
        fragments,
        variables,
        root_value,
        context,
    })
}

/// Executes a query, mutation, or one subscription event against a schema.
///
/// Request-level failures (no such operation, variable coercion) surface as
/// [`GraphQLError`]s; field-level failures are collected into the returned
/// [`ExecutionOutput`].
pub async fn execute<S: ScalarValue>(
    schema: &SchemaType<S>,
    document: &Document<S>,
    operation_name: Option<&str>,
    variables: &Variables<S>,
    root_value: &Value<S>,
    context: &(dyn Any + Send + Sync),
) -> Result<ExecutionOutput<S>, GraphQLError> {
    let ctx = build_execution_context(
        schema,
        document,
        operation_name,
        variables,
        root_value,
        context,
    )?;
    Ok(execute_context(&ctx).await)
}
