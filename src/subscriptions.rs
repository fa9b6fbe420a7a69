//! Subscription execution: source-stream resolution and event mapping.
//!
//! A subscription resolves in two phases. Setup locates the single root
//! field, coerces its arguments and asks its subscribe callback for a
//! source event stream; any failure here produces exactly one result. The
//! returned [`Connection`] then maps every source event through the query
//! executor, one at a time, so responses leave in source order.

use std::{any::Any, fmt, pin::Pin, sync::Arc, task::Poll};

use futures::{Stream, StreamExt as _};
use tracing::debug;

use crate::{
    ast::{Document, OperationType},
    executor::{
        build_execution_context, coerce_argument_values, collect_fields, execute, ExecutionError,
        ExecutionOutput, FieldError, PathSegment, Variables,
    },
    parser::SourcePosition,
    resolve::{default_resolve, ResolveInfo},
    schema::model::SchemaType,
    value::{DefaultScalarValue, ScalarValue, Value},
    GraphQLError,
};

/// Boxed stream of execution results, one per source event.
pub type ResponseStream<S = DefaultScalarValue> =
    Pin<Box<dyn Stream<Item = ExecutionOutput<S>> + Send + 'static>>;

/// A live subscription.
///
/// Yields one [`ExecutionOutput`] per source event, in source order, and
/// ends when the source stream ends. Canceling releases the source stream
/// and any in-flight event mapping; polls after cancellation yield `None`.
pub struct Connection<S = DefaultScalarValue> {
    inner: Option<ResponseStream<S>>,
}

impl<S> Connection<S> {
    /// Wraps a mapped response stream.
    pub fn new(stream: ResponseStream<S>) -> Self {
        Self {
            inner: Some(stream),
        }
    }

    /// Cancels this subscription: drops the in-flight event mapping, then
    /// the source stream. Subsequent polls resolve to `None` promptly.
    pub fn cancel(&mut self) {
        self.inner = None;
    }
}

impl<S> fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Connection")
            .field("cancelled", &self.inner.is_none())
            .finish()
    }
}

impl<S> Stream for Connection<S> {
    type Item = ExecutionOutput<S>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        match self.get_mut().inner {
            Some(ref mut stream) => stream.as_mut().poll_next(cx),
            None => Poll::Ready(None),
        }
    }
}

/// The pull-based connection capability a transport holds onto.
pub trait SubscriptionConnection<S>: Stream<Item = ExecutionOutput<S>> + Send {
    /// Cancels the subscription cooperatively; see [`Connection::cancel`].
    fn cancel(&mut self);
}

impl<S: ScalarValue> SubscriptionConnection<S> for Connection<S> {
    fn cancel(&mut self) {
        self.inner = None;
    }
}

fn setup_error<S>(
    pos: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError<S>,
) -> ExecutionOutput<S> {
    ExecutionOutput::from_error(ExecutionError::new(pos, path, error))
}

/// Resolves a subscription operation into a stream of execution results.
///
/// Setup failures come back as [`Err`] carrying the single result that
/// describes them; per-event failures are embedded in that event's output
/// and do not terminate the stream.
pub async fn resolve_into_stream<S: ScalarValue>(
    schema: &Arc<SchemaType<S>>,
    document: &Arc<Document<S>>,
    operation_name: Option<&str>,
    variables: &Variables<S>,
    root_value: &Value<S>,
    context: &Arc<dyn Any + Send + Sync>,
) -> Result<Connection<S>, ExecutionOutput<S>> {
    let ctx = match build_execution_context(
        schema,
        document,
        operation_name,
        variables,
        root_value,
        &**context,
    ) {
        Ok(ctx) => ctx,
        Err(e) => return Err(e.into()),
    };

    let op = ctx.operation();
    let op_pos = op.span.start;

    if op.item.operation_type != OperationType::Subscription {
        return Err(GraphQLError::NotSubscription.into());
    }

    let Some(root_meta) = ctx.schema().subscription_type() else {
        return Err(setup_error(
            op_pos,
            vec![],
            FieldError::from("Schema is not configured for subscriptions"),
        ));
    };

    let grouped = collect_fields(
        ctx.schema(),
        root_meta,
        &[&op.item.selection_set[..]],
        ctx.variables(),
        &ctx.fragments,
    );

    // A subscription selects exactly one response key.
    if grouped.len() != 1 {
        let pos = grouped
            .get_index(1)
            .and_then(|(_, nodes)| nodes.first())
            .map_or(op_pos, |n| n.span.start);
        return Err(setup_error(
            pos,
            vec![],
            FieldError::from("Subscription operations must select exactly one top-level field"),
        ));
    }

    let (response_key, nodes) = grouped.get_index(0).expect("one grouped field");
    let node = nodes.first().expect("at least one field node");
    let field_name = node.item.name.item.as_str();
    let pos = node.span.start;
    let path = vec![PathSegment::Field(response_key.to_string())];

    let Some(meta_field) = root_meta.field_by_name(field_name) else {
        return Err(setup_error(
            pos,
            path,
            FieldError::from(format!(
                "The subscription field \"{field_name}\" is not defined",
            )),
        ));
    };

    let arguments = match coerce_argument_values(ctx.schema(), meta_field, node, ctx.variables()) {
        Ok(args) => args,
        Err(e) => return Err(setup_error(pos, path, e)),
    };

    debug!(field = field_name, "resolving subscription source stream");

    let info = ResolveInfo {
        field_name,
        parent: root_value,
        arguments: &arguments,
        context: &**context,
    };

    let source = match meta_field.subscriber {
        Some(ref subscriber) => match subscriber.resolve_stream(info).await {
            Ok(stream) => stream,
            Err(e) => return Err(setup_error(pos, path, e)),
        },
        None => {
            // Fall back through the resolver chain; a plain value does not
            // provide the event-stream capability.
            let resolved = match meta_field.resolver {
                Some(ref resolver) => resolver.resolve_field(info).await,
                None => Ok(default_resolve(root_value, field_name)),
            };
            return Err(match resolved {
                Err(e) => setup_error(pos, path, e),
                Ok(_) => setup_error(
                    pos,
                    path,
                    FieldError::from(format!(
                        "Subscription field \"{field_name}\" did not resolve to an event stream",
                    )),
                ),
            });
        }
    };

    // One outstanding event execution at a time keeps responses in source
    // order.
    let schema = Arc::clone(schema);
    let document = Arc::clone(document);
    let context = Arc::clone(context);
    let operation_name = operation_name.map(str::to_owned);
    let variables = variables.clone();
    let response_key = response_key.to_string();

    let mapped = source.then(move |event| {
        let schema = Arc::clone(&schema);
        let document = Arc::clone(&document);
        let context = Arc::clone(&context);
        let operation_name = operation_name.clone();
        let variables = variables.clone();
        let response_key = response_key.clone();

        async move {
            match event {
                Ok(event_value) => {
                    match execute(
                        &schema,
                        &document,
                        operation_name.as_deref(),
                        &variables,
                        &event_value,
                        &*context,
                    )
                    .await
                    {
                        Ok(output) => output,
                        Err(e) => e.into(),
                    }
                }
                Err(e) => ExecutionOutput::from_error(ExecutionError::new(
                    pos,
                    vec![PathSegment::Field(response_key)],
                    e,
                )),
            }
        }
    });

    Ok(Connection::new(Box::pin(mapped)))
}

#[cfg(test)]
mod tests {
    use std::{any::Any, sync::Arc};

    use futures::{stream, StreamExt as _};

    use super::{resolve_into_stream, Connection};
    use crate::{
        ast::Document,
        executor::{ExecutionOutput, PathSegment, ValuesStream, Variables},
        resolve::{resolver, stream_resolver, ResolveInfo},
        schema::{builder::build_schema, model::SchemaType, translate},
        value::{DefaultScalarValue, Value},
    };

    fn ticking_schema() -> Arc<SchemaType<DefaultScalarValue>> {
        let schema = build_schema(
            &translate::parse_schema_document(
                "type Query { noise: Int } \
                 type Subscription { ticks: Int other: Int silent: Int }",
            )
            .unwrap(),
        )
        .unwrap()
        .with_subscriber(
            "Subscription",
            "ticks",
            stream_resolver(|_: ResolveInfo<'_>| {
                let events = (1..=3)
                    .map(|i| Ok(Value::object(vec![("ticks", Value::scalar(i))])))
                    .collect::<Vec<_>>();
                Ok(Box::pin(stream::iter(events)) as ValuesStream)
            }),
        )
        .unwrap()
        .with_resolver(
            "Subscription",
            "silent",
            resolver(|_: ResolveInfo<'_>| Ok(Value::scalar(1))),
        )
        .unwrap();
        Arc::new(schema)
    }

    fn subscription(source: &str) -> Arc<Document> {
        Arc::new(translate::parse_query_document(source).unwrap())
    }

    fn anything() -> Arc<dyn Any + Send + Sync> {
        Arc::new(())
    }

    async fn subscribe(
        schema: &Arc<SchemaType<DefaultScalarValue>>,
        source: &str,
    ) -> Result<Connection<DefaultScalarValue>, ExecutionOutput<DefaultScalarValue>> {
        resolve_into_stream(
            schema,
            &subscription(source),
            None,
            &Variables::new(),
            &Value::object::<&str>(vec![]),
            &anything(),
        )
        .await
    }

    fn single_message(output: &ExecutionOutput<DefaultScalarValue>) -> &str {
        assert_eq!(output.data, Value::Null);
        assert_eq!(output.errors.len(), 1);
        output.errors[0].error().message()
    }

    #[tokio::test]
    async fn events_map_through_the_executor_in_source_order() {
        let schema = ticking_schema();
        let connection = subscribe(&schema, "subscription { ticks }").await.unwrap();

        let outputs = connection.collect::<Vec<_>>().await;
        assert_eq!(outputs.len(), 3);
        for (i, output) in outputs.iter().enumerate() {
            assert_eq!(output.errors, vec![]);
            assert_eq!(
                output.data,
                Value::object(vec![("ticks", Value::scalar(i as i32 + 1))]),
            );
        }
    }

    #[tokio::test]
    async fn subscriptions_select_exactly_one_field() {
        let schema = ticking_schema();
        let output = subscribe(&schema, "subscription { ticks other }")
            .await
            .unwrap_err();

        assert!(single_message(&output)
            .contains("Subscription operations must select exactly one top-level field"));
    }

    #[tokio::test]
    async fn unknown_subscription_fields_are_reported() {
        let schema = ticking_schema();
        let output = subscribe(&schema, "subscription { nope }").await.unwrap_err();

        assert!(single_message(&output)
            .contains(r#"The subscription field "nope" is not defined"#));
    }

    #[tokio::test]
    async fn schemas_without_subscription_root_refuse() {
        let schema = Arc::new(
            build_schema::<DefaultScalarValue>(
                &translate::parse_schema_document("type Query { a: Int }").unwrap(),
            )
            .unwrap(),
        );
        let output = subscribe(&schema, "subscription { ticks }").await.unwrap_err();

        assert!(single_message(&output).contains("not configured for subscriptions"));
    }

    #[tokio::test]
    async fn queries_are_not_subscriptions() {
        let schema = ticking_schema();
        let output = subscribe(&schema, "{ noise }").await.unwrap_err();

        assert!(single_message(&output).contains("not a subscription"));
    }

    #[tokio::test]
    async fn plain_values_are_not_event_streams() {
        let schema = ticking_schema();
        let output = subscribe(&schema, "subscription { silent }").await.unwrap_err();

        assert!(single_message(&output)
            .contains(r#"Subscription field "silent" did not resolve to an event stream"#));
        assert_eq!(
            output.errors[0].path(),
            &[PathSegment::Field("silent".into())],
        );
    }

    #[tokio::test]
    async fn failed_events_do_not_terminate_the_stream() {
        let schema = Arc::new(
            build_schema(
                &translate::parse_schema_document("type Query { a: Int } type Subscription { ticks: Int }")
                    .unwrap(),
            )
            .unwrap()
            .with_subscriber(
                "Subscription",
                "ticks",
                stream_resolver(|_: ResolveInfo<'_>| {
                    let events = vec![
                        Ok(Value::object(vec![("ticks", Value::scalar(1))])),
                        Err("tick lost".into()),
                        Ok(Value::object(vec![("ticks", Value::scalar(3))])),
                    ];
                    Ok(Box::pin(stream::iter(events)) as ValuesStream)
                }),
            )
            .unwrap(),
        );

        let connection = subscribe(&schema, "subscription { ticks }").await.unwrap();
        let outputs = connection.collect::<Vec<_>>().await;

        assert_eq!(outputs.len(), 3);
        assert_eq!(
            outputs[0].data,
            Value::object(vec![("ticks", Value::scalar(1))]),
        );
        assert_eq!(outputs[1].data, Value::Null);
        assert_eq!(outputs[1].errors[0].error().message(), "tick lost");
        assert_eq!(
            outputs[1].errors[0].path(),
            &[PathSegment::Field("ticks".into())],
        );
        assert_eq!(
            outputs[2].data,
            Value::object(vec![("ticks", Value::scalar(3))]),
        );
    }

    #[tokio::test]
    async fn cancelling_releases_the_source_and_ends_the_stream() {
        let schema = Arc::new(
            build_schema(
                &translate::parse_schema_document("type Query { a: Int } type Subscription { ticks: Int }")
                    .unwrap(),
            )
            .unwrap()
            .with_subscriber(
                "Subscription",
                "ticks",
                stream_resolver(|_: ResolveInfo<'_>| {
                    // A source that never produces; only cancellation ends it.
                    Ok(Box::pin(stream::pending()) as ValuesStream)
                }),
            )
            .unwrap(),
        );

        let mut connection = subscribe(&schema, "subscription { ticks }").await.unwrap();
        connection.cancel();

        assert!(connection.next().await.is_none());
    }

    #[tokio::test]
    async fn events_are_filtered_by_the_selection_set() {
        let schema = Arc::new(
            build_schema(
                &translate::parse_schema_document("type Query { a: Int } type Subscription { ticks: Int }")
                    .unwrap(),
            )
            .unwrap()
            .with_subscriber(
                "Subscription",
                "ticks",
                stream_resolver(|_: ResolveInfo<'_>| {
                    let events = vec![Ok(Value::object(vec![
                        ("ticks", Value::scalar(7)),
                        ("unrelated", Value::scalar("dropped")),
                    ]))];
                    Ok(Box::pin(stream::iter(events)) as ValuesStream)
                }),
            )
            .unwrap(),
        );

        let connection = subscribe(&schema, "subscription { ticks }").await.unwrap();
        let outputs = connection.collect::<Vec<_>>().await;

        assert_eq!(outputs.len(), 1);
        assert_eq!(
            outputs[0].data,
            Value::object(vec![("ticks", Value::scalar(7))]),
        );
    }
}
