use std::sync::{Arc, Mutex};

use crate::{
    ast::Document,
    executor::{execute, ExecutionOutput, FieldResult, PathSegment, Variables},
    resolve::{resolver, type_resolver, ResolveField, ResolveInfo},
    BoxFuture,
    schema::{
        builder::build_schema,
        model::SchemaType,
        translate::{parse_query_document, parse_schema_document},
    },
    value::{DefaultScalarValue, Value},
    GraphQLError,
};

fn schema(sdl: &str) -> SchemaType<DefaultScalarValue> {
    build_schema(&parse_schema_document(sdl).expect("SDL should parse"))
        .expect("schema should build")
}

fn query(source: &str) -> Document {
    parse_query_document(source).expect("query should parse")
}

async fn run(
    schema: &SchemaType<DefaultScalarValue>,
    source: &str,
    variables: Variables<DefaultScalarValue>,
    root: Value<DefaultScalarValue>,
) -> Result<ExecutionOutput<DefaultScalarValue>, GraphQLError> {
    execute(schema, &query(source), None, &variables, &root, &()).await
}

fn response_keys(data: &Value<DefaultScalarValue>) -> Vec<String> {
    data.as_object_value()
        .expect("data should be an object")
        .iter()
        .map(|(k, _)| k.clone())
        .collect()
}

#[tokio::test]
async fn default_resolver_reads_root_and_string_serializes() {
    let schema = schema("type Query { str: String }");
    let root = Value::object(vec![("str", Value::scalar(123))]);

    let output = run(&schema, "{ str }", Variables::new(), root).await.unwrap();

    assert_eq!(output.errors, vec![]);
    assert_eq!(output.data, Value::object(vec![("str", Value::scalar("123"))]));
}

#[tokio::test]
async fn aliases_fragments_and_arguments() {
    let schema = schema(
        "type Query { a: String pic(size: Int): String deep: Deep } \
         type Deep { b: String }",
    )
    .with_resolver(
        "Query",
        "pic",
        resolver(|info: ResolveInfo<'_>| {
            Ok(Value::scalar(format!(
                "Pic of size: {}",
                info.arguments.get_int("size").unwrap_or(50),
            )))
        }),
    )
    .unwrap();

    let root = Value::object(vec![
        ("a", Value::scalar("Apple")),
        (
            "deep",
            Value::object(vec![("b", Value::scalar("Banana"))]),
        ),
    ]);

    let source = r"
      query Example($size: Int) {
        a
        x: a
        ...f
        deep { b }
      }

      fragment f on Query {
        pic(size: $size)
      }";

    let vars = vec![("size".to_owned(), 100.into())].into_iter().collect();
    let output = run(&schema, source, vars, root).await.unwrap();

    assert_eq!(output.errors, vec![]);
    assert_eq!(response_keys(&output.data), vec!["a", "x", "pic", "deep"]);
    assert_eq!(
        output.data,
        Value::object(vec![
            ("a", Value::scalar("Apple")),
            ("x", Value::scalar("Apple")),
            ("pic", Value::scalar("Pic of size: 100")),
            ("deep", Value::object(vec![("b", Value::scalar("Banana"))])),
        ]),
    );
}

#[tokio::test]
async fn skip_and_include_honor_variables() {
    let schema = schema("type Query { a: Int b: Int c: Int }");
    let root = Value::object(vec![
        ("a", Value::scalar(1)),
        ("b", Value::scalar(2)),
        ("c", Value::scalar(3)),
    ]);

    let source = "query Q($inc: Boolean) { a @skip(if: true) b @include(if: $inc) c }";
    let vars = vec![("inc".to_owned(), false.into())].into_iter().collect();

    let output = run(&schema, source, vars, root).await.unwrap();
    assert_eq!(response_keys(&output.data), vec!["c"]);
}

#[tokio::test]
async fn missing_required_variable_is_a_request_error() {
    let schema = schema("type Query { f(a: Int!): Int }");

    let err = run(
        &schema,
        "query Q($x: Int!) { f(a: $x) }",
        Variables::new(),
        Value::object::<&str>(vec![]),
    )
    .await
    .unwrap_err();

    match err {
        GraphQLError::ValidationError(errors) => {
            assert!(errors
                .iter()
                .any(|e| e.message().contains(r#"Variable "$x" of required type "Int!""#)));
        }
        other => panic!("expected a validation error, got: {other}"),
    }
}

#[tokio::test]
async fn variable_and_argument_defaults_apply() {
    let schema = schema("type Query { echo(a: Int = 7): Int }")
        .with_resolver(
            "Query",
            "echo",
            resolver(|info: ResolveInfo<'_>| {
                Ok(info.arguments.get_int("a").map_or(Value::Null, Value::scalar))
            }),
        )
        .unwrap();

    let output = run(&schema, "{ echo }", Variables::new(), Value::object::<&str>(vec![]))
        .await
        .unwrap();
    assert_eq!(output.data, Value::object(vec![("echo", Value::scalar(7))]));

    let output = run(
        &schema,
        "query Q($x: Int = 5) { echo(a: $x) }",
        Variables::new(),
        Value::object::<&str>(vec![]),
    )
    .await
    .unwrap();
    assert_eq!(output.data, Value::object(vec![("echo", Value::scalar(5))]));
}

#[tokio::test]
async fn null_in_non_null_position_nulls_the_parent() {
    let schema = schema("type Query { obj: Obj } type Obj { req: Int! }");
    let root = Value::object(vec![("obj", Value::object::<&str>(vec![]))]);

    let output = run(&schema, "{ obj { req } }", Variables::new(), root)
        .await
        .unwrap();

    assert_eq!(output.data, Value::object(vec![("obj", Value::Null)]));
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].path(),
        &[
            PathSegment::Field("obj".into()),
            PathSegment::Field("req".into()),
        ],
    );
    assert!(output.errors[0]
        .error()
        .message()
        .contains("Cannot return null for non-nullable field"));
}

#[tokio::test]
async fn failed_non_null_list_item_nulls_the_list() {
    let schema = schema("type Query { list: [Int!] }");
    let root = Value::object(vec![(
        "list",
        Value::list(vec![Value::scalar(1), Value::Null, Value::scalar(3)]),
    )]);

    let output = run(&schema, "{ list }", Variables::new(), root).await.unwrap();

    assert_eq!(output.data, Value::object(vec![("list", Value::Null)]));
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].path(),
        &[PathSegment::Field("list".into()), PathSegment::Index(1)],
    );
}

#[tokio::test]
async fn nullable_list_items_absorb_nulls() {
    let schema = schema("type Query { list: [Int] }");
    let root = Value::object(vec![(
        "list",
        Value::list(vec![Value::scalar(1), Value::Null, Value::scalar(3)]),
    )]);

    let output = run(&schema, "{ list }", Variables::new(), root).await.unwrap();

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        output.data,
        Value::object(vec![(
            "list",
            Value::list(vec![Value::scalar(1), Value::Null, Value::scalar(3)]),
        )]),
    );
}

#[tokio::test]
async fn resolver_errors_are_located_and_partial_data_survives() {
    let schema = schema("type Query { ok: Int boom: Int }")
        .with_resolver(
            "Query",
            "boom",
            resolver(|_: ResolveInfo<'_>| Err("kaboom".into())),
        )
        .unwrap();
    let root = Value::object(vec![("ok", Value::scalar(1))]);

    let output = run(&schema, "{ ok boom }", Variables::new(), root)
        .await
        .unwrap();

    assert_eq!(
        output.data,
        Value::object(vec![("ok", Value::scalar(1)), ("boom", Value::Null)]),
    );
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].error().message(), "kaboom");
    assert_eq!(output.errors[0].path(), &[PathSegment::Field("boom".into())]);
}

#[tokio::test]
async fn mutation_roots_run_serially_in_selection_order() {
    let schema = schema("type Query { a: Int } type Mutation { first: Int second: Int }");
    let log = Log(Mutex::new(vec![]));
    let output = execute(
        &serial_logging_resolvers(schema, "Mutation"),
        &query("mutation { second first }"),
        None,
        &Variables::new(),
        &Value::object::<&str>(vec![]),
        &log,
    )
    .await
    .unwrap();

    assert_eq!(output.errors, vec![]);
    assert_eq!(response_keys(&output.data), vec!["second", "first"]);
    assert_eq!(*log.0.lock().unwrap(), vec!["second", "first"]);
}

#[tokio::test]
async fn subscription_roots_run_serially_in_selection_order() {
    // Executing a subscription operation directly (as the kernel does once
    // per event) dispatches its root fields serially, like a mutation.
    let schema = schema("type Query { a: Int } type Subscription { first: Int second: Int }");
    let log = Log(Mutex::new(vec![]));
    let output = execute(
        &serial_logging_resolvers(schema, "Subscription"),
        &query("subscription { second first }"),
        None,
        &Variables::new(),
        &Value::object::<&str>(vec![]),
        &log,
    )
    .await
    .unwrap();

    assert_eq!(output.errors, vec![]);
    assert_eq!(response_keys(&output.data), vec!["second", "first"]);
    assert_eq!(*log.0.lock().unwrap(), vec!["second", "first"]);
}

struct Log(Mutex<Vec<&'static str>>);

/// Resolver for the `second` field that yields to the scheduler before
/// logging its turn.
struct YieldBeforeLogging;

impl ResolveField for YieldBeforeLogging {
    fn resolve_field<'a>(&'a self, info: ResolveInfo<'a>) -> BoxFuture<'a, FieldResult<Value>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let log = info.context.downcast_ref::<Log>().unwrap();
            log.0.lock().unwrap().push("second");
            Ok(Value::scalar(2))
        })
    }
}

/// Attaches `first`/`second` resolvers that record their order in the
/// [`Log`] context. The `second` resolver yields before logging, so a
/// parallel dispatch of `{ second first }` would record `first` first;
/// only serial dispatch keeps selection order.
fn serial_logging_resolvers(
    schema: SchemaType<DefaultScalarValue>,
    type_name: &str,
) -> SchemaType<DefaultScalarValue> {
    schema
        .with_resolver(
            type_name,
            "first",
            resolver(|info: ResolveInfo<'_>| {
                let log = info.context.downcast_ref::<Log>().unwrap();
                log.0.lock().unwrap().push("first");
                Ok(Value::scalar(1))
            }),
        )
        .unwrap()
        .with_resolver(type_name, "second", Arc::new(YieldBeforeLogging))
        .unwrap()
}

#[tokio::test]
async fn enums_serialize_by_value_name() {
    let schema = schema("type Query { color: Color bad: Color } enum Color { RED GREEN }");
    let root = Value::object(vec![
        ("color", Value::scalar("RED")),
        ("bad", Value::scalar("PURPLE")),
    ]);

    let output = run(&schema, "{ color bad }", Variables::new(), root)
        .await
        .unwrap();

    assert_eq!(
        output.data,
        Value::object(vec![("color", Value::scalar("RED")), ("bad", Value::Null)]),
    );
    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0]
        .error()
        .message()
        .contains(r#"Enum "Color" cannot represent value"#));
}

#[tokio::test]
async fn abstract_types_resolve_to_concrete_objects() {
    let schema = schema(
        "interface Node { id: Int } \
         type User implements Node { id: Int name: String } \
         type Post implements Node { id: Int title: String } \
         type Query { node: Node }",
    )
    .with_type_resolver(
        "Node",
        type_resolver(|value: &Value<DefaultScalarValue>, _| {
            let kind = value
                .as_object_value()
                .and_then(|o| o.get_field_value("kind"))
                .and_then(Value::as_string_value);
            match kind {
                Some("user") => Ok(arcstr::literal!("User")),
                _ => Ok(arcstr::literal!("Post")),
            }
        }),
    )
    .unwrap();

    let root = Value::object(vec![(
        "node",
        Value::object(vec![
            ("kind", Value::scalar("user")),
            ("id", Value::scalar(4)),
            ("name", Value::scalar("Ada")),
        ]),
    )]);

    let output = run(
        &schema,
        "{ node { id __typename ... on User { name } ... on Post { title } } }",
        Variables::new(),
        root,
    )
    .await
    .unwrap();

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        output.data,
        Value::object(vec![(
            "node",
            Value::object(vec![
                ("id", Value::scalar(4)),
                ("__typename", Value::scalar("User")),
                ("name", Value::scalar("Ada")),
            ]),
        )]),
    );
}

#[tokio::test]
async fn typename_resolves_on_concrete_types() {
    let schema = schema("type Query { a: Int }");
    let output = run(
        &schema,
        "{ __typename }",
        Variables::new(),
        Value::object::<&str>(vec![]),
    )
    .await
    .unwrap();

    assert_eq!(
        output.data,
        Value::object(vec![("__typename", Value::scalar("Query"))]),
    );
}

#[tokio::test]
async fn operation_selection_errors() {
    let schema = schema("type Query { a: Int }");
    let root = Value::object::<&str>(vec![]);

    let err = execute(
        &schema,
        &query("fragment f on Query { a }"),
        None,
        &Variables::new(),
        &root,
        &(),
    )
    .await
    .unwrap_err();
    assert_eq!(err, GraphQLError::NoOperationProvided);

    let err = execute(
        &schema,
        &query("query A { a } query B { a }"),
        None,
        &Variables::new(),
        &root,
        &(),
    )
    .await
    .unwrap_err();
    assert_eq!(err, GraphQLError::MultipleOperationsProvided);

    let err = execute(
        &schema,
        &query("query A { a }"),
        Some("Missing"),
        &Variables::new(),
        &root,
        &(),
    )
    .await
    .unwrap_err();
    assert_eq!(err, GraphQLError::UnknownOperationName);
}
