//! Built-in scalars, introspection types and built-in directives.
//!
//! Every built schema carries these regardless of what the document
//! declares; user definitions never replace them.

use std::sync::Arc;

use crate::{
    ast::{InputValue, Type},
    executor::FieldError,
    schema::{
        meta::{Argument, EnumMeta, EnumValue, Field, MetaType, ObjectMeta, ScalarMeta},
        model::{DirectiveLocation, DirectiveType},
    },
    value::{ScalarValue, Value},
};

/// Names of the five spec scalars, in spec order.
pub(crate) const BUILTIN_SCALAR_NAMES: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

pub(crate) fn is_builtin_type_name(name: &str) -> bool {
    name.starts_with("__") || BUILTIN_SCALAR_NAMES.contains(&name)
}

fn int_scalar<S: ScalarValue>() -> ScalarMeta<S> {
    ScalarMeta::new("Int")
        .description(
            "The `Int` scalar type represents non-fractional signed whole numeric values. \
             Int can represent values between -(2^31) and 2^31 - 1.",
        )
        .serialize_fn(Arc::new(|v: &Value<S>| match v.as_scalar() {
            Some(s) => {
                if let Some(i) = s.as_int() {
                    Ok(Value::scalar(i))
                } else if let Some(b) = s.as_boolean() {
                    Ok(Value::scalar(i32::from(b)))
                } else if let Some(f) = s.as_float() {
                    if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
                        Ok(Value::scalar(f as i32))
                    } else {
                        Err(FieldError::from(format!(
                            "Int cannot represent non-integer value: {f}",
                        )))
                    }
                } else {
                    Err(FieldError::from(format!(
                        "Int cannot represent non-integer value: {v}",
                    )))
                }
            }
            None => Err(FieldError::from(format!(
                "Int cannot represent non-integer value: {v}",
            ))),
        }))
        .parse_value_fn(Arc::new(|v: &InputValue<S>| {
            match v.as_scalar().and_then(S::as_int) {
                Some(_) => Ok(()),
                None => Err(FieldError::from(format!(
                    "Int cannot represent non-integer value: {v}",
                ))),
            }
        }))
        .parse_literal_fn(Arc::new(|v: &InputValue<S>| {
            match v.as_scalar().and_then(S::as_int) {
                Some(_) => Ok(()),
                None => Err(FieldError::from(format!(
                    "Int cannot represent non-integer value: {v}",
                ))),
            }
        }))
}

fn float_scalar<S: ScalarValue>() -> ScalarMeta<S> {
    ScalarMeta::new("Float")
        .description(
            "The `Float` scalar type represents signed double-precision fractional values \
             as specified by IEEE 754.",
        )
        .serialize_fn(Arc::new(|v: &Value<S>| match v.as_scalar() {
            Some(s) => {
                if let Some(f) = s.as_float() {
                    Ok(Value::scalar(f))
                } else if let Some(b) = s.as_boolean() {
                    Ok(Value::scalar(if b { 1.0 } else { 0.0 }))
                } else {
                    Err(FieldError::from(format!(
                        "Float cannot represent non-numeric value: {v}",
                    )))
                }
            }
            None => Err(FieldError::from(format!(
                "Float cannot represent non-numeric value: {v}",
            ))),
        }))
        .parse_value_fn(Arc::new(|v: &InputValue<S>| {
            match v.as_scalar().and_then(S::as_float) {
                Some(_) => Ok(()),
                None => Err(FieldError::from(format!(
                    "Float cannot represent non-numeric value: {v}",
                ))),
            }
        }))
        .parse_literal_fn(Arc::new(|v: &InputValue<S>| {
            match v.as_scalar().and_then(S::as_float) {
                Some(_) => Ok(()),
                None => Err(FieldError::from(format!(
                    "Float cannot represent non-numeric value: {v}",
                ))),
            }
        }))
}

fn string_scalar<S: ScalarValue>() -> ScalarMeta<S> {
    ScalarMeta::new("String")
        .description(
            "The `String` scalar type represents textual data, represented as UTF-8 \
             character sequences.",
        )
        .serialize_fn(Arc::new(|v: &Value<S>| match v.as_scalar() {
            Some(s) => {
                // Serialization is lenient: ints, floats and booleans
                // coerce into their string forms.
                if let Some(s) = s.as_str() {
                    Ok(Value::scalar(s.to_owned()))
                } else if let Some(b) = s.as_boolean() {
                    Ok(Value::scalar(if b { "true" } else { "false" }.to_owned()))
                } else if let Some(i) = s.as_int() {
                    Ok(Value::scalar(i.to_string()))
                } else if let Some(f) = s.as_float() {
                    Ok(Value::scalar(f.to_string()))
                } else {
                    Err(FieldError::from(format!(
                        "String cannot represent value: {v}",
                    )))
                }
            }
            None => Err(FieldError::from(format!(
                "String cannot represent value: {v}",
            ))),
        }))
        .parse_value_fn(Arc::new(|v: &InputValue<S>| {
            match v.as_scalar().and_then(S::as_str) {
                Some(_) => Ok(()),
                None => Err(FieldError::from(format!(
                    "String cannot represent a non string value: {v}",
                ))),
            }
        }))
        .parse_literal_fn(Arc::new(|v: &InputValue<S>| {
            match v.as_scalar().and_then(S::as_str) {
                Some(_) => Ok(()),
                None => Err(FieldError::from(format!(
                    "String cannot represent a non string value: {v}",
                ))),
            }
        }))
}

fn boolean_scalar<S: ScalarValue>() -> ScalarMeta<S> {
    ScalarMeta::new("Boolean")
        .description("The `Boolean` scalar type represents `true` or `false`.")
        .serialize_fn(Arc::new(|v: &Value<S>| match v.as_scalar() {
            Some(s) => {
                if let Some(b) = s.as_boolean() {
                    Ok(Value::scalar(b))
                } else if let Some(f) = s.as_float() {
                    Ok(Value::scalar(f != 0.0))
                } else {
                    Err(FieldError::from(format!(
                        "Boolean cannot represent a non boolean value: {v}",
                    )))
                }
            }
            None => Err(FieldError::from(format!(
                "Boolean cannot represent a non boolean value: {v}",
            ))),
        }))
        .parse_value_fn(Arc::new(|v: &InputValue<S>| {
            match v.as_scalar().and_then(S::as_boolean) {
                Some(_) => Ok(()),
                None => Err(FieldError::from(format!(
                    "Boolean cannot represent a non boolean value: {v}",
                ))),
            }
        }))
        .parse_literal_fn(Arc::new(|v: &InputValue<S>| {
            match v.as_scalar().and_then(S::as_boolean) {
                Some(_) => Ok(()),
                None => Err(FieldError::from(format!(
                    "Boolean cannot represent a non boolean value: {v}",
                ))),
            }
        }))
}

fn id_scalar<S: ScalarValue>() -> ScalarMeta<S> {
    ScalarMeta::new("ID")
        .description(
            "The `ID` scalar type represents a unique identifier, often used to refetch an \
             object or as key for a cache. The ID type appears in a JSON response as a \
             String; however, it is not intended to be human-readable.",
        )
        .serialize_fn(Arc::new(|v: &Value<S>| match v.as_scalar() {
            Some(s) => {
                if let Some(s) = s.as_str() {
                    Ok(Value::scalar(s.to_owned()))
                } else if let Some(i) = s.as_int() {
                    Ok(Value::scalar(i.to_string()))
                } else {
                    Err(FieldError::from(format!("ID cannot represent value: {v}")))
                }
            }
            None => Err(FieldError::from(format!("ID cannot represent value: {v}"))),
        }))
        .parse_value_fn(Arc::new(|v: &InputValue<S>| match v.as_scalar() {
            Some(s) if s.as_str().is_some() || s.as_int().is_some() => Ok(()),
            _ => Err(FieldError::from(format!("ID cannot represent value: {v}"))),
        }))
        .parse_literal_fn(Arc::new(|v: &InputValue<S>| match v.as_scalar() {
            Some(s) if s.as_str().is_some() || s.as_int().is_some() => Ok(()),
            _ => Err(FieldError::from(format!("ID cannot represent value: {v}"))),
        }))
}

/// The five spec scalars, in spec order.
pub(crate) fn builtin_scalars<S: ScalarValue>() -> Vec<MetaType<S>> {
    vec![
        int_scalar().into_meta(),
        float_scalar().into_meta(),
        string_scalar().into_meta(),
        boolean_scalar().into_meta(),
        id_scalar().into_meta(),
    ]
}

fn include_deprecated_arg<S: ScalarValue>() -> Argument<S> {
    Argument::new("includeDeprecated", Type::named("Boolean"))
        .default_value(InputValue::scalar(false))
}

/// The introspection type system, in spec order.
pub(crate) fn introspection_types<S: ScalarValue>() -> Vec<MetaType<S>> {
    let schema = ObjectMeta::new(
        "__Schema",
        vec![
            Field::new("description", Type::named("String")),
            Field::new(
                "types",
                Type::non_null_list(Type::non_null_named("__Type")),
            ),
            Field::new("queryType", Type::non_null_named("__Type")),
            Field::new("mutationType", Type::named("__Type")),
            Field::new("subscriptionType", Type::named("__Type")),
            Field::new(
                "directives",
                Type::non_null_list(Type::non_null_named("__Directive")),
            ),
        ],
    )
    .description(
        "A GraphQL Schema defines the capabilities of a GraphQL server. It exposes all \
         available types and directives on the server, as well as the entry points for \
         query, mutation, and subscription operations.",
    );

    let r#type = ObjectMeta::new(
        "__Type",
        vec![
            Field::new("kind", Type::non_null_named("__TypeKind")),
            Field::new("name", Type::named("String")),
            Field::new("description", Type::named("String")),
            Field::new("specifiedByURL", Type::named("String")),
            Field::new("fields", Type::list(Type::non_null_named("__Field")))
                .argument(include_deprecated_arg()),
            Field::new("interfaces", Type::list(Type::non_null_named("__Type"))),
            Field::new("possibleTypes", Type::list(Type::non_null_named("__Type"))),
            Field::new(
                "enumValues",
                Type::list(Type::non_null_named("__EnumValue")),
            )
            .argument(include_deprecated_arg()),
            Field::new(
                "inputFields",
                Type::list(Type::non_null_named("__InputValue")),
            )
            .argument(include_deprecated_arg()),
            Field::new("ofType", Type::named("__Type")),
            Field::new("isOneOf", Type::named("Boolean")),
        ],
    )
    .description(
        "The fundamental unit of any GraphQL Schema is the type. There are many kinds of \
         types in GraphQL as represented by the `__TypeKind` enum.",
    );

    let type_kind = EnumMeta::new(
        "__TypeKind",
        vec![
            EnumValue::new("SCALAR"),
            EnumValue::new("OBJECT"),
            EnumValue::new("INTERFACE"),
            EnumValue::new("UNION"),
            EnumValue::new("ENUM"),
            EnumValue::new("INPUT_OBJECT"),
            EnumValue::new("LIST"),
            EnumValue::new("NON_NULL"),
        ],
    )
    .description("An enum describing what kind of type a given `__Type` is.");

    let field = ObjectMeta::new(
        "__Field",
        vec![
            Field::new("name", Type::non_null_named("String")),
            Field::new("description", Type::named("String")),
            Field::new(
                "args",
                Type::non_null_list(Type::non_null_named("__InputValue")),
            )
            .argument(include_deprecated_arg()),
            Field::new("type", Type::non_null_named("__Type")),
            Field::new("isDeprecated", Type::non_null_named("Boolean")),
            Field::new("deprecationReason", Type::named("String")),
        ],
    )
    .description(
        "Object and Interface types are described by a list of Fields, each of which has a \
         name, potentially a list of arguments, and a return type.",
    );

    let input_value = ObjectMeta::new(
        "__InputValue",
        vec![
            Field::new("name", Type::non_null_named("String")),
            Field::new("description", Type::named("String")),
            Field::new("type", Type::non_null_named("__Type")),
            Field::new("defaultValue", Type::named("String")),
            Field::new("isDeprecated", Type::non_null_named("Boolean")),
            Field::new("deprecationReason", Type::named("String")),
        ],
    )
    .description(
        "Arguments provided to Fields or Directives and the input fields of an \
         InputObject are represented as Input Values which describe their type and \
         optionally a default value.",
    );

    let enum_value = ObjectMeta::new(
        "__EnumValue",
        vec![
            Field::new("name", Type::non_null_named("String")),
            Field::new("description", Type::named("String")),
            Field::new("isDeprecated", Type::non_null_named("Boolean")),
            Field::new("deprecationReason", Type::named("String")),
        ],
    )
    .description(
        "One possible value for a given Enum. Enum values are unique values, not a \
         placeholder for a string or numeric value.",
    );

    let directive = ObjectMeta::new(
        "__Directive",
        vec![
            Field::new("name", Type::non_null_named("String")),
            Field::new("description", Type::named("String")),
            Field::new(
                "locations",
                Type::non_null_list(Type::non_null_named("__DirectiveLocation")),
            ),
            Field::new(
                "args",
                Type::non_null_list(Type::non_null_named("__InputValue")),
            )
            .argument(include_deprecated_arg()),
            Field::new("isRepeatable", Type::non_null_named("Boolean")),
        ],
    )
    .description(
        "A Directive provides a way to describe alternate runtime execution and type \
         validation behavior in a GraphQL document.",
    );

    let directive_location = EnumMeta::new(
        "__DirectiveLocation",
        [
            "QUERY",
            "MUTATION",
            "SUBSCRIPTION",
            "FIELD",
            "FRAGMENT_DEFINITION",
            "FRAGMENT_SPREAD",
            "INLINE_FRAGMENT",
            "VARIABLE_DEFINITION",
            "SCHEMA",
            "SCALAR",
            "OBJECT",
            "FIELD_DEFINITION",
            "ARGUMENT_DEFINITION",
            "INTERFACE",
            "UNION",
            "ENUM",
            "ENUM_VALUE",
            "INPUT_OBJECT",
            "INPUT_FIELD_DEFINITION",
        ]
        .into_iter()
        .map(EnumValue::new)
        .collect(),
    )
    .description(
        "A Directive can be adjacent to many parts of the GraphQL language, a \
         __DirectiveLocation describes one such possible adjacency.",
    );

    vec![
        schema.into_meta(),
        r#type.into_meta(),
        type_kind.into_meta(),
        field.into_meta(),
        input_value.into_meta(),
        enum_value.into_meta(),
        directive.into_meta(),
        directive_location.into_meta(),
    ]
}

fn skip_directive<S: ScalarValue>() -> DirectiveType<S> {
    DirectiveType::new(
        "skip",
        vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ],
    )
    .description("Directs the executor to skip this field or fragment when the `if` argument is true.")
    .argument(Argument::new("if", Type::non_null_named("Boolean")).description("Skipped when true."))
}

fn include_directive<S: ScalarValue>() -> DirectiveType<S> {
    DirectiveType::new(
        "include",
        vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ],
    )
    .description(
        "Directs the executor to include this field or fragment only when the `if` argument \
         is true.",
    )
    .argument(
        Argument::new("if", Type::non_null_named("Boolean")).description("Included when true."),
    )
}

/// The default reason recorded for a bare `@deprecated` with no argument.
pub(crate) const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

fn deprecated_directive<S: ScalarValue>() -> DirectiveType<S> {
    DirectiveType::new(
        "deprecated",
        vec![
            DirectiveLocation::FieldDefinition,
            DirectiveLocation::ArgumentDefinition,
            DirectiveLocation::InputFieldDefinition,
            DirectiveLocation::EnumValue,
        ],
    )
    .description("Marks an element of a GraphQL schema as no longer supported.")
    .argument(
        Argument::new("reason", Type::named("String"))
            .description(
                "Explains why this element was deprecated, usually also including a \
                 suggestion for how to access supported similar data.",
            )
            .default_value(InputValue::scalar(DEFAULT_DEPRECATION_REASON.to_owned())),
    )
}

fn specified_by_directive<S: ScalarValue>() -> DirectiveType<S> {
    DirectiveType::new("specifiedBy", vec![DirectiveLocation::Scalar])
        .description("Exposes a URL that specifies the behavior of this scalar.")
        .argument(
            Argument::new("url", Type::non_null_named("String"))
                .description("The URL that specifies the behavior of this scalar."),
        )
}

fn one_of_directive<S: ScalarValue>() -> DirectiveType<S> {
    DirectiveType::new("oneOf", vec![DirectiveLocation::InputObject])
        .description("Indicates exactly one field must be supplied and this field must not be `null`.")
}

/// The built-in directives, in spec order.
pub(crate) fn builtin_directives<S: ScalarValue>() -> Vec<DirectiveType<S>> {
    vec![
        skip_directive(),
        include_directive(),
        deprecated_directive(),
        specified_by_directive(),
        one_of_directive(),
    ]
}
