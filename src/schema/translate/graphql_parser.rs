//! Translation of [`graphql_parser`] documents into this crate's AST.
//!
//! The lexer and parser live in the `graphql-parser` crate; these functions
//! turn its loosely-typed output into the crate's spanned, [`Name`]-checked
//! document representation. Text and positions are owned by the result, so
//! translated documents have no ties to the source string.

use std::str::FromStr;

use graphql_parser::query as ext_q;
use graphql_parser::schema as ext_s;

use crate::{
    ast::{
        Arguments, Definition, Directive, DirectiveDefinition, Document, EnumTypeDefinition,
        EnumTypeExtension, EnumValueDefinition, Field, FieldDefinition, Fragment, FragmentSpread,
        InlineFragment, InputObjectTypeDefinition, InputObjectTypeExtension, InputValue,
        InputValueDefinition, InterfaceTypeDefinition, InterfaceTypeExtension, Name,
        ObjectTypeDefinition, ObjectTypeExtension, Operation, OperationType,
        RootOperationTypeDefinition, ScalarTypeDefinition, ScalarTypeExtension, SchemaDefinition,
        Selection, Type, TypeDefinition, TypeExtension, UnionTypeDefinition, UnionTypeExtension,
        VariableDefinition, VariableDefinitions,
    },
    parser::{ParseError, SourcePosition, Spanning},
    schema::model::DirectiveLocation,
    value::ScalarValue,
};

/// Parses SDL source text into a [`Document`] of type-system definitions.
pub fn parse_schema_document<S: ScalarValue>(source: &str) -> Result<Document<S>, ParseError> {
    let doc = graphql_parser::parse_schema::<String>(source)
        .map_err(|e| ParseError::new(e.to_string()))?;

    let mut out = Vec::with_capacity(doc.definitions.len());
    for def in doc.definitions {
        out.push(translate_schema_definition(def)?);
    }
    Ok(out)
}

/// Parses executable source text into a [`Document`] of operations and
/// fragments.
pub fn parse_query_document<S: ScalarValue>(source: &str) -> Result<Document<S>, ParseError> {
    let doc = graphql_parser::parse_query::<String>(source)
        .map_err(|e| ParseError::new(e.to_string()))?;

    let mut out = Vec::with_capacity(doc.definitions.len());
    for def in doc.definitions {
        out.push(translate_executable_definition(def)?);
    }
    Ok(out)
}

fn pos(p: graphql_parser::Pos) -> SourcePosition {
    p.into()
}

fn name(n: String, at: graphql_parser::Pos) -> Result<Spanning<Name>, ParseError> {
    let parsed = Name::from_str(&n).map_err(|e| ParseError::new(e.to_string()))?;
    Ok(Spanning::zero_width(pos(at), parsed))
}

fn translate_schema_definition<'p, S: ScalarValue>(
    def: ext_s::Definition<'p, String>,
) -> Result<Definition<S>, ParseError> {
    match def {
        ext_s::Definition::SchemaDefinition(sd) => {
            let at = sd.position;
            let mut operation_types = vec![];
            for (op, type_name) in [
                (OperationType::Query, sd.query),
                (OperationType::Mutation, sd.mutation),
                (OperationType::Subscription, sd.subscription),
            ] {
                if let Some(type_name) = type_name {
                    operation_types.push(Spanning::zero_width(
                        pos(at),
                        RootOperationTypeDefinition {
                            operation: op,
                            type_name: name(type_name, at)?,
                        },
                    ));
                }
            }
            Ok(Definition::Schema(Spanning::zero_width(
                pos(at),
                SchemaDefinition {
                    description: None,
                    directives: translate_directives(sd.directives)?,
                    operation_types,
                },
            )))
        }
        ext_s::Definition::TypeDefinition(td) => translate_type_definition(td),
        ext_s::Definition::TypeExtension(te) => translate_type_extension(te),
        ext_s::Definition::DirectiveDefinition(dd) => {
            let at = dd.position;
            Ok(Definition::Directive(Spanning::zero_width(
                pos(at),
                DirectiveDefinition {
                    description: dd.description,
                    name: name(dd.name, at)?,
                    arguments: translate_input_values(dd.arguments)?,
                    repeatable: dd.repeatable,
                    locations: dd
                        .locations
                        .into_iter()
                        .map(|l| Spanning::zero_width(pos(at), translate_location(l)))
                        .collect(),
                },
            )))
        }
    }
}

fn translate_type_definition<'p, S: ScalarValue>(
    td: ext_s::TypeDefinition<'p, String>,
) -> Result<Definition<S>, ParseError> {
    let def = match td {
        ext_s::TypeDefinition::Scalar(d) => {
            let at = d.position;
            Spanning::zero_width(
                pos(at),
                TypeDefinition::Scalar(ScalarTypeDefinition {
                    description: d.description,
                    name: name(d.name, at)?,
                    directives: translate_directives(d.directives)?,
                }),
            )
        }
        ext_s::TypeDefinition::Object(d) => {
            let at = d.position;
            Spanning::zero_width(
                pos(at),
                TypeDefinition::Object(ObjectTypeDefinition {
                    description: d.description,
                    name: name(d.name, at)?,
                    implements_interfaces: translate_names(d.implements_interfaces, at)?,
                    directives: translate_directives(d.directives)?,
                    fields: translate_fields(d.fields)?,
                }),
            )
        }
        ext_s::TypeDefinition::Interface(d) => {
            let at = d.position;
            Spanning::zero_width(
                pos(at),
                TypeDefinition::Interface(InterfaceTypeDefinition {
                    description: d.description,
                    name: name(d.name, at)?,
                    implements_interfaces: translate_names(d.implements_interfaces, at)?,
                    directives: translate_directives(d.directives)?,
                    fields: translate_fields(d.fields)?,
                }),
            )
        }
        ext_s::TypeDefinition::Union(d) => {
            let at = d.position;
            Spanning::zero_width(
                pos(at),
                TypeDefinition::Union(UnionTypeDefinition {
                    description: d.description,
                    name: name(d.name, at)?,
                    directives: translate_directives(d.directives)?,
                    members: translate_names(d.types, at)?,
                }),
            )
        }
        ext_s::TypeDefinition::Enum(d) => {
            let at = d.position;
            Spanning::zero_width(
                pos(at),
                TypeDefinition::Enum(EnumTypeDefinition {
                    description: d.description,
                    name: name(d.name, at)?,
                    directives: translate_directives(d.directives)?,
                    values: translate_enum_values(d.values)?,
                }),
            )
        }
        ext_s::TypeDefinition::InputObject(d) => {
            let at = d.position;
            Spanning::zero_width(
                pos(at),
                TypeDefinition::InputObject(InputObjectTypeDefinition {
                    description: d.description,
                    name: name(d.name, at)?,
                    directives: translate_directives(d.directives)?,
                    fields: translate_input_values(d.fields)?,
                }),
            )
        }
    };
    Ok(Definition::Type(def))
}

fn translate_type_extension<'p, S: ScalarValue>(
    te: ext_s::TypeExtension<'p, String>,
) -> Result<Definition<S>, ParseError> {
    let ext = match te {
        ext_s::TypeExtension::Scalar(e) => {
            let at = e.position;
            Spanning::zero_width(
                pos(at),
                TypeExtension::Scalar(ScalarTypeExtension {
                    name: name(e.name, at)?,
                    directives: translate_directives(e.directives)?,
                }),
            )
        }
        ext_s::TypeExtension::Object(e) => {
            let at = e.position;
            Spanning::zero_width(
                pos(at),
                TypeExtension::Object(ObjectTypeExtension {
                    name: name(e.name, at)?,
                    implements_interfaces: translate_names(e.implements_interfaces, at)?,
                    directives: translate_directives(e.directives)?,
                    fields: translate_fields(e.fields)?,
                }),
            )
        }
        ext_s::TypeExtension::Interface(e) => {
            let at = e.position;
            Spanning::zero_width(
                pos(at),
                TypeExtension::Interface(InterfaceTypeExtension {
                    name: name(e.name, at)?,
                    implements_interfaces: translate_names(e.implements_interfaces, at)?,
                    directives: translate_directives(e.directives)?,
                    fields: translate_fields(e.fields)?,
                }),
            )
        }
        ext_s::TypeExtension::Union(e) => {
            let at = e.position;
            Spanning::zero_width(
                pos(at),
                TypeExtension::Union(UnionTypeExtension {
                    name: name(e.name, at)?,
                    directives: translate_directives(e.directives)?,
                    members: translate_names(e.types, at)?,
                }),
            )
        }
        ext_s::TypeExtension::Enum(e) => {
            let at = e.position;
            Spanning::zero_width(
                pos(at),
                TypeExtension::Enum(EnumTypeExtension {
                    name: name(e.name, at)?,
                    directives: translate_directives(e.directives)?,
                    values: translate_enum_values(e.values)?,
                }),
            )
        }
        ext_s::TypeExtension::InputObject(e) => {
            let at = e.position;
            Spanning::zero_width(
                pos(at),
                TypeExtension::InputObject(InputObjectTypeExtension {
                    name: name(e.name, at)?,
                    directives: translate_directives(e.directives)?,
                    fields: translate_input_values(e.fields)?,
                }),
            )
        }
    };
    Ok(Definition::TypeExtension(ext))
}

fn translate_names(
    names: Vec<String>,
    at: graphql_parser::Pos,
) -> Result<Vec<Spanning<Name>>, ParseError> {
    names.into_iter().map(|n| name(n, at)).collect()
}

fn translate_fields<'p, S: ScalarValue>(
    fields: Vec<ext_s::Field<'p, String>>,
) -> Result<Vec<FieldDefinition<S>>, ParseError> {
    fields
        .into_iter()
        .map(|f| {
            Ok(FieldDefinition {
                description: f.description,
                name: name(f.name, f.position)?,
                arguments: translate_input_values(f.arguments)?,
                field_type: Spanning::zero_width(pos(f.position), translate_type(f.field_type)),
                directives: translate_directives(f.directives)?,
            })
        })
        .collect()
}

fn translate_input_values<'p, S: ScalarValue>(
    values: Vec<ext_s::InputValue<'p, String>>,
) -> Result<Vec<InputValueDefinition<S>>, ParseError> {
    values
        .into_iter()
        .map(|v| {
            Ok(InputValueDefinition {
                description: v.description,
                name: name(v.name, v.position)?,
                value_type: Spanning::zero_width(pos(v.position), translate_type(v.value_type)),
                default_value: v
                    .default_value
                    .map(|d| Spanning::zero_width(pos(v.position), translate_value(d))),
                directives: translate_directives(v.directives)?,
            })
        })
        .collect()
}

fn translate_enum_values<'p, S: ScalarValue>(
    values: Vec<ext_s::EnumValue<'p, String>>,
) -> Result<Vec<EnumValueDefinition<S>>, ParseError> {
    values
        .into_iter()
        .map(|v| {
            Ok(EnumValueDefinition {
                description: v.description,
                name: name(v.name, v.position)?,
                directives: translate_directives(v.directives)?,
            })
        })
        .collect()
}

fn translate_directives<'p, S: ScalarValue>(
    directives: Vec<ext_s::Directive<'p, String>>,
) -> Result<Vec<Spanning<Directive<S>>>, ParseError> {
    directives
        .into_iter()
        .map(|d| {
            let at = d.position;
            Ok(Spanning::zero_width(
                pos(at),
                Directive {
                    name: Spanning::zero_width(pos(at), d.name),
                    arguments: if d.arguments.is_empty() {
                        None
                    } else {
                        Some(Spanning::zero_width(
                            pos(at),
                            translate_arguments(d.arguments, at),
                        ))
                    },
                },
            ))
        })
        .collect()
}

fn translate_arguments<'p, S: ScalarValue>(
    arguments: Vec<(String, ext_s::Value<'p, String>)>,
    at: graphql_parser::Pos,
) -> Arguments<S> {
    Arguments {
        items: arguments
            .into_iter()
            .map(|(k, v)| {
                (
                    Spanning::zero_width(pos(at), k),
                    Spanning::zero_width(pos(at), translate_value(v)),
                )
            })
            .collect(),
    }
}

fn translate_type<'p>(t: ext_s::Type<'p, String>) -> Type {
    match t {
        ext_s::Type::NamedType(n) => Type::named(n),
        ext_s::Type::ListType(inner) => Type::list(translate_type(*inner)),
        ext_s::Type::NonNullType(inner) => match *inner {
            ext_s::Type::NamedType(n) => Type::non_null_named(n),
            ext_s::Type::ListType(inner) => Type::non_null_list(translate_type(*inner)),
            // `!!` does not parse; collapse defensively anyway.
            ext_s::Type::NonNullType(inner) => translate_type(ext_s::Type::NonNullType(inner)),
        },
    }
}

fn translate_value<'p, S: ScalarValue>(v: ext_s::Value<'p, String>) -> InputValue<S> {
    match v {
        ext_s::Value::Variable(n) => InputValue::Variable(n),
        ext_s::Value::Int(n) => {
            let n = n.as_i64().unwrap();
            match i32::try_from(n) {
                Ok(i) => InputValue::scalar(i),
                // Out-of-range integers survive as floats, mirroring how
                // JSON transports treat them.
                Err(_) => InputValue::scalar(n as f64),
            }
        }
        ext_s::Value::Float(f) => InputValue::scalar(f),
        ext_s::Value::String(s) => InputValue::scalar(s),
        ext_s::Value::Boolean(b) => InputValue::scalar(b),
        ext_s::Value::Null => InputValue::Null,
        ext_s::Value::Enum(n) => InputValue::Enum(n),
        ext_s::Value::List(l) => {
            InputValue::List(l.into_iter().map(|v| Spanning::unlocated(translate_value(v))).collect())
        }
        ext_s::Value::Object(o) => InputValue::Object(
            o.into_iter()
                .map(|(k, v)| {
                    (
                        Spanning::unlocated(k),
                        Spanning::unlocated(translate_value(v)),
                    )
                })
                .collect(),
        ),
    }
}

fn translate_location(l: ext_s::DirectiveLocation) -> DirectiveLocation {
    use ext_s::DirectiveLocation as L;

    match l {
        L::Query => DirectiveLocation::Query,
        L::Mutation => DirectiveLocation::Mutation,
        L::Subscription => DirectiveLocation::Subscription,
        L::Field => DirectiveLocation::Field,
        L::FragmentDefinition => DirectiveLocation::FragmentDefinition,
        L::FragmentSpread => DirectiveLocation::FragmentSpread,
        L::InlineFragment => DirectiveLocation::InlineFragment,
        L::VariableDefinition => DirectiveLocation::VariableDefinition,
        L::Schema => DirectiveLocation::Schema,
        L::Scalar => DirectiveLocation::Scalar,
        L::Object => DirectiveLocation::Object,
        L::FieldDefinition => DirectiveLocation::FieldDefinition,
        L::ArgumentDefinition => DirectiveLocation::ArgumentDefinition,
        L::Interface => DirectiveLocation::Interface,
        L::Union => DirectiveLocation::Union,
        L::Enum => DirectiveLocation::Enum,
        L::EnumValue => DirectiveLocation::EnumValue,
        L::InputObject => DirectiveLocation::InputObject,
        L::InputFieldDefinition => DirectiveLocation::InputFieldDefinition,
    }
}

fn translate_executable_definition<'p, S: ScalarValue>(
    def: ext_q::Definition<'p, String>,
) -> Result<Definition<S>, ParseError> {
    match def {
        ext_q::Definition::Operation(op) => {
            let (operation_type, position, op_name, variable_definitions, directives, selection_set) =
                match op {
                    ext_q::OperationDefinition::SelectionSet(ss) => (
                        OperationType::Query,
                        ss.span.0,
                        None,
                        vec![],
                        vec![],
                        ss,
                    ),
                    ext_q::OperationDefinition::Query(q) => (
                        OperationType::Query,
                        q.position,
                        q.name,
                        q.variable_definitions,
                        q.directives,
                        q.selection_set,
                    ),
                    ext_q::OperationDefinition::Mutation(m) => (
                        OperationType::Mutation,
                        m.position,
                        m.name,
                        m.variable_definitions,
                        m.directives,
                        m.selection_set,
                    ),
                    ext_q::OperationDefinition::Subscription(s) => (
                        OperationType::Subscription,
                        s.position,
                        s.name,
                        s.variable_definitions,
                        s.directives,
                        s.selection_set,
                    ),
                };

            let variable_definitions = if variable_definitions.is_empty() {
                None
            } else {
                Some(Spanning::zero_width(
                    pos(position),
                    VariableDefinitions {
                        items: variable_definitions
                            .into_iter()
                            .map(|vd| {
                                Ok((
                                    Spanning::zero_width(pos(vd.position), vd.name),
                                    VariableDefinition {
                                        var_type: Spanning::zero_width(
                                            pos(vd.position),
                                            translate_type(vd.var_type),
                                        ),
                                        default_value: vd.default_value.map(|d| {
                                            Spanning::zero_width(
                                                pos(vd.position),
                                                translate_value(d),
                                            )
                                        }),
                                        directives: None,
                                    },
                                ))
                            })
                            .collect::<Result<_, ParseError>>()?,
                    },
                ))
            };

            Ok(Definition::Operation(Spanning::zero_width(
                pos(position),
                Operation {
                    operation_type,
                    name: op_name.map(|n| Spanning::zero_width(pos(position), n)),
                    variable_definitions,
                    directives: translate_optional_directives(directives)?,
                    selection_set: translate_selection_set(selection_set)?,
                },
            )))
        }
        ext_q::Definition::Fragment(f) => {
            let ext_q::TypeCondition::On(condition) = f.type_condition;
            Ok(Definition::Fragment(Spanning::zero_width(
                pos(f.position),
                Fragment {
                    name: Spanning::zero_width(pos(f.position), f.name),
                    type_condition: Spanning::zero_width(pos(f.position), condition),
                    directives: translate_optional_directives(f.directives)?,
                    selection_set: translate_selection_set(f.selection_set)?,
                },
            )))
        }
    }
}

fn translate_optional_directives<'p, S: ScalarValue>(
    directives: Vec<ext_s::Directive<'p, String>>,
) -> Result<Option<Vec<Spanning<Directive<S>>>>, ParseError> {
    if directives.is_empty() {
        Ok(None)
    } else {
        translate_directives(directives).map(Some)
    }
}

fn translate_selection_set<'p, S: ScalarValue>(
    ss: ext_q::SelectionSet<'p, String>,
) -> Result<Vec<Selection<S>>, ParseError> {
    ss.items
        .into_iter()
        .map(|sel| match sel {
            ext_q::Selection::Field(f) => {
                let at = f.position;
                Ok(Selection::Field(Spanning::zero_width(
                    pos(at),
                    Field {
                        alias: f.alias.map(|a| Spanning::zero_width(pos(at), a)),
                        name: Spanning::zero_width(pos(at), f.name),
                        arguments: if f.arguments.is_empty() {
                            None
                        } else {
                            Some(Spanning::zero_width(
                                pos(at),
                                translate_arguments(f.arguments, at),
                            ))
                        },
                        directives: translate_optional_directives(f.directives)?,
                        selection_set: if f.selection_set.items.is_empty() {
                            None
                        } else {
                            Some(translate_selection_set(f.selection_set)?)
                        },
                    },
                )))
            }
            ext_q::Selection::FragmentSpread(fs) => {
                let at = fs.position;
                Ok(Selection::FragmentSpread(Spanning::zero_width(
                    pos(at),
                    FragmentSpread {
                        name: Spanning::zero_width(pos(at), fs.fragment_name),
                        directives: translate_optional_directives(fs.directives)?,
                    },
                )))
            }
            ext_q::Selection::InlineFragment(inf) => {
                let at = inf.position;
                let type_condition = inf.type_condition.map(|ext_q::TypeCondition::On(c)| {
                    Spanning::zero_width(pos(at), c)
                });
                Ok(Selection::InlineFragment(Spanning::zero_width(
                    pos(at),
                    InlineFragment {
                        type_condition,
                        directives: translate_optional_directives(inf.directives)?,
                        selection_set: translate_selection_set(inf.selection_set)?,
                    },
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_query_document, parse_schema_document};
    use crate::{
        ast::{Definition, InputValue, Selection, Type, TypeDefinition, TypeExtension},
        value::DefaultScalarValue,
    };

    #[test]
    fn translates_type_system_documents() {
        let doc = parse_schema_document::<DefaultScalarValue>(
            r#"
            "A point in time"
            scalar Date @specifiedBy(url: "https://example.com/date")

            schema { query: Root }

            type Root {
                when(tz: String = "UTC"): Date
            }

            extend type Root { extra: Int }
            directive @tag(name: String!) repeatable on OBJECT
            "#,
        )
        .unwrap();

        assert_eq!(doc.len(), 5);

        match &doc[0] {
            Definition::Type(t) => match &t.item {
                TypeDefinition::Scalar(s) => {
                    assert_eq!(s.description.as_deref(), Some("A point in time"));
                    assert_eq!(*s.name.item.as_str(), *"Date");
                    assert_eq!(s.directives.len(), 1);
                }
                other => panic!("expected a scalar definition, got: {other:?}"),
            },
            other => panic!("expected a type definition, got: {other:?}"),
        }

        match &doc[2] {
            Definition::Type(t) => match &t.item {
                TypeDefinition::Object(o) => {
                    let field = &o.fields[0];
                    assert_eq!(field.field_type.item, Type::named("Date"));
                    let arg = &field.arguments[0];
                    assert_eq!(arg.value_type.item, Type::named("String"));
                    assert!(matches!(
                        arg.default_value.as_ref().unwrap().item,
                        InputValue::Scalar(_),
                    ));
                }
                other => panic!("expected an object definition, got: {other:?}"),
            },
            other => panic!("expected a type definition, got: {other:?}"),
        }

        assert!(matches!(
            &doc[3],
            Definition::TypeExtension(e) if matches!(e.item, TypeExtension::Object(_)),
        ));
        assert!(matches!(&doc[4], Definition::Directive(_)));
    }

    #[test]
    fn translates_executable_documents() {
        let doc = parse_query_document::<DefaultScalarValue>(
            r#"
            query Q($on: Boolean = true) {
                a
                b: a @include(if: $on)
                ...f
                ... on Root { c }
            }

            fragment f on Root { d }
            "#,
        )
        .unwrap();

        assert_eq!(doc.len(), 2);
        let Definition::Operation(op) = &doc[0] else {
            panic!("expected an operation");
        };
        assert_eq!(op.item.name.as_ref().unwrap().item, "Q");
        assert_eq!(op.item.selection_set.len(), 4);
        match &op.item.selection_set[1] {
            Selection::Field(f) => {
                assert_eq!(f.item.alias.as_ref().unwrap().item, "b");
                assert_eq!(f.item.directives.as_ref().unwrap().len(), 1);
            }
            other => panic!("expected a field, got: {other:?}"),
        }
        assert!(matches!(&doc[1], Definition::Fragment(_)));
    }

    #[test]
    fn invalid_source_reports_a_parse_error() {
        assert!(parse_schema_document::<DefaultScalarValue>("type {").is_err());
        assert!(parse_query_document::<DefaultScalarValue>("query {{").is_err());
    }
}
