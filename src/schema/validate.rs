//! Type-system invariant checks on a linked schema.
//!
//! All checks are collecting: the full list of violations is returned, each
//! carrying the source positions the builder recorded for the offending
//! definitions.

use std::collections::HashSet;

use arcstr::ArcStr;

use crate::{
    ast::{Definition, Directive, Document, InputValueDefinition, Type, TypeDefinition, TypeExtension},
    parser::{SourcePosition, Spanning},
    schema::{
        meta::{Field, InputObjectMeta, MetaType},
        model::{DirectiveLocation, SchemaType},
    },
    validation::RuleError,
    value::ScalarValue,
};

/// Walks the linked graph and asserts the type-system invariants,
/// collecting every violation.
pub fn validate_schema<S: ScalarValue>(schema: &SchemaType<S>) -> Vec<RuleError> {
    let mut errors = vec![];

    validate_root_types(schema, &mut errors);

    for meta in schema.types.values() {
        match meta {
            MetaType::Object(o) => validate_implements(
                schema,
                &o.name,
                &o.fields,
                &o.interface_names,
                o.position,
                false,
                &mut errors,
            ),
            MetaType::Interface(i) => validate_implements(
                schema,
                &i.name,
                &i.fields,
                &i.interface_names,
                i.position,
                true,
                &mut errors,
            ),
            MetaType::Union(u) => {
                for member in &u.of_type_names {
                    if !matches!(
                        schema.concrete_type_by_name(member),
                        Some(MetaType::Object(..)),
                    ) {
                        errors.push(RuleError::new(
                            &format!(
                                "Union type \"{}\" can only include Object types, \
                                 it cannot include \"{member}\"",
                                u.name,
                            ),
                            &locs(u.position),
                        ));
                    }
                }
            }
            MetaType::Enum(e) => {
                for value in &e.values {
                    if ["true", "false", "null"].contains(&value.name.as_str()) {
                        errors.push(RuleError::new(
                            &format!(
                                "Enum type \"{}\" cannot include value: {}",
                                e.name, value.name,
                            ),
                            &locs(e.position),
                        ));
                    }
                }
            }
            MetaType::InputObject(io) => validate_one_of(io, &mut errors),
            MetaType::Scalar(..) => {}
        }
    }

    validate_input_cycles(schema, &mut errors);

    errors
}

fn locs(pos: Option<SourcePosition>) -> Vec<SourcePosition> {
    pos.into_iter().collect()
}

fn validate_root_types<S: ScalarValue>(schema: &SchemaType<S>, errors: &mut Vec<RuleError>) {
    let roots = [
        ("Query", schema.query_type()),
        ("Mutation", schema.mutation_type()),
        ("Subscription", schema.subscription_type()),
    ];
    for (kind, meta) in roots {
        if let Some(meta) = meta {
            if !matches!(meta, MetaType::Object(..)) {
                errors.push(RuleError::new(
                    &format!(
                        "{kind} root type must be Object type, it cannot be \"{}\"",
                        meta.name(),
                    ),
                    &locs(meta.position()),
                ));
            }
        }
    }
}

fn validate_implements<S: ScalarValue>(
    schema: &SchemaType<S>,
    impl_name: &ArcStr,
    fields: &[Field<S>],
    interface_names: &[ArcStr],
    pos: Option<SourcePosition>,
    implementer_is_interface: bool,
    errors: &mut Vec<RuleError>,
) {
    for iface_name in interface_names {
        if implementer_is_interface && iface_name == impl_name {
            errors.push(RuleError::new(
                &format!("Type \"{impl_name}\" cannot implement itself"),
                &locs(pos),
            ));
            continue;
        }

        let iface = match schema.concrete_type_by_name(iface_name) {
            Some(MetaType::Interface(i)) => i,
            Some(_) => {
                errors.push(RuleError::new(
                    &format!(
                        "Type \"{impl_name}\" must only implement Interface types, \
                         it cannot implement \"{iface_name}\"",
                    ),
                    &locs(pos),
                ));
                continue;
            }
            // Unresolvable names already halted the builder.
            None => continue,
        };

        for transitive in &iface.interface_names {
            if transitive != impl_name && !interface_names.contains(transitive) {
                errors.push(RuleError::new(
                    &format!(
                        "Type \"{impl_name}\" must implement \"{transitive}\" because it is \
                         implemented by \"{iface_name}\"",
                    ),
                    &locs(pos),
                ));
            }
        }

        for ifield in &iface.fields {
            let ofield = match fields.iter().find(|f| f.name == ifield.name) {
                Some(f) => f,
                None => {
                    errors.push(RuleError::new(
                        &format!(
                            "Interface field \"{iface_name}.{}\" expected but \
                             \"{impl_name}\" does not provide it",
                            ifield.name,
                        ),
                        &locs(pos.or(ifield.position)),
                    ));
                    continue;
                }
            };

            if !schema.is_subtype(&ofield.field_type, &ifield.field_type) {
                errors.push(RuleError::new(
                    &format!(
                        "Interface field \"{iface_name}.{}\" expects type \"{}\" but \
                         \"{impl_name}.{}\" is type \"{}\"",
                        ifield.name, ifield.field_type, ofield.name, ofield.field_type,
                    ),
                    &locs(ofield.position),
                ));
            }

            validate_field_arguments(iface_name, ifield, impl_name, ofield, errors);
        }
    }
}

/// Argument compatibility for one interface field and its implementation:
/// same-name arguments are invariant in type, additional arguments must not
/// be required.
fn validate_field_arguments<S: ScalarValue>(
    iface_name: &ArcStr,
    ifield: &Field<S>,
    impl_name: &ArcStr,
    ofield: &Field<S>,
    errors: &mut Vec<RuleError>,
) {
    for iarg in &ifield.arguments {
        match ofield.argument_by_name(&iarg.name) {
            None => errors.push(RuleError::new(
                &format!(
                    "Interface field argument \"{iface_name}.{}({}:)\" expected but \
                     \"{impl_name}.{}\" does not provide it",
                    ifield.name, iarg.name, ofield.name,
                ),
                &locs(ofield.position),
            )),
            Some(oarg) if oarg.arg_type != iarg.arg_type => errors.push(RuleError::new(
                &format!(
                    "Interface field argument \"{iface_name}.{}({}:)\" expects type \"{}\" \
                     but \"{impl_name}.{}({}:)\" is type \"{}\"",
                    ifield.name, iarg.name, iarg.arg_type, ofield.name, oarg.name, oarg.arg_type,
                ),
                &locs(oarg.position.or(ofield.position)),
            )),
            Some(_) => {}
        }
    }

    for oarg in &ofield.arguments {
        if ifield.argument_by_name(&oarg.name).is_none()
            && oarg.arg_type.is_non_null()
            && oarg.default_value.is_none()
        {
            errors.push(RuleError::new(
                &format!(
                    "Argument \"{impl_name}.{}({}:)\" must not be required type \"{}\" if \
                     not provided by the interface field \"{iface_name}.{}\"",
                    ofield.name, oarg.name, oarg.arg_type, ifield.name,
                ),
                &locs(oarg.position.or(ofield.position)),
            ));
        }
    }
}

fn validate_one_of<S: ScalarValue>(io: &InputObjectMeta<S>, errors: &mut Vec<RuleError>) {
    if !io.is_one_of {
        return;
    }
    for field in &io.input_fields {
        if field.arg_type.is_non_null() {
            errors.push(RuleError::new(
                &format!(
                    "OneOf input object field \"{}.{}\" must be nullable",
                    io.name, field.name,
                ),
                &locs(field.position),
            ));
        }
        if field.default_value.is_some() {
            errors.push(RuleError::new(
                &format!(
                    "OneOf input object field \"{}.{}\" cannot have a default value",
                    io.name, field.name,
                ),
                &locs(field.position),
            ));
        }
    }
}

/// Rejects chains of non-`null` input object fields that loop back onto
/// themselves; such a value could never be constructed. Lists and nullable
/// fields break the chain.
fn validate_input_cycles<S: ScalarValue>(schema: &SchemaType<S>, errors: &mut Vec<RuleError>) {
    let mut visited: HashSet<ArcStr> = HashSet::new();

    for meta in schema.types.values() {
        if let MetaType::InputObject(io) = meta {
            let mut stack: Vec<(ArcStr, ArcStr)> = vec![];
            detect_cycle(schema, io, &mut visited, &mut stack, errors);
        }
    }
}

fn detect_cycle<S: ScalarValue>(
    schema: &SchemaType<S>,
    io: &InputObjectMeta<S>,
    visited: &mut HashSet<ArcStr>,
    stack: &mut Vec<(ArcStr, ArcStr)>,
    errors: &mut Vec<RuleError>,
) {
    if !visited.insert(io.name.clone()) {
        return;
    }

    for field in &io.input_fields {
        let target_name = match &field.arg_type {
            Type::NonNullNamed(n) => n,
            _ => continue,
        };
        let target = match schema.concrete_type_by_name(target_name) {
            Some(MetaType::InputObject(t)) => t,
            _ => continue,
        };

        if let Some(idx) = stack.iter().position(|(n, _)| *n == target.name) {
            let path = stack[idx..]
                .iter()
                .map(|(_, f)| f.as_str())
                .chain(std::iter::once(field.name.as_str()))
                .collect::<Vec<_>>()
                .join(".");
            errors.push(RuleError::new(
                &format!(
                    "Cannot reference Input Object \"{}\" within itself through a series \
                     of non-null fields: \"{path}\"",
                    target.name,
                ),
                &locs(field.position),
            ));
        } else if io.name == target.name {
            errors.push(RuleError::new(
                &format!(
                    "Cannot reference Input Object \"{}\" within itself through a series \
                     of non-null fields: \"{}\"",
                    io.name, field.name,
                ),
                &locs(field.position),
            ));
        } else {
            stack.push((io.name.clone(), field.name.clone()));
            detect_cycle(schema, target, visited, stack, errors);
            stack.pop();
        }
    }
}

/// Checks every directive applied inside the type-system portion of a
/// document against the built schema: the directive must be known, legal at
/// its location, and not repeated unless declared repeatable.
pub(crate) fn validate_document_directives<S: ScalarValue>(
    document: &Document<S>,
    schema: &SchemaType<S>,
) -> Vec<RuleError> {
    let mut errors = vec![];

    for def in document {
        match def {
            Definition::Schema(sd) => {
                check_directives(
                    schema,
                    &sd.item.directives,
                    DirectiveLocation::Schema,
                    &mut errors,
                );
            }
            Definition::SchemaExtension(se) => {
                check_directives(
                    schema,
                    &se.item.directives,
                    DirectiveLocation::Schema,
                    &mut errors,
                );
            }
            Definition::Type(td) => check_type_definition_directives(schema, &td.item, &mut errors),
            Definition::TypeExtension(te) => {
                check_type_extension_directives(schema, &te.item, &mut errors)
            }
            Definition::Directive(dd) => {
                check_argument_directives(schema, &dd.item.arguments, &mut errors);
            }
            // Executable definitions belong to the query-side validation
            // pipeline.
            Definition::Operation(_) | Definition::Fragment(_) => {}
        }
    }

    errors
}

fn check_type_definition_directives<S: ScalarValue>(
    schema: &SchemaType<S>,
    td: &TypeDefinition<S>,
    errors: &mut Vec<RuleError>,
) {
    use DirectiveLocation as L;

    match td {
        TypeDefinition::Scalar(d) => check_directives(schema, &d.directives, L::Scalar, errors),
        TypeDefinition::Object(d) => {
            check_directives(schema, &d.directives, L::Object, errors);
            check_field_directives(schema, &d.fields, errors);
        }
        TypeDefinition::Interface(d) => {
            check_directives(schema, &d.directives, L::Interface, errors);
            check_field_directives(schema, &d.fields, errors);
        }
        TypeDefinition::Union(d) => check_directives(schema, &d.directives, L::Union, errors),
        TypeDefinition::Enum(d) => {
            check_directives(schema, &d.directives, L::Enum, errors);
            for v in &d.values {
                check_directives(schema, &v.directives, L::EnumValue, errors);
            }
        }
        TypeDefinition::InputObject(d) => {
            check_directives(schema, &d.directives, L::InputObject, errors);
            for f in &d.fields {
                check_directives(schema, &f.directives, L::InputFieldDefinition, errors);
            }
        }
    }
}

fn check_type_extension_directives<S: ScalarValue>(
    schema: &SchemaType<S>,
    te: &TypeExtension<S>,
    errors: &mut Vec<RuleError>,
) {
    use DirectiveLocation as L;

    match te {
        TypeExtension::Scalar(e) => check_directives(schema, &e.directives, L::Scalar, errors),
        TypeExtension::Object(e) => {
            check_directives(schema, &e.directives, L::Object, errors);
            check_field_directives(schema, &e.fields, errors);
        }
        TypeExtension::Interface(e) => {
            check_directives(schema, &e.directives, L::Interface, errors);
            check_field_directives(schema, &e.fields, errors);
        }
        TypeExtension::Union(e) => check_directives(schema, &e.directives, L::Union, errors),
        TypeExtension::Enum(e) => {
            check_directives(schema, &e.directives, L::Enum, errors);
            for v in &e.values {
                check_directives(schema, &v.directives, L::EnumValue, errors);
            }
        }
        TypeExtension::InputObject(e) => {
            check_directives(schema, &e.directives, L::InputObject, errors);
            for f in &e.fields {
                check_directives(schema, &f.directives, L::InputFieldDefinition, errors);
            }
        }
    }
}

fn check_field_directives<S: ScalarValue>(
    schema: &SchemaType<S>,
    fields: &[crate::ast::FieldDefinition<S>],
    errors: &mut Vec<RuleError>,
) {
    for f in fields {
        check_directives(
            schema,
            &f.directives,
            DirectiveLocation::FieldDefinition,
            errors,
        );
        check_argument_directives(schema, &f.arguments, errors);
    }
}

fn check_argument_directives<S: ScalarValue>(
    schema: &SchemaType<S>,
    arguments: &[InputValueDefinition<S>],
    errors: &mut Vec<RuleError>,
) {
    for a in arguments {
        check_directives(
            schema,
            &a.directives,
            DirectiveLocation::ArgumentDefinition,
            errors,
        );
    }
}

fn check_directives<S: ScalarValue>(
    schema: &SchemaType<S>,
    directives: &[Spanning<Directive<S>>],
    location: DirectiveLocation,
    errors: &mut Vec<RuleError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();

    for d in directives {
        let name = d.item.name.item.as_str();
        match schema.directive_by_name(name) {
            None => errors.push(RuleError::new(
                &format!("Unknown directive \"@{name}\""),
                &[d.span.start],
            )),
            Some(dt) => {
                if !dt.locations.contains(&location) {
                    errors.push(RuleError::new(
                        &format!("Directive \"@{name}\" may not be used on {location}"),
                        &[d.span.start],
                    ));
                }
                if !dt.is_repeatable && !seen.insert(name) {
                    errors.push(RuleError::new(
                        &format!("The directive \"@{name}\" can only be used once at this location"),
                        &[d.span.start],
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{
            Definition, Document, EnumTypeDefinition, EnumValueDefinition, Name, TypeDefinition,
        },
        parser::Spanning,
        schema::builder::{build_schema, SchemaError},
        schema::translate::parse_schema_document,
        validation::RuleError,
        value::DefaultScalarValue,
    };

    fn build_errors(sdl: &str) -> Vec<RuleError> {
        let document = parse_schema_document::<DefaultScalarValue>(sdl).expect("SDL should parse");
        match build_schema(&document) {
            Err(SchemaError::Validation(errors)) => errors,
            Err(other) => panic!("expected validation errors, got: {other}"),
            Ok(_) => vec![],
        }
    }

    fn assert_error(sdl: &str, expected: &str) {
        let errors = build_errors(sdl);
        assert!(
            errors.iter().any(|e| e.message().contains(expected)),
            "expected an error containing {expected:?}, got: {errors:#?}",
        );
    }

    #[test]
    fn interface_argument_types_are_invariant() {
        assert_error(
            "interface I { f(x: Int!): Int } type Query implements I { f(x: Int): Int }",
            r#"Interface field argument "I.f(x:)" expects type "Int!" but "Query.f(x:)" is type "Int""#,
        );
    }

    #[test]
    fn extra_implementation_arguments_must_not_be_required() {
        assert_error(
            "interface I { f(x: Int!): Int } type Query implements I { f(x: Int!, y: Int!): Int }",
            r#"Argument "Query.f(y:)" must not be required type "Int!" if not provided by the interface field "I.f""#,
        );
    }

    #[test]
    fn extra_arguments_may_be_nullable_or_defaulted() {
        let errors = build_errors(
            "interface I { f(x: Int!): Int } \
             type Query implements I { f(x: Int!, y: Int, z: Int! = 3): Int }",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn interface_fields_must_be_provided() {
        assert_error(
            "interface I { f: Int g: Int } type Query implements I { f: Int }",
            r#"Interface field "I.g" expected but "Query" does not provide it"#,
        );
    }

    #[test]
    fn implementation_field_types_are_covariant() {
        // Non-null narrowing and abstract-member narrowing are both fine.
        let errors = build_errors(
            "interface Node { id: ID self: Node } \
             type Query implements Node { id: ID! self: Query }",
        );
        assert_eq!(errors, vec![]);

        assert_error(
            "interface I { f: Int } type Query implements I { f: String }",
            r#"Interface field "I.f" expects type "Int" but "Query.f" is type "String""#,
        );
    }

    #[test]
    fn list_covariance_unwraps_elementwise() {
        let errors = build_errors(
            "interface I { xs: [Int] } type Query implements I { xs: [Int!]! }",
        );
        assert_eq!(errors, vec![]);

        assert_error(
            "interface I { xs: [Int!] } type Query implements I { xs: [Int] }",
            r#"Interface field "I.xs" expects type "[Int!]""#,
        );
    }

    #[test]
    fn transitive_interfaces_must_be_declared() {
        assert_error(
            "interface A { x: Int } \
             interface B implements A { x: Int } \
             type Query implements B { x: Int }",
            r#"Type "Query" must implement "A" because it is implemented by "B""#,
        );
    }

    #[test]
    fn only_interfaces_can_be_implemented() {
        assert_error(
            "type Other { a: Int } type Query implements Other { a: Int }",
            r#"Type "Query" must only implement Interface types"#,
        );
    }

    #[test]
    fn root_operation_types_must_be_objects() {
        assert_error(
            "schema { query: Q } enum Q { A }",
            r#"Query root type must be Object type, it cannot be "Q""#,
        );
    }

    #[test]
    fn union_members_must_be_objects() {
        assert_error(
            "enum E { A } union U = E type Query { u: U }",
            r#"Union type "U" can only include Object types"#,
        );
    }

    #[test]
    fn enum_values_cannot_shadow_literals() {
        // `true` is lexically a valid name, so this cannot come from the
        // parser; assemble the definition by hand.
        let document: Document = vec![Definition::Type(Spanning::unlocated(
            TypeDefinition::Enum(EnumTypeDefinition {
                description: None,
                name: Spanning::unlocated("Flag".parse::<Name>().unwrap()),
                directives: vec![],
                values: vec![EnumValueDefinition {
                    description: None,
                    name: Spanning::unlocated("true".parse::<Name>().unwrap()),
                    directives: vec![],
                }],
            }),
        ))];

        match build_schema(&document) {
            Err(SchemaError::Validation(errors)) => assert!(errors
                .iter()
                .any(|e| e.message().contains(r#"Enum type "Flag" cannot include value: true"#))),
            other => panic!("expected validation errors, got: {other:?}"),
        }
    }

    #[test]
    fn non_null_input_cycles_are_rejected() {
        assert_error(
            "input A { b: B! } input B { a: A! } type Query { f(a: A): Int }",
            r#"Cannot reference Input Object"#,
        );
        assert_error(
            "input A { a: A! } type Query { f(a: A): Int }",
            r#"Cannot reference Input Object "A" within itself"#,
        );
    }

    #[test]
    fn nullable_and_list_references_break_input_cycles() {
        let errors = build_errors(
            "input A { b: B } input B { a: [A!]! } type Query { f(a: A): Int }",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn one_of_fields_must_be_plain_nullable() {
        assert_error(
            "input C @oneOf { a: Int! } type Query { f(c: C): Int }",
            r#"OneOf input object field "C.a" must be nullable"#,
        );
        assert_error(
            "input C @oneOf { a: Int = 3 } type Query { f(c: C): Int }",
            r#"OneOf input object field "C.a" cannot have a default value"#,
        );
    }

    #[test]
    fn unknown_directives_are_structural_errors() {
        assert_error("type Query { a: Int @nope }", r#"Unknown directive "@nope""#);
    }

    #[test]
    fn directives_must_be_legal_at_their_location() {
        assert_error(
            "type Query @deprecated { a: Int }",
            r#"Directive "@deprecated" may not be used on OBJECT"#,
        );
    }

    #[test]
    fn non_repeatable_directives_cannot_repeat() {
        assert_error(
            r#"type Query { a: Int @deprecated(reason: "x") @deprecated(reason: "y") }"#,
            r#"The directive "@deprecated" can only be used once at this location"#,
        );
    }
}
