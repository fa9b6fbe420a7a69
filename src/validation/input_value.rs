use std::{collections::HashSet, fmt};

use crate::{
    ast::{InputValue, Operation, VariableDefinitions},
    executor::Variables,
    parser::{SourcePosition, Spanning},
    schema::{
        meta::{EnumMeta, InputObjectMeta, MetaType, ScalarMeta},
        model::{SchemaType, TypeType},
    },
    validation::RuleError,
    value::ScalarValue,
};

#[derive(Debug)]
enum Path<'a> {
    Root,
    ArrayElement(usize, &'a Path<'a>),
    ObjectField(&'a str, &'a Path<'a>),
}

/// Validates the provided variable `values` against the operation's
/// variable definitions and produces the coerced variable map, with
/// defaults applied.
pub(crate) fn coerce_variable_values<S>(
    schema: &SchemaType<S>,
    operation: &Spanning<Operation<S>>,
    values: &Variables<S>,
) -> Result<Variables<S>, Vec<RuleError>>
where
    S: ScalarValue,
{
    let mut errors = vec![];
    let mut coerced = Variables::new();

    if let Some(ref vars) = operation.item.variable_definitions {
        coerce_var_defs(schema, &vars.item, values, &mut coerced, &mut errors);
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        errors.sort();
        Err(errors)
    }
}

fn coerce_var_defs<S>(
    schema: &SchemaType<S>,
    var_defs: &VariableDefinitions<S>,
    values: &Variables<S>,
    coerced: &mut Variables<S>,
    errors: &mut Vec<RuleError>,
) where
    S: ScalarValue,
{
    for (name, def) in var_defs.iter() {
        let raw_type_name = def.var_type.item.innermost_name();
        match schema.concrete_type_by_name(raw_type_name) {
            Some(t) if t.is_input() => {
                let ct = schema.make_type(&def.var_type.item);
                let value = values.get(&name.item);

                if value.is_none() {
                    if let Some(ref default) = def.default_value {
                        coerced.insert(name.item.clone(), default.item.clone());
                        continue;
                    }
                }

                if def.var_type.item.is_non_null() && is_absent_or_null(value) {
                    errors.push(RuleError::new(
                        &format!(
                            r#"Variable "${}" of required type "{}" was not provided."#,
                            name.item, def.var_type.item,
                        ),
                        &[name.span.start],
                    ));
                } else if let Some(v) = value {
                    let mut errs =
                        unify_value(&name.item, &name.span.start, v, &ct, schema, Path::Root);
                    if errs.is_empty() {
                        coerced.insert(name.item.clone(), v.clone());
                    } else {
                        errors.append(&mut errs);
                    }
                }
            }
            _ => errors.push(RuleError::new(
                &format!(
                    r#"Variable "${}" expected value of type "{}" which cannot be used as an input type."#,
                    name.item, def.var_type.item,
                ),
                &[def.var_type.span.start],
            )),
        }
    }
}

fn unify_value<'a, S>(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &InputValue<S>,
    meta_type: &TypeType<'a, S>,
    schema: &SchemaType<S>,
    path: Path<'a>,
) -> Vec<RuleError>
where
    S: ScalarValue,
{
    let mut errors: Vec<RuleError> = vec![];

    match meta_type {
        TypeType::NonNull(inner) => {
            if value.is_null() {
                errors.push(unification_error(
                    var_name,
                    var_pos,
                    &path,
                    format!(r#"Expected "{meta_type}", found null"#),
                ));
            } else {
                errors.append(&mut unify_value(
                    var_name, var_pos, value, inner, schema, path,
                ));
            }
        }

        TypeType::List(inner) => {
            if value.is_null() {
                return errors;
            }

            match value.to_list_value() {
                Some(l) => {
                    for (i, v) in l.iter().enumerate() {
                        errors.append(&mut unify_value(
                            var_name,
                            var_pos,
                            v,
                            inner,
                            schema,
                            Path::ArrayElement(i, &path),
                        ));
                    }
                }
                // A single value is coerced into a one-element list.
                _ => errors.append(&mut unify_value(
                    var_name, var_pos, value, inner, schema, path,
                )),
            }
        }

        TypeType::Concrete(mt) => {
            if value.is_null() {
                return errors;
            }

            match *mt {
                MetaType::Scalar(ref sm) => {
                    errors.append(&mut unify_scalar(var_name, var_pos, value, sm, &path))
                }
                MetaType::Enum(ref em) => {
                    errors.append(&mut unify_enum(var_name, var_pos, value, em, &path))
                }
                MetaType::InputObject(ref iom) => errors.append(&mut unify_input_object(
                    var_name, var_pos, value, iom, schema, &path,
                )),
                _ => errors.push(unification_error(
                    var_name,
                    var_pos,
                    &path,
                    format!(r#""{}" is not an input type"#, mt.name()),
                )),
            }
        }
    }
    errors
}

fn unify_scalar<S>(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &InputValue<S>,
    meta: &ScalarMeta<S>,
    path: &Path<'_>,
) -> Vec<RuleError>
where
    S: ScalarValue,
{
    match *value {
        InputValue::List(_) => {
            return vec![unification_error(
                var_name,
                var_pos,
                path,
                format!(r#"Expected "{}", found list"#, meta.name),
            )]
        }
        InputValue::Object(_) => {
            return vec![unification_error(
                var_name,
                var_pos,
                path,
                format!(r#"Expected "{}", found object"#, meta.name),
            )]
        }
        _ => {}
    }

    if let Err(e) = (meta.parse_value_fn)(value) {
        return vec![unification_error(
            var_name,
            var_pos,
            path,
            format!(
                "Expected input scalar \"{}\". Got: \"{value}\". Details: {}",
                meta.name,
                e.message(),
            ),
        )];
    }

    vec![]
}

fn unify_enum<S>(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &InputValue<S>,
    meta: &EnumMeta,
    path: &Path<'_>,
) -> Vec<RuleError>
where
    S: ScalarValue,
{
    match value {
        // Out-of-band variable values carry enum values as plain strings.
        InputValue::Scalar(scalar) if scalar.as_str().is_some() => {
            let name = scalar.as_str().unwrap_or_default();
            if meta.value_by_name(name).is_none() {
                return vec![unification_error(
                    var_name,
                    var_pos,
                    path,
                    format!(r#"Invalid value for enum "{}""#, meta.name),
                )];
            }
            vec![]
        }
        InputValue::Enum(name) => {
            if meta.value_by_name(name).is_none() {
                return vec![unification_error(
                    var_name,
                    var_pos,
                    path,
                    format!(r#"Invalid value for enum "{}""#, meta.name),
                )];
            }
            vec![]
        }
        _ => vec![unification_error(
            var_name,
            var_pos,
            path,
            format!(r#"Expected "{}", found not a string or enum"#, meta.name),
        )],
    }
}

fn unify_input_object<S>(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &InputValue<S>,
    meta: &InputObjectMeta<S>,
    schema: &SchemaType<S>,
    path: &Path<'_>,
) -> Vec<RuleError>
where
    S: ScalarValue,
{
    let mut errors: Vec<RuleError> = vec![];

    if let Some(ref obj) = value.to_object_value() {
        let mut keys = obj.iter().map(|(k, _)| *k).collect::<HashSet<&str>>();

        for input_field in &meta.input_fields {
            let mut has_value = false;
            keys.remove(input_field.name.as_str());

            if let Some((_, value)) = obj.iter().find(|(k, _)| *k == input_field.name.as_str()) {
                if !value.is_null() {
                    has_value = true;

                    errors.append(&mut unify_value(
                        var_name,
                        var_pos,
                        value,
                        &schema.make_type(&input_field.arg_type),
                        schema,
                        Path::ObjectField(&input_field.name, path),
                    ));
                }
            }

            if !has_value
                && input_field.arg_type.is_non_null()
                && input_field.default_value.is_none()
            {
                errors.push(unification_error(
                    var_name,
                    var_pos,
                    &Path::ObjectField(&input_field.name, path),
                    format!(r#"Expected "{}", found null"#, input_field.arg_type),
                ));
            }
        }

        for key in keys {
            errors.push(unification_error(
                var_name,
                var_pos,
                &Path::ObjectField(key, path),
                "Unknown field",
            ));
        }

        if meta.is_one_of && errors.is_empty() {
            let provided = obj.iter().filter(|(_, v)| !v.is_null()).count();
            if provided != 1 || obj.len() != 1 {
                errors.push(unification_error(
                    var_name,
                    var_pos,
                    path,
                    format!(
                        r#"OneOf input object "{}" must specify exactly one non-null key"#,
                        meta.name,
                    ),
                ));
            }
        }
    } else {
        errors.push(unification_error(
            var_name,
            var_pos,
            path,
            format!(r#"Expected "{}", found not an object"#, meta.name),
        ));
    }
    errors
}

fn is_absent_or_null<S>(v: Option<&InputValue<S>>) -> bool {
    v.map_or(true, InputValue::is_null)
}

fn unification_error(
    var_name: impl fmt::Display,
    var_pos: &SourcePosition,
    path: &Path<'_>,
    message: impl fmt::Display,
) -> RuleError {
    RuleError::new(
        &format!(r#"Variable "${var_name}" got invalid value. {path}{message}."#),
        &[*var_pos],
    )
}

impl<'a> fmt::Display for Path<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Path::Root => write!(f, ""),
            Path::ArrayElement(idx, prev) => write!(f, "{prev}In element #{idx}: "),
            Path::ObjectField(name, prev) => write!(f, r#"{prev}In field "{name}": "#),
        }
    }
}
