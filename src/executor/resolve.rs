//! The value-resolution engine.
//!
//! Selection sets resolve to [`Value`]s by collecting fields, invoking
//! resolvers (concurrently for queries, serially for mutation and
//! subscription roots) and completing each resolved value against its
//! declared type. Field errors
//! land in a shared sink together with their source location and response
//! path; `null` bubbles past non-`null` positions without reporting twice.

use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use fnv::FnvHashMap;
use futures::future::{self, BoxFuture};
use indexmap::IndexMap;
use tracing::trace;

use crate::{
    ast::{Directive as AstDirective, Field as AstField, Fragment, InputValue, OperationType, Selection},
    executor::{
        ExecutionContext, ExecutionError, ExecutionOutput, ExecutionStrategy, FieldError,
        FieldResult, PathSegment, Variables,
    },
    parser::{SourcePosition, Spanning},
    resolve::{default_resolve, Arguments, ResolveInfo},
    schema::{
        meta::{Field as MetaField, MetaType},
        model::{SchemaType, TypeType},
    },
    value::{Object, ScalarValue, Value},
};

/// Marker for a `null` that must propagate past the current position
/// because a non-`null` constraint failed beneath it. The causing error is
/// already in the sink when this surfaces.
pub(crate) struct Nulled;

pub(crate) struct Executor<'e, S> {
    ctx: &'e ExecutionContext<'e, S>,
    errors: &'e RwLock<Vec<ExecutionError<S>>>,
    field_path: Arc<FieldPath>,
}

enum FieldPath {
    Root,
    Field(String, Arc<FieldPath>),
    Index(usize, Arc<FieldPath>),
}

impl FieldPath {
    fn construct_path(&self, acc: &mut Vec<PathSegment>) {
        match self {
            FieldPath::Root => (),
            FieldPath::Field(name, parent) => {
                parent.construct_path(acc);
                acc.push(PathSegment::Field(name.clone()));
            }
            FieldPath::Index(i, parent) => {
                parent.construct_path(acc);
                acc.push(PathSegment::Index(*i));
            }
        }
    }
}

impl<'e, S> Clone for Executor<'e, S> {
    fn clone(&self) -> Self {
        Executor {
            ctx: self.ctx,
            errors: self.errors,
            field_path: Arc::clone(&self.field_path),
        }
    }
}

impl<'e, S: ScalarValue> Executor<'e, S> {
    fn field_sub_executor(&self, response_key: &str) -> Executor<'e, S> {
        Executor {
            ctx: self.ctx,
            errors: self.errors,
            field_path: Arc::new(FieldPath::Field(
                response_key.into(),
                Arc::clone(&self.field_path),
            )),
        }
    }

    fn index_sub_executor(&self, index: usize) -> Executor<'e, S> {
        Executor {
            ctx: self.ctx,
            errors: self.errors,
            field_path: Arc::new(FieldPath::Index(index, Arc::clone(&self.field_path))),
        }
    }

    fn push_error_at(&self, error: FieldError<S>, location: SourcePosition) {
        let mut path = Vec::new();
        self.field_path.construct_path(&mut path);

        let mut errors = self.errors.write().unwrap();
        errors.push(ExecutionError::new(location, path, error));
    }

    /// Records a failed field and decides how the `null` spreads: a
    /// nullable field swallows it, a non-`null` one pushes it to the
    /// enclosing object.
    fn handle_field_error(
        &self,
        error: FieldError<S>,
        location: SourcePosition,
        non_null: bool,
    ) -> Option<Value<S>> {
        self.push_error_at(error, location);
        if non_null {
            None
        } else {
            Some(Value::Null)
        }
    }
}

/// Executes the context's operation to completion.
pub(crate) async fn execute_context<S: ScalarValue>(
    ctx: &ExecutionContext<'_, S>,
) -> ExecutionOutput<S> {
    let op = ctx.operation();
    let root_meta = match op.item.operation_type {
        OperationType::Query => ctx.schema().query_type(),
        OperationType::Mutation => ctx.schema().mutation_type(),
        OperationType::Subscription => ctx.schema().subscription_type(),
    };
    let Some(root_meta) = root_meta else {
        return ExecutionOutput::from_error(ExecutionError::at_origin(FieldError::from(format!(
            "Schema is not configured to execute {} operation",
            op.item.operation_type,
        ))));
    };

    let errors = RwLock::new(Vec::new());
    let executor = Executor {
        ctx,
        errors: &errors,
        field_path: Arc::new(FieldPath::Root),
    };
    let serial = ctx.strategy() == ExecutionStrategy::Serial;

    let data = match execute_selection_set(
        executor,
        root_meta,
        ctx.root_value().clone(),
        vec![&op.item.selection_set[..]],
        serial,
    )
    .await
    {
        Ok(v) => v,
        Err(Nulled) => Value::Null,
    };

    let mut errors = errors.into_inner().unwrap();
    errors.sort();

    ExecutionOutput { data, errors }
}

fn execute_selection_set<'e, S: ScalarValue>(
    executor: Executor<'e, S>,
    object: &'e MetaType<S>,
    parent: Value<S>,
    selection_sets: Vec<&'e [Selection<S>]>,
    serial: bool,
) -> BoxFuture<'e, Result<Value<S>, Nulled>> {
    Box::pin(async move {
        let grouped = collect_fields(
            executor.ctx.schema,
            object,
            &selection_sets,
            &executor.ctx.variables,
            &executor.ctx.fragments,
        );

        let mut object_value = Object::with_capacity(grouped.len());

        if serial {
            for (key, nodes) in &grouped {
                match resolve_field(&executor, object, &parent, key, nodes).await {
                    Some(v) => {
                        object_value.add_field(*key, v);
                    }
                    None => return Err(Nulled),
                }
            }
        } else {
            let fields = grouped.iter().map(|(key, nodes)| {
                let executor = &executor;
                let parent = &parent;
                async move { (*key, resolve_field(executor, object, parent, key, nodes).await) }
            });
            for (key, resolved) in future::join_all(fields).await {
                match resolved {
                    Some(v) => {
                        object_value.add_field(key, v);
                    }
                    None => return Err(Nulled),
                }
            }
        }

        Ok(Value::Object(object_value))
    })
}

fn resolve_field<'e, 'p, S: ScalarValue>(
    executor: &'p Executor<'e, S>,
    object: &'e MetaType<S>,
    parent: &'p Value<S>,
    response_key: &'e str,
    nodes: &'p [&'e Spanning<AstField<S>>],
) -> BoxFuture<'p, Option<Value<S>>>
where
    'e: 'p,
{
    Box::pin(async move {
        let first = nodes[0];
        let field_name = first.item.name.item.as_str();
        let pos = first.span.start;

        if field_name == "__typename" {
            return Some(Value::scalar(object.name().to_string()));
        }

        let sub_executor = executor.field_sub_executor(response_key);

        let Some(meta_field) = object.field_by_name(field_name) else {
            return sub_executor.handle_field_error(
                FieldError::from(format!(
                    "Unknown field \"{field_name}\" on type \"{}\"",
                    object.name(),
                )),
                pos,
                false,
            );
        };
        let non_null = meta_field.field_type.is_non_null();

        let arguments = match coerce_argument_values(
            executor.ctx.schema,
            meta_field,
            first,
            &executor.ctx.variables,
        ) {
            Ok(args) => args,
            Err(e) => return sub_executor.handle_field_error(e, pos, non_null),
        };

        trace!(field = field_name, "resolving field");

        let resolved = match meta_field.resolver {
            Some(ref resolver) => {
                resolver
                    .resolve_field(ResolveInfo {
                        field_name,
                        parent,
                        arguments: &arguments,
                        context: executor.ctx.context,
                    })
                    .await
            }
            None => Ok(default_resolve(parent, field_name)),
        };

        let value = match resolved {
            Ok(v) => v,
            Err(e) => return sub_executor.handle_field_error(e, pos, non_null),
        };

        let sub_selections: Vec<&'e [Selection<S>]> = nodes
            .iter()
            .filter_map(|n| n.item.selection_set.as_deref())
            .collect();

        let ty = executor.ctx.schema.make_type(&meta_field.field_type);
        match complete_value(&sub_executor, &ty, value, &sub_selections, pos).await {
            Ok(v) => Some(v),
            Err(Nulled) => {
                if non_null {
                    None
                } else {
                    Some(Value::Null)
                }
            }
        }
    })
}

fn complete_value<'e, 'p, S: ScalarValue>(
    executor: &'p Executor<'e, S>,
    ty: &'p TypeType<'e, S>,
    value: Value<S>,
    sub_selections: &'p [&'e [Selection<S>]],
    pos: SourcePosition,
) -> BoxFuture<'p, Result<Value<S>, Nulled>>
where
    'e: 'p,
{
    Box::pin(async move {
        match ty {
            TypeType::NonNull(inner) => {
                let v = complete_value(executor, inner, value, sub_selections, pos).await?;
                if v.is_null() {
                    executor.push_error_at(
                        FieldError::from("Cannot return null for non-nullable field"),
                        pos,
                    );
                    Err(Nulled)
                } else {
                    Ok(v)
                }
            }

            TypeType::List(inner) => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let Value::List(items) = value else {
                    executor.push_error_at(
                        FieldError::from("Expected a list value for a list type"),
                        pos,
                    );
                    return Err(Nulled);
                };
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let item_executor = executor.index_sub_executor(i);
                    match complete_value(&item_executor, inner, item, sub_selections, pos).await {
                        Ok(v) => out.push(v),
                        Err(Nulled) => {
                            if inner.is_non_null() {
                                return Err(Nulled);
                            }
                            out.push(Value::Null);
                        }
                    }
                }
                Ok(Value::List(out))
            }

            TypeType::Concrete(meta) => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                match meta {
                    MetaType::Scalar(sm) => match (sm.serialize_fn)(&value) {
                        Ok(v) => Ok(v),
                        Err(e) => {
                            executor.push_error_at(e, pos);
                            Err(Nulled)
                        }
                    },

                    // Enums are carried as their value names.
                    MetaType::Enum(em) => match value.as_string_value() {
                        Some(name) if em.value_by_name(name).is_some() => {
                            Ok(Value::scalar(name.to_owned()))
                        }
                        _ => {
                            executor.push_error_at(
                                FieldError::from(format!(
                                    "Enum \"{}\" cannot represent value: {value}",
                                    em.name,
                                )),
                                pos,
                            );
                            Err(Nulled)
                        }
                    },

                    MetaType::Object(_) => {
                        execute_selection_set(
                            executor.clone(),
                            meta,
                            value,
                            sub_selections.to_vec(),
                            false,
                        )
                        .await
                    }

                    MetaType::Interface(_) | MetaType::Union(_) => {
                        let concrete = resolve_runtime_type(executor, meta, &value, pos).await?;
                        execute_selection_set(
                            executor.clone(),
                            concrete,
                            value,
                            sub_selections.to_vec(),
                            false,
                        )
                        .await
                    }

                    MetaType::InputObject(io) => {
                        executor.push_error_at(
                            FieldError::from(format!(
                                "Input object \"{}\" cannot be resolved as an output type",
                                io.name,
                            )),
                            pos,
                        );
                        Err(Nulled)
                    }
                }
            }
        }
    })
}

/// Discriminates the concrete object type an abstract-typed value belongs
/// to: the attached `resolveType` callback first, then every possible
/// type's `isTypeOf` predicate, then a `__typename` entry of the value
/// itself.
async fn resolve_runtime_type<'e, 'p, S: ScalarValue>(
    executor: &'p Executor<'e, S>,
    abstract_meta: &'e MetaType<S>,
    value: &'p Value<S>,
    pos: SourcePosition,
) -> Result<&'e MetaType<S>, Nulled>
where
    'e: 'p,
{
    let resolver = match abstract_meta {
        MetaType::Interface(i) => i.resolve_type.clone(),
        MetaType::Union(u) => u.resolve_type.clone(),
        _ => None,
    };

    let type_name: Option<String> = match resolver {
        Some(r) => match r.resolve_abstract_type(value, executor.ctx.context).await {
            Ok(name) => Some(name.to_string()),
            Err(e) => {
                executor.push_error_at(e, pos);
                return Err(Nulled);
            }
        },
        None => {
            let mut found = None;
            for possible in executor.ctx.schema.possible_types(abstract_meta) {
                if let MetaType::Object(o) = possible {
                    if let Some(ref predicate) = o.is_type_of {
                        if predicate.is_type_of(value, executor.ctx.context) {
                            found = Some(o.name.to_string());
                            break;
                        }
                    }
                }
            }
            found.or_else(|| {
                value
                    .as_object_value()
                    .and_then(|o| o.get_field_value("__typename"))
                    .and_then(Value::as_string_value)
                    .map(str::to_owned)
            })
        }
    };

    let Some(type_name) = type_name else {
        executor.push_error_at(
            FieldError::from(format!(
                "Abstract type \"{}\" must resolve to an Object type at runtime",
                abstract_meta.name(),
            )),
            pos,
        );
        return Err(Nulled);
    };

    match executor.ctx.schema.concrete_type_by_name(&type_name) {
        Some(m @ MetaType::Object(_)) if executor.ctx.schema.is_possible_type(abstract_meta, m) => {
            Ok(m)
        }
        _ => {
            executor.push_error_at(
                FieldError::from(format!(
                    "Abstract type \"{}\" was resolved to a type \"{type_name}\" that does not \
                     exist inside the schema or is not its possible type",
                    abstract_meta.name(),
                )),
                pos,
            );
            Err(Nulled)
        }
    }
}

/// Collects the fields of `selection_sets` into an ordered map of response
/// key to the field nodes sharing it, honoring `@skip`/`@include`,
/// fragment spreads and inline fragments against the current runtime type.
pub(crate) fn collect_fields<'e, S: ScalarValue>(
    schema: &'e SchemaType<S>,
    object: &'e MetaType<S>,
    selection_sets: &[&'e [Selection<S>]],
    variables: &Variables<S>,
    fragments: &FnvHashMap<&'e str, &'e Fragment<S>>,
) -> IndexMap<&'e str, Vec<&'e Spanning<AstField<S>>>> {
    let mut grouped = IndexMap::new();
    let mut visited = HashSet::new();
    for set in selection_sets {
        collect_into(
            schema,
            object,
            set,
            variables,
            fragments,
            &mut visited,
            &mut grouped,
        );
    }
    grouped
}

fn collect_into<'e, S: ScalarValue>(
    schema: &'e SchemaType<S>,
    object: &'e MetaType<S>,
    selection_set: &'e [Selection<S>],
    variables: &Variables<S>,
    fragments: &FnvHashMap<&'e str, &'e Fragment<S>>,
    visited: &mut HashSet<&'e str>,
    grouped: &mut IndexMap<&'e str, Vec<&'e Spanning<AstField<S>>>>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(f) => {
                if is_excluded(&f.item.directives, variables) {
                    continue;
                }
                grouped
                    .entry(f.item.response_name())
                    .or_default()
                    .push(f);
            }
            Selection::FragmentSpread(spread) => {
                if is_excluded(&spread.item.directives, variables) {
                    continue;
                }
                let name = spread.item.name.item.as_str();
                if !visited.insert(name) {
                    continue;
                }
                let Some(fragment) = fragments.get(name) else {
                    continue;
                };
                if type_condition_applies(schema, object, &fragment.type_condition.item) {
                    collect_into(
                        schema,
                        object,
                        &fragment.selection_set,
                        variables,
                        fragments,
                        visited,
                        grouped,
                    );
                }
            }
            Selection::InlineFragment(inline) => {
                if is_excluded(&inline.item.directives, variables) {
                    continue;
                }
                let applies = inline
                    .item
                    .type_condition
                    .as_ref()
                    .map_or(true, |c| type_condition_applies(schema, object, &c.item));
                if applies {
                    collect_into(
                        schema,
                        object,
                        &inline.item.selection_set,
                        variables,
                        fragments,
                        visited,
                        grouped,
                    );
                }
            }
        }
    }
}

fn type_condition_applies<S: ScalarValue>(
    schema: &SchemaType<S>,
    object: &MetaType<S>,
    condition: &str,
) -> bool {
    if *object.name() == *condition {
        return true;
    }
    match schema.concrete_type_by_name(condition) {
        Some(cond) if cond.is_abstract() => {
            schema.is_possible_type(cond, object)
                || object
                    .interface_names()
                    .is_some_and(|ns| ns.iter().any(|n| *n == *condition))
        }
        _ => false,
    }
}

/// Whether a `@skip`/`@include` directive excludes the selection under the
/// current variable values.
fn is_excluded<S: ScalarValue>(
    directives: &Option<Vec<Spanning<AstDirective<S>>>>,
    variables: &Variables<S>,
) -> bool {
    if let Some(directives) = directives {
        for directive in directives {
            let condition = directive
                .item
                .arguments
                .as_ref()
                .and_then(|args| args.item.get("if"))
                .and_then(|v| v.item.clone().into_const(variables))
                .and_then(|v| v.as_boolean_value())
                .unwrap_or(false);

            if (directive.item.name.item == "skip" && condition)
                || (directive.item.name.item == "include" && !condition)
            {
                return true;
            }
        }
    }
    false
}

/// Coerces the argument values of one field node against the field's
/// declared arguments, resolving variables and applying defaults.
pub(crate) fn coerce_argument_values<S: ScalarValue>(
    schema: &SchemaType<S>,
    meta_field: &MetaField<S>,
    field: &Spanning<AstField<S>>,
    variables: &Variables<S>,
) -> FieldResult<Arguments<S>, S> {
    let mut args = IndexMap::new();

    if let Some(ref input_args) = field.item.arguments {
        for (name, value) in input_args.item.iter() {
            let Some(meta_arg) = meta_field.argument_by_name(&name.item) else {
                return Err(FieldError::from(format!(
                    "Unknown argument \"{}\" on field \"{}\"",
                    name.item, meta_field.name,
                )));
            };

            // A variable with no value leaves the argument absent, so its
            // default can still apply.
            let Some(resolved) = value.item.clone().into_const(variables) else {
                continue;
            };

            let ct = schema.make_type(&meta_arg.arg_type);
            if let Some(message) = validate_literal_value(schema, &ct, &resolved) {
                return Err(FieldError::from(message));
            }

            args.insert(name.item.clone(), resolved);
        }
    }

    for meta_arg in &meta_field.arguments {
        let missing = args
            .get(meta_arg.name.as_str())
            .map_or(true, InputValue::is_null);
        if missing && meta_arg.arg_type.is_non_null() && meta_arg.default_value.is_none() {
            return Err(FieldError::from(format!(
                "Argument \"{}\" of required type \"{}\" was not provided",
                meta_arg.name, meta_arg.arg_type,
            )));
        }
    }

    Ok(Arguments::new(args, &meta_field.arguments))
}

/// Returns an error string if the literal value does not fit the type.
fn validate_literal_value<S: ScalarValue>(
    schema: &SchemaType<S>,
    arg_type: &TypeType<S>,
    arg_value: &InputValue<S>,
) -> Option<String> {
    match arg_type {
        TypeType::NonNull(inner) => {
            if arg_value.is_null() {
                Some(format!("Type \"{arg_type}\" is not nullable"))
            } else {
                validate_literal_value(schema, inner, arg_value)
            }
        }

        TypeType::List(inner) => match arg_value {
            InputValue::Null | InputValue::Variable(_) => None,
            InputValue::List(items) => items
                .iter()
                .find_map(|i| validate_literal_value(schema, inner, &i.item)),
            // A single value coerces into a one-element list.
            v => validate_literal_value(schema, inner, v),
        },

        TypeType::Concrete(t) => {
            if arg_value.is_null() || arg_value.is_variable() {
                return None;
            }

            match t {
                MetaType::Scalar(sm) => match arg_value {
                    InputValue::List(_) => Some(format!(r#"Expected "{}", found list"#, sm.name)),
                    InputValue::Object(_) => {
                        Some(format!(r#"Expected "{}", found object"#, sm.name))
                    }
                    v => (sm.parse_literal_fn)(v).err().map(|e| {
                        format!(
                            r#"Invalid value for scalar "{}": {}"#,
                            sm.name,
                            e.message(),
                        )
                    }),
                },

                // Strings can be parsed into enums out-of-band, but they
                // are not valid as enum _literals_.
                MetaType::Enum(em) => match arg_value {
                    InputValue::Enum(name) => em
                        .value_by_name(name)
                        .is_none()
                        .then(|| format!(r#"Invalid value "{name}" for enum "{}""#, em.name)),
                    v => Some(format!(r#"Invalid value "{v}" for enum "{}""#, em.name)),
                },

                MetaType::InputObject(iom) => {
                    let Some(obj) = arg_value.to_object_value() else {
                        return Some(format!(r#""{}" is not an input object"#, iom.name));
                    };

                    let mut remaining_required = iom
                        .input_fields
                        .iter()
                        .filter(|f| f.arg_type.is_non_null() && f.default_value.is_none())
                        .map(|f| f.name.to_string())
                        .collect::<HashSet<_>>();

                    for (key, value) in &obj {
                        remaining_required.remove(*key);
                        let Some(field) = iom.input_fields.iter().find(|f| f.name == **key) else {
                            return Some(format!(
                                r#"Field "{key}" does not exist on type "{}""#,
                                iom.name,
                            ));
                        };
                        let ct = schema.make_type(&field.arg_type);
                        if let Some(message) = validate_literal_value(schema, &ct, value) {
                            return Some(format!(
                                r#"Error on "{}" field "{key}": {message}"#,
                                iom.name,
                            ));
                        }
                    }

                    if iom.is_one_of {
                        let provided = obj.iter().filter(|(_, v)| !v.is_null()).count();
                        if provided != 1 || obj.len() != 1 {
                            return Some(format!(
                                r#"OneOf input object "{}" must specify exactly one non-null key"#,
                                iom.name,
                            ));
                        }
                    }

                    if remaining_required.is_empty() {
                        None
                    } else {
                        let mut missing = remaining_required
                            .into_iter()
                            .map(|s| format!("\"{s}\""))
                            .collect::<Vec<_>>();
                        missing.sort();
                        Some(format!(
                            r#""{}" is missing fields: {}"#,
                            iom.name,
                            missing.join(", "),
                        ))
                    }
                }

                t => Some(format!(r#""{}" is not an input type"#, t.name())),
            }
        }
    }
}
