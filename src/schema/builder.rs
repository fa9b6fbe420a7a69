//! Lowering of a parsed document into a linked [`SchemaType`].
//!
//! One algorithm serves both entry points: [`build_schema`] lowers a
//! document into a fresh schema, [`extend_schema`] lowers the same way but
//! seeded from an existing schema. The input schema is never mutated;
//! extension copies every reachable type into the new type map, which
//! rewires all name references at once.

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ast::{
        Definition, DirectiveDefinition, Document, EnumValueDefinition, FieldDefinition,
        InputValueDefinition, Name, OperationType, SchemaDefinition, SchemaExtension,
        TypeDefinition, TypeExtension,
    },
    parser::{SourcePosition, Spanning},
    schema::{
        builtin,
        meta::{
            Argument, DeprecationStatus, EnumMeta, EnumValue, Field, InputObjectMeta,
            InterfaceMeta, MetaType, ObjectMeta, ScalarMeta, UnionMeta,
        },
        model::{DirectiveType, SchemaType},
        validate,
    },
    validation::RuleError,
    value::ScalarValue,
};

/// An error that halted schema construction, or the collected output of the
/// schema validator.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A named reference did not resolve to any type of the schema.
    #[error("Unknown type \"{name}\" (at {position})")]
    UnknownType {
        name: String,
        position: SourcePosition,
    },

    /// An `extend` clause targeted a name that no definition supplies.
    #[error("Cannot extend unknown type \"{name}\" (at {position})")]
    ExtendingUnknownType {
        name: String,
        position: SourcePosition,
    },

    /// More than one `schema { ... }` definition was present.
    #[error("Must provide only one schema definition (at {position})")]
    SchemaDefinitionConflict { position: SourcePosition },

    /// A type name was defined twice, or collided with an existing type.
    #[error("There can be only one type named \"{name}\" (at {position})")]
    DuplicateTypeName {
        name: String,
        position: SourcePosition,
    },

    /// A directive name was defined twice, or collided with an existing
    /// directive.
    #[error("There can be only one directive named \"@{name}\" (at {position})")]
    DuplicateDirectiveName {
        name: String,
        position: SourcePosition,
    },

    /// An `extend` clause of one kind targeted a type of another kind.
    #[error("Cannot extend non-matching kind of type \"{name}\" (at {position})")]
    ExtensionKindMismatch {
        name: String,
        position: SourcePosition,
    },

    /// A type reference occurred in a position its kind does not permit.
    #[error("The type of {context} must be {expected} type but got: \"{type_name}\" (at {position})")]
    InvalidTypeExpression {
        context: String,
        expected: &'static str,
        type_name: String,
        position: SourcePosition,
    },

    /// A default value was supplied for an argument whose type is not an
    /// input type.
    #[error(
        "Default value supplied for {context} whose type \"{type_name}\" is not an input type \
         (at {position})"
    )]
    NonInputDefault {
        context: String,
        type_name: String,
        position: SourcePosition,
    },

    /// The schema validator rejected the linked schema.
    #[error("Schema validation failed with {} error(s)", .0.len())]
    Validation(Vec<RuleError>),

    /// A resolver was attached to a field that does not exist.
    #[error("Field \"{type_name}.{field_name}\" does not exist in the schema")]
    UnknownField {
        type_name: String,
        field_name: String,
    },

    /// A callback was attached to a type of the wrong kind.
    #[error("Type \"{name}\" is not {expected} type of the schema")]
    WrongAttachmentKind { name: String, expected: &'static str },
}

impl SchemaError {
    pub(crate) fn unknown_field(type_name: &str, field_name: &str) -> Self {
        SchemaError::UnknownField {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }

    pub(crate) fn unknown_abstract_type(name: &str) -> Self {
        SchemaError::WrongAttachmentKind {
            name: name.into(),
            expected: "an abstract",
        }
    }

    pub(crate) fn unknown_object_type(name: &str) -> Self {
        SchemaError::WrongAttachmentKind {
            name: name.into(),
            expected: "an object",
        }
    }

    pub(crate) fn unknown_scalar_type(name: &str) -> Self {
        SchemaError::WrongAttachmentKind {
            name: name.into(),
            expected: "a scalar",
        }
    }

    /// The validation errors carried by this error, if it is the collecting
    /// kind.
    pub fn validation_errors(&self) -> Option<&[RuleError]> {
        match self {
            SchemaError::Validation(errs) => Some(errs),
            _ => None,
        }
    }
}

/// Builds a schema from a document of type-system definitions and validates
/// it.
///
/// Executable definitions in the document are ignored. An empty document
/// yields a valid schema containing exactly the built-in types and
/// directives.
pub fn build_schema<S: ScalarValue>(document: &Document<S>) -> Result<SchemaType<S>, SchemaError> {
    let (schema, diagnostics) = lower(None, document, false)?;
    finish(schema, document, diagnostics)
}

/// Builds a schema from a document without running the schema validator.
///
/// The returned schema carries the `assume_valid` flag.
pub fn build_schema_unchecked<S: ScalarValue>(
    document: &Document<S>,
) -> Result<SchemaType<S>, SchemaError> {
    lower(None, document, true).map(|(schema, _)| schema)
}

/// Produces a new schema from an existing schema plus a document of
/// additional definitions and `extend` clauses, and validates it.
///
/// The input schema is never mutated. A document contributing no
/// type-system definitions returns a structurally identical copy of the
/// input.
pub fn extend_schema<S: ScalarValue>(
    schema: &SchemaType<S>,
    document: &Document<S>,
) -> Result<SchemaType<S>, SchemaError> {
    let (extended, diagnostics) = lower(Some(schema), document, schema.assume_valid)?;
    if extended.assume_valid {
        return Ok(extended);
    }
    finish(extended, document, diagnostics)
}

/// [`extend_schema`], but skipping the schema validator.
pub fn extend_schema_unchecked<S: ScalarValue>(
    schema: &SchemaType<S>,
    document: &Document<S>,
) -> Result<SchemaType<S>, SchemaError> {
    lower(Some(schema), document, true).map(|(schema, _)| schema)
}

fn finish<S: ScalarValue>(
    schema: SchemaType<S>,
    document: &Document<S>,
    mut errors: Vec<RuleError>,
) -> Result<SchemaType<S>, SchemaError> {
    errors.extend(validate::validate_document_directives(document, &schema));
    errors.extend(validate::validate_schema(&schema));
    if errors.is_empty() {
        Ok(schema)
    } else {
        Err(SchemaError::Validation(errors))
    }
}

struct Buckets<'d, S> {
    type_defs: Vec<&'d Spanning<TypeDefinition<S>>>,
    type_exts: Vec<&'d Spanning<TypeExtension<S>>>,
    directive_defs: Vec<&'d Spanning<DirectiveDefinition<S>>>,
    schema_def: Option<&'d Spanning<SchemaDefinition<S>>>,
    schema_exts: Vec<&'d Spanning<SchemaExtension<S>>>,
}

impl<'d, S> Buckets<'d, S> {
    fn is_empty(&self) -> bool {
        self.type_defs.is_empty()
            && self.type_exts.is_empty()
            && self.directive_defs.is_empty()
            && self.schema_def.is_none()
            && self.schema_exts.is_empty()
    }
}

fn override_roots(
    ops: &[Spanning<crate::ast::RootOperationTypeDefinition>],
    roots: &mut FnvHashMap<&'static str, (Option<ArcStr>, Option<SourcePosition>)>,
) {
    for op in ops {
        let key = match op.item.operation {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        };
        roots.insert(
            key,
            (
                Some(op.item.type_name.item.as_arcstr().clone()),
                Some(op.item.type_name.span.start),
            ),
        );
    }
}

fn partition<S>(document: &Document<S>) -> Result<Buckets<'_, S>, SchemaError> {
    let mut buckets = Buckets {
        type_defs: vec![],
        type_exts: vec![],
        directive_defs: vec![],
        schema_def: None,
        schema_exts: vec![],
    };

    for def in document {
        match def {
            Definition::Type(d) => buckets.type_defs.push(d),
            Definition::TypeExtension(e) => buckets.type_exts.push(e),
            Definition::Directive(d) => buckets.directive_defs.push(d),
            Definition::Schema(sd) => {
                if buckets.schema_def.is_some() {
                    return Err(SchemaError::SchemaDefinitionConflict {
                        position: sd.span.start,
                    });
                }
                buckets.schema_def = Some(sd);
            }
            Definition::SchemaExtension(se) => buckets.schema_exts.push(se),
            // Executable definitions are the executor's business.
            Definition::Operation(_) | Definition::Fragment(_) => {}
        }
    }

    Ok(buckets)
}

pub(crate) fn lower<S: ScalarValue>(
    existing: Option<&SchemaType<S>>,
    document: &Document<S>,
    assume_valid: bool,
) -> Result<(SchemaType<S>, Vec<RuleError>), SchemaError> {
    let buckets = partition(document)?;

    if let Some(existing) = existing {
        if buckets.is_empty() {
            return Ok((existing.clone(), vec![]));
        }
    }

    debug!(
        types = buckets.type_defs.len(),
        extensions = buckets.type_exts.len(),
        directives = buckets.directive_defs.len(),
        extending = existing.is_some(),
        "lowering schema document",
    );

    let mut duplicates = vec![];

    // Seed the type map: built-ins always come first and are never replaced
    // by user types of the same name.
    let mut types: IndexMap<Name, MetaType<S>> = IndexMap::new();
    for meta in builtin::builtin_scalars::<S>()
        .into_iter()
        .chain(builtin::introspection_types::<S>())
    {
        types.insert(Name::unchecked(meta.name().clone()), meta);
    }
    if let Some(existing) = existing {
        for (name, meta) in &existing.types {
            if builtin::is_builtin_type_name(name.as_str()) {
                continue;
            }
            types.insert(name.clone(), meta.clone());
        }
    }
    for def in &buckets.type_defs {
        let name = def.item.name();
        if builtin::is_builtin_type_name(name.item.as_str()) {
            continue;
        }
        if types.contains_key(name.item.as_str()) {
            return Err(SchemaError::DuplicateTypeName {
                name: name.item.to_string(),
                position: name.span.start,
            });
        }
        let meta = lower_type_definition(&def.item, def.span.start, &mut duplicates);
        types.insert(name.item.clone(), meta);
    }

    // Fold extensions in, in document order. Unknown targets only fail
    // here, once every definition had its chance to introduce the name.
    for ext in &buckets.type_exts {
        let target = ext.item.target();
        match types.get_mut(target.item.as_str()) {
            Some(meta) => apply_extension(meta, ext, &mut duplicates)?,
            None => {
                return Err(SchemaError::ExtendingUnknownType {
                    name: target.item.to_string(),
                    position: ext.span.start,
                })
            }
        }
    }

    // Root operation types: existing roots first, overridden by the schema
    // definition, then by schema extensions in document order.
    let mut roots: FnvHashMap<&'static str, (Option<ArcStr>, Option<SourcePosition>)> =
        FnvHashMap::default();
    roots.insert(
        "query",
        (existing.and_then(|e| e.query_type_name.clone()), None),
    );
    roots.insert(
        "mutation",
        (existing.and_then(|e| e.mutation_type_name.clone()), None),
    );
    roots.insert(
        "subscription",
        (existing.and_then(|e| e.subscription_type_name.clone()), None),
    );

    if let Some(sd) = buckets.schema_def {
        override_roots(&sd.item.operation_types, &mut roots);
    }
    for se in &buckets.schema_exts {
        override_roots(&se.item.operation_types, &mut roots);
    }

    let no_roots_supplied = roots.values().all(|(name, _)| name.is_none());
    if buckets.schema_def.is_none() && buckets.schema_exts.is_empty() && no_roots_supplied {
        // No schema definition overrides the roots: fall back to the types
        // conventionally named after the operations, if they are objects.
        for key in ["query", "mutation", "subscription"] {
            let type_name = match key {
                "query" => "Query",
                "mutation" => "Mutation",
                _ => "Subscription",
            };
            if let Some(MetaType::Object(o)) = types.get(type_name) {
                roots.insert(key, (Some(o.name.clone()), None));
            }
        }
    }

    // Directives: existing ones are copied verbatim, new definitions
    // appended, built-ins supplied if absent.
    let mut directives: Vec<DirectiveType<S>> =
        existing.map(|e| e.directives.clone()).unwrap_or_default();
    for dd in &buckets.directive_defs {
        if directives.iter().any(|d| d.name == *dd.item.name.item.as_str()) {
            return Err(SchemaError::DuplicateDirectiveName {
                name: dd.item.name.item.to_string(),
                position: dd.item.name.span.start,
            });
        }
        directives.push(lower_directive_definition(&dd.item));
    }
    for b in builtin::builtin_directives::<S>() {
        if !directives.iter().any(|d| d.name == b.name) {
            directives.push(b);
        }
    }

    let description = buckets
        .schema_def
        .and_then(|sd| sd.item.description.as_deref().map(ArcStr::from))
        .or_else(|| existing.and_then(|e| e.description.clone()));

    let (query_type_name, query_pos) = roots.remove("query").expect("query root slot");
    let (mutation_type_name, mutation_pos) = roots.remove("mutation").expect("mutation root slot");
    let (subscription_type_name, subscription_pos) = roots.remove("subscription").expect("subscription root slot");

    let schema = SchemaType {
        description,
        types,
        query_type_name,
        mutation_type_name,
        subscription_type_name,
        directives,
        assume_valid,
    };

    link(
        &schema,
        &[
            (&schema.query_type_name, query_pos),
            (&schema.mutation_type_name, mutation_pos),
            (&schema.subscription_type_name, subscription_pos),
        ],
    )?;

    Ok((schema, duplicates))
}

/// Verifies that every named reference of the sealed schema resolves, and
/// resolves to a type legal for its position. The first failure halts the
/// build, as later steps would dereference the missing type.
fn link<S: ScalarValue>(
    schema: &SchemaType<S>,
    roots: &[(&Option<ArcStr>, Option<SourcePosition>)],
) -> Result<(), SchemaError> {
    for (root, pos) in roots {
        if let Some(name) = root {
            if schema.concrete_type_by_name(name).is_none() {
                return Err(SchemaError::UnknownType {
                    name: name.to_string(),
                    position: pos.unwrap_or_default(),
                });
            }
        }
    }

    for meta in schema.types.values() {
        match meta {
            MetaType::Object(o) => {
                check_fields(schema, &o.name, &o.fields)?;
                check_names_exist(schema, &o.interface_names, o.position)?;
            }
            MetaType::Interface(i) => {
                check_fields(schema, &i.name, &i.fields)?;
                check_names_exist(schema, &i.interface_names, i.position)?;
            }
            MetaType::Union(u) => check_names_exist(schema, &u.of_type_names, u.position)?,
            MetaType::InputObject(io) => {
                for f in &io.input_fields {
                    check_input_position(schema, format!("{}.{}", io.name, f.name), f)?;
                }
            }
            MetaType::Scalar(..) | MetaType::Enum(..) => {}
        }
    }

    for d in &schema.directives {
        for a in &d.arguments {
            check_input_position(schema, format!("@{}({}:)", d.name, a.name), a)?;
        }
    }

    Ok(())
}

fn check_fields<S: ScalarValue>(
    schema: &SchemaType<S>,
    type_name: &ArcStr,
    fields: &[Field<S>],
) -> Result<(), SchemaError> {
    for f in fields {
        let inner = f.field_type.innermost_name();
        let pos = f.position.unwrap_or_default();
        match schema.concrete_type_by_name(inner) {
            None => {
                return Err(SchemaError::UnknownType {
                    name: inner.into(),
                    position: pos,
                })
            }
            Some(t) if matches!(t, MetaType::InputObject(..)) => {
                return Err(SchemaError::InvalidTypeExpression {
                    context: format!("{type_name}.{}", f.name),
                    expected: "an output",
                    type_name: inner.into(),
                    position: pos,
                })
            }
            Some(_) => {}
        }
        for a in &f.arguments {
            check_input_position(schema, format!("{type_name}.{}({}:)", f.name, a.name), a)?;
        }
    }
    Ok(())
}

fn check_input_position<S: ScalarValue>(
    schema: &SchemaType<S>,
    context: String,
    arg: &Argument<S>,
) -> Result<(), SchemaError> {
    let inner = arg.arg_type.innermost_name();
    let pos = arg.position.unwrap_or_default();
    match schema.concrete_type_by_name(inner) {
        None => Err(SchemaError::UnknownType {
            name: inner.into(),
            position: pos,
        }),
        Some(t) if !t.is_input() => {
            if arg.default_value.is_some() {
                Err(SchemaError::NonInputDefault {
                    context,
                    type_name: inner.into(),
                    position: pos,
                })
            } else {
                Err(SchemaError::InvalidTypeExpression {
                    context,
                    expected: "an input",
                    type_name: inner.into(),
                    position: pos,
                })
            }
        }
        Some(_) => Ok(()),
    }
}

fn check_names_exist<S: ScalarValue>(
    schema: &SchemaType<S>,
    names: &[ArcStr],
    pos: Option<SourcePosition>,
) -> Result<(), SchemaError> {
    for name in names {
        if schema.concrete_type_by_name(name).is_none() {
            return Err(SchemaError::UnknownType {
                name: name.to_string(),
                position: pos.unwrap_or_default(),
            });
        }
    }
    Ok(())
}

fn lower_type_definition<S: ScalarValue>(
    def: &TypeDefinition<S>,
    pos: SourcePosition,
    duplicates: &mut Vec<RuleError>,
) -> MetaType<S> {
    match def {
        TypeDefinition::Scalar(d) => {
            let mut meta = ScalarMeta::new(d.name.item.as_arcstr().clone());
            meta.description = d.description.as_deref().map(ArcStr::from);
            meta.specified_by_url = specified_by_url(&d.directives);
            meta.position = Some(pos);
            meta.into_meta()
        }
        TypeDefinition::Object(d) => {
            let mut fields = vec![];
            for fd in &d.fields {
                merge_field(
                    &mut fields,
                    lower_field_definition(fd),
                    d.name.item.as_arcstr(),
                    duplicates,
                );
            }
            let mut meta = ObjectMeta::new(d.name.item.as_arcstr().clone(), fields);
            meta.description = d.description.as_deref().map(ArcStr::from);
            meta.interface_names = dedup_names(&d.implements_interfaces);
            meta.position = Some(pos);
            meta.into_meta()
        }
        TypeDefinition::Interface(d) => {
            let mut fields = vec![];
            for fd in &d.fields {
                merge_field(
                    &mut fields,
                    lower_field_definition(fd),
                    d.name.item.as_arcstr(),
                    duplicates,
                );
            }
            let mut meta = InterfaceMeta::new(d.name.item.as_arcstr().clone(), fields);
            meta.description = d.description.as_deref().map(ArcStr::from);
            meta.interface_names = dedup_names(&d.implements_interfaces);
            meta.position = Some(pos);
            meta.into_meta()
        }
        TypeDefinition::Union(d) => {
            let mut meta = UnionMeta::new(d.name.item.as_arcstr().clone(), dedup_names(&d.members));
            meta.description = d.description.as_deref().map(ArcStr::from);
            meta.position = Some(pos);
            meta.into_meta()
        }
        TypeDefinition::Enum(d) => {
            let mut values = vec![];
            for vd in &d.values {
                merge_enum_value(
                    &mut values,
                    lower_enum_value(vd),
                    d.name.item.as_arcstr(),
                    vd.name.span.start,
                    duplicates,
                );
            }
            let mut meta = EnumMeta::new(d.name.item.as_arcstr().clone(), values);
            meta.description = d.description.as_deref().map(ArcStr::from);
            meta.position = Some(pos);
            meta.into_meta()
        }
        TypeDefinition::InputObject(d) => {
            let mut input_fields = vec![];
            for fd in &d.fields {
                merge_input_field(
                    &mut input_fields,
                    lower_input_value_definition(fd),
                    d.name.item.as_arcstr(),
                    duplicates,
                );
            }
            let mut meta = InputObjectMeta::new(d.name.item.as_arcstr().clone(), input_fields);
            meta.description = d.description.as_deref().map(ArcStr::from);
            meta.is_one_of = has_directive(&d.directives, "oneOf");
            meta.position = Some(pos);
            meta.into_meta()
        }
    }
}

fn apply_extension<S: ScalarValue>(
    meta: &mut MetaType<S>,
    ext: &Spanning<TypeExtension<S>>,
    duplicates: &mut Vec<RuleError>,
) -> Result<(), SchemaError> {
    let mismatch = || SchemaError::ExtensionKindMismatch {
        name: ext.item.target().item.to_string(),
        position: ext.span.start,
    };

    match (&mut *meta, &ext.item) {
        (MetaType::Scalar(m), TypeExtension::Scalar(e)) => {
            if let Some(url) = specified_by_url(&e.directives) {
                m.specified_by_url = Some(url);
            }
        }
        (MetaType::Object(m), TypeExtension::Object(e)) => {
            let name = m.name.clone();
            for iface in dedup_names(&e.implements_interfaces) {
                if !m.interface_names.contains(&iface) {
                    m.interface_names.push(iface);
                }
            }
            for fd in &e.fields {
                merge_field(&mut m.fields, lower_field_definition(fd), &name, duplicates);
            }
        }
        (MetaType::Interface(m), TypeExtension::Interface(e)) => {
            let name = m.name.clone();
            for iface in dedup_names(&e.implements_interfaces) {
                if !m.interface_names.contains(&iface) {
                    m.interface_names.push(iface);
                }
            }
            for fd in &e.fields {
                merge_field(&mut m.fields, lower_field_definition(fd), &name, duplicates);
            }
        }
        (MetaType::Union(m), TypeExtension::Union(e)) => {
            for member in dedup_names(&e.members) {
                if !m.of_type_names.contains(&member) {
                    m.of_type_names.push(member);
                }
            }
        }
        (MetaType::Enum(m), TypeExtension::Enum(e)) => {
            let name = m.name.clone();
            for vd in &e.values {
                merge_enum_value(
                    &mut m.values,
                    lower_enum_value(vd),
                    &name,
                    vd.name.span.start,
                    duplicates,
                );
            }
        }
        (MetaType::InputObject(m), TypeExtension::InputObject(e)) => {
            let name = m.name.clone();
            if has_directive(&e.directives, "oneOf") {
                m.is_one_of = true;
            }
            for fd in &e.fields {
                merge_input_field(
                    &mut m.input_fields,
                    lower_input_value_definition(fd),
                    &name,
                    duplicates,
                );
            }
        }
        _ => return Err(mismatch()),
    }

    meta.push_extension_position(ext.span.start);
    Ok(())
}

fn lower_field_definition<S: ScalarValue>(fd: &FieldDefinition<S>) -> Field<S> {
    let mut field = Field::new(fd.name.item.as_arcstr().clone(), fd.field_type.item.clone());
    field.description = fd.description.as_deref().map(ArcStr::from);
    field.deprecation_status = deprecation_status(&fd.directives);
    field.position = Some(fd.name.span.start);
    field.arguments = fd
        .arguments
        .iter()
        .map(lower_input_value_definition)
        .collect();
    field
}

fn lower_input_value_definition<S: ScalarValue>(ivd: &InputValueDefinition<S>) -> Argument<S> {
    let mut arg = Argument::new(ivd.name.item.as_arcstr().clone(), ivd.value_type.item.clone());
    arg.description = ivd.description.as_deref().map(ArcStr::from);
    arg.default_value = ivd.default_value.as_ref().map(|dv| dv.item.clone());
    arg.deprecation_status = deprecation_status(&ivd.directives);
    arg.position = Some(ivd.name.span.start);
    arg
}

fn lower_enum_value<S: ScalarValue>(vd: &EnumValueDefinition<S>) -> EnumValue {
    let mut value = EnumValue::new(vd.name.item.as_arcstr().clone());
    value.description = vd.description.as_deref().map(ArcStr::from);
    value.deprecation_status = deprecation_status(&vd.directives);
    value
}

fn lower_directive_definition<S: ScalarValue>(dd: &DirectiveDefinition<S>) -> DirectiveType<S> {
    let mut directive = DirectiveType::new(
        dd.name.item.as_arcstr().clone(),
        dd.locations.iter().map(|l| l.item).collect(),
    );
    directive.description = dd.description.as_deref().map(ArcStr::from);
    directive.is_repeatable = dd.repeatable;
    directive.arguments = dd
        .arguments
        .iter()
        .map(lower_input_value_definition)
        .collect();
    directive
}

fn merge_field<S>(
    fields: &mut Vec<Field<S>>,
    field: Field<S>,
    type_name: &ArcStr,
    duplicates: &mut Vec<RuleError>,
) {
    if let Some(existing) = fields.iter_mut().find(|f| f.name == field.name) {
        duplicates.push(RuleError::new(
            &format!(
                "Field \"{type_name}.{}\" can only be defined once",
                field.name,
            ),
            &[field.position.unwrap_or_default()],
        ));
        // Last write wins; the slot keeps its original order.
        *existing = field;
    } else {
        fields.push(field);
    }
}

fn merge_enum_value(
    values: &mut Vec<EnumValue>,
    value: EnumValue,
    type_name: &ArcStr,
    pos: SourcePosition,
    duplicates: &mut Vec<RuleError>,
) {
    if let Some(existing) = values.iter_mut().find(|v| v.name == value.name) {
        duplicates.push(RuleError::new(
            &format!(
                "Enum value \"{type_name}.{}\" can only be defined once",
                value.name,
            ),
            &[pos],
        ));
        *existing = value;
    } else {
        values.push(value);
    }
}

fn merge_input_field<S>(
    fields: &mut Vec<Argument<S>>,
    field: Argument<S>,
    type_name: &ArcStr,
    duplicates: &mut Vec<RuleError>,
) {
    if let Some(existing) = fields.iter_mut().find(|f| f.name == field.name) {
        duplicates.push(RuleError::new(
            &format!(
                "Input field \"{type_name}.{}\" can only be defined once",
                field.name,
            ),
            &[field.position.unwrap_or_default()],
        ));
        *existing = field;
    } else {
        fields.push(field);
    }
}

fn dedup_names(names: &[Spanning<Name>]) -> Vec<ArcStr> {
    let mut out: Vec<ArcStr> = vec![];
    for n in names {
        let name = n.item.as_arcstr().clone();
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

fn has_directive<S>(directives: &[Spanning<crate::ast::Directive<S>>], name: &str) -> bool {
    directives.iter().any(|d| d.item.name.item == name)
}

fn directive_string_argument<'a, S: ScalarValue>(
    directives: &'a [Spanning<crate::ast::Directive<S>>],
    directive: &str,
    argument: &str,
) -> Option<&'a str> {
    directives
        .iter()
        .find(|d| d.item.name.item == directive)
        .and_then(|d| d.item.arguments.as_ref())
        .and_then(|args| args.item.get(argument))
        .and_then(|v| v.item.as_string_value())
}

fn specified_by_url<S: ScalarValue>(
    directives: &[Spanning<crate::ast::Directive<S>>],
) -> Option<ArcStr> {
    directive_string_argument(directives, "specifiedBy", "url").map(ArcStr::from)
}

fn deprecation_status<S: ScalarValue>(
    directives: &[Spanning<crate::ast::Directive<S>>],
) -> DeprecationStatus {
    if !has_directive(directives, "deprecated") {
        return DeprecationStatus::Current;
    }
    let reason = directive_string_argument(directives, "deprecated", "reason")
        .unwrap_or(builtin::DEFAULT_DEPRECATION_REASON);
    DeprecationStatus::Deprecated(Some(ArcStr::from(reason)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::Document,
        schema::translate::{parse_query_document, parse_schema_document},
        value::DefaultScalarValue,
    };

    fn doc(sdl: &str) -> Document {
        parse_schema_document::<DefaultScalarValue>(sdl).expect("SDL should parse")
    }

    fn field_names(schema: &SchemaType<DefaultScalarValue>, type_name: &str) -> Vec<String> {
        schema
            .concrete_type_by_name(type_name)
            .expect("type should exist")
            .fields()
            .expect("type should have fields")
            .iter()
            .map(|f| f.name.to_string())
            .collect()
    }

    #[test]
    fn empty_document_builds_builtin_schema() {
        let schema = build_schema::<DefaultScalarValue>(&vec![]).unwrap();

        assert_eq!(
            schema.type_names(),
            vec![
                "Int",
                "Float",
                "String",
                "Boolean",
                "ID",
                "__Schema",
                "__Type",
                "__TypeKind",
                "__Field",
                "__InputValue",
                "__EnumValue",
                "__Directive",
                "__DirectiveLocation",
            ],
        );
        assert_eq!(
            schema
                .directive_list()
                .iter()
                .map(|d| d.name.to_string())
                .collect::<Vec<_>>(),
            vec!["skip", "include", "deprecated", "specifiedBy", "oneOf"],
        );
        assert!(schema.query_type().is_none());
        assert!(schema.mutation_type().is_none());
        assert!(schema.subscription_type().is_none());
    }

    #[test]
    fn roots_fall_back_to_conventional_names() {
        let schema = build_schema(&doc(
            "type Query { a: Int } type Mutation { b: Int } type Other { c: Int }",
        ))
        .unwrap();

        assert_eq!(*schema.query_type().unwrap().name(), "Query");
        assert_eq!(*schema.mutation_type().unwrap().name(), "Mutation");
        assert!(schema.subscription_type().is_none());
    }

    #[test]
    fn roots_stay_absent_for_other_names() {
        let schema = build_schema(&doc("type MyQuery { a: Int }")).unwrap();

        assert!(schema.query_type().is_none());
        assert!(schema.mutation_type().is_none());
        assert!(schema.subscription_type().is_none());
    }

    #[test]
    fn schema_definition_overrides_and_disables_fallback() {
        let schema = build_schema(&doc(
            "schema { query: Q } type Q { a: Int } type Mutation { b: Int }",
        ))
        .unwrap();

        assert_eq!(*schema.query_type().unwrap().name(), "Q");
        // A schema definition disables the name-based fallback entirely.
        assert!(schema.mutation_type().is_none());
    }

    #[test]
    fn executable_definitions_are_ignored() {
        let mut document = doc("type Query { str: String }");
        document.extend(
            parse_query_document::<DefaultScalarValue>("fragment F on Query { str }").unwrap(),
        );

        let schema = build_schema(&document).unwrap();
        assert_eq!(field_names(&schema, "Query"), vec!["str"]);
    }

    #[test]
    fn second_schema_definition_conflicts() {
        let err = build_schema(&doc(
            "schema { query: Query } schema { query: Query } type Query { a: Int }",
        ))
        .unwrap_err();
        assert!(matches!(err, SchemaError::SchemaDefinitionConflict { .. }));
    }

    #[test]
    fn unknown_field_type_halts_the_build() {
        let err = build_schema(&doc("type Query { a: Missing }")).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { name, .. } if name == "Missing"));
    }

    #[test]
    fn extending_unknown_type_fails_at_link_time() {
        let err = build_schema(&doc("type Query { a: Int } extend type Missing { b: Int }"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::ExtendingUnknownType { name, .. } if name == "Missing"));
    }

    #[test]
    fn extension_kind_must_match() {
        let err =
            build_schema(&doc("enum Color { RED } extend type Color { a: Int }")).unwrap_err();
        assert!(matches!(err, SchemaError::ExtensionKindMismatch { name, .. } if name == "Color"));
    }

    #[test]
    fn input_object_is_not_an_output_type() {
        let err = build_schema(&doc("input In { a: Int } type Query { f: In }")).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidTypeExpression { type_name, .. } if type_name == "In",
        ));
    }

    #[test]
    fn object_is_not_an_input_type() {
        let err = build_schema(&doc("type Other { x: Int } type Query { f(a: Other): Int }"))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidTypeExpression { type_name, .. } if type_name == "Other",
        ));
    }

    #[test]
    fn default_for_non_input_argument_type() {
        let err = build_schema(&doc(
            "type Other { x: Int } type Query { f(a: Other = 1): Int }",
        ))
        .unwrap_err();
        assert!(matches!(err, SchemaError::NonInputDefault { type_name, .. } if type_name == "Other"));
    }

    #[test]
    fn duplicate_type_names_conflict() {
        let err = build_schema(&doc("type Query { a: Int } type Query { b: Int }")).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTypeName { name, .. } if name == "Query"));
    }

    #[test]
    fn builtins_are_never_replaced_by_user_types() {
        let schema = build_schema(&doc("scalar Int type Query { a: Int }")).unwrap();

        let int = schema.concrete_type_by_name("Int").unwrap();
        assert!(int
            .description()
            .expect("built-in Int keeps its description")
            .contains("non-fractional"));
    }

    #[test]
    fn extension_appends_fields_and_leaves_the_input_untouched() {
        let original = build_schema(&doc("type Query { a: Int }")).unwrap();
        let extended = extend_schema(&original, &doc("extend type Query { b: Int }")).unwrap();

        assert_eq!(field_names(&extended, "Query"), vec!["a", "b"]);
        assert_eq!(field_names(&original, "Query"), vec!["a"]);
    }

    #[test]
    fn extension_without_definitions_is_identity() {
        let original = build_schema(&doc("type Query { a: Int }")).unwrap();

        let unchanged = extend_schema(&original, &vec![]).unwrap();
        assert_eq!(unchanged.type_names(), original.type_names());
        assert_eq!(field_names(&unchanged, "Query"), field_names(&original, "Query"));
        assert_eq!(
            unchanged.directive_list().len(),
            original.directive_list().len(),
        );

        // Executable definitions contribute nothing either.
        let executable =
            parse_query_document::<DefaultScalarValue>("query { a }").unwrap();
        let unchanged = extend_schema(&original, &executable).unwrap();
        assert_eq!(unchanged.type_names(), original.type_names());
    }

    #[test]
    fn extensions_merge_every_type_kind() {
        let schema = build_schema(&doc(
            r#"
            type Query { a: Int }
            enum Color { RED }
            union Thing = Query
            input Filter { a: Int }
            scalar Url

            extend enum Color { BLUE }
            extend union Thing = Extra
            extend input Filter { b: Int }
            extend scalar Url @specifiedBy(url: "https://example.com/url-spec")
            type Extra { b: Int }
            "#,
        ))
        .unwrap();

        match schema.concrete_type_by_name("Color").unwrap() {
            MetaType::Enum(e) => assert_eq!(
                e.values.iter().map(|v| v.name.to_string()).collect::<Vec<_>>(),
                vec!["RED", "BLUE"],
            ),
            _ => panic!("Color should be an enum"),
        }
        match schema.concrete_type_by_name("Thing").unwrap() {
            MetaType::Union(u) => assert_eq!(
                u.of_type_names.iter().map(ToString::to_string).collect::<Vec<_>>(),
                vec!["Query", "Extra"],
            ),
            _ => panic!("Thing should be a union"),
        }
        match schema.concrete_type_by_name("Filter").unwrap() {
            MetaType::InputObject(io) => assert_eq!(
                io.input_fields.iter().map(|f| f.name.to_string()).collect::<Vec<_>>(),
                vec!["a", "b"],
            ),
            _ => panic!("Filter should be an input object"),
        }
        assert_eq!(
            schema
                .concrete_type_by_name("Url")
                .unwrap()
                .specified_by_url()
                .map(ToString::to_string),
            Some("https://example.com/url-spec".into()),
        );
    }

    #[test]
    fn duplicate_fields_are_tolerated_but_reported() {
        let document = doc("type Query { a: Int a: String }");

        let err = build_schema(&document).unwrap_err();
        let errors = err.validation_errors().expect("collecting error");
        assert!(errors
            .iter()
            .any(|e| e.message().contains("\"Query.a\" can only be defined once")));

        // The builder itself is tolerant; the later definition wins.
        let schema = build_schema_unchecked(&document).unwrap();
        let field = schema
            .concrete_type_by_name("Query")
            .unwrap()
            .field_by_name("a")
            .unwrap();
        assert_eq!(field.field_type, crate::ast::Type::named("String"));
    }

    #[test]
    fn deprecation_is_lifted_from_directives() {
        let schema = build_schema(&doc(
            r#"type Query { a: Int @deprecated(reason: "use b") b: Int @deprecated c: Int }"#,
        ))
        .unwrap();
        let query = schema.concrete_type_by_name("Query").unwrap();

        let reason = |name: &str| {
            query
                .field_by_name(name)
                .unwrap()
                .deprecation_status
                .reason()
                .map(ToString::to_string)
        };
        assert_eq!(reason("a"), Some("use b".into()));
        assert_eq!(reason("b"), Some("No longer supported".into()));
        assert!(!query.field_by_name("c").unwrap().deprecation_status.is_deprecated());
    }

    #[test]
    fn one_of_is_lifted_from_directives() {
        let schema = build_schema(&doc(
            "input Choice @oneOf { a: Int b: String } type Query { f(c: Choice): Int }",
        ))
        .unwrap();
        match schema.concrete_type_by_name("Choice").unwrap() {
            MetaType::InputObject(io) => assert!(io.is_one_of),
            _ => panic!("Choice should be an input object"),
        }
    }

    #[test]
    fn directive_definitions_are_linked() {
        let schema = build_schema(&doc(
            r#"
            directive @auth(role: String = "user") repeatable on FIELD_DEFINITION | OBJECT
            type Query @auth { a: Int @auth(role: "admin") @auth(role: "ops") }
            "#,
        ))
        .unwrap();

        let auth = schema.directive_by_name("auth").unwrap();
        assert!(auth.is_repeatable);
        assert_eq!(auth.arguments.len(), 1);
        assert_eq!(
            auth.locations,
            vec![
                crate::schema::model::DirectiveLocation::FieldDefinition,
                crate::schema::model::DirectiveLocation::Object,
            ],
        );
    }

    #[test]
    fn every_named_reference_resolves_into_the_type_map() {
        let schema = build_schema(&doc(
            r#"
            interface Node { id: ID }
            type User implements Node { id: ID friends: [User!] pet: Pet }
            type Dog { name: String }
            type Cat { name: String }
            union Pet = Dog | Cat
            input Filter { nested: Filter limit: Int }
            type Query { node(filter: Filter): Node users: [User] }
            "#,
        ))
        .unwrap();

        for meta in schema.type_list() {
            if let Some(fields) = meta.fields() {
                for f in fields {
                    let inner = f.field_type.innermost_name();
                    assert_eq!(
                        *schema.concrete_type_by_name(inner).unwrap().name(),
                        *inner,
                    );
                    for a in &f.arguments {
                        let inner = a.arg_type.innermost_name();
                        assert_eq!(
                            *schema.concrete_type_by_name(inner).unwrap().name(),
                            *inner,
                        );
                    }
                }
            }
            if let Some(interfaces) = meta.interface_names() {
                for i in interfaces {
                    assert!(schema.concrete_type_by_name(i).is_some());
                }
            }
            if let MetaType::Union(u) = meta {
                for m in &u.of_type_names {
                    assert!(schema.concrete_type_by_name(m).is_some());
                }
            }
        }
    }

    #[test]
    fn builtins_survive_extension() {
        let original = build_schema(&doc("type Query { a: Int }")).unwrap();
        let extended = extend_schema(&original, &doc("type Extra { b: Int }")).unwrap();

        for name in ["Int", "Float", "String", "Boolean", "ID", "__Schema"] {
            assert!(extended.concrete_type_by_name(name).is_some(), "{name} missing");
        }
        for name in ["skip", "include", "deprecated", "specifiedBy", "oneOf"] {
            assert!(extended.directive_by_name(name).is_some(), "@{name} missing");
        }
        assert!(extended.concrete_type_by_name("Extra").is_some());
    }

    #[test]
    fn schema_extension_supplies_roots() {
        use crate::ast::{RootOperationTypeDefinition, SchemaExtension};

        let original = build_schema(&doc("type Query { a: Int } type Later { b: Int }")).unwrap();

        // `graphql-parser` has no syntax for `extend schema`; the clause is
        // assembled directly.
        let document: Document = vec![Definition::SchemaExtension(Spanning::unlocated(
            SchemaExtension {
                directives: vec![],
                operation_types: vec![Spanning::unlocated(RootOperationTypeDefinition {
                    operation: OperationType::Mutation,
                    type_name: Spanning::unlocated("Later".parse().unwrap()),
                })],
            },
        ))];

        let extended = extend_schema(&original, &document).unwrap();

        assert_eq!(*extended.query_type().unwrap().name(), "Query");
        assert_eq!(*extended.mutation_type().unwrap().name(), "Later");
        assert!(original.mutation_type().is_none());
    }
}
