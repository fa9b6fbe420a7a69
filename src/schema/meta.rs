//! Types used to describe the linked type graph of a schema.
//!
//! Named references inside the graph are interned names, resolved through
//! the owning schema's ordered type map. That keeps the cyclic type graph a
//! plain value: copying a [`MetaType`] and re-inserting it into a new map
//! rewires every reference at once.

use std::sync::Arc;

use arcstr::ArcStr;
use derive_more::with_trait::Debug;

use crate::{
    ast::{InputValue, Type},
    executor::FieldResult,
    parser::SourcePosition,
    resolve::{IsTypeOf, ResolveAbstractType, ResolveField, ResolveStream},
    value::{DefaultScalarValue, Value},
};

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    Current,

    /// The field/variant is deprecated, with an optional reason.
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            Self::Current => false,
            Self::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&ArcStr> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_ref(),
        }
    }
}

/// Shortcut for a result-value serialization function of a scalar.
pub type SerializeFn<S> = Arc<dyn Fn(&Value<S>) -> FieldResult<Value<S>, S> + Send + Sync>;

/// Shortcut for an input-coercion check of a scalar (variable values).
pub type ParseValueFn<S> = Arc<dyn Fn(&InputValue<S>) -> FieldResult<(), S> + Send + Sync>;

/// Shortcut for a literal-coercion check of a scalar (in-document values).
pub type ParseLiteralFn<S> = Arc<dyn Fn(&InputValue<S>) -> FieldResult<(), S> + Send + Sync>;

/// Scalar type metadata.
#[derive(Clone, Debug)]
pub struct ScalarMeta<S = DefaultScalarValue> {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub specified_by_url: Option<ArcStr>,
    #[doc(hidden)]
    pub position: Option<SourcePosition>,
    #[doc(hidden)]
    pub extension_positions: Vec<SourcePosition>,
    #[debug(ignore)]
    pub(crate) serialize_fn: SerializeFn<S>,
    #[debug(ignore)]
    pub(crate) parse_value_fn: ParseValueFn<S>,
    #[debug(ignore)]
    pub(crate) parse_literal_fn: ParseLiteralFn<S>,
}

impl<S> ScalarMeta<S> {
    /// Builds a new [`ScalarMeta`] type with the specified `name`.
    ///
    /// The serialization callback defaults to the identity and the coercion
    /// checks default to accepting any input, matching the behavior of a
    /// custom scalar declared in SDL without attached behavior.
    pub fn new(name: impl Into<ArcStr>) -> Self
    where
        S: Clone + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            specified_by_url: None,
            position: None,
            extension_positions: vec![],
            serialize_fn: Arc::new(|v| Ok(v.clone())),
            parse_value_fn: Arc::new(|_| Ok(())),
            parse_literal_fn: Arc::new(|_| Ok(())),
        }
    }

    /// Sets the `description` of this [`ScalarMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the [specification URL][0] for this [`ScalarMeta`] type.
    ///
    /// [0]: https://spec.graphql.org/October2021#sec--specifiedBy
    #[must_use]
    pub fn specified_by_url(mut self, url: impl Into<ArcStr>) -> Self {
        self.specified_by_url = Some(url.into());
        self
    }

    /// Replaces the result-serialization callback.
    #[must_use]
    pub fn serialize_fn(mut self, f: SerializeFn<S>) -> Self {
        self.serialize_fn = f;
        self
    }

    /// Replaces the variable-coercion check.
    #[must_use]
    pub fn parse_value_fn(mut self, f: ParseValueFn<S>) -> Self {
        self.parse_value_fn = f;
        self
    }

    /// Replaces the literal-coercion check.
    #[must_use]
    pub fn parse_literal_fn(mut self, f: ParseLiteralFn<S>) -> Self {
        self.parse_literal_fn = f;
        self
    }

    /// Wraps this [`ScalarMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType<S> {
        MetaType::Scalar(self)
    }
}

/// Metadata for a field of an object or interface type.
#[derive(Clone, Debug)]
pub struct Field<S = DefaultScalarValue> {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arguments: Vec<Argument<S>>,
    #[doc(hidden)]
    pub field_type: Type,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    #[doc(hidden)]
    pub position: Option<SourcePosition>,
    #[debug(ignore)]
    pub(crate) resolver: Option<Arc<dyn ResolveField<S>>>,
    #[debug(ignore)]
    pub(crate) subscriber: Option<Arc<dyn ResolveStream<S>>>,
}

impl<S> Field<S> {
    /// Builds a new [`Field`] of the given output [`Type`] with the given
    /// `name`.
    pub fn new(name: impl Into<ArcStr>, field_type: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: vec![],
            field_type,
            deprecation_status: DeprecationStatus::Current,
            position: None,
            resolver: None,
            subscriber: None,
        }
    }

    /// Sets the `description` of this [`Field`].
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an `argument` to this [`Field`].
    #[must_use]
    pub fn argument(mut self, argument: Argument<S>) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Sets this [`Field`] as deprecated with an optional `reason`.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<impl Into<ArcStr>>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }

    /// Attaches a resolver callback to this [`Field`].
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn ResolveField<S>>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Attaches a subscription source callback to this [`Field`].
    ///
    /// Only meaningful on fields of the subscription root type.
    #[must_use]
    pub fn subscriber(mut self, subscriber: Arc<dyn ResolveStream<S>>) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    /// Returns this [`Field`]'s argument with the given `name`, if any.
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument<S>> {
        self.arguments.iter().find(|a| a.name == *name)
    }

    /// Indicates whether this [`Field`] is GraphQL built-in.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        // "used exclusively by GraphQL's introspection system"
        self.name.starts_with("__")
    }
}

/// Metadata for an argument to a field, or a field of an input object.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument<S = DefaultScalarValue> {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arg_type: Type,
    #[doc(hidden)]
    pub default_value: Option<InputValue<S>>,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    #[doc(hidden)]
    pub position: Option<SourcePosition>,
}

impl<S> Argument<S> {
    /// Builds a new [`Argument`] of the given input [`Type`] with the given
    /// `name`.
    pub fn new(name: impl Into<ArcStr>, arg_type: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
            deprecation_status: DeprecationStatus::Current,
            position: None,
        }
    }

    /// Sets the `description` of this [`Argument`].
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value of this [`Argument`].
    #[must_use]
    pub fn default_value(mut self, val: InputValue<S>) -> Self {
        self.default_value = Some(val);
        self
    }

    /// Sets this [`Argument`] as deprecated with an optional `reason`.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<impl Into<ArcStr>>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

/// Metadata for a single value of an enum type.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    /// The name of the enum value.
    ///
    /// This is the string literal representation of the enum in responses.
    pub name: ArcStr,

    /// The optional description of this enum _value_.
    pub description: Option<ArcStr>,

    /// Whether the value is deprecated, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl EnumValue {
    /// Constructs a new [`EnumValue`] with the provided `name`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the `description` of this [`EnumValue`].
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets this [`EnumValue`] as deprecated with an optional `reason`.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<impl Into<ArcStr>>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

/// Object type metadata.
#[derive(Clone, Debug)]
pub struct ObjectMeta<S = DefaultScalarValue> {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field<S>>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub position: Option<SourcePosition>,
    #[doc(hidden)]
    pub extension_positions: Vec<SourcePosition>,
    #[debug(ignore)]
    pub(crate) is_type_of: Option<Arc<dyn IsTypeOf<S>>>,
}

impl<S> ObjectMeta<S> {
    /// Builds a new [`ObjectMeta`] type with the specified `name` and
    /// `fields`.
    pub fn new(name: impl Into<ArcStr>, fields: Vec<Field<S>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
            interface_names: vec![],
            position: None,
            extension_positions: vec![],
            is_type_of: None,
        }
    }

    /// Sets the `description` of this [`ObjectMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the interfaces this [`ObjectMeta`] type implements.
    #[must_use]
    pub fn interfaces(mut self, interfaces: Vec<ArcStr>) -> Self {
        self.interface_names = interfaces;
        self
    }

    /// Attaches an [`IsTypeOf`] predicate to this [`ObjectMeta`] type.
    #[must_use]
    pub fn is_type_of(mut self, predicate: Arc<dyn IsTypeOf<S>>) -> Self {
        self.is_type_of = Some(predicate);
        self
    }

    /// Wraps this [`ObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType<S> {
        MetaType::Object(self)
    }
}

/// Interface type metadata.
#[derive(Clone, Debug)]
pub struct InterfaceMeta<S = DefaultScalarValue> {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field<S>>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub position: Option<SourcePosition>,
    #[doc(hidden)]
    pub extension_positions: Vec<SourcePosition>,
    #[debug(ignore)]
    pub(crate) resolve_type: Option<Arc<dyn ResolveAbstractType<S>>>,
}

impl<S> InterfaceMeta<S> {
    /// Builds a new [`InterfaceMeta`] type with the specified `name` and
    /// `fields`.
    pub fn new(name: impl Into<ArcStr>, fields: Vec<Field<S>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
            interface_names: vec![],
            position: None,
            extension_positions: vec![],
            resolve_type: None,
        }
    }

    /// Sets the `description` of this [`InterfaceMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the interfaces this [`InterfaceMeta`] interface itself
    /// implements.
    #[must_use]
    pub fn interfaces(mut self, interfaces: Vec<ArcStr>) -> Self {
        self.interface_names = interfaces;
        self
    }

    /// Attaches a [`ResolveAbstractType`] callback to this interface.
    #[must_use]
    pub fn resolve_type(mut self, resolver: Arc<dyn ResolveAbstractType<S>>) -> Self {
        self.resolve_type = Some(resolver);
        self
    }

    /// Wraps this [`InterfaceMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType<S> {
        MetaType::Interface(self)
    }
}

/// Union type metadata.
#[derive(Clone, Debug)]
pub struct UnionMeta<S = DefaultScalarValue> {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub of_type_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub position: Option<SourcePosition>,
    #[doc(hidden)]
    pub extension_positions: Vec<SourcePosition>,
    #[debug(ignore)]
    pub(crate) resolve_type: Option<Arc<dyn ResolveAbstractType<S>>>,
}

impl<S> UnionMeta<S> {
    /// Builds a new [`UnionMeta`] type with the specified `name` and member
    /// type names.
    pub fn new(name: impl Into<ArcStr>, of_type_names: Vec<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            of_type_names,
            position: None,
            extension_positions: vec![],
            resolve_type: None,
        }
    }

    /// Sets the `description` of this [`UnionMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches a [`ResolveAbstractType`] callback to this union.
    #[must_use]
    pub fn resolve_type(mut self, resolver: Arc<dyn ResolveAbstractType<S>>) -> Self {
        self.resolve_type = Some(resolver);
        self
    }

    /// Wraps this [`UnionMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType<S> {
        MetaType::Union(self)
    }
}

/// Enum type metadata.
#[derive(Clone, Debug)]
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub values: Vec<EnumValue>,
    #[doc(hidden)]
    pub position: Option<SourcePosition>,
    #[doc(hidden)]
    pub extension_positions: Vec<SourcePosition>,
}

impl EnumMeta {
    /// Builds a new [`EnumMeta`] type with the specified `name` and possible
    /// `values`.
    pub fn new(name: impl Into<ArcStr>, values: Vec<EnumValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values,
            position: None,
            extension_positions: vec![],
        }
    }

    /// Sets the `description` of this [`EnumMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the [`EnumValue`] with the given `name`, if declared.
    pub fn value_by_name(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == *name)
    }

    /// Wraps this [`EnumMeta`] type into a generic [`MetaType`].
    pub fn into_meta<S>(self) -> MetaType<S> {
        MetaType::Enum(self)
    }
}

/// Input object type metadata.
#[derive(Clone, Debug)]
pub struct InputObjectMeta<S = DefaultScalarValue> {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub input_fields: Vec<Argument<S>>,
    #[doc(hidden)]
    pub is_one_of: bool,
    #[doc(hidden)]
    pub position: Option<SourcePosition>,
    #[doc(hidden)]
    pub extension_positions: Vec<SourcePosition>,
}

impl<S> InputObjectMeta<S> {
    /// Builds a new [`InputObjectMeta`] type with the specified `name` and
    /// `input_fields`.
    pub fn new(name: impl Into<ArcStr>, input_fields: Vec<Argument<S>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields,
            is_one_of: false,
            position: None,
            extension_positions: vec![],
        }
    }

    /// Sets the `description` of this [`InputObjectMeta`] type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks this [`InputObjectMeta`] type as `@oneOf`.
    #[must_use]
    pub fn one_of(mut self) -> Self {
        self.is_one_of = true;
        self
    }

    /// Wraps this [`InputObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType<S> {
        MetaType::InputObject(self)
    }
}

/// GraphQL type kind.
///
/// The GraphQL specification defines a number of type kinds - the meta type
/// of a type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self {
            TypeKind::Scalar => "SCALAR",
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::InputObject => "INPUT_OBJECT",
            TypeKind::List => "LIST",
            TypeKind::NonNull => "NON_NULL",
        })
    }
}

/// Generic named type metadata.
#[derive(Clone, Debug)]
pub enum MetaType<S = DefaultScalarValue> {
    #[doc(hidden)]
    Scalar(ScalarMeta<S>),
    #[doc(hidden)]
    Object(ObjectMeta<S>),
    #[doc(hidden)]
    Interface(InterfaceMeta<S>),
    #[doc(hidden)]
    Union(UnionMeta<S>),
    #[doc(hidden)]
    Enum(EnumMeta),
    #[doc(hidden)]
    InputObject(InputObjectMeta<S>),
}

impl<S> MetaType<S> {
    /// Returns the name of the represented type.
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Union(UnionMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. }) => name,
        }
    }

    /// Returns the description of the represented type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Union(UnionMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. }) => description.as_ref(),
        }
    }

    /// Returns the [specification URL][0] of the represented type, if
    /// applicable.
    ///
    /// [0]: https://spec.graphql.org/October2021#sec--specifiedBy
    pub fn specified_by_url(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta {
                specified_by_url, ..
            }) => specified_by_url.as_ref(),
            _ => None,
        }
    }

    /// Returns the source position of the definition that introduced this
    /// type, if known.
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            Self::Scalar(ScalarMeta { position, .. })
            | Self::Object(ObjectMeta { position, .. })
            | Self::Interface(InterfaceMeta { position, .. })
            | Self::Union(UnionMeta { position, .. })
            | Self::Enum(EnumMeta { position, .. })
            | Self::InputObject(InputObjectMeta { position, .. }) => *position,
        }
    }

    /// Returns the source positions of the extensions folded into this
    /// type, in document order.
    pub fn extension_positions(&self) -> &[SourcePosition] {
        match self {
            Self::Scalar(ScalarMeta {
                extension_positions,
                ..
            })
            | Self::Object(ObjectMeta {
                extension_positions,
                ..
            })
            | Self::Interface(InterfaceMeta {
                extension_positions,
                ..
            })
            | Self::Union(UnionMeta {
                extension_positions,
                ..
            })
            | Self::Enum(EnumMeta {
                extension_positions,
                ..
            })
            | Self::InputObject(InputObjectMeta {
                extension_positions,
                ..
            }) => extension_positions,
        }
    }

    /// Constructs a [`TypeKind`] out of this [`MetaType`].
    pub fn type_kind(&self) -> TypeKind {
        match self {
            Self::Scalar(..) => TypeKind::Scalar,
            Self::Object(..) => TypeKind::Object,
            Self::Interface(..) => TypeKind::Interface,
            Self::Union(..) => TypeKind::Union,
            Self::Enum(..) => TypeKind::Enum,
            Self::InputObject(..) => TypeKind::InputObject,
        }
    }

    /// Returns a [`Field`]'s metadata by its `name`.
    ///
    /// Only objects and interfaces have fields.
    pub fn field_by_name(&self, name: &str) -> Option<&Field<S>> {
        match self {
            Self::Object(ObjectMeta { fields, .. })
            | Self::Interface(InterfaceMeta { fields, .. }) => {
                fields.iter().find(|f| f.name == *name)
            }
            _ => None,
        }
    }

    /// Returns all fields of the represented type, if it has any.
    pub fn fields(&self) -> Option<&[Field<S>]> {
        match self {
            Self::Object(ObjectMeta { fields, .. })
            | Self::Interface(InterfaceMeta { fields, .. }) => Some(fields),
            _ => None,
        }
    }

    /// Returns an input field's metadata by its `name`.
    ///
    /// Only input objects have input fields.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument<S>> {
        match self {
            Self::InputObject(InputObjectMeta { input_fields, .. }) => {
                input_fields.iter().find(|f| f.name == *name)
            }
            _ => None,
        }
    }

    /// Returns the names of the interfaces the represented type implements,
    /// if it can implement any.
    pub fn interface_names(&self) -> Option<&[ArcStr]> {
        match self {
            Self::Object(ObjectMeta {
                interface_names, ..
            })
            | Self::Interface(InterfaceMeta {
                interface_names, ..
            }) => Some(interface_names),
            _ => None,
        }
    }

    /// Constructs a nullable named [`Type`] literal referencing this
    /// [`MetaType`].
    pub fn as_type(&self) -> Type {
        Type::Named(self.name().clone())
    }

    /// Indicates whether the represented type is a composite one.
    ///
    /// Objects, interfaces and unions are composite types.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Object(..) | Self::Interface(..) | Self::Union(..)
        )
    }

    /// Indicates whether the represented type can occur in leaf positions
    /// of queries.
    ///
    /// Only enums and scalars are leaf types.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(..) | Self::Enum(..))
    }

    /// Indicates whether the represented type is abstract.
    ///
    /// Only interfaces and unions are abstract types.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(..) | Self::Union(..))
    }

    /// Indicates whether the represented type can be used in input
    /// positions, e.g. arguments or variables.
    ///
    /// Only scalars, enums and input objects are input types.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::Scalar(..) | Self::Enum(..) | Self::InputObject(..)
        )
    }

    /// Indicates whether the represented type is GraphQL built-in: one of
    /// the spec scalars or an introspection type.
    pub fn is_builtin(&self) -> bool {
        let name = self.name();
        name.starts_with("__")
            || name == "Int"
            || name == "Float"
            || name == "String"
            || name == "Boolean"
            || name == "ID"
    }

    pub(crate) fn push_extension_position(&mut self, pos: SourcePosition) {
        match self {
            Self::Scalar(ScalarMeta {
                extension_positions,
                ..
            })
            | Self::Object(ObjectMeta {
                extension_positions,
                ..
            })
            | Self::Interface(InterfaceMeta {
                extension_positions,
                ..
            })
            | Self::Union(UnionMeta {
                extension_positions,
                ..
            })
            | Self::Enum(EnumMeta {
                extension_positions,
                ..
            })
            | Self::InputObject(InputObjectMeta {
                extension_positions,
                ..
            }) => extension_positions.push(pos),
        }
    }
}
