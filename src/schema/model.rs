//! The linked, immutable schema value.

use std::{fmt, sync::Arc};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    ast::{Name, Type},
    resolve::{IsTypeOf, ResolveAbstractType, ResolveField, ResolveStream},
    schema::{
        builder::SchemaError,
        meta::{Argument, MetaType, ParseLiteralFn, ParseValueFn, SerializeFn},
    },
    value::DefaultScalarValue,
};

/// A fully linked GraphQL type system.
///
/// Built once by the schema builder, then immutable; every named reference
/// inside the graph resolves through [`SchemaType::concrete_type_by_name`]
/// into the single ordered `types` map. Freely shareable across requests.
#[derive(Clone, Debug)]
pub struct SchemaType<S = DefaultScalarValue> {
    pub(crate) description: Option<ArcStr>,
    pub(crate) types: IndexMap<Name, MetaType<S>>,
    pub(crate) query_type_name: Option<ArcStr>,
    pub(crate) mutation_type_name: Option<ArcStr>,
    pub(crate) subscription_type_name: Option<ArcStr>,
    pub(crate) directives: Vec<DirectiveType<S>>,
    pub(crate) assume_valid: bool,
}

/// A wrapped type literal resolved against a schema.
#[derive(Clone, Debug)]
pub enum TypeType<'a, S: 'a> {
    /// A named type of the schema.
    Concrete(&'a MetaType<S>),
    /// A non-`null` wrapping of an inner type.
    NonNull(Box<TypeType<'a, S>>),
    /// A list wrapping of an inner type.
    List(Box<TypeType<'a, S>>),
}

/// Metadata of a directive declared in, or built into, a schema.
#[derive(Clone, Debug)]
pub struct DirectiveType<S = DefaultScalarValue> {
    /// Name of this directive, without the `@`.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// The locations this directive may legally be applied at.
    pub locations: Vec<DirectiveLocation>,
    /// Ordered arguments of this directive.
    pub arguments: Vec<Argument<S>>,
    /// Whether the directive may be applied repeatedly at one location.
    pub is_repeatable: bool,
}

/// All locations a directive can be declared for, as enumerated by the
/// GraphQL specification.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(missing_docs)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
            DirectiveLocation::Schema => "SCHEMA",
            DirectiveLocation::Scalar => "SCALAR",
            DirectiveLocation::Object => "OBJECT",
            DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
            DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
            DirectiveLocation::Interface => "INTERFACE",
            DirectiveLocation::Union => "UNION",
            DirectiveLocation::Enum => "ENUM",
            DirectiveLocation::EnumValue => "ENUM_VALUE",
            DirectiveLocation::InputObject => "INPUT_OBJECT",
            DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        })
    }
}

impl<S> SchemaType<S> {
    /// The description of this schema, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Whether this schema was sealed without running the schema validator.
    pub fn assume_valid(&self) -> bool {
        self.assume_valid
    }

    /// Gets a type by name, wrapped for type-expression composition.
    pub fn type_by_name(&self, name: &str) -> Option<TypeType<S>> {
        self.types.get(name).map(TypeType::Concrete)
    }

    /// Gets a concrete type by name.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType<S>> {
        self.types.get(name)
    }

    /// Looks the innermost named type of a type literal up.
    pub fn lookup_type(&self, tpe: &Type) -> Option<&MetaType<S>> {
        self.concrete_type_by_name(tpe.innermost_name())
    }

    /// Gets the query root type, if the schema has one.
    pub fn query_type(&self) -> Option<&MetaType<S>> {
        self.query_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("Query type does not exist in schema")
        })
    }

    /// Gets the mutation root type, if the schema has one.
    pub fn mutation_type(&self) -> Option<&MetaType<S>> {
        self.mutation_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("Mutation type does not exist in schema")
        })
    }

    /// Gets the subscription root type, if the schema has one.
    pub fn subscription_type(&self) -> Option<&MetaType<S>> {
        self.subscription_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("Subscription type does not exist in schema")
        })
    }

    /// All named types of the schema, in insertion order.
    pub fn type_list(&self) -> Vec<&MetaType<S>> {
        self.types.values().collect()
    }

    /// All type names of the schema, in insertion order.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(Name::as_str).collect()
    }

    /// Resolves a [`Type`] literal into a [`TypeType`] against this schema.
    ///
    /// # Panics
    ///
    /// If the literal references a type absent from the schema. The builder
    /// guarantees this cannot happen for literals taken out of a built
    /// schema.
    pub fn make_type(&self, t: &Type) -> TypeType<S> {
        match t {
            Type::NonNullNamed(n) => TypeType::NonNull(Box::new(
                self.type_by_name(n).expect("Type not found in schema"),
            )),
            Type::NonNullList(inner) => TypeType::NonNull(Box::new(TypeType::List(Box::new(
                self.make_type(inner),
            )))),
            Type::Named(n) => self.type_by_name(n).expect("Type not found in schema"),
            Type::List(inner) => TypeType::List(Box::new(self.make_type(inner))),
        }
    }

    /// All directives of the schema, in insertion order.
    pub fn directive_list(&self) -> &[DirectiveType<S>] {
        &self.directives
    }

    /// Gets a directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType<S>> {
        self.directives.iter().find(|d| d.name == *name)
    }

    /// The possible concrete object types of an abstract type.
    ///
    /// For unions these are the declared members; for interfaces, every
    /// object type implementing it. Non-abstract types have no possible
    /// types.
    pub fn possible_types(&self, t: &MetaType<S>) -> Vec<&MetaType<S>> {
        match t {
            MetaType::Union(u) => u
                .of_type_names
                .iter()
                .filter_map(|n| self.concrete_type_by_name(n))
                .collect(),
            MetaType::Interface(i) => self
                .types
                .values()
                .filter(|t| match t {
                    MetaType::Object(o) => o.interface_names.iter().any(|n| *n == i.name),
                    _ => false,
                })
                .collect(),
            _ => vec![],
        }
    }

    /// Every object _and interface_ type declaring to implement the named
    /// interface.
    pub fn implementations_of(&self, interface_name: &str) -> Vec<&MetaType<S>> {
        self.types
            .values()
            .filter(|t| {
                t.interface_names()
                    .is_some_and(|ns| ns.iter().any(|n| *n == *interface_name))
            })
            .collect()
    }

    /// Whether `possible_type` is one of the concrete types of
    /// `abstract_type`.
    pub fn is_possible_type(
        &self,
        abstract_type: &MetaType<S>,
        possible_type: &MetaType<S>,
    ) -> bool {
        self.possible_types(abstract_type)
            .iter()
            .any(|t| t.name() == possible_type.name())
    }

    /// Whether `sub_type` is a valid covariant subtype of `super_type`.
    ///
    /// `T` is a valid subtype of `U` if `T = U`; or `T` is non-`null` and
    /// its nullable form is a subtype of `U`; or both are lists with
    /// covariant element types; or `U` is an abstract type and `T` a member
    /// of it.
    pub fn is_subtype(&self, sub_type: &Type, super_type: &Type) -> bool {
        use crate::ast::Type::*;

        if super_type == sub_type {
            return true;
        }

        match (super_type, sub_type) {
            (NonNullNamed(super_name), NonNullNamed(sub_name))
            | (Named(super_name), Named(sub_name))
            | (Named(super_name), NonNullNamed(sub_name)) => {
                self.is_named_subtype(sub_name, super_name)
            }
            (NonNullList(super_inner), NonNullList(sub_inner))
            | (List(super_inner), List(sub_inner))
            | (List(super_inner), NonNullList(sub_inner)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            _ => false,
        }
    }

    /// Whether the named type `sub_type_name` is a valid subtype of the
    /// named type `super_type_name`.
    pub fn is_named_subtype(&self, sub_type_name: &str, super_type_name: &str) -> bool {
        if sub_type_name == super_type_name {
            true
        } else if let (Some(sub_type), Some(super_type)) = (
            self.concrete_type_by_name(sub_type_name),
            self.concrete_type_by_name(super_type_name),
        ) {
            super_type.is_abstract()
                && (self.is_possible_type(super_type, sub_type)
                    || sub_type
                        .interface_names()
                        .is_some_and(|ns| ns.iter().any(|n| *n == *super_type_name)))
        } else {
            false
        }
    }
}

impl<S> SchemaType<S> {
    /// Attaches a field resolver, consuming and returning the schema.
    ///
    /// Fails if the type or field does not exist, or the type has no
    /// fields.
    pub fn with_resolver(
        mut self,
        type_name: &str,
        field_name: &str,
        resolver: Arc<dyn ResolveField<S>>,
    ) -> Result<Self, SchemaError> {
        let field = self
            .field_mut(type_name, field_name)
            .ok_or_else(|| SchemaError::unknown_field(type_name, field_name))?;
        field.resolver = Some(resolver);
        Ok(self)
    }

    /// Attaches a subscription source resolver to a field of the
    /// subscription root, consuming and returning the schema.
    pub fn with_subscriber(
        mut self,
        type_name: &str,
        field_name: &str,
        subscriber: Arc<dyn ResolveStream<S>>,
    ) -> Result<Self, SchemaError> {
        let field = self
            .field_mut(type_name, field_name)
            .ok_or_else(|| SchemaError::unknown_field(type_name, field_name))?;
        field.subscriber = Some(subscriber);
        Ok(self)
    }

    /// Attaches an abstract-type resolver to an interface or union type,
    /// consuming and returning the schema.
    pub fn with_type_resolver(
        mut self,
        type_name: &str,
        resolver: Arc<dyn ResolveAbstractType<S>>,
    ) -> Result<Self, SchemaError> {
        match self.types.get_mut(type_name) {
            Some(MetaType::Interface(i)) => {
                i.resolve_type = Some(resolver);
                Ok(self)
            }
            Some(MetaType::Union(u)) => {
                u.resolve_type = Some(resolver);
                Ok(self)
            }
            _ => Err(SchemaError::unknown_abstract_type(type_name)),
        }
    }

    /// Attaches an [`IsTypeOf`] predicate to an object type, consuming and
    /// returning the schema.
    pub fn with_is_type_of(
        mut self,
        type_name: &str,
        predicate: Arc<dyn IsTypeOf<S>>,
    ) -> Result<Self, SchemaError> {
        match self.types.get_mut(type_name) {
            Some(MetaType::Object(o)) => {
                o.is_type_of = Some(predicate);
                Ok(self)
            }
            _ => Err(SchemaError::unknown_object_type(type_name)),
        }
    }

    /// Replaces the coercion and serialization callbacks of a scalar type,
    /// consuming and returning the schema.
    pub fn with_scalar_fns(
        mut self,
        type_name: &str,
        serialize: SerializeFn<S>,
        parse_value: ParseValueFn<S>,
        parse_literal: ParseLiteralFn<S>,
    ) -> Result<Self, SchemaError> {
        match self.types.get_mut(type_name) {
            Some(MetaType::Scalar(s)) => {
                s.serialize_fn = serialize;
                s.parse_value_fn = parse_value;
                s.parse_literal_fn = parse_literal;
                Ok(self)
            }
            _ => Err(SchemaError::unknown_scalar_type(type_name)),
        }
    }

    fn field_mut(
        &mut self,
        type_name: &str,
        field_name: &str,
    ) -> Option<&mut crate::schema::meta::Field<S>> {
        match self.types.get_mut(type_name) {
            Some(MetaType::Object(o)) => o.fields.iter_mut().find(|f| f.name == *field_name),
            Some(MetaType::Interface(i)) => i.fields.iter_mut().find(|f| f.name == *field_name),
            _ => None,
        }
    }
}

impl<'a, S> TypeType<'a, S> {
    /// Views this [`TypeType`] as a concrete type, if it is one.
    #[inline]
    pub fn to_concrete(&self) -> Option<&'a MetaType<S>> {
        match self {
            TypeType::Concrete(t) => Some(t),
            _ => None,
        }
    }

    /// The concrete type at the innermost position of this [`TypeType`].
    #[inline]
    pub fn innermost_concrete(&self) -> &'a MetaType<S> {
        match self {
            TypeType::Concrete(t) => t,
            TypeType::NonNull(n) | TypeType::List(n) => n.innermost_concrete(),
        }
    }

    /// Whether the outermost wrapper of this [`TypeType`] is non-`null`.
    #[inline]
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeType::NonNull(_))
    }
}

impl<'a, S> fmt::Display for TypeType<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeType::Concrete(t) => f.write_str(t.name()),
            TypeType::List(i) => write!(f, "[{i}]"),
            TypeType::NonNull(i) => write!(f, "{i}!"),
        }
    }
}

impl<S> DirectiveType<S> {
    /// Builds a new [`DirectiveType`] with the given `name` and legal
    /// `locations`.
    pub fn new(name: impl Into<ArcStr>, locations: Vec<DirectiveLocation>) -> DirectiveType<S> {
        DirectiveType {
            name: name.into(),
            description: None,
            locations,
            arguments: vec![],
            is_repeatable: false,
        }
    }

    /// Sets the `description` of this [`DirectiveType`].
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an `argument` to this [`DirectiveType`].
    #[must_use]
    pub fn argument(mut self, argument: Argument<S>) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Marks this [`DirectiveType`] as repeatable.
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.is_repeatable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::Type,
        schema::{builder::build_schema, translate::parse_schema_document},
        value::DefaultScalarValue,
    };

    fn sample() -> super::SchemaType<DefaultScalarValue> {
        build_schema(
            &parse_schema_document(
                "interface Node { id: ID } \
                 interface Timestamped implements Node { id: ID at: Int } \
                 type User implements Node { id: ID } \
                 type Dog { name: String } \
                 union Pet = Dog \
                 type Query { node: Node pet: Pet }",
            )
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn subtype_rules_are_covariant() {
        let schema = sample();

        // Identity and non-null narrowing.
        assert!(schema.is_subtype(&Type::named("Int"), &Type::named("Int")));
        assert!(schema.is_subtype(&Type::non_null_named("Int"), &Type::named("Int")));
        assert!(!schema.is_subtype(&Type::named("Int"), &Type::non_null_named("Int")));

        // Abstract membership.
        assert!(schema.is_subtype(&Type::named("User"), &Type::named("Node")));
        assert!(schema.is_subtype(&Type::named("Dog"), &Type::named("Pet")));
        assert!(!schema.is_subtype(&Type::named("Dog"), &Type::named("Node")));

        // Lists compose element-wise.
        assert!(schema.is_subtype(
            &Type::list(Type::non_null_named("User")),
            &Type::list(Type::named("Node")),
        ));
        assert!(!schema.is_subtype(
            &Type::list(Type::named("User")),
            &Type::named("Node"),
        ));
    }

    #[test]
    fn possible_types_and_implementations() {
        let schema = sample();

        let node = schema.concrete_type_by_name("Node").unwrap();
        let possible = schema
            .possible_types(node)
            .iter()
            .map(|t| t.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(possible, vec!["User"]);

        // Interfaces implementing the interface show up here, objects too.
        let implementations = schema
            .implementations_of("Node")
            .iter()
            .map(|t| t.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(implementations, vec!["Timestamped", "User"]);
    }

    #[test]
    fn make_type_wraps_and_displays() {
        let schema = sample();
        let t = schema.make_type(&Type::non_null_list(Type::non_null_named("User")));
        assert_eq!(t.to_string(), "[User!]!");
        assert!(t.is_non_null());
        assert_eq!(*t.innermost_concrete().name(), "User");
    }
}
