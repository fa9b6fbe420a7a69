//! The abstract syntax tree consumed by the schema builder and the executor.
//!
//! A [`Document`] is an ordered list of [`Definition`]s covering both
//! executable documents (operations, fragments) and type-system documents
//! (type definitions, extensions, directive definitions, schema
//! definitions). The schema builder ignores executable definitions; the
//! executor ignores type-system definitions.

use std::{borrow::Borrow, fmt, slice, str::FromStr, vec};

use arcstr::ArcStr;

use crate::{
    executor::Variables,
    parser::Spanning,
    schema::model::DirectiveLocation,
    value::{DefaultScalarValue, ScalarValue},
};

/// A GraphQL name: `/[_A-Za-z][_0-9A-Za-z]*/`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name(ArcStr);

impl Name {
    /// Checks whether `input` is a valid GraphQL name.
    pub fn is_valid(input: &str) -> bool {
        for (i, c) in input.chars().enumerate() {
            let is_valid = c.is_ascii_alphabetic() || c == '_' || (i > 0 && c.is_ascii_digit());
            if !is_valid {
                return false;
            }
        }
        !input.is_empty()
    }

    /// Returns this [`Name`] as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_arcstr(&self) -> &ArcStr {
        &self.0
    }

    pub(crate) fn unchecked(s: impl Into<ArcStr>) -> Self {
        Name(s.into())
    }
}

/// Error of parsing an invalid [`Name`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameParseError(String);

impl fmt::Display for NameParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for NameParseError {}

impl FromStr for Name {
    type Err = NameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Name::is_valid(s) {
            Ok(Name(s.into()))
        } else {
            Err(NameParseError(format!(
                "Names must match /^[_a-zA-Z][_a-zA-Z0-9]*$/ but \"{s}\" does not",
            )))
        }
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Type literal in a syntax tree.
///
/// Carries no semantic information and might refer to types that don't
/// exist. Double non-`null` is unrepresentable by construction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// `T`
    Named(ArcStr),
    /// `[T]`
    List(Box<Type>),
    /// `T!`
    NonNullNamed(ArcStr),
    /// `[T]!`
    NonNullList(Box<Type>),
}

impl Type {
    /// A nullable named type literal.
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Type::Named(name.into())
    }

    /// A non-`null` named type literal.
    pub fn non_null_named(name: impl Into<ArcStr>) -> Self {
        Type::NonNullNamed(name.into())
    }

    /// A nullable list of `inner`.
    pub fn list(inner: Type) -> Self {
        Type::List(Box::new(inner))
    }

    /// A non-`null` list of `inner`.
    pub fn non_null_list(inner: Type) -> Self {
        Type::NonNullList(Box::new(inner))
    }

    /// Returns the name of the innermost named type, unpacking lists and
    /// non-`null` wrappers.
    pub fn innermost_name(&self) -> &str {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => n,
            Type::List(l) | Type::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Indicates whether this [`Type`] can only represent non-`null` values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }

    /// Strips one level of non-`null`, if present.
    pub fn into_nullable(self) -> Type {
        match self {
            Type::NonNullNamed(n) => Type::Named(n),
            Type::NonNullList(l) => Type::List(l),
            t => t,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Named(n) => write!(f, "{n}"),
            Type::List(i) => write!(f, "[{i}]"),
            Type::NonNullNamed(n) => write!(f, "{n}!"),
            Type::NonNullList(i) => write!(f, "[{i}]!"),
        }
    }
}

/// A JSON-like value appearing in a query or SDL document, either in-band
/// as literals and default values, or out-of-band as variable values. These
/// are _not_ constant and might contain variables.
///
/// List and object variants are _spanned_, i.e. they contain a reference to
/// their position in the source file, if available.
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue<S = DefaultScalarValue> {
    /// `null`
    Null,
    /// Int, Float, String or Boolean literal.
    Scalar(S),
    /// Enum value literal, e.g. `NORTH`.
    Enum(String),
    /// Variable reference, e.g. `$id`.
    Variable(String),
    /// List literal.
    List(Vec<Spanning<InputValue<S>>>),
    /// Input object literal, ordered.
    Object(Vec<(Spanning<String>, Spanning<InputValue<S>>)>),
}

impl<S> InputValue<S> {
    /// Constructs a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Constructs a scalar value.
    pub fn scalar<T>(v: T) -> Self
    where
        S: From<T>,
    {
        Self::Scalar(v.into())
    }

    /// Constructs an enum value.
    pub fn enum_value(s: impl AsRef<str>) -> Self {
        Self::Enum(s.as_ref().into())
    }

    /// Constructs a variable reference.
    pub fn variable(v: impl AsRef<str>) -> Self {
        Self::Variable(v.as_ref().into())
    }

    /// Constructs an unlocated list out of plain values.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l.into_iter().map(Spanning::unlocated).collect())
    }

    /// Constructs an unlocated object out of plain name/value pairs.
    pub fn object<K: AsRef<str>>(o: Vec<(K, Self)>) -> Self {
        Self::Object(
            o.into_iter()
                .map(|(k, v)| {
                    (
                        Spanning::unlocated(k.as_ref().into()),
                        Spanning::unlocated(v),
                    )
                })
                .collect(),
        )
    }

    /// Resolves all variables of this [`InputValue`] to their actual
    /// `values`.
    ///
    /// If a variable is not present in the `values`:
    /// - Returns [`None`] in case this is an [`InputValue::Variable`].
    /// - Skips the field in case of an [`InputValue::Object`] field.
    /// - Replaces with an [`InputValue::Null`] in case of an
    ///   [`InputValue::List`] element.
    #[must_use]
    pub fn into_const(self, values: &Variables<S>) -> Option<Self>
    where
        S: Clone,
    {
        match self {
            Self::Variable(v) => values.get(&v).cloned(),
            Self::List(l) => Some(Self::List(
                l.into_iter()
                    .map(|s| s.map(|v| v.into_const(values).unwrap_or_else(Self::null)))
                    .collect(),
            )),
            Self::Object(o) => Some(Self::Object(
                o.into_iter()
                    .filter_map(|(sk, sv)| {
                        let span = sv.span;
                        sv.item
                            .into_const(values)
                            .map(|v| (sk, Spanning::new(span, v)))
                    })
                    .collect(),
            )),
            v => Some(v),
        }
    }

    /// Does the value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does the value represent a variable?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Views the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e.as_str()),
            _ => None,
        }
    }

    /// Views the underlying scalar value, if present.
    pub fn as_scalar(&self) -> Option<&S> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Views the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str>
    where
        S: ScalarValue,
    {
        self.as_scalar().and_then(S::as_str)
    }

    /// Views the underlying boolean value, if present.
    pub fn as_boolean_value(&self) -> Option<bool>
    where
        S: ScalarValue,
    {
        self.as_scalar().and_then(S::as_boolean)
    }

    /// Views this [`InputValue`] as a list of its elements, if it is one.
    pub fn to_list_value(&self) -> Option<Vec<&Self>> {
        match self {
            Self::List(l) => Some(l.iter().map(|s| &s.item).collect()),
            _ => None,
        }
    }

    /// Views this [`InputValue`] as its object fields, if it is an object.
    pub fn to_object_value(&self) -> Option<Vec<(&str, &Self)>> {
        match self {
            Self::Object(o) => Some(
                o.iter()
                    .map(|(sk, sv)| (sk.item.as_str(), &sv.item))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Recursively finds all referenced variables.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            Self::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }

    /// Compares equality with another [`InputValue`] ignoring any source
    /// position information.
    pub fn unlocated_eq(&self, other: &Self) -> bool
    where
        S: PartialEq,
    {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Scalar(s1), Self::Scalar(s2)) => s1 == s2,
            (Self::Enum(s1), Self::Enum(s2)) | (Self::Variable(s1), Self::Variable(s2)) => s1 == s2,
            (Self::List(l1), Self::List(l2)) => {
                l1.len() == l2.len()
                    && l1
                        .iter()
                        .zip(l2.iter())
                        .all(|(v1, v2)| v1.item.unlocated_eq(&v2.item))
            }
            (Self::Object(o1), Self::Object(o2)) => {
                o1.len() == o2.len()
                    && o1.iter().all(|(sk1, sv1)| {
                        o2.iter().any(|(sk2, sv2)| {
                            sk1.item == sk2.item && sv1.item.unlocated_eq(&sv2.item)
                        })
                    })
            }
            _ => false,
        }
    }
}

impl<S: ScalarValue> fmt::Display for InputValue<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Scalar(s) => {
                if let Some(s) = s.as_str() {
                    write!(f, "\"{s}\"")
                } else {
                    write!(f, "{s}")
                }
            }
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, spanning) in v.iter().enumerate() {
                    spanning.item.fmt(f)?;
                    if i < v.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    write!(f, "{}: ", k.item)?;
                    v.item.fmt(f)?;
                    if i < o.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

impl<'a, S: From<String>> From<&'a str> for InputValue<S> {
    fn from(s: &'a str) -> Self {
        Self::scalar(s.to_owned())
    }
}

impl<S: From<String>> From<String> for InputValue<S> {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl<S: From<i32>> From<i32> for InputValue<S> {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl<S: From<f64>> From<f64> for InputValue<S> {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl<S: From<bool>> From<bool> for InputValue<S> {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}

/// Arguments applied to a field or directive in an executable document.
#[derive(Clone, Debug, PartialEq)]
pub struct Arguments<S> {
    pub items: Vec<(Spanning<String>, Spanning<InputValue<S>>)>,
}

impl<S> Arguments<S> {
    pub fn into_iter(self) -> vec::IntoIter<(Spanning<String>, Spanning<InputValue<S>>)> {
        self.items.into_iter()
    }

    pub fn iter(&self) -> slice::Iter<(Spanning<String>, Spanning<InputValue<S>>)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue<S>>> {
        self.items
            .iter()
            .find(|(k, _)| k.item == key)
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition<S> {
    pub var_type: Spanning<Type>,
    pub default_value: Option<Spanning<InputValue<S>>>,
    pub directives: Option<Vec<Spanning<Directive<S>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinitions<S> {
    pub items: Vec<(Spanning<String>, VariableDefinition<S>)>,
}

impl<S> VariableDefinitions<S> {
    pub fn iter(&self) -> slice::Iter<(Spanning<String>, VariableDefinition<S>)> {
        self.items.iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field<S> {
    pub alias: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub arguments: Option<Spanning<Arguments<S>>>,
    pub directives: Option<Vec<Spanning<Directive<S>>>>,
    pub selection_set: Option<Vec<Selection<S>>>,
}

impl<S> Field<S> {
    /// The key this field contributes to the response: its alias, if any,
    /// otherwise its name.
    pub fn response_name(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.name).item.as_str()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread<S> {
    pub name: Spanning<String>,
    pub directives: Option<Vec<Spanning<Directive<S>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment<S> {
    pub type_condition: Option<Spanning<String>>,
    pub directives: Option<Vec<Spanning<Directive<S>>>>,
    pub selection_set: Vec<Selection<S>>,
}

/// Entry in a GraphQL selection set.
///
/// This enum represents one of the three variants of a selection that
/// exists in GraphQL: a field, a fragment spread, or an inline fragment.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Selection<S = DefaultScalarValue> {
    Field(Spanning<Field<S>>),
    FragmentSpread(Spanning<FragmentSpread<S>>),
    InlineFragment(Spanning<InlineFragment<S>>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Directive<S> {
    pub name: Spanning<String>,
    pub arguments: Option<Spanning<Arguments<S>>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Operation<S> {
    pub operation_type: OperationType,
    pub name: Option<Spanning<String>>,
    pub variable_definitions: Option<Spanning<VariableDefinitions<S>>>,
    pub directives: Option<Vec<Spanning<Directive<S>>>>,
    pub selection_set: Vec<Selection<S>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fragment<S> {
    pub name: Spanning<String>,
    pub type_condition: Spanning<String>,
    pub directives: Option<Vec<Spanning<Directive<S>>>>,
    pub selection_set: Vec<Selection<S>>,
}

/// `schema { query: Q mutation: M }`
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaDefinition<S> {
    pub description: Option<String>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub operation_types: Vec<Spanning<RootOperationTypeDefinition>>,
}

/// A single `query: TypeName` entry of a schema definition or extension.
#[derive(Clone, Debug, PartialEq)]
pub struct RootOperationTypeDefinition {
    pub operation: OperationType,
    pub type_name: Spanning<Name>,
}

/// `extend schema { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaExtension<S> {
    pub directives: Vec<Spanning<Directive<S>>>,
    pub operation_types: Vec<Spanning<RootOperationTypeDefinition>>,
}

/// `directive @name(args) repeatable? on LOCATIONS`
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub arguments: Vec<InputValueDefinition<S>>,
    pub repeatable: bool,
    pub locations: Vec<Spanning<DirectiveLocation>>,
}

/// An argument or input field definition.
#[derive(Clone, Debug, PartialEq)]
pub struct InputValueDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub value_type: Spanning<Type>,
    pub default_value: Option<Spanning<InputValue<S>>>,
    pub directives: Vec<Spanning<Directive<S>>>,
}

/// A field definition of an object or interface type.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub arguments: Vec<InputValueDefinition<S>>,
    pub field_type: Spanning<Type>,
    pub directives: Vec<Spanning<Directive<S>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarTypeDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTypeDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub implements_interfaces: Vec<Spanning<Name>>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub fields: Vec<FieldDefinition<S>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceTypeDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub implements_interfaces: Vec<Spanning<Name>>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub fields: Vec<FieldDefinition<S>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionTypeDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub members: Vec<Spanning<Name>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumTypeDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub values: Vec<EnumValueDefinition<S>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumValueDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectTypeDefinition<S> {
    pub description: Option<String>,
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub fields: Vec<InputValueDefinition<S>>,
}

/// One of the six type definition kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDefinition<S = DefaultScalarValue> {
    Scalar(ScalarTypeDefinition<S>),
    Object(ObjectTypeDefinition<S>),
    Interface(InterfaceTypeDefinition<S>),
    Union(UnionTypeDefinition<S>),
    Enum(EnumTypeDefinition<S>),
    InputObject(InputObjectTypeDefinition<S>),
}

impl<S> TypeDefinition<S> {
    /// The name this definition introduces.
    pub fn name(&self) -> &Spanning<Name> {
        match self {
            TypeDefinition::Scalar(d) => &d.name,
            TypeDefinition::Object(d) => &d.name,
            TypeDefinition::Interface(d) => &d.name,
            TypeDefinition::Union(d) => &d.name,
            TypeDefinition::Enum(d) => &d.name,
            TypeDefinition::InputObject(d) => &d.name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarTypeExtension<S> {
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTypeExtension<S> {
    pub name: Spanning<Name>,
    pub implements_interfaces: Vec<Spanning<Name>>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub fields: Vec<FieldDefinition<S>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceTypeExtension<S> {
    pub name: Spanning<Name>,
    pub implements_interfaces: Vec<Spanning<Name>>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub fields: Vec<FieldDefinition<S>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionTypeExtension<S> {
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub members: Vec<Spanning<Name>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumTypeExtension<S> {
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub values: Vec<EnumValueDefinition<S>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectTypeExtension<S> {
    pub name: Spanning<Name>,
    pub directives: Vec<Spanning<Directive<S>>>,
    pub fields: Vec<InputValueDefinition<S>>,
}

/// One of the six `extend type`-family clauses.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExtension<S = DefaultScalarValue> {
    Scalar(ScalarTypeExtension<S>),
    Object(ObjectTypeExtension<S>),
    Interface(InterfaceTypeExtension<S>),
    Union(UnionTypeExtension<S>),
    Enum(EnumTypeExtension<S>),
    InputObject(InputObjectTypeExtension<S>),
}

impl<S> TypeExtension<S> {
    /// The name of the type this extension targets.
    pub fn target(&self) -> &Spanning<Name> {
        match self {
            TypeExtension::Scalar(e) => &e.name,
            TypeExtension::Object(e) => &e.name,
            TypeExtension::Interface(e) => &e.name,
            TypeExtension::Union(e) => &e.name,
            TypeExtension::Enum(e) => &e.name,
            TypeExtension::InputObject(e) => &e.name,
        }
    }
}

/// A single definition of a [`Document`].
#[derive(Clone, Debug, PartialEq)]
pub enum Definition<S = DefaultScalarValue> {
    Operation(Spanning<Operation<S>>),
    Fragment(Spanning<Fragment<S>>),
    Schema(Spanning<SchemaDefinition<S>>),
    SchemaExtension(Spanning<SchemaExtension<S>>),
    Type(Spanning<TypeDefinition<S>>),
    TypeExtension(Spanning<TypeExtension<S>>),
    Directive(Spanning<DirectiveDefinition<S>>),
}

/// An ordered list of definitions, executable and type-system alike.
pub type Document<S = DefaultScalarValue> = Vec<Definition<S>>;

#[cfg(test)]
mod tests {
    use super::{InputValue, Name, Type};

    #[test]
    fn name_validity() {
        assert!(Name::is_valid("Foo"));
        assert!(Name::is_valid("foo42"));
        assert!(Name::is_valid("_Foo"));
        assert!(Name::is_valid("_42Foo"));

        assert!(!Name::is_valid(""));
        assert!(!Name::is_valid("42_Foo"));
        assert!(!Name::is_valid("Foo-42"));
        assert!(!Name::is_valid("Foo???"));
    }

    #[test]
    fn type_display() {
        assert_eq!(Type::named("Int").to_string(), "Int");
        assert_eq!(Type::non_null_named("Int").to_string(), "Int!");
        assert_eq!(Type::list(Type::named("Int")).to_string(), "[Int]");
        assert_eq!(
            Type::non_null_list(Type::non_null_named("Int")).to_string(),
            "[Int!]!",
        );
    }

    #[test]
    fn input_value_display() {
        let v: InputValue = InputValue::null();
        assert_eq!(v.to_string(), "null");

        let v: InputValue = InputValue::scalar(123);
        assert_eq!(v.to_string(), "123");

        let v: InputValue = InputValue::scalar("FOO".to_owned());
        assert_eq!(v.to_string(), "\"FOO\"");

        let v: InputValue = InputValue::enum_value("BAR");
        assert_eq!(v.to_string(), "BAR");

        let v: InputValue = InputValue::variable("baz");
        assert_eq!(v.to_string(), "$baz");

        let v: InputValue = InputValue::list(vec![1.into(), 2.into()]);
        assert_eq!(v.to_string(), "[1, 2]");

        let v: InputValue = InputValue::object(vec![("foo", 1.into()), ("bar", 2.into())]);
        assert_eq!(v.to_string(), "{foo: 1, bar: 2}");
    }
}
