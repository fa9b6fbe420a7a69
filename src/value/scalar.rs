use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

/// A trait marking a type that could be used as an internal representation
/// of scalar values.
///
/// The main objective of this abstraction is to allow downstream users to
/// replace the default representation with something that better fits their
/// transport, e.g. a value type carrying 64-bit integers.
///
/// Implementations must be able to represent at least the four spec scalar
/// kinds (`Int`, `Float`, `String`, `Boolean`); the `From` bounds reflect
/// that.
pub trait ScalarValue:
    fmt::Debug
    + fmt::Display
    + PartialEq
    + Clone
    + DeserializeOwned
    + Serialize
    + From<String>
    + From<bool>
    + From<i32>
    + From<f64>
    + Send
    + Sync
    + 'static
{
    /// Represents this [`ScalarValue`] as an integer value.
    #[must_use]
    fn as_int(&self) -> Option<i32>;

    /// Represents this [`ScalarValue`] as a float value.
    ///
    /// Implementations should also answer for integers, as every integer is
    /// representable as a float.
    #[must_use]
    fn as_float(&self) -> Option<f64>;

    /// Represents this [`ScalarValue`] as a [`str`] value.
    #[must_use]
    fn as_str(&self) -> Option<&str>;

    /// Represents this [`ScalarValue`] as a [`String`] value.
    #[must_use]
    fn as_string(&self) -> Option<String>;

    /// Converts this [`ScalarValue`] into a [`String`] value.
    ///
    /// Same as [`ScalarValue::as_string()`], but takes ownership, so allows
    /// to omit redundant cloning.
    #[must_use]
    fn into_string(self) -> Option<String>;

    /// Represents this [`ScalarValue`] as a boolean value.
    #[must_use]
    fn as_boolean(&self) -> Option<bool>;

    /// Converts this [`ScalarValue`] into another one.
    fn into_another<S: ScalarValue>(self) -> S {
        if let Some(i) = self.as_int() {
            S::from(i)
        } else if let Some(f) = self.as_float() {
            S::from(f)
        } else if let Some(b) = self.as_boolean() {
            S::from(b)
        } else if let Some(s) = self.into_string() {
            S::from(s)
        } else {
            unreachable!("`ScalarValue` must represent at least one of the GraphQL spec types")
        }
    }
}

/// The default [`ScalarValue`] representation.
///
/// These variants closely follow the [GraphQL specification][0].
///
/// [0]: https://spec.graphql.org/October2021
#[derive(Clone, Debug, PartialEq, Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum DefaultScalarValue {
    /// `Int` as a signed 32-bit non-fractional value.
    Int(i32),

    /// `Float` as a signed double-precision fractional value.
    Float(f64),

    /// `String` as a UTF-8 character sequence.
    String(String),

    /// `Boolean` as a `true` or `false` value.
    Boolean(bool),
}

impl ScalarValue for DefaultScalarValue {
    fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(f64::from(*i)),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn as_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_string(self) -> Option<String> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn into_another<S: ScalarValue>(self) -> S {
        match self {
            Self::Int(i) => S::from(i),
            Self::Float(f) => S::from(f),
            Self::String(s) => S::from(s),
            Self::Boolean(b) => S::from(b),
        }
    }
}

impl fmt::Display for DefaultScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::String(v) => v.fmt(f),
            Self::Boolean(v) => v.fmt(f),
        }
    }
}

impl From<i32> for DefaultScalarValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for DefaultScalarValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for DefaultScalarValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<'a> From<&'a str> for DefaultScalarValue {
    fn from(s: &'a str) -> Self {
        Self::String(s.into())
    }
}

impl From<bool> for DefaultScalarValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}
