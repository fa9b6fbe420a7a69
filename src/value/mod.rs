//! Resolved values produced during execution.

mod object;
mod scalar;

use std::fmt;

pub use self::{
    object::Object,
    scalar::{DefaultScalarValue, ScalarValue},
};

/// Serializable value returned from query and subscription execution.
///
/// This is this crate's equivalent of the response data a transport layer
/// would serialize to JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<S = DefaultScalarValue> {
    /// Absent or `null` value.
    Null,
    /// Scalar leaf value.
    Scalar(S),
    /// Homogeneous-by-type list of values.
    List(Vec<Value<S>>),
    /// Ordered map of response keys to values.
    Object(Object<S>),
}

impl<S> Value<S> {
    /// Constructs a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Constructs a scalar value.
    pub fn scalar<T>(s: T) -> Self
    where
        S: From<T>,
    {
        Self::Scalar(s.into())
    }

    /// Constructs a list value.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    /// Constructs an object value out of name/value pairs.
    pub fn object<K: Into<String>>(o: Vec<(K, Self)>) -> Self {
        Self::Object(o.into_iter().collect())
    }

    /// Does this value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
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

    /// Views the underlying object, if present.
    pub fn as_object_value(&self) -> Option<&Object<S>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Views the underlying list, if present.
    pub fn as_list_value(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Maps the [`ScalarValue`] type of this [`Value`] into another one.
    pub fn map_scalar_value<Into: ScalarValue>(self) -> Value<Into>
    where
        S: ScalarValue,
    {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(s) => Value::Scalar(s.into_another()),
            Self::List(l) => Value::List(l.into_iter().map(Value::map_scalar_value).collect()),
            Self::Object(o) => Value::Object(
                o.into_iter()
                    .map(|(k, v)| (k, v.map_scalar_value()))
                    .collect(),
            ),
        }
    }
}

impl<S: ScalarValue> fmt::Display for Value<S> {
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
            Self::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    v.fmt(f)?;
                    if i < l.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    write!(f, "\"{k}\": {v}")?;
                    if i < o.field_count() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

impl<S, T> From<Option<T>> for Value<S>
where
    Self: From<T>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl<'a, S: From<String>> From<&'a str> for Value<S> {
    fn from(s: &'a str) -> Self {
        Self::scalar(s.to_owned())
    }
}

impl<S: From<String>> From<String> for Value<S> {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl<S: From<i32>> From<i32> for Value<S> {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl<S: From<f64>> From<f64> for Value<S> {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl<S: From<bool>> From<bool> for Value<S> {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}
