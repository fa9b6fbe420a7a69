//! Serialization of responses and errors into the standard GraphQL
//! response shape.
//!
//! Source positions serialize one-based, as the response format expects.

use serde::ser::{self, SerializeMap, SerializeSeq};

use crate::{
    ast::InputValue,
    executor::{ExecutionError, ExecutionOutput, PathSegment},
    parser::SourcePosition,
    validation::RuleError,
    value::{Object, ScalarValue, Value},
    GraphQLError,
};

impl ser::Serialize for SourcePosition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("line", &(self.line() + 1))?;
        map.serialize_entry("column", &(self.column() + 1))?;
        map.end()
    }
}

impl ser::Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            PathSegment::Field(name) => serializer.serialize_str(name),
            PathSegment::Index(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

impl<T: ScalarValue> ser::Serialize for Value<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Scalar(s) => s.serialize(serializer),
            Value::List(l) => l.serialize(serializer),
            Value::Object(o) => o.serialize(serializer),
        }
    }
}

impl<T: ScalarValue> ser::Serialize for Object<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.field_count()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<T: ScalarValue> ser::Serialize for InputValue<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            InputValue::Null | InputValue::Variable(_) => serializer.serialize_none(),
            InputValue::Scalar(s) => s.serialize(serializer),
            InputValue::Enum(e) => serializer.serialize_str(e),
            InputValue::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for v in l {
                    seq.serialize_element(&v.item)?;
                }
                seq.end()
            }
            InputValue::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (k, v) in o {
                    map.serialize_entry(&k.item, &v.item)?;
                }
                map.end()
            }
        }
    }
}

impl<T: ScalarValue> ser::Serialize for ExecutionError<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(4))?;

        map.serialize_entry("message", self.error().message())?;
        map.serialize_entry("locations", &[*self.location()])?;
        map.serialize_entry("path", self.path())?;

        if !self.error().extensions().is_null() {
            map.serialize_entry("extensions", self.error().extensions())?;
        }

        map.end()
    }
}

impl<T: ScalarValue> ser::Serialize for ExecutionOutput<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let len = if self.errors.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;

        map.serialize_entry("data", &self.data)?;
        if !self.errors.is_empty() {
            map.serialize_entry("errors", &self.errors)?;
        }

        map.end()
    }
}

impl ser::Serialize for RuleError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("message", self.message())?;
        map.serialize_entry("locations", self.locations())?;
        map.end()
    }
}

#[derive(serde::Serialize)]
struct SerializeHelper {
    message: &'static str,
}

impl ser::Serialize for GraphQLError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            GraphQLError::ParseError(e) => [SerializeHelperOwned {
                message: e.message().into(),
            }]
            .serialize(serializer),
            GraphQLError::ValidationError(errs) => errs.serialize(serializer),
            GraphQLError::NoOperationProvided => [SerializeHelper {
                message: "Must provide an operation",
            }]
            .serialize(serializer),
            GraphQLError::MultipleOperationsProvided => [SerializeHelper {
                message: "Must provide operation name if query contains multiple operations",
            }]
            .serialize(serializer),
            GraphQLError::UnknownOperationName => [SerializeHelper {
                message: "Unknown operation",
            }]
            .serialize(serializer),
            GraphQLError::NotSubscription => [SerializeHelper {
                message: "Expected subscription, got query or mutation",
            }]
            .serialize(serializer),
        }
    }
}

#[derive(serde::Serialize)]
struct SerializeHelperOwned {
    message: String,
}

#[cfg(test)]
mod tests {
    use crate::value::Value;

    #[test]
    fn value_serializes_to_json() {
        let v: Value = Value::object(vec![
            ("str", Value::scalar("hi")),
            ("int", Value::scalar(3)),
            ("null", Value::Null),
            ("list", Value::list(vec![Value::scalar(true)])),
        ]);
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"str":"hi","int":3,"null":null,"list":[true]}"#,
        );
    }

    #[test]
    fn execution_error_shape() {
        use crate::executor::{ExecutionError, FieldError, PathSegment};
        use crate::parser::SourcePosition;

        let e: ExecutionError = ExecutionError::new(
            SourcePosition::new(1, 2),
            vec![
                PathSegment::Field("hero".into()),
                PathSegment::Index(0),
                PathSegment::Field("name".into()),
            ],
            FieldError::from("boom"),
        );
        assert_eq!(
            serde_json::to_string(&e).unwrap(),
            r#"{"message":"boom","locations":[{"line":2,"column":3}],"path":["hero",0,"name"]}"#,
        );
    }
}
