//! Capability traits for user-provided callbacks.
//!
//! A schema built from SDL carries no behavior of its own; resolvers,
//! subscription sources and abstract-type discriminators are attached
//! afterwards and held by the schema behind shared ownership, since one
//! schema is reused across many requests.
//!
//! Every callback kind gets its own trait. Plain functions and closures
//! implement them through the adapter constructors ([`resolver`],
//! [`stream_resolver`], [`type_resolver`]), so attaching behavior stays a
//! one-liner for the common synchronous case while still permitting fully
//! asynchronous implementations.

use std::{any::Any, sync::Arc};

use arcstr::ArcStr;
use futures::future::{self, BoxFuture};
use indexmap::IndexMap;

use crate::{
    ast::InputValue,
    executor::{FieldResult, ValuesStream},
    schema::meta::Argument,
    value::{DefaultScalarValue, ScalarValue, Value},
};

/// Coerced field arguments handed to a resolver.
///
/// Defaults declared on the field definition are already merged in;
/// iteration follows argument definition order.
#[derive(Clone, Debug, PartialEq)]
pub struct Arguments<S = DefaultScalarValue> {
    args: IndexMap<String, InputValue<S>>,
}

impl<S> Arguments<S> {
    #[doc(hidden)]
    pub fn new(
        mut args: IndexMap<String, InputValue<S>>,
        meta_args: &[Argument<S>],
    ) -> Arguments<S>
    where
        S: Clone,
    {
        for arg in meta_args {
            if !args.contains_key(arg.name.as_str()) || args[arg.name.as_str()].is_null() {
                if let Some(ref default_value) = arg.default_value {
                    args.insert(arg.name.to_string(), default_value.clone());
                } else {
                    args.insert(arg.name.to_string(), InputValue::null());
                }
            }
        }

        Arguments { args }
    }

    /// An empty argument set.
    pub fn none() -> Self {
        Arguments {
            args: IndexMap::new(),
        }
    }

    /// Returns the value of the argument `key`, if present.
    pub fn get(&self, key: &str) -> Option<&InputValue<S>> {
        self.args.get(key)
    }

    /// Returns the string value of the argument `key`, if present.
    pub fn get_string(&self, key: &str) -> Option<&str>
    where
        S: ScalarValue,
    {
        self.get(key).and_then(InputValue::as_string_value)
    }

    /// Returns the int value of the argument `key`, if present.
    pub fn get_int(&self, key: &str) -> Option<i32>
    where
        S: ScalarValue,
    {
        self.get(key).and_then(|v| v.as_scalar()).and_then(S::as_int)
    }

    /// Returns the boolean value of the argument `key`, if present.
    pub fn get_boolean(&self, key: &str) -> Option<bool>
    where
        S: ScalarValue,
    {
        self.get(key).and_then(InputValue::as_boolean_value)
    }

    /// Iterates over all argument name/value pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue<S>)> {
        self.args.iter()
    }
}

/// Everything a resolver callback gets to see about the field it resolves.
pub struct ResolveInfo<'a, S = DefaultScalarValue> {
    /// Name of the field being resolved (not its response alias).
    pub field_name: &'a str,

    /// The value the enclosing object resolved to; the root value at the
    /// top level, or the source event during subscription execution.
    pub parent: &'a Value<S>,

    /// Coerced arguments with defaults applied.
    pub arguments: &'a Arguments<S>,

    /// The opaque per-request context. Never inspected by this crate,
    /// passed through unchanged.
    pub context: &'a (dyn Any + Send + Sync),
}

/// Callback resolving one field of an object type into a value.
pub trait ResolveField<S = DefaultScalarValue>: Send + Sync {
    /// Produces the field's value for the given parent and arguments.
    fn resolve_field<'a>(&'a self, info: ResolveInfo<'a, S>) -> BoxFuture<'a, FieldResult<Value<S>, S>>;
}

/// Callback resolving the root subscription field into a source event
/// stream.
pub trait ResolveStream<S = DefaultScalarValue>: Send + Sync {
    /// Produces the stream of source events this subscription maps over.
    fn resolve_stream<'a>(
        &'a self,
        info: ResolveInfo<'a, S>,
    ) -> BoxFuture<'a, FieldResult<ValuesStream<S>, S>>;
}

/// Callback discriminating the concrete object type of an abstract
/// (interface or union) value.
pub trait ResolveAbstractType<S = DefaultScalarValue>: Send + Sync {
    /// Returns the name of the concrete object type `value` belongs to.
    fn resolve_abstract_type<'a>(
        &'a self,
        value: &'a Value<S>,
        context: &'a (dyn Any + Send + Sync),
    ) -> BoxFuture<'a, FieldResult<ArcStr, S>>;
}

/// Predicate answering whether a value belongs to a particular object type.
///
/// Used as a fallback when an abstract type has no
/// [`ResolveAbstractType`] callback.
pub trait IsTypeOf<S = DefaultScalarValue>: Send + Sync {
    /// Checks whether `value` is of the object type this predicate is
    /// attached to.
    fn is_type_of(&self, value: &Value<S>, context: &(dyn Any + Send + Sync)) -> bool;
}

struct FnBoxResolver<F>(F);

impl<S, F> ResolveField<S> for FnBoxResolver<F>
where
    F: for<'a> Fn(ResolveInfo<'a, S>) -> BoxFuture<'a, FieldResult<Value<S>, S>> + Send + Sync,
{
    fn resolve_field<'a>(&'a self, info: ResolveInfo<'a, S>) -> BoxFuture<'a, FieldResult<Value<S>, S>> {
        (self.0)(info)
    }
}

struct FnBoxStreamResolver<F>(F);

impl<S, F> ResolveStream<S> for FnBoxStreamResolver<F>
where
    F: for<'a> Fn(ResolveInfo<'a, S>) -> BoxFuture<'a, FieldResult<ValuesStream<S>, S>>
        + Send
        + Sync,
{
    fn resolve_stream<'a>(
        &'a self,
        info: ResolveInfo<'a, S>,
    ) -> BoxFuture<'a, FieldResult<ValuesStream<S>, S>> {
        (self.0)(info)
    }
}

struct FnResolver<F>(F);

impl<S, F> ResolveField<S> for FnResolver<F>
where
    S: ScalarValue,
    F: for<'a> Fn(ResolveInfo<'a, S>) -> FieldResult<Value<S>, S> + Send + Sync,
{
    fn resolve_field<'a>(&'a self, info: ResolveInfo<'a, S>) -> BoxFuture<'a, FieldResult<Value<S>, S>> {
        Box::pin(future::ready((self.0)(info)))
    }
}

struct FnStreamResolver<F>(F);

impl<S, F> ResolveStream<S> for FnStreamResolver<F>
where
    S: ScalarValue,
    F: for<'a> Fn(ResolveInfo<'a, S>) -> FieldResult<ValuesStream<S>, S> + Send + Sync,
{
    fn resolve_stream<'a>(
        &'a self,
        info: ResolveInfo<'a, S>,
    ) -> BoxFuture<'a, FieldResult<ValuesStream<S>, S>> {
        Box::pin(future::ready((self.0)(info)))
    }
}

struct FnTypeResolver<F>(F);

impl<S, F> ResolveAbstractType<S> for FnTypeResolver<F>
where
    S: ScalarValue,
    F: Fn(&Value<S>, &(dyn Any + Send + Sync)) -> FieldResult<ArcStr, S> + Send + Sync,
{
    fn resolve_abstract_type<'a>(
        &'a self,
        value: &'a Value<S>,
        context: &'a (dyn Any + Send + Sync),
    ) -> BoxFuture<'a, FieldResult<ArcStr, S>> {
        Box::pin(future::ready((self.0)(value, context)))
    }
}

struct FnIsTypeOf<F>(F);

impl<S, F> IsTypeOf<S> for FnIsTypeOf<F>
where
    S: ScalarValue,
    F: Fn(&Value<S>, &(dyn Any + Send + Sync)) -> bool + Send + Sync,
{
    fn is_type_of(&self, value: &Value<S>, context: &(dyn Any + Send + Sync)) -> bool {
        (self.0)(value, context)
    }
}

/// Wraps a synchronous function into a shareable field resolver.
pub fn resolver<S, F>(f: F) -> Arc<dyn ResolveField<S>>
where
    S: ScalarValue,
    F: for<'a> Fn(ResolveInfo<'a, S>) -> FieldResult<Value<S>, S> + Send + Sync + 'static,
{
    Arc::new(FnResolver(f))
}

/// Wraps a function returning a boxed future into a shareable field
/// resolver, for resolvers that genuinely need to await.
pub fn async_resolver<S, F>(f: F) -> Arc<dyn ResolveField<S>>
where
    S: ScalarValue,
    F: for<'a> Fn(ResolveInfo<'a, S>) -> BoxFuture<'a, FieldResult<Value<S>, S>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnBoxResolver(f))
}

/// Wraps a function returning a boxed future into a shareable subscription
/// source resolver.
pub fn async_stream_resolver<S, F>(f: F) -> Arc<dyn ResolveStream<S>>
where
    S: ScalarValue,
    F: for<'a> Fn(ResolveInfo<'a, S>) -> BoxFuture<'a, FieldResult<ValuesStream<S>, S>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnBoxStreamResolver(f))
}

/// Wraps a synchronous function into a shareable subscription source
/// resolver.
pub fn stream_resolver<S, F>(f: F) -> Arc<dyn ResolveStream<S>>
where
    S: ScalarValue,
    F: for<'a> Fn(ResolveInfo<'a, S>) -> FieldResult<ValuesStream<S>, S> + Send + Sync + 'static,
{
    Arc::new(FnStreamResolver(f))
}

/// Wraps a synchronous function into a shareable abstract-type resolver.
pub fn type_resolver<S, F>(f: F) -> Arc<dyn ResolveAbstractType<S>>
where
    S: ScalarValue,
    F: Fn(&Value<S>, &(dyn Any + Send + Sync)) -> FieldResult<ArcStr, S> + Send + Sync + 'static,
{
    Arc::new(FnTypeResolver(f))
}

/// Wraps a predicate function into a shareable [`IsTypeOf`] check.
pub fn is_type_of<S, F>(f: F) -> Arc<dyn IsTypeOf<S>>
where
    S: ScalarValue,
    F: Fn(&Value<S>, &(dyn Any + Send + Sync)) -> bool + Send + Sync + 'static,
{
    Arc::new(FnIsTypeOf(f))
}

/// The resolver every field falls back to: reads the field's name out of
/// the parent object value, yielding `null` for anything else.
pub(crate) fn default_resolve<S: ScalarValue>(parent: &Value<S>, field_name: &str) -> Value<S> {
    parent
        .as_object_value()
        .and_then(|o| o.get_field_value(field_name))
        .cloned()
        .unwrap_or(Value::Null)
}
