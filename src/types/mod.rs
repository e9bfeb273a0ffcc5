//! Typed adapters between [`Value`]s and native Rust types.
//!
//! GraphQL wraps base types in nullable and list modifiers. On the Rust
//! side the modifier chain is spelled through the type system: an optional
//! list of non-null integers is [`Option`]`<`[`Vec`]`<i32>>`, a list of
//! optional strings is [`Vec`]`<`[`Option`]`<String>>`, and so on. The
//! [`FromValue`] impls for [`Option`] and [`Vec`] peel one modifier each
//! and recurse, and [`ResolveValue`] runs the same chain in reverse when a
//! resolver's native return value is converted back into a [`Value`].

mod containers;
mod scalars;

use futures::future::BoxFuture;

use crate::{
    error::{ExecutionResult, FieldResult, SchemaError},
    executor::ResolverParams,
    value::{MapValue, Value},
};

pub use self::scalars::ID;

/// Conversion from a dynamic [`Value`] into a native type.
///
/// Implemented for the built-in scalars, for [`Value`] and [`MapValue`]
/// themselves (opaque pass-through), and recursively for [`Option`] and
/// [`Vec`]. Conversion failures carry the bare mismatch message
/// (`"not an integer"`, `"not a string"`, ...); [`require`] wraps them with
/// the argument name.
pub trait FromValue: Sized {
    /// Converts a single value to this type.
    fn from_value(value: &Value) -> FieldResult<Self>;

    /// Converts a possibly absent argument to this type.
    ///
    /// An absent argument converts like an explicit `null`; the [`Option`]
    /// impl overrides this to absorb both into [`None`].
    fn from_argument(value: Option<&Value>) -> FieldResult<Self> {
        Self::from_value(value.unwrap_or(&Value::Null))
    }
}

/// Extracts the argument `name` from `arguments`, coercing it to `T`.
///
/// Fails when the argument is missing or malformed, wrapping the coercion
/// failure as `"Invalid argument: <name> message: <inner>"`. Arguments whose
/// type admits `null` should be extracted as [`Option`]`<T>` (or looked up
/// with [`find`]), which turns a missing argument into [`None`] instead of
/// an error.
pub fn require<T: FromValue>(name: &str, arguments: &MapValue) -> FieldResult<T> {
    T::from_argument(arguments.get_field_value(name)).map_err(|err| {
        let inner = err.messages().first().map_or("", String::as_str);
        SchemaError::new(format!("Invalid argument: {name} message: {inner}"))
    })
}

/// Extracts the argument `name` from `arguments` without failing.
///
/// The second element of the pair reports whether a well-formed value was
/// found; on a missing or malformed argument the first element is [`None`].
#[must_use]
pub fn find<T: FromValue>(name: &str, arguments: &MapValue) -> (Option<T>, bool) {
    match require(name, arguments) {
        Ok(value) => (Some(value), true),
        Err(_) => (None, false),
    }
}

/// Conversion of a resolver's native return value into a [`Value`],
/// resolving nested selection sets along the way.
///
/// Scalars ignore the field's sub-selection; a shared
/// [`ObjectType`](crate::ObjectType) resolves recursively against it. The
/// [`Option`] impl turns [`None`] into [`Value::Null`] and the [`Vec`] impl
/// converts element-wise, preserving order.
pub trait ResolveValue {
    /// Converts `self`, resolving any nested selection in `params`.
    fn resolve_value(self, params: ResolverParams) -> BoxFuture<'static, ExecutionResult>;
}
