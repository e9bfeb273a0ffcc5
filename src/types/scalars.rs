use derive_more::with_trait::{Display, From};
use futures::{FutureExt as _, future::BoxFuture};

use crate::{
    base64,
    error::{ExecutionResult, FieldResult, SchemaError},
    executor::ResolverParams,
    value::{MapValue, Value},
};

use super::{FromValue, ResolveValue};

/// An opaque identifier, backed by raw bytes in memory.
///
/// On the wire an `ID` is a Base64 string; [`FromValue`] decodes it and
/// [`ResolveValue`] produces a [`Value::Id`] which serializes back to
/// Base64.
#[derive(Clone, Debug, Default, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
#[display("{}", base64::to_base64(&self.0))]
pub struct ID(Vec<u8>);

impl ID {
    /// Constructs a new [`ID`] from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw bytes of this [`ID`].
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Releases the raw bytes of this [`ID`].
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<ID> for Value {
    fn from(id: ID) -> Self {
        Self::Id(id.0)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> FieldResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| SchemaError::new("not a boolean"))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> FieldResult<Self> {
        value
            .as_int()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| SchemaError::new("not an integer"))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> FieldResult<Self> {
        value
            .as_int()
            .ok_or_else(|| SchemaError::new("not an integer"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> FieldResult<Self> {
        value
            .as_float()
            .ok_or_else(|| SchemaError::new("not a float"))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> FieldResult<Self> {
        value
            .as_string()
            .map(Into::into)
            .ok_or_else(|| SchemaError::new("not a string"))
    }
}

impl FromValue for ID {
    fn from_value(value: &Value) -> FieldResult<Self> {
        match value {
            Value::Id(bytes) => Ok(Self(bytes.clone())),
            Value::String(encoded) => base64::from_base64(encoded).map(Self),
            _ => Err(SchemaError::new("not a string")),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> FieldResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for MapValue {
    fn from_value(value: &Value) -> FieldResult<Self> {
        value
            .as_map()
            .cloned()
            .ok_or_else(|| SchemaError::new("not an object"))
    }
}

impl ResolveValue for Value {
    fn resolve_value(self, _: ResolverParams) -> BoxFuture<'static, ExecutionResult> {
        futures::future::ready(Ok(self)).boxed()
    }
}

/// Implements [`ResolveValue`] for a scalar type through its [`Value`]
/// conversion, ignoring the field's sub-selection.
macro_rules! resolve_scalar {
    ($($ty:ty)*) => {$(
        impl ResolveValue for $ty {
            fn resolve_value(self, params: ResolverParams) -> BoxFuture<'static, ExecutionResult> {
                Value::from(self).resolve_value(params)
            }
        }
    )*};
}

resolve_scalar!(bool i32 i64 f64 String ID MapValue);

impl ResolveValue for &'static str {
    fn resolve_value(self, params: ResolverParams) -> BoxFuture<'static, ExecutionResult> {
        Value::from(self).resolve_value(params)
    }
}
