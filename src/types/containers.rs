use futures::{FutureExt as _, future::BoxFuture};

use crate::{
    error::{ExecutionResult, FieldResult, SchemaError},
    executor::ResolverParams,
    value::Value,
};

use super::{FromValue, ResolveValue};

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> FieldResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }

    fn from_argument(value: Option<&Value>) -> FieldResult<Self> {
        match value {
            None => Ok(None),
            Some(v) => Self::from_value(v),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> FieldResult<Self> {
        match value {
            Value::List(elements) => elements.iter().map(T::from_value).collect(),
            _ => Err(SchemaError::new("not a list")),
        }
    }
}

impl<T: ResolveValue> ResolveValue for Option<T> {
    fn resolve_value(self, params: ResolverParams) -> BoxFuture<'static, ExecutionResult> {
        match self {
            Some(value) => value.resolve_value(params),
            None => futures::future::ready(Ok(Value::Null)).boxed(),
        }
    }
}

impl<T: ResolveValue + Send + 'static> ResolveValue for Vec<T> {
    fn resolve_value(self, params: ResolverParams) -> BoxFuture<'static, ExecutionResult> {
        async move {
            let mut elements = Vec::with_capacity(self.len());

            for element in self {
                elements.push(element.resolve_value(params.clone()).await?);
            }

            Ok(Value::List(elements))
        }
        .boxed()
    }
}
