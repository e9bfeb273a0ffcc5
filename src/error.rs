//! Error type raised by resolvers and the execution engine.

use std::fmt;

use crate::value::{MapValue, Value};

/// An error that prevented an operation from executing.
///
/// Carries one or more human-readable messages in the order they were
/// raised. The request dispatcher renders them as the `"errors"` list of the
/// response document; any error raised by a resolver or by the engine while
/// walking a selection set aborts the whole operation.
///
/// [`SchemaError`] converts from anything [`Display`]able, which makes error
/// chaining with the `?` operator a breeze:
///
/// ```rust
/// # use graphql_service::SchemaError;
/// fn get_string(data: Vec<u8>) -> Result<String, SchemaError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
///
/// [`Display`]: fmt::Display
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaError {
    messages: Vec<String>,
}

impl SchemaError {
    /// Constructs a new [`SchemaError`] from a single message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Constructs a new [`SchemaError`] from an ordered list of messages.
    #[must_use]
    pub fn with_messages(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// The messages carried by this error, in the order they were raised.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Renders this error as the `"errors"` list of a response document:
    /// one `{"message": <text>}` map per message.
    #[must_use]
    pub fn into_errors_value(self) -> Value {
        Value::List(
            self.messages
                .into_iter()
                .map(|message| {
                    let mut error = MapValue::with_capacity(1);
                    error.add_field("message", Value::String(message));
                    Value::Map(error)
                })
                .collect(),
        )
    }
}

impl<T: fmt::Display> From<T> for SchemaError {
    fn from(err: T) -> Self {
        Self::new(err.to_string())
    }
}

/// The result of resolving the value of a field of type `T`.
pub type FieldResult<T> = Result<T, SchemaError>;

/// The result of resolving an unspecified field.
pub type ExecutionResult = FieldResult<Value>;
