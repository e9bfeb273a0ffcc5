mod map;

use std::fmt;

use itertools::Itertools as _;

use crate::base64;

pub use self::map::MapValue;

/// Serializable value returned from query and field execution.
///
/// Used by the execution engine and resolvers to build up the response
/// structure, and for everything else that flows through a request
/// dynamically: coerced arguments, variables and directive arguments.
///
/// String-like variants are kept distinct so that output serialization can
/// tell them apart: [`Value::String`] serializes quoted, [`Value::Enum`]
/// unquoted in GraphQL wire form (but as a plain string in JSON), and
/// [`Value::Id`] as its base64 encoding.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    Id(Vec<u8>),
    List(Vec<Value>),
    Map(MapValue),
}

impl Value {
    // CONSTRUCTORS

    /// Constructs a null value.
    #[must_use]
    pub fn null() -> Self {
        Self::Null
    }

    /// Constructs a list value.
    #[must_use]
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    /// Constructs a map value.
    #[must_use]
    pub fn map(m: MapValue) -> Self {
        Self::Map(m)
    }

    // DISCRIMINATORS

    /// Does this value represent null?
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Views the underlying boolean value, if present.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Views the underlying integer value, if present.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Views the underlying float value, if present.
    ///
    /// Integers are widened, since any JSON number is a valid float.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Views the underlying string value, if present.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Views the underlying enum identifier, if present.
    #[must_use]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Views the underlying list value, if present.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Views the underlying map value, if present.
    #[must_use]
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Converts this value into a [`MapValue`].
    ///
    /// Returns [`None`] if the value is not a map.
    #[must_use]
    pub fn into_map(self) -> Option<MapValue> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Enum(name) => write!(f, "{name}"),
            Self::Id(bytes) => write!(f, "\"{}\"", base64::to_base64(bytes)),
            Self::List(list) => write!(f, "[{}]", list.iter().format(", ")),
            Self::Map(map) => write!(
                f,
                "{{{}}}",
                map.iter()
                    .format_with(", ", |(k, v), fmt| fmt(&format_args!("\"{k}\": {v}"))),
            ),
        }
    }
}

impl<T> From<Option<T>> for Value
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

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<MapValue> for Value {
    fn from(m: MapValue) -> Self {
        Self::Map(m)
    }
}
