//! [`serde`] serialization of response values and errors.
//!
//! The engine does not pick a transport, but the JSON mapping is part of
//! its wire contract: enums serialize as plain strings, IDs as their Base64
//! encoding, and maps emit every entry in insertion order — duplicate keys
//! included. A consumer whose document model cannot represent duplicate
//! keys must dedupe with last-wins, matching
//! [`MapValue::get_field_value`].

use serde::ser::{Serialize, SerializeMap as _, Serializer};

use crate::{
    base64,
    error::SchemaError,
    value::{MapValue, Value},
};

#[derive(serde::Serialize)]
struct SerializeHelper<'a> {
    message: &'a str,
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::String(s) | Self::Enum(s) => serializer.serialize_str(s),
            Self::Id(bytes) => serializer.serialize_str(&base64::to_base64(bytes)),
            Self::List(list) => list.serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
        }
    }
}

impl Serialize for MapValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.field_count()))?;

        for (key, value) in self.iter() {
            map.serialize_key(key)?;
            map.serialize_value(value)?;
        }

        map.end()
    }
}

impl Serialize for SchemaError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(
            self.messages()
                .iter()
                .map(|message| SerializeHelper { message }),
        )
    }
}
