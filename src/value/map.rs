use std::{slice, vec};

use super::Value;

/// An ordered map [`Value`].
///
/// Entries keep the order in which fields were added, which is how response
/// key ordering is made observable. Duplicate keys are permitted: merging
/// fragments may legitimately produce the same alias twice, and every entry
/// is preserved on iteration. [`MapValue::get_field_value`] resolves
/// duplicates as last-write-wins; serializers that cannot represent
/// duplicate keys must apply the same rule.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapValue {
    members: Vec<(String, Value)>,
}

impl MapValue {
    /// Creates a new empty [`MapValue`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`MapValue`] with a fixed number of preallocated slots
    /// for field-value pairs.
    #[must_use]
    pub fn with_capacity(size: usize) -> Self {
        Self {
            members: Vec::with_capacity(size),
        }
    }

    /// Appends a new field with a value.
    ///
    /// An existing field with the same key is not replaced; both entries are
    /// kept in insertion order.
    pub fn add_field(&mut self, key: impl Into<String>, value: Value) {
        self.members.push((key.into(), value));
    }

    /// Checks if the map contains a field with the given key.
    #[must_use]
    pub fn contains_field(&self, key: &str) -> bool {
        self.members.iter().any(|(k, _)| k == key)
    }

    /// Gets the value for a given field.
    ///
    /// When the key occurs more than once, the most recently added value
    /// wins.
    #[must_use]
    pub fn get_field_value(&self, key: &str) -> Option<&Value> {
        self.members
            .iter()
            .rev()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// The current number of fields, duplicates included.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.members.len()
    }

    /// Indicates whether the map holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Gets an iterator over all field-value pairs, in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, (String, Value)> {
        self.members.iter()
    }
}

impl IntoIterator for MapValue {
    type Item = (String, Value);
    type IntoIter = vec::IntoIter<(String, Value)>;

    /// Releases the entries, in insertion order.
    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a MapValue {
    type Item = &'a (String, Value);
    type IntoIter = slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl<K: Into<String>> Extend<(K, Value)> for MapValue {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.add_field(k, v);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0);
        map.extend(iter);
        map
    }
}
