//! Ordered, multi-valued field mapping.

use super::FieldValue;

/// A named field and its ordered values.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    values: Vec<FieldValue>,
}

/// Mapping from field name to an ordered sequence of values.
///
/// - Field names are unique.
/// - Iteration follows insertion order; replacing a field keeps its position.
/// - A field's value sequence may be empty but is always present.
///
/// `Fields` is what a transform returns as its field update set: a full
/// replacement of the record's mapping, built by cloning the current one
/// and editing the clone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fields {
    entries: Vec<Field>,
}

impl Fields {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mapping with room for `capacity` fields.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Builder form of [`Fields::insert`].
    #[must_use]
    pub fn with<V>(mut self, name: impl Into<String>, values: V) -> Self
    where
        V: IntoIterator,
        V::Item: Into<FieldValue>,
    {
        self.insert(name, values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets a field's values, returning the previous values if it existed.
    ///
    /// An existing field keeps its position; a new field is appended.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: Vec<FieldValue>,
    ) -> Option<Vec<FieldValue>> {
        let name = name.into();
        match self.position(&name) {
            Some(pos) => Some(std::mem::replace(&mut self.entries[pos].values, values)),
            None => {
                self.entries.push(Field { name, values });
                None
            }
        }
    }

    /// Appends a single value to a field, creating the field if needed.
    pub fn push_value(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(pos) => self.entries[pos].values.push(value),
            None => self.entries.push(Field {
                name,
                values: vec![value],
            }),
        }
    }

    /// Removes a field, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<FieldValue>> {
        let pos = self.position(name)?;
        Some(self.entries.remove(pos).values)
    }

    /// Returns a field's values.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[FieldValue]> {
        self.position(name).map(|pos| self.entries[pos].values.as_slice())
    }

    /// Returns the first non-null value of a field.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)?.iter().find(|v| !v.is_null())
    }

    /// Returns true if the field exists (even with no values).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|f| f.name.as_str())
    }

    /// Iterates `(name, values)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldValue])> {
        self.entries
            .iter()
            .map(|f| (f.name.as_str(), f.values.as_slice()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|f| f.name == name)
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<FieldValue>)> for Fields {
    fn from_iter<I: IntoIterator<Item = (N, Vec<FieldValue>)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        fields.extend(iter);
        fields
    }
}

impl<N: Into<String>> Extend<(N, Vec<FieldValue>)> for Fields {
    fn extend<I: IntoIterator<Item = (N, Vec<FieldValue>)>>(&mut self, iter: I) {
        for (name, values) in iter {
            self.insert(name, values);
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{FieldValue, Fields};
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    /// A field is written as a list, but a bare scalar is accepted on input.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<FieldValue>),
        One(FieldValue),
    }

    impl Serialize for Fields {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (name, values) in self.iter() {
                map.serialize_entry(name, values)?;
            }
            map.end()
        }
    }

    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = Fields;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of field names to values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
            let mut fields = Fields::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, values)) = access.next_entry::<String, OneOrMany>()? {
                let values = match values {
                    OneOrMany::Many(values) => values,
                    OneOrMany::One(value) => vec![value],
                };
                fields.insert(name, values);
            }
            Ok(fields)
        }
    }

    impl<'de> Deserialize<'de> for Fields {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(FieldsVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_kept() {
        let fields = Fields::new()
            .with("title", ["Home"])
            .with("body", ["Welcome"])
            .with("path", ["-1,1066"]);
        let names: Vec<_> = fields.names().collect();
        assert_eq!(names, vec!["title", "body", "path"]);
    }

    #[test]
    fn replacing_keeps_position() {
        let mut fields = Fields::new().with("a", ["1"]).with("b", ["2"]);
        let old = fields.insert("a", vec![FieldValue::text("3")]);

        assert_eq!(old, Some(vec![FieldValue::text("1")]));
        let names: Vec<_> = fields.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(fields.get("a"), Some(&[FieldValue::text("3")][..]));
    }

    #[test]
    fn names_stay_unique() {
        let fields: Fields = vec![
            ("a", vec![FieldValue::text("1")]),
            ("a", vec![FieldValue::text("2")]),
        ]
        .into_iter()
        .collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("a"), Some(&[FieldValue::text("2")][..]));
    }

    #[test]
    fn empty_values_are_present() {
        let fields = Fields::new().with("empty", Vec::<FieldValue>::new());
        assert!(fields.contains("empty"));
        assert_eq!(fields.get("empty"), Some(&[][..]));
        assert_eq!(fields.first("empty"), None);
    }

    #[test]
    fn first_skips_nulls() {
        let fields = Fields::new().with("a", [FieldValue::Null, FieldValue::text("x")]);
        assert_eq!(fields.first("a"), Some(&FieldValue::text("x")));
    }

    #[test]
    fn push_and_remove() {
        let mut fields = Fields::new();
        fields.push_value("tags", "a");
        fields.push_value("tags", "b");
        assert_eq!(fields.get("tags").map(<[_]>::len), Some(2));

        assert!(fields.remove("tags").is_some());
        assert!(fields.remove("tags").is_none());
        assert!(fields.is_empty());
    }
}
