//! Free-form key/value metadata attached to blog records.
//!
//! # Invariants
//! - Keys are unique; insertion replaces the previous value.
//! - Persisted as one JSON object in a nullable TEXT column; an empty map is
//!   stored as `NULL`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered string-keyed metadata map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the entry as a string slice when it holds a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes for the `metadata` column.
    pub fn to_column(&self) -> Result<Option<String>, serde_json::Error> {
        if self.0.is_empty() {
            return Ok(None);
        }
        serde_json::to_string(&self.0).map(Some)
    }

    /// Decodes a `metadata` column value. `NULL` and blank text decode to an
    /// empty map.
    pub fn from_column(value: Option<&str>) -> Result<Self, serde_json::Error> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => serde_json::from_str(text).map(Self),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Metadata;
    use serde_json::json;

    #[test]
    fn empty_metadata_is_stored_as_null() {
        assert_eq!(Metadata::new().to_column().unwrap(), None);
        assert!(Metadata::from_column(None).unwrap().is_empty());
        assert!(Metadata::from_column(Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn column_codec_keeps_nested_values() {
        let mut metadata = Metadata::new();
        metadata.insert("meta", "data");
        metadata.insert("views", 42);
        metadata.insert("extra", json!({ "pinned": true }));

        let column = metadata.to_column().unwrap().expect("non-empty map");
        let decoded = Metadata::from_column(Some(column.as_str())).unwrap();
        assert_eq!(decoded.get_str("meta"), Some("data"));
        assert_eq!(decoded.get("views"), Some(&json!(42)));
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn collected_pairs_can_be_removed_again() {
        let mut metadata: Metadata = [("lang", "rust"), ("draft", "yes")].into_iter().collect();
        assert_eq!(metadata.remove("draft"), Some(json!("yes")));
        assert_eq!(metadata.remove("draft"), None);
        assert_eq!(metadata.to_column().unwrap().as_deref(), Some(r#"{"lang":"rust"}"#));
    }

    #[test]
    fn from_column_rejects_non_object_json() {
        assert!(Metadata::from_column(Some("[1, 2]")).is_err());
        assert!(Metadata::from_column(Some("{broken")).is_err());
    }
}
