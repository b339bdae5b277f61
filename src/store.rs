//! Path-addressed attribute storage.
//!
//! The store holds the nested attribute tree and knows nothing about events,
//! schemas or business rules. It never coerces values.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::path::AttributePath;

/// A nested attribute tree addressed by dotted paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    root: Map<String, Value>,
}

impl AttributeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded from an attribute tree.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidOptions` if `tree` is not an object.
    /// `null` is treated as an empty tree.
    pub fn from_tree(tree: Value) -> Result<Self, ValidationError> {
        match tree {
            Value::Null => Ok(Self::new()),
            Value::Object(root) => Ok(Self { root }),
            other => Err(ValidationError::InvalidOptions {
                reason: format!("attributes must be an object, got {}", kind_of(&other)),
            }),
        }
    }

    /// The whole attribute tree.
    #[must_use]
    pub const fn tree(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Reads the value at `path`; `None` means absent.
    ///
    /// A path is absent when any segment is missing or when an intermediate
    /// segment holds a non-object value.
    #[must_use]
    pub fn get(&self, path: &AttributePath) -> Option<&Value> {
        let mut segments = path.segments();
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Writes `value` at `path`, materializing missing intermediate objects.
    ///
    /// Intermediate segments that hold a non-object value are replaced by an
    /// empty object. Returns the previous value at `path`, if any.
    pub fn set(&mut self, path: &AttributePath, value: Value) -> Option<Value> {
        let segments: Vec<&str> = path.segments().collect();
        insert_at(&mut self.root, path, &segments, value)
    }

    /// Returns true if a value (including `null`) is stored at `path`.
    #[must_use]
    pub fn contains(&self, path: &AttributePath) -> bool {
        self.get(path).is_some()
    }
}

fn insert_at(
    map: &mut Map<String, Value>,
    path: &AttributePath,
    segments: &[&str],
    value: Value,
) -> Option<Value> {
    let (head, rest) = segments.split_first()?;
    if rest.is_empty() {
        return map.insert((*head).to_string(), value);
    }
    if let Some(Value::Object(child)) = map.get_mut(*head) {
        return insert_at(child, path, rest, value);
    }

    let mut child = Map::new();
    let previous = insert_at(&mut child, path, rest, value);
    if let Some(replaced) = map.insert((*head).to_string(), Value::Object(child)) {
        tracing::debug!(
            path = %path,
            segment = *head,
            replaced = kind_of(&replaced),
            "replacing non-object intermediate value"
        );
    }
    previous
}

/// Human-readable JSON kind name.
pub(crate) const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(raw: &str) -> AttributePath {
        AttributePath::parse(raw).unwrap()
    }

    #[test]
    fn test_get_absent_path() {
        let store = AttributeStore::new();
        assert!(store.get(&path("PersonalDetails.Scale")).is_none());
        assert!(!store.contains(&path("PersonalDetails")));
    }

    #[test]
    fn test_set_materializes_intermediates() {
        let mut store = AttributeStore::new();
        let previous = store.set(&path("ContactDetails.Address.State"), json!("NSW"));
        assert!(previous.is_none());
        assert_eq!(
            store.get(&path("ContactDetails.Address")),
            Some(&json!({"State": "NSW"}))
        );
        assert_eq!(store.get(&path("ContactDetails.Address.State")), Some(&json!("NSW")));
    }

    #[test]
    fn test_set_returns_previous_value() {
        let mut store = AttributeStore::new();
        store.set(&path("PersonalDetails.Scale"), json!("Single"));
        let previous = store.set(&path("PersonalDetails.Scale"), json!("Couple"));
        assert_eq!(previous, Some(json!("Single")));
    }

    #[test]
    fn test_explicit_null_is_present() {
        let mut store = AttributeStore::new();
        store.set(&path("ProductSelection.Extras"), Value::Null);
        assert_eq!(store.get(&path("ProductSelection.Extras")), Some(&Value::Null));
        assert!(store.get(&path("ProductSelection.Extras.Code")).is_none());
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut store = AttributeStore::new();
        store.set(&path("ProductSelection.Combined"), Value::Null);
        store.set(&path("ProductSelection.Combined.Code"), json!("Kickstarter"));
        assert_eq!(
            store.get(&path("ProductSelection.Combined")),
            Some(&json!({"Code": "Kickstarter"}))
        );

        store.set(&path("PersonalDetails.Scale"), json!("Single"));
        let previous = store.set(&path("PersonalDetails.Scale.Kind"), json!("Couple"));
        assert_eq!(previous, None);
        assert_eq!(store.get(&path("PersonalDetails.Scale.Kind")), Some(&json!("Couple")));
        assert_eq!(store.get(&path("ProductSelection.Combined.Code")), Some(&json!("Kickstarter")));
    }

    #[test]
    fn test_set_does_not_coerce() {
        let mut store = AttributeStore::new();
        store.set(&path("ProductSelection.Hospital.Excess"), json!("500"));
        assert_eq!(
            store.get(&path("ProductSelection.Hospital.Excess")),
            Some(&json!("500"))
        );
    }

    #[test]
    fn test_from_tree() {
        let store = AttributeStore::from_tree(json!({"name": "John Smith"})).unwrap();
        assert_eq!(store.tree().get("name"), Some(&json!("John Smith")));

        let empty = AttributeStore::from_tree(Value::Null).unwrap();
        assert!(empty.tree().is_empty());

        assert!(AttributeStore::from_tree(json!([1, 2])).is_err());
    }
}
