//! Product selection structures and the extras catalog.
//!
//! Extras are stored as a structure rather than a code: a `Code`, an optional
//! `BaseBundle` and an ordered list of add-on `Bundles`. The catalog maps
//! human codes (e.g. `CorePlus`) to the canonical structure for each code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codes::ExtrasCode;
use crate::error::{ModelError, ModelResult, ValidationError};

/// Canonical extras structure as stored under `ProductSelection.Extras`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtrasSelection {
    /// Product code (`Bundles` for bundle-built products).
    pub code: String,
    /// Base bundle, if any.
    pub base_bundle: Option<String>,
    /// Ordered add-on bundle names.
    #[serde(default)]
    pub bundles: Vec<String>,
}

impl ExtrasSelection {
    /// The fixed structure for "no extras".
    #[must_use]
    pub fn none() -> Self {
        Self {
            code: ExtrasCode::None.as_ref().to_string(),
            base_bundle: None,
            bundles: Vec::new(),
        }
    }

    /// A selection built from a base bundle plus add-ons.
    #[must_use]
    pub fn bundled(base_bundle: impl Into<String>, bundles: Vec<String>) -> Self {
        Self {
            code: ExtrasCode::BUNDLED.to_string(),
            base_bundle: Some(base_bundle.into()),
            bundles,
        }
    }

    /// Returns true for the "no extras" code.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.code == ExtrasCode::None.as_ref()
    }

    /// The structure as an attribute value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "Code": self.code,
            "BaseBundle": self.base_bundle,
            "Bundles": self.bundles,
        })
    }
}

/// Mapping from extras code to canonical structure.
///
/// Structures are kept exactly as supplied, including keys beyond `Code`,
/// `BaseBundle` and `Bundles`, so a stored copy always maps back to its code.
/// Lookups by structure are linear scans in insertion order; catalogs are
/// expected to hold a handful of products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCatalog {
    entries: Vec<(String, Value)>,
}

impl ProductCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the structure for a code.
    pub fn insert(&mut self, code: impl Into<String>, selection: &ExtrasSelection) {
        self.put(code.into(), selection.to_value());
    }

    /// Adds or replaces a raw structure for a code.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidOptions` unless `structure` is an
    /// object with a string `Code`.
    pub fn insert_raw(&mut self, code: impl Into<String>, structure: Value) -> Result<(), ValidationError> {
        let code = code.into();
        if !structure.get("Code").is_some_and(Value::is_string) {
            return Err(ValidationError::InvalidOptions {
                reason: format!("extras structure for '{code}' has no string Code"),
            });
        }
        self.put(code, structure);
        Ok(())
    }

    fn put(&mut self, code: String, structure: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == code) {
            entry.1 = structure;
        } else {
            self.entries.push((code, structure));
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, code: impl Into<String>, selection: &ExtrasSelection) -> Self {
        self.insert(code, selection);
        self
    }

    /// Parses a catalog from a JSON object of `code -> structure`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidOptions` if `value` is not an object or
    /// an entry lacks a string `Code`.
    pub fn from_json(value: &Value) -> ModelResult<Self> {
        let Value::Object(map) = value else {
            return Err(ModelError::from(ValidationError::InvalidOptions {
                reason: "extras catalog must be an object".to_string(),
            }));
        };

        let mut catalog = Self::new();
        for (code, structure) in map {
            catalog.insert_raw(code.clone(), structure.clone())?;
        }
        Ok(catalog)
    }

    /// The structure for a code, exactly as supplied.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Value> {
        self.entries.iter().find(|(c, _)| c == code).map(|(_, s)| s)
    }

    /// Typed view of the structure for a code.
    #[must_use]
    pub fn selection(&self, code: &str) -> Option<ExtrasSelection> {
        serde_json::from_value(self.get(code)?.clone()).ok()
    }

    /// The first code whose structure deep-equals `stored`.
    #[must_use]
    pub fn code_for(&self, stored: &Value) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, structure)| structure == stored)
            .map(|(code, _)| code.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(code, structure)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, s)| (c.as_str(), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> ProductCatalog {
        ProductCatalog::from_json(&json!({
            "Core": {"Code": "Bundles", "BaseBundle": "Core", "Bundles": []},
            "CorePlus": {"Code": "Bundles", "BaseBundle": "CorePlus", "Bundles": []},
            "Top": {"Code": "Top", "BaseBundle": "Top", "Bundles": []},
            "Wellbeing": {"Code": "Bundles", "BaseBundle": "Core", "Bundles": ["Wellbeing"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_none_structure() {
        let none = ExtrasSelection::none();
        assert!(none.is_none());
        assert_eq!(
            none.to_value(),
            json!({"Code": "None", "BaseBundle": null, "Bundles": []})
        );
    }

    #[test]
    fn test_to_value_matches_serde() {
        let selection = ExtrasSelection::bundled("Core", vec!["Wellbeing".to_string()]);
        assert_eq!(selection.to_value(), serde_json::to_value(&selection).unwrap());
    }

    #[test]
    fn test_catalog_lookup_by_code() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 4);
        let top = catalog.selection("Top").unwrap();
        assert_eq!(top.code, "Top");
        assert_eq!(catalog.get("Top"), Some(&json!({"Code": "Top", "BaseBundle": "Top", "Bundles": []})));
        assert!(catalog.get("Platinum").is_none());
    }

    #[test]
    fn test_catalog_reverse_lookup_is_structural() {
        let catalog = catalog();
        let stored = json!({"Code": "Bundles", "BaseBundle": "CorePlus", "Bundles": []});
        assert_eq!(catalog.code_for(&stored), Some("CorePlus"));

        let reordered = json!({"Bundles": [], "BaseBundle": "Core", "Code": "Bundles"});
        assert_eq!(catalog.code_for(&reordered), Some("Core"));

        let extra_bundle = json!({"Code": "Bundles", "BaseBundle": "Core", "Bundles": ["Optical"]});
        assert_eq!(catalog.code_for(&extra_bundle), None);
        assert_eq!(catalog.code_for(&Value::Null), None);
    }

    #[test]
    fn test_insert_replaces_existing_code() {
        let mut catalog = ProductCatalog::new().with("Top", &ExtrasSelection::bundled("Core", vec![]));
        catalog.insert("Top", &ExtrasSelection::bundled("Top", vec![]));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.selection("Top").unwrap().base_bundle.as_deref(), Some("Top"));
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(ProductCatalog::from_json(&json!([])).is_err());
        assert!(ProductCatalog::from_json(&json!({"Core": {"BaseBundle": "Core"}})).is_err());
        assert!(ProductCatalog::from_json(&json!({"Core": {"Code": 7}})).is_err());
        assert!(ProductCatalog::from_json(&json!({"Core": "Core"})).is_err());
    }

    #[test]
    fn test_catalog_keeps_extra_keys() {
        let structure = json!({"Code": "Top", "BaseBundle": "Top", "Bundles": [], "Name": "Top Extras"});
        let catalog = ProductCatalog::from_json(&json!({ "Top": structure.clone() })).unwrap();
        assert_eq!(catalog.get("Top"), Some(&structure));
        assert_eq!(catalog.code_for(&structure), Some("Top"));
        assert_eq!(catalog.selection("Top").unwrap().base_bundle.as_deref(), Some("Top"));
    }
}
