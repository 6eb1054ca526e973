//! In-memory dictionary model
//!
//! A [`Dictionary`] can be assembled with builders or loaded from JSON:
//!
//! ```json
//! {
//!   "version": "5.30",
//!   "categories": {
//!     "cell": {
//!       "keys": ["entry_id"],
//!       "items": {
//!         "entry_id": {"type": "string", "mandatory": true},
//!         "length_a": {"type": "float", "ranges": [{"min": "0", "max": "."}]}
//!       }
//!     }
//!   }
//! }
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{DictionaryInfo, Example, TypeCode, ValueRange};
use crate::cif;
use crate::error::Result;

/// Definition of one item (column)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Data type
    #[serde(rename = "type", default)]
    pub type_code: TypeCode,
    /// Whether a value is always required
    #[serde(default)]
    pub mandatory: bool,
    /// Enumerated permitted values
    #[serde(default)]
    pub enumeration: Vec<String>,
    /// Permitted value ranges
    #[serde(default)]
    pub ranges: Vec<ValueRange>,
    /// Units code
    #[serde(default)]
    pub units: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Example values
    #[serde(default)]
    pub examples: Vec<Example>,
    /// Whether the item may hold the inapplicable value
    #[serde(default)]
    pub may_be_inapplicable: bool,
    /// Whether the item is known to break its parent relationship
    #[serde(default)]
    pub bad_child_relation: bool,
    /// Overrides whether unknown values are allowed, defaults to the
    /// negation of `mandatory`
    #[serde(default)]
    pub unknown_allowed: Option<bool>,
}

impl ItemDef {
    /// Create an item of a data type
    pub fn new(type_code: TypeCode) -> Self {
        Self {
            type_code,
            ..Default::default()
        }
    }

    /// Mark the item mandatory
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Set the enumerated permitted values
    pub fn with_enumeration<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration = values.into_iter().map(Into::into).collect();
        self
    }

    /// Add a permitted value range row
    pub fn with_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.ranges.push(ValueRange::new(min, max));
        self
    }

    /// Set the units code
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an example
    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    /// Mark the item as possibly inapplicable
    pub fn may_be_inapplicable(mut self) -> Self {
        self.may_be_inapplicable = true;
        self
    }

    /// Mark the item as breaking its parent relationship
    pub fn bad_child_relation(mut self) -> Self {
        self.bad_child_relation = true;
        self
    }

    /// Override whether unknown values are allowed
    pub fn with_unknown_allowed(mut self, allowed: bool) -> Self {
        self.unknown_allowed = Some(allowed);
        self
    }

    fn has_ranges(&self) -> bool {
        self.ranges.iter().any(|r| !r.is_unbounded())
    }
}

/// Definition of one category (table)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// CIF examples
    #[serde(default)]
    pub examples: Vec<Example>,
    /// Attribute names of the key items
    #[serde(default)]
    pub keys: Vec<String>,
    /// Items by attribute name
    #[serde(default)]
    pub items: IndexMap<String, ItemDef>,
}

impl CategoryDef {
    /// Create an empty category
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a CIF example
    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    /// Add a key item; key items are always mandatory
    pub fn with_key(mut self, attribute: impl Into<String>, item: ItemDef) -> Self {
        let attribute = attribute.into();
        self.keys.push(attribute.clone());
        self.items.insert(attribute, item.mandatory());
        self
    }

    /// Declare a key by name only, without defining its item
    pub fn with_key_name(mut self, attribute: impl Into<String>) -> Self {
        self.keys.push(attribute.into());
        self
    }

    /// Add a non-key item
    pub fn with_item(mut self, attribute: impl Into<String>, item: ItemDef) -> Self {
        self.items.insert(attribute.into(), item);
        self
    }

    fn item(&self, attribute: &str) -> Option<&ItemDef> {
        self.items.get(attribute).or_else(|| {
            self.items
                .iter()
                .find(|(name, _)| cif::is_ci_equal(name, attribute))
                .map(|(_, item)| item)
        })
    }
}

/// In-memory dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    /// Dictionary version
    #[serde(default)]
    pub version: Option<String>,
    /// Categories by name
    #[serde(default)]
    pub categories: IndexMap<String, CategoryDef>,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dictionary from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a dictionary from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Set the version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a category
    pub fn with_category(mut self, name: impl Into<String>, category: CategoryDef) -> Self {
        self.categories.insert(name.into(), category);
        self
    }

    fn category_entry(&self, name: &str) -> Option<(&String, &CategoryDef)> {
        self.categories
            .get_key_value(name)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|(cat, _)| cif::is_ci_equal(cat, name))
            })
    }

    fn item(&self, item: &str) -> Option<&ItemDef> {
        let (category, attribute) = cif::split_cif_item(item)?;
        self.category_entry(category)?.1.item(attribute)
    }
}

impl DictionaryInfo for Dictionary {
    fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    fn item_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(cat, def)| def.items.keys().map(move |attr| cif::make_cif_item(cat, attr)))
            .collect()
    }

    fn category_keys(&self, category: &str) -> Vec<String> {
        match self.category_entry(category) {
            Some((name, def)) => def
                .keys
                .iter()
                .map(|attr| cif::make_cif_item(name, attr))
                .collect(),
            None => Vec::new(),
        }
    }

    fn is_category_defined(&self, category: &str) -> bool {
        self.category_entry(category).is_some()
    }

    fn is_item_defined(&self, item: &str) -> bool {
        self.item(item).is_some()
    }

    fn is_item_mandatory(&self, item: &str) -> bool {
        self.item(item).map(|i| i.mandatory).unwrap_or(false)
    }

    fn is_simple_data_type(&self, item: &str) -> bool {
        match self.item(item) {
            Some(def) => def.enumeration.is_empty() && !def.has_ranges() && def.units.is_none(),
            None => true,
        }
    }

    fn data_type(&self, item: &str) -> TypeCode {
        self.item(item).map(|i| i.type_code).unwrap_or(TypeCode::None)
    }

    fn enumeration(&self, item: &str) -> Vec<String> {
        self.item(item).map(|i| i.enumeration.clone()).unwrap_or_default()
    }

    fn ranges(&self, item: &str) -> Vec<ValueRange> {
        self.item(item).map(|i| i.ranges.clone()).unwrap_or_default()
    }

    fn units(&self, item: &str) -> Option<String> {
        self.item(item).and_then(|i| i.units.clone())
    }

    fn item_description(&self, item: &str) -> String {
        self.item(item).map(|i| i.description.clone()).unwrap_or_default()
    }

    fn item_examples(&self, item: &str) -> Vec<Example> {
        self.item(item).map(|i| i.examples.clone()).unwrap_or_default()
    }

    fn category_description(&self, category: &str) -> String {
        self.category_entry(category)
            .map(|(_, def)| def.description.clone())
            .unwrap_or_default()
    }

    fn category_examples(&self, category: &str) -> Vec<Example> {
        self.category_entry(category)
            .map(|(_, def)| def.examples.clone())
            .unwrap_or_default()
    }

    fn version(&self) -> Option<String> {
        self.version.clone()
    }

    fn can_be_inapplicable(&self, item: &str) -> bool {
        self.item(item).map(|i| i.may_be_inapplicable).unwrap_or(false)
    }

    fn is_bad_child_relation(&self, item: &str) -> bool {
        self.item(item).map(|i| i.bad_child_relation).unwrap_or(false)
    }

    fn is_unknown_value_allowed(&self, category: &str, attribute: &str) -> bool {
        match self.item(&cif::make_cif_item(category, attribute)) {
            Some(def) => def.unknown_allowed.unwrap_or(!def.mandatory),
            None => true,
        }
    }
}
