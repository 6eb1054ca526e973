//! Dictionary collaborators
//!
//! The schema generator and the instance writer never own dictionary
//! data; they read it through the [`DictionaryInfo`] and [`ParentChild`]
//! traits. In-memory implementations of both are provided in
//! [`Dictionary`] and [`RelationGraph`].

mod model;
mod relations;

pub use model::{CategoryDef, Dictionary, ItemDef};
pub use relations::{ParentLink, RelationGraph};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cif;

/// Semantic data type of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCode {
    /// Integer numbers
    Int,
    /// Floating point numbers
    Float,
    /// Short single-line strings
    #[default]
    String,
    /// Multi-line text
    Text,
    /// Dates
    DateTime,
    /// Not defined in the dictionary
    None,
}

impl TypeCode {
    /// Get the type code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCode::Int => "int",
            TypeCode::Float => "float",
            TypeCode::String => "string",
            TypeCode::Text => "text",
            TypeCode::DateTime => "datetime",
            TypeCode::None => "none",
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of an item's permitted value range.
///
/// An empty, `?` or `.` bound is open; equal bounds denote a single
/// permitted value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound
    pub min: String,
    /// Upper bound
    pub max: String,
}

impl ValueRange {
    /// Create a new range row
    pub fn new(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Both bounds are equal
    pub fn is_point(&self) -> bool {
        cif::is_ci_equal(&self.min, &self.max)
    }

    /// Both bounds are open
    pub fn is_unbounded(&self) -> bool {
        cif::is_empty_value(&self.min) && cif::is_empty_value(&self.max)
    }
}

/// Documentation example of a category or item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// The example itself, CIF text for categories
    pub case: String,
    /// Explanation of the example
    #[serde(default)]
    pub detail: Option<String>,
}

impl Example {
    /// Create an example without detail text
    pub fn new(case: impl Into<String>) -> Self {
        Self {
            case: case.into(),
            detail: None,
        }
    }

    /// Set the detail text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Ordered set of fully qualified item names of one category
pub type ComboKey = Vec<String>;

/// Combo keys of one child category referencing a parent combo key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildKeys {
    /// Child category name
    pub category: String,
    /// Child combo keys, each of the parent key's arity
    pub keys: Vec<ComboKey>,
}

/// Read access to dictionary metadata.
///
/// Item names are fully qualified (`_category.attribute`). Lookups that
/// find nothing return empty or absent values.
pub trait DictionaryInfo {
    /// Names of all categories
    fn category_names(&self) -> Vec<String>;

    /// Names of all items
    fn item_names(&self) -> Vec<String>;

    /// Key items of a category
    fn category_keys(&self, category: &str) -> Vec<String>;

    /// Check if a category is defined
    fn is_category_defined(&self, category: &str) -> bool;

    /// Check if an item is defined
    fn is_item_defined(&self, item: &str) -> bool;

    /// Check if an item must always have a value
    fn is_item_mandatory(&self, item: &str) -> bool;

    /// Check if an item is written as a plain XSD type
    fn is_simple_data_type(&self, item: &str) -> bool;

    /// Data type of an item, [`TypeCode::None`] when undefined
    fn data_type(&self, item: &str) -> TypeCode;

    /// Enumerated permitted values
    fn enumeration(&self, item: &str) -> Vec<String>;

    /// Permitted value ranges
    fn ranges(&self, item: &str) -> Vec<ValueRange>;

    /// Units code
    fn units(&self, item: &str) -> Option<String>;

    /// Description of an item
    fn item_description(&self, item: &str) -> String;

    /// Examples of an item
    fn item_examples(&self, item: &str) -> Vec<Example>;

    /// Description of a category
    fn category_description(&self, category: &str) -> String;

    /// CIF examples of a category
    fn category_examples(&self, category: &str) -> Vec<Example>;

    /// Dictionary version
    fn version(&self) -> Option<String>;

    /// Check if an item is a key item of a category
    fn is_key_item(&self, category: &str, attribute: &str) -> bool {
        let item = cif::make_cif_item(category, attribute);
        self.category_keys(category)
            .iter()
            .any(|key| cif::is_ci_equal(key, &item))
    }

    /// Check if an item may hold the inapplicable value
    fn can_be_inapplicable(&self, _item: &str) -> bool {
        false
    }

    /// Check if an item is known to break its parent relationship
    fn is_bad_child_relation(&self, _item: &str) -> bool {
        false
    }

    /// Check if a column may hold the unknown value
    fn is_unknown_value_allowed(&self, category: &str, attribute: &str) -> bool {
        !self.is_item_mandatory(&cif::make_cif_item(category, attribute))
    }

    /// Rewrite a value to the dictionary spelling of a matching
    /// enumerated value
    fn standardize_enum_value(&self, item: &str, value: &str) -> String {
        self.enumeration(item)
            .into_iter()
            .find(|allowed| cif::is_ci_equal(allowed, value))
            .unwrap_or_else(|| value.to_string())
    }
}

/// Read access to the parent/child relationship graph
pub trait ParentChild {
    /// Parent combo keys of a category
    fn combo_keys(&self, category: &str) -> Vec<ComboKey>;

    /// Child keys referencing a parent combo key, grouped by child
    /// category
    fn children_keys(&self, parent: &[String]) -> Vec<ChildKeys>;
}

/// Check if an item belongs to the key of its own category
pub(crate) fn is_own_key_item<D: DictionaryInfo + ?Sized>(dict: &D, item: &str) -> bool {
    match cif::split_cif_item(item) {
        Some((category, attribute)) => dict.is_key_item(category, attribute),
        None => false,
    }
}
