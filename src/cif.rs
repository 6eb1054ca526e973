//! CIF value and item-name conventions
//!
//! Item names are fully qualified as `_category.attribute`. The special
//! values `?` (unknown) and `.` (inapplicable) are treated as null.

use once_cell::sync::Lazy;
use regex::Regex;

/// Value of an item whose value is not known
pub const UNKNOWN_VALUE: &str = "?";

/// Value of an item that does not apply
pub const INAPPLICABLE_VALUE: &str = ".";

static CIF_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_([^.\s]+)\.([^\s]+)$").unwrap());

/// Check if a value is null: empty, unknown or inapplicable
pub fn is_empty_value(value: &str) -> bool {
    value.is_empty() || value == UNKNOWN_VALUE || value == INAPPLICABLE_VALUE
}

/// Build a fully qualified item name from its category and attribute
pub fn make_cif_item(category: &str, attribute: &str) -> String {
    format!("_{}.{}", category, attribute)
}

/// Split a fully qualified item name into category and attribute
pub fn split_cif_item(item: &str) -> Option<(&str, &str)> {
    let caps = CIF_ITEM.captures(item)?;
    match (caps.get(1), caps.get(2)) {
        (Some(cat), Some(attr)) => Some((cat.as_str(), attr.as_str())),
        _ => None,
    }
}

/// Category part of a fully qualified item name
pub fn category_of(item: &str) -> Option<&str> {
    split_cif_item(item).map(|(cat, _)| cat)
}

/// Attribute part of a fully qualified item name
pub fn attribute_of(item: &str) -> Option<&str> {
    split_cif_item(item).map(|(_, attr)| attr)
}

/// Case-insensitive comparison of CIF names and values
pub fn is_ci_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
