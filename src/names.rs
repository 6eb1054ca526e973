//! XML name handling and PDBML naming conventions
//!
//! This module turns dictionary identifiers into XML names and derives
//! the element, type and schema file names used by both the schema
//! generator and the instance writer.

use crate::error::Result;
use url::Url;

/// Name of the datablock element
pub const DATABLOCK_ELEMENT: &str = "datablock";

/// Name of the optional datablock name attribute
pub const DATABLOCK_NAME_ATTRIBUTE: &str = "datablockName";

/// Suffix of category wrapper elements
pub const CATEGORY_ELEMENT_SUFFIX: &str = "Category";

/// Suffix of category complex types
pub const CATEGORY_TYPE_SUFFIX: &str = "Type";

/// Base URL under which schema files are published
pub const SCHEMA_LOCATION_BASE: &str = "http://pdbml.pdb.org/schema/";

/// Check if a string is a valid XML Name
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    name.chars()
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false)
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    if name.is_empty() || name.contains(':') {
        return false;
    }

    is_valid_name(name)
}

/// Turn an identifier into an XML name.
///
/// A leading digit gets an `_` prefix and the characters `[`, `]`, `%`,
/// `<` and `>` are dropped. A `/` becomes `_over_` unless `keep_slash`
/// is set, which XPath expressions need.
pub fn qualify_name(name: &str, keep_slash: bool) -> String {
    let mut qualified = String::with_capacity(name.len() + 1);

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        qualified.push('_');
    }

    for c in name.chars() {
        match c {
            '[' | ']' | '%' | '<' | '>' => continue,
            '/' if !keep_slash => qualified.push_str("_over_"),
            _ => qualified.push(c),
        }
    }

    qualified
}

/// Name of the element wrapping all rows of a category
pub fn make_category_element_name(category: &str) -> String {
    format!("{}{}", category, CATEGORY_ELEMENT_SUFFIX)
}

/// Name of the complex type describing a category
pub fn make_category_type_name(category: &str) -> String {
    format!("{}{}", category, CATEGORY_TYPE_SUFFIX)
}

/// Schema file name, `<prefix>[-v<version>].xsd`
pub fn make_schema_file_name(prefix: &str, dict_version: &str) -> String {
    if dict_version.is_empty() {
        format!("{}.xsd", prefix)
    } else {
        format!("{}-v{}.xsd", prefix, dict_version)
    }
}

/// Schema file name resolved under a schema location base URL
pub fn make_full_schema_file_name(base: &str, prefix: &str, dict_version: &str) -> Result<String> {
    let base = Url::parse(base)?;
    let full = base.join(&make_schema_file_name(prefix, dict_version))?;
    Ok(full.to_string())
}
