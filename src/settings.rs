//! Schema generation settings
//!
//! The outer wrapper that picks files and prefixes is not part of this
//! crate; it hands over an already validated [`SchemaSettings`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::names::SCHEMA_LOCATION_BASE;
use crate::namespaces::Namespace;

/// Rule set deciding which items are dropped from combo keys before
/// key/keyref emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    /// Only keys made of category key items are referenced
    IntrinsicKeysOnly,
    /// Keys that contain the whole category key, extended with mandatory
    /// determinable items
    KeySupersetsMandatory,
    /// Any combo key of mandatory determinable items
    MandatoryItems,
    /// Any combo key, regardless of mandatoriness
    AnyItems,
}

impl KeyPolicy {
    /// All policies
    pub const ALL: [KeyPolicy; 4] = [
        KeyPolicy::IntrinsicKeysOnly,
        KeyPolicy::KeySupersetsMandatory,
        KeyPolicy::MandatoryItems,
        KeyPolicy::AnyItems,
    ];

    /// Get the policy as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPolicy::IntrinsicKeysOnly => "intrinsic_keys_only",
            KeyPolicy::KeySupersetsMandatory => "key_supersets_mandatory",
            KeyPolicy::MandatoryItems => "mandatory_items",
            KeyPolicy::AnyItems => "any_items",
        }
    }
}

impl FromStr for KeyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KeyPolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::Value(format!("Invalid key policy: '{}'", s)))
    }
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// XSD identity constraint used for a generated key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// `xsd:key`, all fields must be present
    Key,
    /// `xsd:unique`, fields may be absent
    Unique,
}

impl ConstraintKind {
    /// Part of the generated constraint name, `Key` or `Unique`
    pub fn name_part(&self) -> &'static str {
        match self {
            ConstraintKind::Key => "Key",
            ConstraintKind::Unique => "Unique",
        }
    }
}

impl FromStr for ConstraintKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "key" => Ok(ConstraintKind::Key),
            "unique" => Ok(ConstraintKind::Unique),
            _ => Err(Error::Value(format!(
                "Invalid constraint kind: '{}'. Must be 'key' or 'unique'",
                s
            ))),
        }
    }
}

/// Configuration for schema generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Namespace of the generated schema and instances
    namespace: Namespace,
    /// Schema file name prefix
    prefix: String,
    /// Version used when the dictionary does not carry one
    fallback_version: String,
    /// Active key policy
    key_policy: KeyPolicy,
    /// Constraint kind of the category key (id 0)
    intrinsic_kind: ConstraintKind,
    /// Constraint kind of the other combo keys
    combo_kind: ConstraintKind,
    /// Base URL of published schema files
    schema_location_base: String,
    /// Contact line written to the schema header
    contact: String,
    /// Spaces per indentation level
    indent_width: usize,
    /// Date written to the header instead of today
    #[serde(skip)]
    generated_on: Option<NaiveDate>,
}

impl SchemaSettings {
    /// Create settings for a namespace prefix, a schema file prefix and
    /// an explicitly chosen key policy
    pub fn new(ns_prefix: impl Into<String>, prefix: impl Into<String>, key_policy: KeyPolicy) -> Self {
        Self {
            namespace: Namespace::new(ns_prefix),
            prefix: prefix.into(),
            fallback_version: "1.00".to_string(),
            key_policy,
            intrinsic_kind: ConstraintKind::Key,
            combo_kind: ConstraintKind::Unique,
            schema_location_base: SCHEMA_LOCATION_BASE.to_string(),
            contact: "Please direct questions or comments to the PDBML schema maintainers"
                .to_string(),
            indent_width: 3,
            generated_on: None,
        }
    }

    /// Get the namespace
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Get the schema file prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the fallback dictionary version
    pub fn fallback_version(&self) -> &str {
        &self.fallback_version
    }

    /// Get the key policy
    pub fn key_policy(&self) -> KeyPolicy {
        self.key_policy
    }

    /// Get the constraint kind of the category key
    pub fn intrinsic_kind(&self) -> ConstraintKind {
        self.intrinsic_kind
    }

    /// Get the constraint kind of the other combo keys
    pub fn combo_kind(&self) -> ConstraintKind {
        self.combo_kind
    }

    /// Get the schema location base URL
    pub fn schema_location_base(&self) -> &str {
        &self.schema_location_base
    }

    /// Get the contact line
    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// Get the indentation width
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// Get the fixed generation date, if any
    pub fn generated_on(&self) -> Option<NaiveDate> {
        self.generated_on
    }

    /// Set the namespace URI
    pub fn with_namespace_uri(mut self, uri: impl Into<String>) -> Self {
        self.namespace = self.namespace.with_uri(uri);
        self
    }

    /// Set the fallback dictionary version
    pub fn with_fallback_version(mut self, version: impl Into<String>) -> Self {
        self.fallback_version = version.into();
        self
    }

    /// Set the key policy
    pub fn with_key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// Set the constraint kind of the category key
    pub fn with_intrinsic_kind(mut self, kind: ConstraintKind) -> Self {
        self.intrinsic_kind = kind;
        self
    }

    /// Set the constraint kind of the other combo keys
    pub fn with_combo_kind(mut self, kind: ConstraintKind) -> Self {
        self.combo_kind = kind;
        self
    }

    /// Set the schema location base URL
    pub fn with_schema_location_base(mut self, base: impl Into<String>) -> Self {
        self.schema_location_base = base.into();
        self
    }

    /// Set the contact line
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Fix the date written to the schema header
    pub fn with_generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }
}
