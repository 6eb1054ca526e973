//! XML namespace handling
//!
//! This module holds the well-known namespaces written into generated
//! documents and the prefix used to qualify PDBML names.

use serde::{Deserialize, Serialize};

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Prefix bound to the XML Schema namespace in generated schemas
pub const XSD_PREFIX: &str = "xsd";

/// A namespace prefix with an optional URI
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Namespace {
    /// Prefix, empty for the default namespace
    pub prefix: String,
    /// Namespace URI, derived from the schema file name when absent
    #[serde(default)]
    pub uri: Option<String>,
}

impl Namespace {
    /// Create a namespace with a prefix only
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: None,
        }
    }

    /// Set the namespace URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Prefix followed by `:`, or nothing for the default namespace
    pub fn qualifier(&self) -> String {
        if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}:", self.prefix)
        }
    }

    /// Prefix a local name
    pub fn qualify(&self, local_name: &str) -> String {
        format!("{}{}", self.qualifier(), local_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify() {
        let ns = Namespace::new("PDBx");
        assert_eq!(ns.qualifier(), "PDBx:");
        assert_eq!(ns.qualify("cellType"), "PDBx:cellType");
    }

    #[test]
    fn test_default_namespace() {
        let ns = Namespace::default();
        assert_eq!(ns.qualifier(), "");
        assert_eq!(ns.qualify("cellType"), "cellType");
    }

    #[test]
    fn test_with_uri() {
        let ns = Namespace::new("PDBx").with_uri("http://example.com/pdbx.xsd");
        assert_eq!(ns.uri.as_deref(), Some("http://example.com/pdbx.xsd"));
    }
}
