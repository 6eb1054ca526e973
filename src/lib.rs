//! # pdbml
//!
//! Generates PDBML XSD schemas and PDBML-XML instance documents from an
//! mmCIF-style data dictionary.
//!
//! ## Features
//!
//! - One XSD complex type per dictionary category, with key items as
//!   required attributes and the other items as elements
//! - Enumerations, value ranges and units as inline simple types
//! - `key`, `unique` and `keyref` constraints derived from the
//!   parent/child relation graph under a selectable [`KeyPolicy`]
//! - Category documentation with examples rendered as PDBML
//! - Instance table writing that formats values the way the schema
//!   types them
//!
//! ## Example
//!
//! ```rust,ignore
//! use pdbml::{generate_schema, Dictionary, KeyPolicy, RelationGraph, SchemaSettings};
//!
//! // Load the dictionary model and its relations
//! let dict = Dictionary::from_file("path/to/dictionary.json")?;
//! let graph = RelationGraph::from_json_str(&std::fs::read_to_string("path/to/links.json")?)?;
//!
//! // Generate the schema
//! let settings = SchemaSettings::new("PDBx", "pdbx", KeyPolicy::MandatoryItems);
//! let xsd = generate_schema(&dict, &graph, settings)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod cif;
pub mod error;

// Names and namespaces
pub mod names;
pub mod namespaces;

// Dictionary model and configuration
pub mod dictionary;
pub mod settings;
pub mod table;

// Output
pub mod schema;
pub mod writers;

// Re-exports for convenience
pub use dictionary::{
    CategoryDef, Dictionary, DictionaryInfo, ItemDef, ParentChild, RelationGraph, TypeCode,
};
pub use error::{Error, FormatError, Result};
pub use schema::{generate_schema, ExampleRenderer, PdbMlSchema, TablesExampleRenderer};
pub use settings::{ConstraintKind, KeyPolicy, SchemaSettings};
pub use table::Table;
pub use writers::{PdbMlWriter, TableOutcome};

/// Version of the pdbml library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
