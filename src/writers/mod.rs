//! Tag emission and instance writing
//!
//! - [`format`]: stateless escaping and scalar formatting
//! - [`XmlWriter`]: indentation-tracking tag primitives
//! - [`XsdWriter`]: the `xsd:` vocabulary used by the schema generator
//! - [`PdbMlWriter`]: PDBML instance tables

pub mod format;
mod pdbml;
mod xml;
mod xsd;

pub use pdbml::{PdbMlWriter, SkipReason, TableOutcome};
pub use xml::{XmlWriter, DEFAULT_INDENT_WIDTH};
pub use xsd::{XsdTag, XsdWriter};
