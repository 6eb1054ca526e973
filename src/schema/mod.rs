//! PDBML XSD schema generation
//!
//! [`PdbMlSchema`] walks a dictionary once and writes, in order:
//!
//! 1. the XML declaration and a comment header,
//! 2. one complex type per category, sorted by name,
//! 3. the `datablockType` holding every category element,
//! 4. the `datablock` element with all key, unique and keyref
//!    constraints.
//!
//! ## Example
//!
//! ```rust
//! use pdbml::dictionary::{CategoryDef, Dictionary, ItemDef, RelationGraph, TypeCode};
//! use pdbml::schema::generate_schema;
//! use pdbml::settings::{KeyPolicy, SchemaSettings};
//!
//! let dict = Dictionary::new().with_category(
//!     "entry",
//!     CategoryDef::new().with_key("id", ItemDef::new(TypeCode::String)),
//! );
//! let settings = SchemaSettings::new("PDBx", "pdbx", KeyPolicy::IntrinsicKeysOnly);
//!
//! let xsd = generate_schema(&dict, &RelationGraph::new(), settings).unwrap();
//! assert!(xsd.contains("<xsd:key name=\"entryKey_0\">"));
//! ```

mod docs;
mod items;
mod keys;
mod ranges;

pub use docs::{format_description, format_example, ExampleRenderer, TablesExampleRenderer};
pub use keys::{
    are_all_key_items, constraint_name, filter_keys, is_superset_of_key_items, keyref_name,
    plan_category_keys, skip_child_item, skip_parent_item, FilteredKey, KeyDeclaration, KeyPlan,
    KeyrefGroup,
};
pub use ranges::{aggregate_inclusive_ranges, has_multiple_sub_ranges, has_range_restriction};

use std::collections::HashSet;
use std::io::Write;

use chrono::Local;
use tracing::{info, warn};

use crate::cif;
use crate::dictionary::{DictionaryInfo, ParentChild, TypeCode};
use crate::error::{Error, Result};
use crate::names;
use crate::settings::SchemaSettings;
use crate::writers::{XsdTag, XsdWriter};

/// Schema generator over a dictionary and its relation graph
pub struct PdbMlSchema<'a, W: Write, D: ?Sized, P: ?Sized> {
    writer: XsdWriter<W>,
    dict: &'a D,
    graph: &'a P,
    settings: SchemaSettings,
    renderer: Option<Box<dyn ExampleRenderer + 'a>>,
    /// Lowercased items of every parent and child combo key
    relation_items: HashSet<String>,
}

impl<'a, W, D, P> PdbMlSchema<'a, W, D, P>
where
    W: Write,
    D: DictionaryInfo + ?Sized,
    P: ParentChild + ?Sized,
{
    /// Create a generator writing to `out`
    pub fn new(out: W, dict: &'a D, graph: &'a P, settings: SchemaSettings) -> Self {
        let mut relation_items = HashSet::new();
        for category in dict.category_names() {
            for parent in graph.combo_keys(&category) {
                for child in graph.children_keys(&parent) {
                    for key in &child.keys {
                        relation_items.extend(key.iter().map(|item| item.to_lowercase()));
                    }
                }
                relation_items.extend(parent.iter().map(|item| item.to_lowercase()));
            }
        }

        Self {
            writer: XsdWriter::new(out).with_indent_width(settings.indent_width()),
            dict,
            graph,
            settings,
            renderer: None,
            relation_items,
        }
    }

    /// Render category examples as PDBML in the documentation.
    ///
    /// Without a renderer the example CIF text is written as is.
    pub fn with_example_renderer(mut self, renderer: impl ExampleRenderer + 'a) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Get the settings
    pub fn settings(&self) -> &SchemaSettings {
        &self.settings
    }

    /// Consume the generator and return the stream
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Write the whole schema
    pub fn convert(&mut self) -> Result<()> {
        let version = self
            .dict
            .version()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.settings.fallback_version().to_string());

        self.writer.write_declaration()?;
        self.writer.write_new_line()?;
        self.write_schema_comment(&version)?;
        self.writer.write_new_line()?;

        self.writer.open(XsdTag::Schema)?;
        self.write_schema_attributes()?;
        self.writer.write_new_line()?;

        let mut categories = self.dict.category_names();
        categories.sort();

        let mut items = self.dict.item_names();
        items.sort();

        self.writer.increment_indent();

        for category in &categories {
            self.write_category_type(category, &items)?;
        }

        self.write_datablock_type(&categories)?;

        let constraints = self.write_datablock_element(&categories)?;

        self.writer.decrement_indent();
        self.writer.write_closing_tag(XsdTag::Schema.as_str())?;

        info!(
            version = %version,
            categories = categories.len(),
            items = items.len(),
            constraints,
            policy = %self.settings.key_policy(),
            "Schema generated"
        );
        Ok(())
    }

    fn write_schema_comment(&mut self, version: &str) -> Result<()> {
        let date = self
            .settings
            .generated_on()
            .unwrap_or_else(|| Local::now().date_naive());
        self.writer
            .write_comment(&format!("XSD type schema generated on {}", date.format("%Y-%m-%d")))?;

        let schema_file = names::make_full_schema_file_name(
            self.settings.schema_location_base(),
            self.settings.prefix(),
            version,
        )?;
        self.writer
            .write_comment(&format!("Schema file: {}", schema_file))?;

        let contact = self.settings.contact().to_string();
        self.writer.write_comment(&contact)
    }

    fn write_schema_attributes(&mut self) -> Result<()> {
        self.writer.write_xsd_namespace()?;
        self.writer.write_new_line()?;

        self.writer.increment_indent();

        let namespace = self.settings.namespace();
        let uri = match &namespace.uri {
            Some(uri) => uri.clone(),
            None => names::make_full_schema_file_name(
                self.settings.schema_location_base(),
                self.settings.prefix(),
                "",
            )?,
        };
        let xmlns = if namespace.prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", namespace.prefix)
        };

        self.writer.write_indent()?;
        self.writer.write_leading_attribute(&xmlns, &uri)?;
        self.writer.write_new_line()?;

        self.writer.write_indent()?;
        self.writer.write_leading_attribute("targetNamespace", &uri)?;
        self.writer.write_new_line()?;

        self.writer.write_indent()?;
        self.writer
            .write_leading_attribute("elementFormDefault", "qualified")?;
        self.writer
            .write_attribute_form_default_attribute("unqualified")?;
        self.writer.write_closing_bracket(true)?;

        self.writer.decrement_indent();
        Ok(())
    }

    fn write_category_type(&mut self, category: &str, items: &[String]) -> Result<()> {
        let qualified = names::qualify_name(category, false);
        if !names::is_valid_ncname(&qualified) {
            warn!(category, name = %qualified, "Category name is not a valid NCName");
        }

        self.writer.open(XsdTag::ComplexType)?;
        self.writer
            .write_name_attribute(&names::make_category_type_name(category))?;
        self.writer.begin_content()?;

        self.write_category_documentation(category)?;

        self.writer.open_block(XsdTag::Sequence)?;

        self.writer.open(XsdTag::Element)?;
        self.writer.write_name_attribute(category)?;
        self.writer.write_min_occurs_attribute("0")?;
        self.writer.write_max_occurs_attribute("unbounded")?;
        self.writer.begin_content()?;

        self.writer.open_block(XsdTag::ComplexType)?;

        let mut keys = self.dict.category_keys(category);
        keys.sort();

        let non_key_items: Vec<&String> = items
            .iter()
            .filter(|item| {
                cif::category_of(item)
                    .map(|cat| cif::is_ci_equal(cat, category))
                    .unwrap_or(false)
            })
            .filter(|item| !keys.iter().any(|key| cif::is_ci_equal(key, item)))
            .collect();

        if !non_key_items.is_empty() {
            self.writer.open_block(XsdTag::All)?;
            for item in non_key_items {
                self.write_non_key_item(item)?;
            }
            self.writer.close_block(XsdTag::All)?;
        }

        for key in &keys {
            let attribute = cif::attribute_of(key).unwrap_or("");
            if attribute.is_empty() || attribute == cif::UNKNOWN_VALUE {
                continue;
            }
            if !self.dict.is_item_defined(key) {
                warn!(category, item = %key, "Undefined key item omitted from category type");
                continue;
            }
            self.write_key_item(key)?;
        }

        self.writer.close_block(XsdTag::ComplexType)?;
        self.writer.close_block(XsdTag::Element)?;
        self.writer.close_block(XsdTag::Sequence)?;
        self.writer.close_block(XsdTag::ComplexType)?;
        self.writer.write_new_line()
    }

    fn write_category_documentation(&mut self, category: &str) -> Result<()> {
        self.writer.open_block(XsdTag::Annotation)?;
        self.writer.open(XsdTag::Documentation)?;
        self.writer.write_lang_attribute()?;
        self.writer.write_closing_bracket(true)?;

        let description = docs::format_description(&self.dict.category_description(category));
        self.write_documentation_line(&description)?;

        for example in self.dict.category_examples(category) {
            if let Some(detail) = &example.detail {
                self.write_documentation_line(detail)?;
            }
            if cif::is_empty_value(&example.case) {
                continue;
            }

            let rendered =
                docs::render_category_example(self.renderer.as_deref(), category, &example.case);
            if let Some(xml) = rendered {
                self.write_documentation_line(&xml)?;
            }
        }

        self.writer.write_new_line()?;
        self.writer.write_indent()?;
        self.writer
            .write_closing_tag(XsdTag::Documentation.as_str())?;
        self.writer.close_block(XsdTag::Annotation)
    }

    fn write_datablock_type(&mut self, categories: &[String]) -> Result<()> {
        let ns = self.settings.namespace().clone();

        self.writer.open(XsdTag::ComplexType)?;
        self.writer
            .write_name_attribute(&names::make_category_type_name(names::DATABLOCK_ELEMENT))?;
        self.writer.begin_content()?;

        self.writer.open_block(XsdTag::All)?;
        for category in categories {
            let type_name = names::make_category_type_name(&names::qualify_name(category, false));

            self.writer.open(XsdTag::Element)?;
            self.writer
                .write_name_attribute(&names::make_category_element_name(category))?;
            self.writer.write_type_attribute(&ns.qualify(&type_name))?;
            self.writer.write_min_occurs_attribute("0")?;
            self.writer.write_max_occurs_attribute("1")?;
            self.writer.write_closing_bracket(true)?;
            self.writer.write_indent()?;
            self.writer.write_closing_tag(XsdTag::Element.as_str())?;
        }
        self.writer.close_block(XsdTag::All)?;

        self.writer.open(XsdTag::Attribute)?;
        self.writer
            .write_name_attribute(names::DATABLOCK_NAME_ATTRIBUTE)?;
        self.writer.write_data_type_attribute(TypeCode::String)?;
        self.writer.write_use_attribute("optional")?;
        self.writer.close_empty()?;

        self.writer.close_block(XsdTag::ComplexType)
    }

    fn write_datablock_element(&mut self, categories: &[String]) -> Result<usize> {
        let type_name = self
            .settings
            .namespace()
            .qualify(&names::make_category_type_name(names::DATABLOCK_ELEMENT));

        self.writer.open(XsdTag::Element)?;
        self.writer.write_name_attribute(names::DATABLOCK_ELEMENT)?;
        self.writer.write_type_attribute(&type_name)?;
        self.writer.begin_content()?;

        let mut constraints = 0;
        for category in categories {
            constraints += self.write_category_constraints(category)?;
        }

        self.writer.close_block(XsdTag::Element)?;
        Ok(constraints)
    }
}

/// Generate a schema into a string
pub fn generate_schema<D, P>(dict: &D, graph: &P, settings: SchemaSettings) -> Result<String>
where
    D: DictionaryInfo + ?Sized,
    P: ParentChild + ?Sized,
{
    let mut schema = PdbMlSchema::new(Vec::new(), dict, graph, settings);
    schema.convert()?;
    String::from_utf8(schema.into_inner())
        .map_err(|e| Error::Value(format!("Generated schema is not UTF-8: {}", e)))
}
