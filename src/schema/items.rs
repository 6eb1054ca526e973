//! Item declarations
//!
//! Key items become required attributes of the row element, all other
//! items become optional or mandatory child elements. Items with an
//! enumeration, a value range or units get an inline type; the rest are
//! typed with a plain `type="xsd:..."` attribute.

use std::io::Write;

use crate::cif;
use crate::dictionary::{DictionaryInfo, ParentChild, TypeCode, ValueRange};
use crate::error::Result;
use crate::writers::XsdTag;

use super::docs::format_description;
use super::keys::{skip_child_item, skip_parent_item};
use super::ranges;
use super::PdbMlSchema;

impl<'a, W, D, P> PdbMlSchema<'a, W, D, P>
where
    W: Write,
    D: DictionaryInfo + ?Sized,
    P: ParentChild + ?Sized,
{
    /// Check if an item takes part in a relation but is filtered out of
    /// it by the key policy
    pub(super) fn is_nillable(&self, item: &str) -> bool {
        if !self.relation_items.contains(&item.to_lowercase()) {
            return false;
        }

        let policy = self.settings.key_policy();
        skip_parent_item(self.dict, policy, item) || skip_child_item(self.dict, policy, item)
    }

    /// `<xsd:attribute name=".." use="required">` for a key item
    pub(super) fn write_key_item(&mut self, item: &str) -> Result<()> {
        let attribute = cif::attribute_of(item).unwrap_or(item);

        self.writer.open(XsdTag::Attribute)?;
        self.writer.write_name_attribute(attribute)?;
        self.writer.write_use_attribute("required")?;
        self.write_item_body(item)?;
        self.writer.write_indent()?;
        self.writer.write_closing_tag(XsdTag::Attribute.as_str())
    }

    /// `<xsd:element name=".." minOccurs=".." maxOccurs="1">` for a non-key
    /// item
    pub(super) fn write_non_key_item(&mut self, item: &str) -> Result<()> {
        let attribute = cif::attribute_of(item).unwrap_or(item);
        let min_occurs = if self.dict.is_item_mandatory(item) { "1" } else { "0" };

        self.writer.open(XsdTag::Element)?;
        self.writer.write_name_attribute(attribute)?;
        self.writer.write_min_occurs_attribute(min_occurs)?;
        self.writer.write_max_occurs_attribute("1")?;
        if self.is_nillable(item) {
            self.writer.write_nillable_attribute(true)?;
        }
        self.write_item_body(item)?;
        self.writer.write_indent()?;
        self.writer.write_closing_tag(XsdTag::Element.as_str())
    }

    fn write_item_body(&mut self, item: &str) -> Result<()> {
        let simple = self.dict.is_simple_data_type(item);
        if simple {
            self.writer.write_data_type_attribute(self.dict.data_type(item))?;
        }
        self.writer.begin_content()?;

        self.write_item_documentation(item)?;
        if !simple {
            self.write_data_type_element(item)?;
        }

        self.writer.decrement_indent();
        Ok(())
    }

    fn write_item_documentation(&mut self, item: &str) -> Result<()> {
        self.writer.open_block(XsdTag::Annotation)?;
        self.writer.open(XsdTag::Documentation)?;
        self.writer.write_lang_attribute()?;
        self.writer.write_closing_bracket(true)?;

        let description = format_description(&self.dict.item_description(item));
        self.write_documentation_line(&description)?;

        for example in self.dict.item_examples(item) {
            if let Some(detail) = &example.detail {
                self.write_documentation_line(detail)?;
            }
            self.write_documentation_line(&example.case)?;
        }

        self.writer.write_indent()?;
        self.writer.write_closing_tag(XsdTag::Documentation.as_str())?;
        self.writer.close_block(XsdTag::Annotation)
    }

    /// Text followed by a newline unless it is a null value
    pub(super) fn write_documentation_line(&mut self, text: &str) -> Result<()> {
        self.writer.write_text(text)?;
        if !cif::is_empty_value(text) {
            self.writer.write_new_line()?;
        }
        Ok(())
    }

    fn write_data_type_element(&mut self, item: &str) -> Result<()> {
        let type_code = self.dict.data_type(item);
        let enumeration = self.dict.enumeration(item);
        let value_ranges = self.dict.ranges(item);

        if !enumeration.is_empty() {
            self.writer.open_block(XsdTag::SimpleType)?;
            self.open_restriction(type_code)?;
            for value in &enumeration {
                self.writer.open(XsdTag::Enumeration)?;
                self.writer.write_value_attribute(value, true)?;
                self.writer.close_empty()?;
            }
            self.writer.close_block(XsdTag::Restriction)?;
            return self.writer.close_block(XsdTag::SimpleType);
        }

        if ranges::has_range_restriction(&value_ranges) {
            let aggregated = ranges::aggregate_inclusive_ranges(&value_ranges);
            return match aggregated.as_slice() {
                [single] => self.write_inclusive_range(type_code, single),
                _ => self.write_range_union(type_code, &value_ranges),
            };
        }

        if let Some(units) = self.dict.units(item) {
            self.writer.open_block(XsdTag::ComplexType)?;
            self.writer.open_block(XsdTag::SimpleContent)?;
            self.writer.open(XsdTag::Extension)?;
            self.writer.write_base_attribute(type_code)?;
            self.writer.begin_content()?;

            self.writer.open(XsdTag::Attribute)?;
            self.writer.write_fixed_attribute(&units)?;
            self.writer.write_name_attribute("units")?;
            self.writer.write_data_type_attribute(TypeCode::String)?;
            self.writer.write_use_attribute("optional")?;
            self.writer.close_empty()?;

            self.writer.close_block(XsdTag::Extension)?;
            self.writer.close_block(XsdTag::SimpleContent)?;
            return self.writer.close_block(XsdTag::ComplexType);
        }

        Ok(())
    }

    fn open_restriction(&mut self, type_code: TypeCode) -> Result<()> {
        self.writer.open(XsdTag::Restriction)?;
        self.writer.write_base_attribute(type_code)?;
        self.writer.begin_content()
    }

    fn write_bound(&mut self, tag: XsdTag, value: &str) -> Result<()> {
        if cif::is_empty_value(value) {
            return Ok(());
        }
        self.writer.write_facet(tag, value)
    }

    fn write_inclusive_range(&mut self, type_code: TypeCode, range: &ValueRange) -> Result<()> {
        self.writer.open_block(XsdTag::SimpleType)?;
        self.open_restriction(type_code)?;
        self.write_bound(XsdTag::MinInclusive, &range.min)?;
        self.write_bound(XsdTag::MaxInclusive, &range.max)?;
        self.writer.close_block(XsdTag::Restriction)?;
        self.writer.close_block(XsdTag::SimpleType)
    }

    fn write_range_union(&mut self, type_code: TypeCode, rows: &[ValueRange]) -> Result<()> {
        self.writer.open_block(XsdTag::SimpleType)?;
        self.writer.open_block(XsdTag::Union)?;

        for row in rows.iter().filter(|r| !r.is_unbounded()) {
            self.writer.open_block(XsdTag::SimpleType)?;
            self.open_restriction(type_code)?;
            if row.is_point() {
                self.write_bound(XsdTag::MinInclusive, &row.min)?;
                self.write_bound(XsdTag::MaxInclusive, &row.max)?;
            } else {
                self.write_bound(XsdTag::MinExclusive, &row.min)?;
                self.write_bound(XsdTag::MaxExclusive, &row.max)?;
            }
            self.writer.close_block(XsdTag::Restriction)?;
            self.writer.close_block(XsdTag::SimpleType)?;
        }

        self.writer.close_block(XsdTag::Union)?;
        self.writer.close_block(XsdTag::SimpleType)
    }
}
