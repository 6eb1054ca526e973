//! XML Schema vocabulary on top of [`XmlWriter`]

use std::fmt;
use std::io::Write;
use std::ops::{Deref, DerefMut};

use crate::dictionary::TypeCode;
use crate::error::Result;
use crate::namespaces::XSD_PREFIX;

use super::xml::XmlWriter;

/// XSD element names used by the schema generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsdTag {
    /// `xsd:schema`
    Schema,
    /// `xsd:complexType`
    ComplexType,
    /// `xsd:sequence`
    Sequence,
    /// `xsd:all`
    All,
    /// `xsd:annotation`
    Annotation,
    /// `xsd:documentation`
    Documentation,
    /// `xsd:simpleType`
    SimpleType,
    /// `xsd:restriction`
    Restriction,
    /// `xsd:enumeration`
    Enumeration,
    /// `xsd:union`
    Union,
    /// `xsd:simpleContent`
    SimpleContent,
    /// `xsd:extension`
    Extension,
    /// `xsd:element`
    Element,
    /// `xsd:attribute`
    Attribute,
    /// `xsd:minInclusive`
    MinInclusive,
    /// `xsd:maxInclusive`
    MaxInclusive,
    /// `xsd:minExclusive`
    MinExclusive,
    /// `xsd:maxExclusive`
    MaxExclusive,
    /// `xsd:key`
    Key,
    /// `xsd:unique`
    Unique,
    /// `xsd:keyref`
    Keyref,
    /// `xsd:selector`
    Selector,
    /// `xsd:field`
    Field,
}

impl XsdTag {
    /// Local name of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            XsdTag::Schema => "schema",
            XsdTag::ComplexType => "complexType",
            XsdTag::Sequence => "sequence",
            XsdTag::All => "all",
            XsdTag::Annotation => "annotation",
            XsdTag::Documentation => "documentation",
            XsdTag::SimpleType => "simpleType",
            XsdTag::Restriction => "restriction",
            XsdTag::Enumeration => "enumeration",
            XsdTag::Union => "union",
            XsdTag::SimpleContent => "simpleContent",
            XsdTag::Extension => "extension",
            XsdTag::Element => "element",
            XsdTag::Attribute => "attribute",
            XsdTag::MinInclusive => "minInclusive",
            XsdTag::MaxInclusive => "maxInclusive",
            XsdTag::MinExclusive => "minExclusive",
            XsdTag::MaxExclusive => "maxExclusive",
            XsdTag::Key => "key",
            XsdTag::Unique => "unique",
            XsdTag::Keyref => "keyref",
            XsdTag::Selector => "selector",
            XsdTag::Field => "field",
        }
    }
}

impl fmt::Display for XsdTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Writer of `xsd:`-prefixed schema documents
#[derive(Debug)]
pub struct XsdWriter<W: Write> {
    xml: XmlWriter<W>,
}

impl<W: Write> XsdWriter<W> {
    /// Create a schema writer over a stream
    pub fn new(out: W) -> Self {
        Self {
            xml: XmlWriter::new(out, XSD_PREFIX),
        }
    }

    /// Set the number of spaces per indentation level
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.xml = self.xml.with_indent_width(width);
        self
    }

    /// Consume the writer and return the stream
    pub fn into_inner(self) -> W {
        self.xml.into_inner()
    }

    /// Indent and start a tag, leaving it open for attributes
    pub fn open(&mut self, tag: XsdTag) -> Result<()> {
        self.xml.write_indent()?;
        self.xml.write_opening_tag(tag.as_str())
    }

    /// Indent, write `<xsd:tag>` and go one level deeper
    pub fn open_block(&mut self, tag: XsdTag) -> Result<()> {
        self.open(tag)?;
        self.begin_content()
    }

    /// Finish an opened tag with `>` and go one level deeper
    pub fn begin_content(&mut self) -> Result<()> {
        self.xml.write_closing_bracket(true)?;
        self.xml.increment_indent();
        Ok(())
    }

    /// Go one level up and write `</xsd:tag>`
    pub fn close_block(&mut self, tag: XsdTag) -> Result<()> {
        self.xml.decrement_indent();
        self.xml.write_indent()?;
        self.xml.write_closing_tag(tag.as_str())
    }

    /// Finish an opened tag as an empty element
    pub fn close_empty(&mut self) -> Result<()> {
        self.xml.write_empty_closing()
    }

    /// `name="..."` with the value made an XML name
    pub fn write_name_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_qualified_attribute("name", value, false, "")
    }

    /// `value="..."`, escaped when `format` is set
    pub fn write_value_attribute(&mut self, value: &str, format: bool) -> Result<()> {
        if format {
            self.xml.write_escaped_attribute("value", value, None)
        } else {
            self.xml.write_attribute("value", value)
        }
    }

    /// `base="xsd:..."` for a data type
    pub fn write_base_attribute(&mut self, type_code: TypeCode) -> Result<()> {
        self.xml.write_type_code_attribute("base", type_code)
    }

    /// `type="xsd:..."` for a data type
    pub fn write_data_type_attribute(&mut self, type_code: TypeCode) -> Result<()> {
        self.xml.write_type_code_attribute("type", type_code)
    }

    /// `type="..."` naming a declared type
    pub fn write_type_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_attribute("type", value)
    }

    /// `fixed="..."`, escaped
    pub fn write_fixed_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_escaped_attribute("fixed", value, None)
    }

    /// `use="..."`
    pub fn write_use_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_attribute("use", value)
    }

    /// `minOccurs="..."`
    pub fn write_min_occurs_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_attribute("minOccurs", value)
    }

    /// `maxOccurs="..."`
    pub fn write_max_occurs_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_attribute("maxOccurs", value)
    }

    /// `nillable="..."`
    pub fn write_nillable_attribute(&mut self, value: bool) -> Result<()> {
        self.xml
            .write_attribute("nillable", if value { "true" } else { "false" })
    }

    /// `xpath="..."`, prefixed with `@` when selecting an attribute
    pub fn write_xpath_attribute(&mut self, value: &str, attribute: bool) -> Result<()> {
        let prefix = if attribute { "@" } else { "" };
        self.xml.write_qualified_attribute("xpath", value, true, prefix)
    }

    /// `refer="..."` naming a key or unique constraint
    pub fn write_refer_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_qualified_attribute("refer", value, false, "")
    }

    /// `targetNamespace="..."`
    pub fn write_target_namespace_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_attribute("targetNamespace", value)
    }

    /// `elementFormDefault="..."`
    pub fn write_element_form_default_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_attribute("elementFormDefault", value)
    }

    /// `attributeFormDefault="..."`
    pub fn write_attribute_form_default_attribute(&mut self, value: &str) -> Result<()> {
        self.xml.write_attribute("attributeFormDefault", value)
    }

    /// A facet element such as `<xsd:minInclusive value="0" />`
    pub fn write_facet(&mut self, tag: XsdTag, value: &str) -> Result<()> {
        self.open(tag)?;
        self.write_value_attribute(value, false)?;
        self.close_empty()
    }
}

impl<W: Write> Deref for XsdWriter<W> {
    type Target = XmlWriter<W>;

    fn deref(&self) -> &Self::Target {
        &self.xml
    }
}

impl<W: Write> DerefMut for XsdWriter<W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.xml
    }
}
