//! Indentation-tracking XML tag writer
//!
//! [`XmlWriter`] is the forward-only primitive layer shared by the
//! schema and instance writers. It never buffers structure: every call
//! goes straight to the underlying stream, and the caller keeps opening
//! and closing tags balanced.

use std::io::Write;

use crate::dictionary::TypeCode;
use crate::error::{Error, Result};
use crate::names;
use crate::namespaces::{XSD_NAMESPACE, XSD_PREFIX, XSI_NAMESPACE};

use super::format;

/// Default number of spaces per indentation level
pub const DEFAULT_INDENT_WIDTH: usize = 3;

/// XML writer bound to one namespace prefix
#[derive(Debug)]
pub struct XmlWriter<W: Write> {
    out: W,
    ns: String,
    indent: usize,
    indent_width: usize,
}

impl<W: Write> XmlWriter<W> {
    /// Create a writer whose unqualified tags use the `ns` prefix
    pub fn new(out: W, ns: impl Into<String>) -> Self {
        Self {
            out,
            ns: ns.into(),
            indent: 0,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }

    /// Set the number of spaces per indentation level
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Namespace prefix of the writer
    pub fn namespace(&self) -> &str {
        &self.ns
    }

    /// Current indentation level
    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Consume the writer and return the stream
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Mutable access to the stream
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    fn raw(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn qualified(&self, tag: &str) -> String {
        if self.ns.is_empty() {
            tag.to_string()
        } else {
            format!("{}:{}", self.ns, tag)
        }
    }

    /// `<?xml version="1.0" encoding="UTF-8"?>`
    pub fn write_declaration(&mut self) -> Result<()> {
        self.raw("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")
    }

    /// `<!-- comment -->` on its own line
    pub fn write_comment(&mut self, comment: &str) -> Result<()> {
        self.write_indent()?;
        self.raw(&format!("<!-- {} -->\n", comment))
    }

    /// Start a tag in the writer namespace, leaving it open for attributes
    pub fn write_opening_tag(&mut self, tag: &str) -> Result<()> {
        let tag = self.qualified(tag);
        self.raw(&format!("<{}", tag))
    }

    /// Start a tag whose name is qualified from an identifier
    pub fn write_qualified_opening_tag(&mut self, name: &str) -> Result<()> {
        let tag = self.qualified(&names::qualify_name(name, false));
        self.raw(&format!("<{}", tag))
    }

    /// `</ns:tag>` followed by a newline
    pub fn write_closing_tag(&mut self, tag: &str) -> Result<()> {
        let tag = self.qualified(tag);
        self.raw(&format!("</{}>\n", tag))
    }

    /// Closing tag for a name qualified from an identifier
    pub fn write_qualified_closing_tag(&mut self, name: &str) -> Result<()> {
        let tag = self.qualified(&names::qualify_name(name, false));
        self.raw(&format!("</{}>\n", tag))
    }

    /// ` />` followed by a newline
    pub fn write_empty_closing(&mut self) -> Result<()> {
        self.raw(" />\n")
    }

    /// `>`, optionally followed by a newline
    pub fn write_closing_bracket(&mut self, new_line: bool) -> Result<()> {
        self.raw(if new_line { ">\n" } else { ">" })
    }

    /// ` name="value"` with the value written as is
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.raw(&format!(" {}=\"{}\"", name, value))
    }

    /// `name="value"` without a leading space, for attributes that start
    /// an indented line
    pub fn write_leading_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.raw(&format!("{}=\"{}\"", name, value))
    }

    /// ` name=` followed by the quoted value right-aligned in `width`
    pub fn write_attribute_padded(&mut self, name: &str, value: &str, width: usize) -> Result<()> {
        let quoted = format!("\"{}\"", value);
        self.raw(&format!(" {}={:>width$}", name, quoted, width = width))
    }

    /// ` name="value"` with the value escaped and truncated to `width`
    pub fn write_escaped_attribute(
        &mut self,
        name: &str,
        value: &str,
        width: Option<usize>,
    ) -> Result<()> {
        let escaped = format::escape_string(value, width);
        self.write_attribute(name, &escaped)
    }

    /// Attribute whose value is an identifier turned into an XML name.
    ///
    /// With `keep_slash` the value is kept usable as an XPath.
    pub fn write_qualified_attribute(
        &mut self,
        name: &str,
        value: &str,
        keep_slash: bool,
        prefix: &str,
    ) -> Result<()> {
        let qualified = names::qualify_name(value, keep_slash);
        self.raw(&format!(" {}=\"{}{}\"", name, prefix, qualified))
    }

    /// Attribute holding the XSD type of a data type
    pub fn write_type_code_attribute(&mut self, name: &str, type_code: TypeCode) -> Result<()> {
        let xsd_type = format::xsd_type_name(type_code)?;
        self.write_attribute(name, xsd_type)
    }

    /// Attribute named after a column, its value formatted as `type_code`.
    ///
    /// A value that fails formatting is still written, escaped, and the
    /// format error is returned for the caller to report.
    pub fn write_attribute_value(
        &mut self,
        name: &str,
        value: &str,
        type_code: TypeCode,
        width: Option<usize>,
    ) -> Result<()> {
        self.raw(&format!(" {}=\"", names::qualify_name(name, false)))?;
        let written = self.write_data(value, type_code, width);
        self.raw("\"")?;
        written
    }

    /// Write a value formatted as `type_code`.
    ///
    /// On a format error the value is written escaped but otherwise
    /// unformatted and the error is returned.
    pub fn write_data(&mut self, value: &str, type_code: TypeCode, width: Option<usize>) -> Result<()> {
        match format::format_data(value, type_code, width) {
            Ok(formatted) => self.raw(&formatted),
            Err(Error::Format(err)) => {
                let escaped = format::escape_string(&err.value, width);
                self.raw(&escaped)?;
                Err(Error::Format(err))
            }
            Err(err) => Err(err),
        }
    }

    /// Write multi-line text content
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        let escaped = format::escape_text(text);
        self.raw(&escaped)
    }

    /// Write text that is already valid XML content
    pub fn write_raw_text(&mut self, text: &str) -> Result<()> {
        self.raw(text)
    }

    /// `xmlns:xsd="..."`
    pub fn write_xsd_namespace(&mut self) -> Result<()> {
        self.write_attribute(&format!("xmlns:{}", XSD_PREFIX), XSD_NAMESPACE)
    }

    /// `xmlns:xsi="..."`
    pub fn write_xsi_namespace(&mut self) -> Result<()> {
        self.write_attribute("xmlns:xsi", XSI_NAMESPACE)
    }

    /// `xml:lang="en"`
    pub fn write_lang_attribute(&mut self) -> Result<()> {
        self.write_attribute("xml:lang", "en")
    }

    /// `xmlns:ns="uri"`, or `xmlns="uri"` for the default namespace
    pub fn write_namespace_attribute(&mut self, ns: &str, uri: &str) -> Result<()> {
        if ns.is_empty() {
            self.write_attribute("xmlns", uri)
        } else {
            self.write_attribute(&format!("xmlns:{}", ns), uri)
        }
    }

    /// `xsi:schemaLocation="..."`
    pub fn write_schema_location_attribute(&mut self, value: &str) -> Result<()> {
        self.write_attribute("xsi:schemaLocation", value)
    }

    /// `xsi:nil="..."`
    pub fn write_nil_attribute(&mut self, value: bool) -> Result<()> {
        self.write_attribute("xsi:nil", if value { "true" } else { "false" })
    }

    /// Write the current indentation
    pub fn write_indent(&mut self) -> Result<()> {
        let spaces = " ".repeat(self.indent * self.indent_width);
        self.raw(&spaces)
    }

    /// Go one level deeper
    pub fn increment_indent(&mut self) {
        self.indent += 1;
    }

    /// Go one level up, never below zero
    pub fn decrement_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Set the indentation level
    pub fn set_indent(&mut self, level: usize) {
        self.indent = level;
    }

    /// A single space
    pub fn write_space(&mut self) -> Result<()> {
        self.raw(" ")
    }

    /// A line break
    pub fn write_new_line(&mut self) -> Result<()> {
        self.raw("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn output(writer: XmlWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_declaration_and_comment() {
        let mut w = XmlWriter::new(Vec::new(), "xsd");
        w.write_declaration().unwrap();
        w.write_comment("generated").unwrap();
        assert_eq!(
            output(w),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- generated -->\n"
        );
    }

    #[test]
    fn test_nested_tags() {
        let mut w = XmlWriter::new(Vec::new(), "xsd");
        w.write_opening_tag("all").unwrap();
        w.write_closing_bracket(true).unwrap();
        w.increment_indent();
        w.write_indent().unwrap();
        w.write_opening_tag("element").unwrap();
        w.write_qualified_attribute("name", "3d/x", false, "").unwrap();
        w.write_empty_closing().unwrap();
        w.decrement_indent();
        w.write_indent().unwrap();
        w.write_closing_tag("all").unwrap();
        assert_eq!(
            output(w),
            "<xsd:all>\n   <xsd:element name=\"_3d_over_x\" />\n</xsd:all>\n"
        );
    }

    #[test]
    fn test_indent_never_negative() {
        let mut w = XmlWriter::new(Vec::new(), "");
        w.decrement_indent();
        assert_eq!(w.indent_level(), 0);
        w.set_indent(2);
        w.write_indent().unwrap();
        assert_eq!(output(w), "      ");
    }

    #[test]
    fn test_write_data_passes_through_bad_values() {
        let mut w = XmlWriter::new(Vec::new(), "PDBx");
        let result = w.write_data("1.2.3", TypeCode::Float, None);
        assert!(matches!(result, Err(Error::Format(_))));
        assert_eq!(output(w), "1.2.3");
    }

    #[test]
    fn test_attribute_value() {
        let mut w = XmlWriter::new(Vec::new(), "PDBx");
        w.write_attribute_value("entry_id", "a<b", TypeCode::String, None)
            .unwrap();
        w.write_type_code_attribute("type", TypeCode::Int).unwrap();
        assert_eq!(output(w), " entry_id=\"a&lt;b\" type=\"xsd:integer\"");
    }

    #[test]
    fn test_namespace_attributes() {
        let mut w = XmlWriter::new(Vec::new(), "PDBx");
        w.write_namespace_attribute("PDBx", "http://pdbml.pdb.org/schema/pdbx.xsd")
            .unwrap();
        w.write_namespace_attribute("", "urn:default").unwrap();
        w.write_nil_attribute(true).unwrap();
        assert_eq!(
            output(w),
            " xmlns:PDBx=\"http://pdbml.pdb.org/schema/pdbx.xsd\" xmlns=\"urn:default\" xsi:nil=\"true\""
        );
    }
}
