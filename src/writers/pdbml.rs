//! PDBML instance writer
//!
//! [`PdbMlWriter`] serializes [`Table`]s as PDBML category elements. Key
//! columns become attributes of the row element; every other column
//! becomes a child element. Data-quality problems (undefined columns,
//! invalid rows, unformattable values) are logged and skipped so that a
//! document is always completed.

use std::io::Write;
use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::cif::{self, INAPPLICABLE_VALUE, UNKNOWN_VALUE};
use crate::dictionary::{DictionaryInfo, TypeCode};
use crate::error::{Error, Result};
use crate::names::{self, DATABLOCK_ELEMENT, DATABLOCK_NAME_ATTRIBUTE};
use crate::table::Table;

use super::xml::XmlWriter;

/// Columns of the compact atom record layout and their widths
const ATOM_RECORD_COLUMNS: [(&str, usize); 20] = [
    ("group_PDB", 6),
    ("pdbx_PDB_model_num", 4),
    ("label_asym_id", 3),
    ("auth_asym_id", 4),
    ("label_seq_id", 6),
    ("auth_seq_id", 6),
    ("pdbx_PDB_ins_code", 2),
    ("label_alt_id", 2),
    ("label_comp_id", 4),
    ("auth_comp_id", 4),
    ("type_symbol", 3),
    ("label_atom_id", 6),
    ("auth_atom_id", 6),
    ("Cartn_x", 9),
    ("Cartn_y", 9),
    ("Cartn_z", 9),
    ("occupancy", 7),
    ("B_iso_or_equiv", 7),
    ("label_entity_id", 5),
    ("pdbx_formal_charge", 4),
];

const ATOM_RECORD_CATEGORY: &str = "category_atom_record";
const ATOM_RECORD_ELEMENT: &str = "atom_record";

/// Why a table produced no output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Widths were to be recalculated but none were given
    MissingWidths,
    /// None of the columns is a defined dictionary item
    NoDefinedColumns,
    /// None of the defined columns is a key column
    NoKeyColumns,
    /// Every row failed validation
    NoValidRows,
}

impl SkipReason {
    /// Get the reason as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingWidths => "missing widths",
            SkipReason::NoDefinedColumns => "no defined columns",
            SkipReason::NoKeyColumns => "no key columns",
            SkipReason::NoValidRows => "no valid rows",
        }
    }
}

/// Result of writing one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    /// The category element was written
    Written {
        /// Rows written
        rows: usize,
        /// Rows skipped by validation
        skipped_rows: usize,
    },
    /// Nothing was written
    Skipped(SkipReason),
}

impl TableOutcome {
    /// Check if the category element was written
    pub fn is_written(&self) -> bool {
        matches!(self, TableOutcome::Written { .. })
    }
}

/// A column that survived definition checks, in output order
#[derive(Debug)]
struct Column<'t> {
    name: &'t str,
    index: usize,
    is_key: bool,
    unknown_allowed: bool,
    type_code: TypeCode,
}

/// Writer of PDBML instance documents
pub struct PdbMlWriter<'d, W: Write, D: DictionaryInfo + ?Sized> {
    xml: XmlWriter<W>,
    dict: &'d D,
}

impl<'d, W: Write, D: DictionaryInfo + ?Sized> PdbMlWriter<'d, W, D> {
    /// Create an instance writer qualifying elements with `ns`
    pub fn new(out: W, ns: impl Into<String>, dict: &'d D) -> Self {
        Self {
            xml: XmlWriter::new(out, ns),
            dict,
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

    /// Indent and start the datablock tag, leaving it open for attributes
    pub fn write_datablock_opening_tag(&mut self) -> Result<()> {
        self.xml.write_indent()?;
        self.xml.write_opening_tag(DATABLOCK_ELEMENT)
    }

    /// `datablockName="..."`
    pub fn write_datablock_attribute(&mut self, value: &str) -> Result<()> {
        self.xml
            .write_escaped_attribute(DATABLOCK_NAME_ATTRIBUTE, value, None)
    }

    /// Write the complete datablock start tag and go one level deeper.
    ///
    /// The namespace URI doubles as the first half of
    /// `xsi:schemaLocation` when a schema location is given.
    pub fn write_datablock_start(
        &mut self,
        datablock_name: Option<&str>,
        namespace_uri: Option<&str>,
        schema_location: Option<&str>,
    ) -> Result<()> {
        self.write_datablock_opening_tag()?;

        if let Some(name) = datablock_name {
            self.write_datablock_attribute(name)?;
        }

        if let Some(uri) = namespace_uri {
            let ns = self.xml.namespace().to_string();
            self.xml.write_namespace_attribute(&ns, uri)?;
        }

        if let Some(location) = schema_location {
            self.xml.write_xsi_namespace()?;
            let value = match namespace_uri {
                Some(uri) => format!("{} {}", uri, location),
                None => location.to_string(),
            };
            self.xml.write_schema_location_attribute(&value)?;
        }

        self.xml.write_closing_bracket(true)?;
        self.xml.increment_indent();
        Ok(())
    }

    /// Go one level up and close the datablock
    pub fn write_datablock_closing_tag(&mut self) -> Result<()> {
        self.xml.decrement_indent();
        self.xml.write_indent()?;
        self.xml.write_closing_tag(DATABLOCK_ELEMENT)
    }

    /// `<ns:catCategory>` on its own line
    pub fn write_category_opening_tag(&mut self, category: &str) -> Result<()> {
        self.xml.write_indent()?;
        self.xml
            .write_qualified_opening_tag(&names::make_category_element_name(category))?;
        self.xml.write_closing_bracket(true)
    }

    /// `</ns:catCategory>` on its own line
    pub fn write_category_closing_tag(&mut self, category: &str) -> Result<()> {
        self.xml.write_indent()?;
        self.xml
            .write_qualified_closing_tag(&names::make_category_element_name(category))
    }

    fn defined_columns<'t>(&self, table: &'t Table) -> Vec<Column<'t>> {
        let category = table.name();
        let mut columns = Vec::new();

        for (index, name) in table.columns().iter().enumerate() {
            let item = cif::make_cif_item(category, name);
            if !self.dict.is_item_defined(&item) {
                warn!(item = %item, "Skipping conversion to XML of non-defined item");
                continue;
            }

            let type_code = match table.type_codes() {
                Some(codes) => codes[index],
                None => self.dict.data_type(&item),
            };

            columns.push(Column {
                name: name.as_str(),
                index,
                is_key: self.dict.is_key_item(category, name),
                unknown_allowed: self.dict.is_unknown_value_allowed(category, name),
                type_code,
            });
        }

        columns.sort_by(|a, b| a.name.cmp(b.name));
        columns
    }

    fn is_row_valid(columns: &[Column<'_>], row: &[String]) -> bool {
        columns.iter().all(|column| {
            let value = row[column.index].as_str();
            if column.is_key {
                !cif::is_empty_value(value)
            } else {
                column.unknown_allowed || !(value.is_empty() || value == UNKNOWN_VALUE)
            }
        })
    }

    /// Write one table as a category element.
    ///
    /// `widths` is indexed by the table's column index and truncates
    /// string values; an empty slice disables truncation. With
    /// `recalc_widths` each width first grows to the longest value seen.
    pub fn write_table(
        &mut self,
        table: &Table,
        widths: &mut [usize],
        recalc_widths: bool,
    ) -> Result<TableOutcome> {
        let category = table.name();

        if recalc_widths && widths.is_empty() {
            warn!(category, "Skipping conversion to XML of table, no widths to recalculate");
            return Ok(TableOutcome::Skipped(SkipReason::MissingWidths));
        }

        let columns = self.defined_columns(table);
        if columns.is_empty() {
            warn!(
                category,
                "Skipping conversion to XML of table, since no items are specified"
            );
            return Ok(TableOutcome::Skipped(SkipReason::NoDefinedColumns));
        }

        if !columns.iter().any(|c| c.is_key) {
            warn!(
                category,
                "Skipping conversion to XML of table, since no key values are specified"
            );
            return Ok(TableOutcome::Skipped(SkipReason::NoKeyColumns));
        }

        let all_key = columns.iter().all(|c| c.is_key);
        let mut written = 0;
        let mut skipped_rows = 0;

        for (row_index, row) in table.rows().iter().enumerate() {
            if !Self::is_row_valid(&columns, row) {
                warn!(
                    category,
                    row = row_index + 1,
                    "Skipping conversion to XML of invalid row"
                );
                skipped_rows += 1;
                continue;
            }

            if written == 0 {
                self.write_category_opening_tag(category)?;
                self.xml.increment_indent();
            }

            self.write_row(category, &columns, row, widths, recalc_widths, all_key)?;
            written += 1;
        }

        if written == 0 {
            warn!(category, "Skipping conversion to XML of table without valid rows");
            return Ok(TableOutcome::Skipped(SkipReason::NoValidRows));
        }

        self.xml.decrement_indent();
        self.write_category_closing_tag(category)?;

        debug!(category, rows = written, skipped_rows, "Wrote table");
        Ok(TableOutcome::Written {
            rows: written,
            skipped_rows,
        })
    }

    fn write_row(
        &mut self,
        category: &str,
        columns: &[Column<'_>],
        row: &[String],
        widths: &mut [usize],
        recalc_widths: bool,
        all_key: bool,
    ) -> Result<()> {
        self.xml.write_indent()?;
        self.xml.write_qualified_opening_tag(category)?;

        for column in columns.iter().filter(|c| c.is_key && c.type_code != TypeCode::None) {
            let value = self.standardized(category, column, row);
            let width = Self::track_width(widths, column.index, &value, recalc_widths);
            let written = self
                .xml
                .write_attribute_value(column.name, &value, column.type_code, width);
            Self::report_format_error(written, category, column, &value)?;
        }

        self.xml.write_closing_bracket(false)?;
        if !all_key {
            self.xml.write_new_line()?;
        }

        self.xml.increment_indent();

        for column in columns.iter().filter(|c| !c.is_key && c.type_code != TypeCode::None) {
            let raw = row[column.index].as_str();
            if raw.is_empty() || raw == UNKNOWN_VALUE {
                continue;
            }

            self.xml.write_indent()?;
            self.xml.write_qualified_opening_tag(column.name)?;

            if raw == INAPPLICABLE_VALUE {
                self.xml.write_nil_attribute(true)?;
                self.xml.write_empty_closing()?;
                continue;
            }

            self.xml.write_closing_bracket(false)?;

            let value = self.standardized(category, column, row);
            let width = Self::track_width(widths, column.index, &value, recalc_widths);
            let written = self.xml.write_data(&value, column.type_code, width);
            Self::report_format_error(written, category, column, &value)?;

            self.xml.write_qualified_closing_tag(column.name)?;
        }

        self.xml.decrement_indent();

        if !all_key {
            self.xml.write_indent()?;
        }
        self.xml.write_qualified_closing_tag(category)
    }

    fn standardized(&self, category: &str, column: &Column<'_>, row: &[String]) -> String {
        let item = cif::make_cif_item(category, column.name);
        self.dict.standardize_enum_value(&item, &row[column.index])
    }

    fn track_width(
        widths: &mut [usize],
        index: usize,
        value: &str,
        recalc_widths: bool,
    ) -> Option<usize> {
        let width = widths.get_mut(index)?;
        let len = value.chars().count();
        if recalc_widths && len > *width {
            *width = len;
        }
        Some(*width)
    }

    fn report_format_error(
        written: Result<()>,
        category: &str,
        column: &Column<'_>,
        value: &str,
    ) -> Result<()> {
        match written {
            Err(Error::Format(err)) => {
                warn!(
                    category,
                    attribute = column.name,
                    value,
                    error = %err,
                    "Value could not be formatted"
                );
                Ok(())
            }
            other => other,
        }
    }

    /// Write `atom_site` rows in the compact fixed-width atom record layout
    pub fn write_atom_record_table(&mut self, table: &Table) -> Result<()> {
        let present: Vec<(usize, &str, usize)> = ATOM_RECORD_COLUMNS
            .iter()
            .filter_map(|(name, width)| table.column_index(name).map(|i| (i, *name, *width)))
            .collect();
        let id_column = table.column_index("id");

        self.xml.write_indent()?;
        self.xml.write_opening_tag(ATOM_RECORD_CATEGORY)?;
        self.xml.write_closing_bracket(true)?;
        self.xml.increment_indent();

        for row in table.rows() {
            let id = id_column.map(|i| row[i].as_str()).unwrap_or("");

            self.xml.write_indent()?;
            self.xml.write_opening_tag(ATOM_RECORD_ELEMENT)?;
            self.xml.write_attribute_padded("id", id, 9)?;
            self.xml.write_closing_bracket(false)?;

            let mut cells = String::new();
            for (index, name, width) in &present {
                let cell = row[*index].as_str();
                if cell.is_empty() {
                    cells.push_str(UNKNOWN_VALUE);
                    continue;
                }

                if *name == "label_atom_id" || *name == "auth_atom_id" {
                    cells.push(' ');
                    cells.push_str(&cell.replace(' ', "&#32;"));
                } else {
                    cells.push_str(&format!("{:>width$}", cell, width = *width));
                }
                cells.push(' ');
            }
            self.xml.write_raw_text(&cells)?;

            self.xml.write_closing_tag(ATOM_RECORD_ELEMENT)?;
        }

        self.xml.decrement_indent();
        self.xml.write_indent()?;
        self.xml.write_closing_tag(ATOM_RECORD_CATEGORY)
    }
}

impl<'d, W: Write, D: DictionaryInfo + ?Sized> Deref for PdbMlWriter<'d, W, D> {
    type Target = XmlWriter<W>;

    fn deref(&self) -> &Self::Target {
        &self.xml
    }
}

impl<'d, W: Write, D: DictionaryInfo + ?Sized> DerefMut for PdbMlWriter<'d, W, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.xml
    }
}
