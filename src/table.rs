//! Relational table data written as PDBML instances

use crate::cif;
use crate::dictionary::TypeCode;
use crate::error::{Error, Result};

/// One category's rows as typed string columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    type_codes: Option<Vec<TypeCode>>,
}

impl Table {
    /// Create an empty table for a category
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            type_codes: None,
        }
    }

    /// Override the dictionary types, one code per column
    pub fn with_type_codes(mut self, type_codes: Vec<TypeCode>) -> Result<Self> {
        if type_codes.len() != self.columns.len() {
            return Err(Error::Table(format!(
                "Table \"{}\" has {} columns but {} type codes were given",
                self.name,
                self.columns.len(),
                type_codes.len()
            )));
        }
        self.type_codes = Some(type_codes);
        Ok(self)
    }

    /// Append a row
    pub fn add_row<I, S>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(Error::Table(format!(
                "Row of {} values does not fit table \"{}\" of {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder form of [`Table::add_row`]
    pub fn with_row<I, S>(mut self, row: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_row(row)?;
        Ok(self)
    }

    /// Category name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Per-column type overrides
    pub fn type_codes(&self) -> Option<&[TypeCode]> {
        self.type_codes.as_deref()
    }

    /// Index of a column, matched case-insensitively
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| cif::is_ci_equal(c, column))
    }

    /// Check if a column is present
    pub fn is_column_present(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Value of a column in a row
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }
}
