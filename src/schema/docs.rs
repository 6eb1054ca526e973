//! Documentation text and inline example rendering

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::dictionary::DictionaryInfo;
use crate::error::{Error, Result};
use crate::table::Table;
use crate::writers::PdbMlWriter;

static ITEM_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_([^.\s]+)\.([^\s]+?)([.;,]?)$").unwrap());

/// Renders the CIF text of a category example as PDBML
pub trait ExampleRenderer {
    /// Render one example, failing on text that cannot be parsed
    fn render_example(&self, cif_text: &str) -> Result<String>;
}

impl<F> ExampleRenderer for F
where
    F: Fn(&str) -> Result<String>,
{
    fn render_example(&self, cif_text: &str) -> Result<String> {
        self(cif_text)
    }
}

/// Example renderer over a CIF parser that yields tables.
///
/// Each parsed table is written with [`PdbMlWriter`]; tables of
/// undefined categories and empty tables are skipped.
pub struct TablesExampleRenderer<'d, D: DictionaryInfo + ?Sized, F> {
    dict: &'d D,
    ns: String,
    parse: F,
}

impl<'d, D, F> TablesExampleRenderer<'d, D, F>
where
    D: DictionaryInfo + ?Sized,
    F: Fn(&str) -> Result<Vec<Table>>,
{
    /// Create a renderer writing elements qualified with `ns`
    pub fn new(dict: &'d D, ns: impl Into<String>, parse: F) -> Self {
        Self {
            dict,
            ns: ns.into(),
            parse,
        }
    }
}

impl<'d, D, F> ExampleRenderer for TablesExampleRenderer<'d, D, F>
where
    D: DictionaryInfo + ?Sized,
    F: Fn(&str) -> Result<Vec<Table>>,
{
    fn render_example(&self, cif_text: &str) -> Result<String> {
        let tables = (self.parse)(cif_text)?;
        let mut writer = PdbMlWriter::new(Vec::new(), self.ns.clone(), self.dict);

        for table in &tables {
            if !self.dict.is_category_defined(table.name()) {
                debug!(table = table.name(), "Skipping conversion to XML of the unknown table");
                continue;
            }
            if table.num_rows() == 0 {
                continue;
            }
            writer.write_table(table, &mut [], false)?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Example(format!("Rendered example is not UTF-8: {}", e)))
    }
}

fn rewrite_line(line: &str) -> String {
    let mut references = 0;
    let words: Vec<String> = line
        .split([' ', '\t'])
        .filter(|w| !w.is_empty())
        .map(|word| match ITEM_REFERENCE.captures(word) {
            Some(caps) => {
                references += 1;
                format!("attribute {} in category {}{}", &caps[2], &caps[1], &caps[3])
            }
            None => word.to_string(),
        })
        .collect();

    if references == 1 {
        words.join(" ")
    } else {
        line.to_string()
    }
}

/// Prepare a description for documentation.
///
/// Leading whitespace is stripped from every line, and a line naming
/// exactly one item as `_category.attribute` is spelled out as
/// `attribute <attribute> in category <category>`.
pub fn format_description(description: &str) -> String {
    description
        .split('\n')
        .map(|line| rewrite_line(line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Frame the CIF text of a category example for parsing
pub fn format_example(case: &str) -> String {
    if case.is_empty() {
        return String::new();
    }

    let mut framed = String::with_capacity(case.len() + 3);
    framed.push('\n');
    for line in case.split_inclusive('\n') {
        let stripped = line.trim_start_matches([' ', '\t']);
        framed.push_str(stripped);
    }
    framed.push_str("\n\n");
    framed
}

/// Render a category example, logging failures
pub(crate) fn render_category_example(
    renderer: Option<&dyn ExampleRenderer>,
    category: &str,
    case: &str,
) -> Option<String> {
    let framed = format_example(case);
    let Some(renderer) = renderer else {
        return Some(framed);
    };

    match renderer.render_example(&framed) {
        Ok(xml) => Some(xml),
        Err(e) => {
            warn!(category, error = %e, "Skipping conversion to XML of the bad CIF segment");
            None
        }
    }
}
