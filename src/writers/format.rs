//! Value escaping and scalar formatting
//!
//! Stateless helpers shared by the XSD and PDBML writers.

use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::cif;
use crate::dictionary::TypeCode;
use crate::error::{Error, FormatError, Result};

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

/// XSD built-in type of a data type
pub fn xsd_type_name(type_code: TypeCode) -> Result<&'static str> {
    match type_code {
        TypeCode::Int => Ok("xsd:integer"),
        TypeCode::Float => Ok("xsd:decimal"),
        TypeCode::String | TypeCode::Text => Ok("xsd:string"),
        TypeCode::DateTime => Ok("xsd:date"),
        TypeCode::None => Err(Error::InvalidTypeCode(type_code.to_string())),
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '\'' => out.push_str("&apos;"),
        '"' => out.push_str("&quot;"),
        '&' => out.push_str("&amp;"),
        '%' => out.push_str("&#37;"),
        _ => out.push(c),
    }
}

/// Escape a value for an attribute or a single-line element.
///
/// Null values produce nothing. Whitespace runs collapse to one space
/// and at most `width` characters are kept.
pub fn escape_string(value: &str, width: Option<usize>) -> String {
    if cif::is_empty_value(value) {
        return String::new();
    }

    let mut out = String::with_capacity(value.len());
    let mut in_space = false;
    for c in value.chars().take(width.unwrap_or(usize::MAX)) {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        push_escaped(&mut out, c);
    }
    out
}

/// Escape multi-line text, keeping its newlines
pub fn escape_text(value: &str) -> String {
    if cif::is_empty_value(value) {
        return String::new();
    }

    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_whitespace() && c != '\n' {
            out.push(' ');
        } else {
            push_escaped(&mut out, c);
        }
    }
    out
}

/// Check an integer value
pub fn format_integer(value: &str) -> std::result::Result<String, FormatError> {
    if INTEGER.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(FormatError::new("Value is not an integer", value))
    }
}

/// Check a decimal value, rewriting scientific notation to fixed notation
pub fn format_float(value: &str) -> std::result::Result<String, FormatError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => {}
        Ok(_) => {
            return Err(FormatError::new("Value is not a float", value)
                .with_reason("not a finite number"))
        }
        Err(e) => {
            return Err(FormatError::new("Value is not a float", value).with_reason(e.to_string()))
        }
    }

    if value.contains(['e', 'E']) {
        Decimal::from_scientific(value)
            .map(|d| d.to_string())
            .map_err(|e| FormatError::new("Value is not a float", value).with_reason(e.to_string()))
    } else {
        Ok(value.to_string())
    }
}

/// Check a date value after removing all whitespace
pub fn format_date(value: &str, width: Option<usize>) -> std::result::Result<String, FormatError> {
    let date: String = value
        .chars()
        .take(width.unwrap_or(usize::MAX))
        .filter(|c| !c.is_whitespace())
        .collect();

    match NaiveDate::from_str(&date) {
        Ok(_) => Ok(date),
        Err(e) => Err(FormatError::new("Value is not a date", date).with_reason(e.to_string())),
    }
}

/// Format a value as its data type.
///
/// On a format error the returned [`FormatError`] still carries the
/// value to write unformatted.
pub fn format_data(value: &str, type_code: TypeCode, width: Option<usize>) -> Result<String> {
    if cif::is_empty_value(value) && type_code != TypeCode::None {
        return Ok(String::new());
    }

    match type_code {
        TypeCode::Int => Ok(format_integer(value)?),
        TypeCode::Float => Ok(format_float(value)?),
        TypeCode::String => Ok(escape_string(value, width)),
        TypeCode::Text => Ok(escape_text(value)),
        TypeCode::DateTime => Ok(format_date(value, width)?),
        TypeCode::None => Err(Error::InvalidTypeCode(type_code.to_string())),
    }
}
