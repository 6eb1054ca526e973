//! Shared dictionary, relation graph and settings for integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use pdbml::cif;
use pdbml::dictionary::Example;
use pdbml::{
    CategoryDef, Dictionary, Error, ItemDef, KeyPolicy, RelationGraph, Result, SchemaSettings,
    Table, TypeCode,
};

/// A small mmCIF-like dictionary with entries, cells and entities
pub fn dictionary() -> Dictionary {
    Dictionary::new()
        .with_version("5.30")
        .with_category(
            "entry",
            CategoryDef::new()
                .with_description("Data items in the ENTRY category record details about this data block.")
                .with_key("id", ItemDef::new(TypeCode::String)),
        )
        .with_category(
            "cell",
            CategoryDef::new()
                .with_description(
                    "Data items in the CELL category record details about the\n\
                     crystallographic cell parameters.\n\
                     \x20   See _cell.length_a.",
                )
                .with_example(
                    Example::new("    _cell.entry_id 1ABC\n    _cell.length_a 10.5")
                        .with_detail("Example 1 - a cell."),
                )
                .with_key("entry_id", ItemDef::new(TypeCode::String))
                .with_item(
                    "length_a",
                    ItemDef::new(TypeCode::Float)
                        .with_description("Unit-cell length a.")
                        .with_range("0.0", "0.0")
                        .with_range("0.0", "."),
                )
                .with_item(
                    "volume",
                    ItemDef::new(TypeCode::Float).with_units("angstroms_cubed"),
                )
                .with_item("Z_PDB", ItemDef::new(TypeCode::Int).mandatory()),
        )
        .with_category(
            "entity",
            CategoryDef::new()
                .with_key("id", ItemDef::new(TypeCode::String))
                .with_item(
                    "type",
                    ItemDef::new(TypeCode::String)
                        .mandatory()
                        .with_enumeration(["polymer", "non-polymer", "water"]),
                )
                .with_item("details", ItemDef::new(TypeCode::Text)),
        )
        .with_category(
            "entity_poly",
            CategoryDef::new()
                .with_key("entity_id", ItemDef::new(TypeCode::String))
                .with_item("type", ItemDef::new(TypeCode::String).mandatory()),
        )
        .with_category(
            "struct_asym",
            CategoryDef::new()
                .with_key("id", ItemDef::new(TypeCode::String))
                .with_item("entity_id", ItemDef::new(TypeCode::String).mandatory())
                .with_item(
                    "details",
                    ItemDef::new(TypeCode::Text).may_be_inapplicable(),
                ),
        )
}

/// Parent/child links between the fixture categories
pub fn relations() -> RelationGraph {
    RelationGraph::new()
        .with_link(["_entry.id"], ["_cell.entry_id"])
        .and_then(|g| g.with_link(["_entity.id"], ["_entity_poly.entity_id"]))
        .and_then(|g| g.with_link(["_entity.id"], ["_struct_asym.entity_id"]))
        .and_then(|g| {
            g.with_link(
                ["_entity.id", "_entity.type"],
                ["_entity_poly.entity_id", "_entity_poly.type"],
            )
        })
        .and_then(|g| {
            g.with_link(
                ["_entity.id", "_entity.details"],
                ["_struct_asym.entity_id", "_struct_asym.details"],
            )
        })
        .and_then(|g| g.with_link(["_entity.type"], ["_entity_poly.type"]))
        .unwrap()
}

/// Settings with a fixed date so that output is reproducible
pub fn settings(policy: KeyPolicy) -> SchemaSettings {
    SchemaSettings::new("PDBx", "pdbx", policy)
        .with_generated_on(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
}

/// Parse `_category.item value` lines into one single-row table per
/// category, in order of first appearance
pub fn parse_cif_pairs(text: &str) -> Result<Vec<Table>> {
    let mut categories: Vec<(String, Vec<String>, Vec<String>)> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut parts = line.split_whitespace();
        let (Some(item), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::Example(format!("Cannot parse line \"{}\"", line)));
        };
        let Some((category, attribute)) = cif::split_cif_item(item) else {
            return Err(Error::Example(format!("Not an item name \"{}\"", item)));
        };

        match categories.iter_mut().find(|(name, _, _)| name == category) {
            Some((_, columns, values)) => {
                columns.push(attribute.to_string());
                values.push(value.to_string());
            }
            None => categories.push((
                category.to_string(),
                vec![attribute.to_string()],
                vec![value.to_string()],
            )),
        }
    }

    categories
        .into_iter()
        .map(|(name, columns, values)| Table::new(name, columns).with_row(values))
        .collect()
}
