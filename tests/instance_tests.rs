//! Integration tests for PDBML instance documents

mod fixtures;

use pdbml::namespaces::{XSD_NAMESPACE, XSI_NAMESPACE};
use pdbml::writers::SkipReason;
use pdbml::{generate_schema, KeyPolicy, PdbMlWriter, Table, TableOutcome};
use pretty_assertions::assert_eq;
use roxmltree::{Document, Node};

use fixtures::{dictionary, relations, settings};

const URI: &str = "http://pdbml.pdb.org/schema/pdbx-v5.30.xsd";

fn tables() -> Vec<Table> {
    vec![
        Table::new("entry", ["id"]).with_row(["1ABC"]).unwrap(),
        Table::new("cell", ["entry_id", "length_a", "volume", "Z_PDB"])
            .with_row(["1ABC", "10.5", "?", "four"])
            .unwrap(),
        Table::new("entity", ["id", "type", "details"])
            .with_row(["1", "POLYMER", "."])
            .unwrap()
            .with_row(["2", "water", "?"])
            .unwrap()
            .with_row(["?", "polymer", "orphan"])
            .unwrap(),
        Table::new("struct_asym", ["details"])
            .with_row(["none"])
            .unwrap(),
        Table::new("mystery", ["a", "b"]).with_row(["1", "2"]).unwrap(),
    ]
}

fn write_document(tables: &[Table]) -> (Vec<TableOutcome>, String) {
    let dict = dictionary();
    let mut writer = PdbMlWriter::new(Vec::new(), "PDBx", &dict);

    writer.write_declaration().unwrap();
    writer
        .write_datablock_start(Some("1ABC"), Some(URI), Some("pdbx-v5.30.xsd"))
        .unwrap();
    let outcomes = tables
        .iter()
        .map(|table| writer.write_table(table, &mut [], false).unwrap())
        .collect();
    writer.write_datablock_closing_tag().unwrap();

    (outcomes, String::from_utf8(writer.into_inner()).unwrap())
}

fn element_names(node: Node) -> Vec<String> {
    node.children()
        .filter(|c| c.is_element())
        .map(|c| c.tag_name().name().to_string())
        .collect()
}

#[test]
fn test_table_outcomes() {
    let (outcomes, _) = write_document(&tables());
    assert_eq!(
        outcomes,
        vec![
            TableOutcome::Written {
                rows: 1,
                skipped_rows: 0
            },
            TableOutcome::Written {
                rows: 1,
                skipped_rows: 0
            },
            TableOutcome::Written {
                rows: 2,
                skipped_rows: 1
            },
            TableOutcome::Skipped(SkipReason::NoKeyColumns),
            TableOutcome::Skipped(SkipReason::NoDefinedColumns),
        ]
    );
}

#[test]
fn test_document_structure() {
    let (_, xml) = write_document(&tables());
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<PDBx:datablock"));

    let doc = Document::parse(&xml).unwrap();
    let root = doc.root_element();
    assert!(root.has_tag_name((URI, "datablock")));
    assert_eq!(root.attribute("datablockName"), Some("1ABC"));
    assert_eq!(
        root.attribute((XSI_NAMESPACE, "schemaLocation")),
        Some("http://pdbml.pdb.org/schema/pdbx-v5.30.xsd pdbx-v5.30.xsd")
    );
    assert_eq!(
        element_names(root),
        vec!["entryCategory", "cellCategory", "entityCategory"]
    );
}

#[test]
fn test_row_contents() {
    let (_, xml) = write_document(&tables());
    let doc = Document::parse(&xml).unwrap();

    let cell = doc
        .descendants()
        .find(|n| n.has_tag_name((URI, "cell")))
        .unwrap();
    assert_eq!(cell.attribute("entry_id"), Some("1ABC"));
    // unknown values are left out, a value that is not an integer is
    // still written
    assert_eq!(element_names(cell), vec!["Z_PDB", "length_a"]);
    let z = cell.children().find(|n| n.has_tag_name((URI, "Z_PDB"))).unwrap();
    assert_eq!(z.text(), Some("four"));

    let entities: Vec<Node> = doc
        .descendants()
        .filter(|n| n.has_tag_name((URI, "entity")))
        .collect();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].attribute("id"), Some("1"));
    assert_eq!(element_names(entities[0]), vec!["details", "type"]);

    let details = entities[0].first_element_child().unwrap();
    assert_eq!(details.attribute((XSI_NAMESPACE, "nil")), Some("true"));
    let kind = entities[0].last_element_child().unwrap();
    assert_eq!(kind.text(), Some("polymer"));

    assert_eq!(entities[1].attribute("id"), Some("2"));
    assert_eq!(element_names(entities[1]), vec!["type"]);
}

#[test]
fn test_key_only_rows_stay_on_one_line() {
    let (_, xml) = write_document(&tables());
    assert!(xml.contains("      <PDBx:entry id=\"1ABC\"></PDBx:entry>\n"));
}

#[test]
fn test_widths_recalculated_across_rows() {
    let dict = dictionary();
    let mut writer = PdbMlWriter::new(Vec::new(), "PDBx", &dict);
    let entity = &tables()[2];

    let mut widths = vec![0; 3];
    writer.write_table(entity, &mut widths, true).unwrap();
    assert_eq!(widths, vec![1, 7, 0]);
}

#[test]
fn test_instance_elements_are_declared_in_schema() {
    let xsd = generate_schema(&dictionary(), &relations(), settings(KeyPolicy::AnyItems)).unwrap();
    let schema = Document::parse(&xsd).unwrap();
    let (_, xml) = write_document(&tables());
    let doc = Document::parse(&xml).unwrap();

    for category in ["cell", "entity"] {
        let type_name = format!("{}Type", category);
        let declared: Vec<&str> = schema
            .descendants()
            .find(|n| n.attribute("name") == Some(type_name.as_str()))
            .unwrap()
            .descendants()
            .filter(|n| {
                n.has_tag_name((XSD_NAMESPACE, "element"))
                    || n.has_tag_name((XSD_NAMESPACE, "attribute"))
            })
            .filter_map(|n| n.attribute("name"))
            .collect();

        for row in doc.descendants().filter(|n| n.has_tag_name((URI, category))) {
            for name in element_names(row) {
                assert!(declared.contains(&name.as_str()), "{} not in {}", name, type_name);
            }
            for attribute in row.attributes() {
                assert!(declared.contains(&attribute.name()), "{} not in {}", attribute.name(), type_name);
            }
        }
    }
}

#[test]
fn test_atom_record_document() {
    let dict = dictionary();
    let table = Table::new("atom_site", ["id", "group_PDB", "label_atom_id", "Cartn_x"])
        .with_row(["1", "ATOM", "C A", "1.5"])
        .unwrap()
        .with_row(["2", "HETATM", "O", ""])
        .unwrap();

    let mut writer = PdbMlWriter::new(Vec::new(), "PDBx", &dict);
    writer.write_datablock_start(None, Some(URI), None).unwrap();
    writer.write_atom_record_table(&table).unwrap();
    writer.write_datablock_closing_tag().unwrap();
    let xml = String::from_utf8(writer.into_inner()).unwrap();

    let doc = Document::parse(&xml).unwrap();
    let records: Vec<Node> = doc
        .descendants()
        .filter(|n| n.has_tag_name((URI, "atom_record")))
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].attribute("id"), Some("1"));
    let text = records[0].text().unwrap();
    assert!(text.contains("ATOM"));
    assert!(text.contains(" C A "));
    assert!(records[1].text().unwrap().trim_end().ends_with('?'));
}
