//! Integration tests for schema generation
//!
//! Generated schemas are read back with roxmltree so that assertions
//! work on structure rather than on exact whitespace.

mod fixtures;

use pdbml::dictionary::Example;
use pdbml::namespaces::XSD_NAMESPACE;
use pdbml::schema::TablesExampleRenderer;
use pdbml::{
    generate_schema, CategoryDef, ConstraintKind, Dictionary, ItemDef, KeyPolicy,
    PdbMlSchema, RelationGraph, TypeCode,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use roxmltree::{Document, Node};

use fixtures::{dictionary, parse_cif_pairs, relations, settings};

fn generate(policy: KeyPolicy) -> String {
    generate_schema(&dictionary(), &relations(), settings(policy)).unwrap()
}

fn count_tags(doc: &Document, local: &str) -> usize {
    doc.descendants()
        .filter(|n| n.has_tag_name((XSD_NAMESPACE, local)))
        .count()
}

fn named<'a, 'i>(doc: &'a Document<'i>, name: &str) -> Node<'a, 'i> {
    doc.descendants()
        .find(|n| n.is_element() && n.attribute("name") == Some(name))
        .unwrap_or_else(|| panic!("no element named {}", name))
}

fn xpaths(node: Node) -> Vec<String> {
    node.children()
        .filter(|c| c.is_element())
        .filter_map(|c| c.attribute("xpath"))
        .map(String::from)
        .collect()
}

fn names_of(doc: &Document, local: &str) -> Vec<String> {
    doc.descendants()
        .filter(|n| n.has_tag_name((XSD_NAMESPACE, local)))
        .filter_map(|n| n.attribute("name"))
        .map(String::from)
        .collect()
}

#[test]
fn test_cell_category_type() {
    let dict = Dictionary::new().with_category(
        "cell",
        CategoryDef::new()
            .with_key("entry_id", ItemDef::new(TypeCode::String))
            .with_item(
                "length_a",
                ItemDef::new(TypeCode::Float).mandatory().with_range("0", "."),
            ),
    );
    let xsd = generate_schema(
        &dict,
        &RelationGraph::new(),
        settings(KeyPolicy::IntrinsicKeysOnly),
    )
    .unwrap();
    let doc = Document::parse(&xsd).unwrap();

    let cell_type = named(&doc, "cellType");
    let all: Vec<Node> = cell_type
        .descendants()
        .filter(|n| n.has_tag_name((XSD_NAMESPACE, "all")))
        .collect();
    assert_eq!(all.len(), 1);

    let length_a = named(&doc, "length_a");
    assert_eq!(length_a.attribute("minOccurs"), Some("1"));
    assert_eq!(length_a.attribute("maxOccurs"), Some("1"));
    let min = length_a
        .descendants()
        .find(|n| n.has_tag_name((XSD_NAMESPACE, "minInclusive")))
        .unwrap();
    assert_eq!(min.attribute("value"), Some("0"));
    assert_eq!(count_tags(&doc, "maxInclusive"), 0);

    let entry_id = named(&doc, "entry_id");
    assert!(entry_id.has_tag_name((XSD_NAMESPACE, "attribute")));
    assert_eq!(entry_id.attribute("use"), Some("required"));
}

#[test]
fn test_schema_is_well_formed_for_every_policy() {
    for policy in KeyPolicy::ALL {
        let xsd = generate(policy);
        let doc = Document::parse(&xsd).unwrap();
        let root = doc.root_element();
        assert!(root.has_tag_name((XSD_NAMESPACE, "schema")));
        assert_eq!(
            root.attribute("targetNamespace"),
            Some("http://pdbml.pdb.org/schema/pdbx.xsd")
        );
        assert_eq!(root.attribute("elementFormDefault"), Some("qualified"));
    }
}

#[test]
fn test_category_types_are_sorted() {
    let doc_text = generate(KeyPolicy::AnyItems);
    let doc = Document::parse(&doc_text).unwrap();
    let types: Vec<String> = doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name((XSD_NAMESPACE, "complexType")))
        .filter_map(|n| n.attribute("name"))
        .map(String::from)
        .collect();
    assert_eq!(
        types,
        vec![
            "cellType",
            "entityType",
            "entity_polyType",
            "entryType",
            "struct_asymType",
            "datablockType",
        ]
    );
}

#[test]
fn test_constraint_counts_per_policy() {
    let expected = [
        (KeyPolicy::IntrinsicKeysOnly, 5, 0, 2),
        (KeyPolicy::KeySupersetsMandatory, 5, 1, 4),
        (KeyPolicy::MandatoryItems, 5, 2, 5),
        (KeyPolicy::AnyItems, 5, 2, 6),
    ];

    for (policy, keys, uniques, keyrefs) in expected {
        let xsd = generate(policy);
        let doc = Document::parse(&xsd).unwrap();
        assert_eq!(count_tags(&doc, "key"), keys, "keys for {}", policy);
        assert_eq!(count_tags(&doc, "unique"), uniques, "uniques for {}", policy);
        assert_eq!(count_tags(&doc, "keyref"), keyrefs, "keyrefs for {}", policy);
    }
}

#[test]
fn test_keyref_names_and_targets() {
    let xsd = generate(KeyPolicy::AnyItems);
    let doc = Document::parse(&xsd).unwrap();

    assert_eq!(
        names_of(&doc, "keyref"),
        vec![
            "entityKeyref_0_0_0_0",
            "entityKeyref_0_0_1_0",
            "entityKeyref_1_1_0_0",
            "entityKeyref_2_0_0_0",
            "entityKeyref_3_2_0_0",
            "entryKeyref_0_0_0_0",
        ]
    );

    let declared: Vec<String> = names_of(&doc, "key")
        .into_iter()
        .chain(names_of(&doc, "unique"))
        .map(|name| format!("PDBx:{}", name))
        .collect();
    for keyref in doc
        .descendants()
        .filter(|n| n.has_tag_name((XSD_NAMESPACE, "keyref")))
    {
        let refer = keyref.attribute("refer").unwrap();
        assert!(declared.iter().any(|d| d == refer), "undeclared {}", refer);
    }
}

#[test]
fn test_combo_key_fields() {
    let xsd = generate(KeyPolicy::MandatoryItems);
    let doc = Document::parse(&xsd).unwrap();

    let unique = named(&doc, "entityUnique_1");
    assert!(unique.has_tag_name((XSD_NAMESPACE, "unique")));
    assert_eq!(
        xpaths(unique),
        vec!["PDBx:entityCategory/PDBx:entity", "@id", "PDBx:type"]
    );

    let keyref = named(&doc, "entityKeyref_1_1_0_0");
    assert_eq!(keyref.attribute("refer"), Some("PDBx:entityUnique_1"));
    assert_eq!(
        xpaths(keyref),
        vec![
            "PDBx:entity_polyCategory/PDBx:entity_poly",
            "@entity_id",
            "PDBx:type",
        ]
    );

    let by_type = named(&doc, "entityKeyref_2_2_0_0");
    assert_eq!(by_type.attribute("refer"), Some("PDBx:entityUnique_2"));
}

#[test]
fn test_reduced_key_reuses_category_key() {
    let xsd = generate(KeyPolicy::AnyItems);
    let doc = Document::parse(&xsd).unwrap();

    // _struct_asym.details may be inapplicable, so the (id, details) key
    // shrinks to the category key
    let keyref = named(&doc, "entityKeyref_2_0_0_0");
    assert_eq!(keyref.attribute("refer"), Some("PDBx:entityKey_0"));
    assert_eq!(
        xpaths(keyref),
        vec!["PDBx:struct_asymCategory/PDBx:struct_asym", "PDBx:entity_id"]
    );
}

#[test]
fn test_combo_constraint_kind_setting() {
    let settings = settings(KeyPolicy::MandatoryItems).with_combo_kind(ConstraintKind::Key);
    let xsd = generate_schema(&dictionary(), &relations(), settings).unwrap();
    let doc = Document::parse(&xsd).unwrap();

    assert_eq!(count_tags(&doc, "unique"), 0);
    assert_eq!(count_tags(&doc, "key"), 7);
    let keyref = named(&doc, "entityKeyref_1_1_0_0");
    assert_eq!(keyref.attribute("refer"), Some("PDBx:entityKey_1"));
}

#[test]
fn test_nillable_items_per_policy() {
    let expected = [
        (
            KeyPolicy::IntrinsicKeysOnly,
            vec!["details", "type", "type", "details", "entity_id"],
        ),
        (KeyPolicy::KeySupersetsMandatory, vec!["details", "details"]),
        (KeyPolicy::MandatoryItems, vec!["details", "details"]),
        (KeyPolicy::AnyItems, vec!["details"]),
    ];

    for (policy, nillable) in expected {
        let xsd = generate(policy);
        let doc = Document::parse(&xsd).unwrap();
        let found: Vec<&str> = doc
            .descendants()
            .filter(|n| n.attribute("nillable") == Some("true"))
            .filter_map(|n| n.attribute("name"))
            .collect();
        assert_eq!(found, nillable, "nillable items for {}", policy);
    }
}

#[test]
fn test_item_type_encodings() {
    let xsd = generate(KeyPolicy::AnyItems);
    let doc = Document::parse(&xsd).unwrap();

    let z = named(&doc, "Z_PDB");
    assert_eq!(z.attribute("type"), Some("xsd:integer"));
    assert_eq!(z.attribute("minOccurs"), Some("1"));

    let volume = named(&doc, "volume");
    let units = volume
        .descendants()
        .find(|n| n.has_tag_name((XSD_NAMESPACE, "attribute")))
        .unwrap();
    assert_eq!(units.attribute("fixed"), Some("angstroms_cubed"));
    assert_eq!(units.attribute("name"), Some("units"));

    let entity_type = doc
        .descendants()
        .filter(|n| n.attribute("name") == Some("type"))
        .find(|n| n.ancestors().any(|a| a.attribute("name") == Some("entityType")))
        .unwrap();
    let values: Vec<&str> = entity_type
        .descendants()
        .filter(|n| n.has_tag_name((XSD_NAMESPACE, "enumeration")))
        .filter_map(|n| n.attribute("value"))
        .collect();
    assert_eq!(values, vec!["polymer", "non-polymer", "water"]);
}

#[test]
fn test_category_documentation() {
    let dict = dictionary();
    let graph = relations();
    let renderer = TablesExampleRenderer::new(&dict, "PDBx", parse_cif_pairs);
    let mut schema = PdbMlSchema::new(Vec::new(), &dict, &graph, settings(KeyPolicy::AnyItems))
        .with_example_renderer(renderer);
    schema.convert().unwrap();
    let xsd = String::from_utf8(schema.into_inner()).unwrap();

    assert!(xsd.contains(
        "crystallographic cell parameters.\nSee attribute length_a in category cell.\n"
    ));
    assert!(xsd.contains("Example 1 - a cell.\n&lt;PDBx:cellCategory&gt;\n"));
    assert!(xsd.contains("&lt;PDBx:cell entry_id=&quot;1ABC&quot;&gt;"));
    assert!(xsd.contains("&lt;PDBx:length_a&gt;10.5&lt;/PDBx:length_a&gt;"));

    let doc = Document::parse(&xsd).unwrap();
    let documentation = named(&doc, "cellType")
        .descendants()
        .find(|n| n.has_tag_name((XSD_NAMESPACE, "documentation")))
        .unwrap();
    let text = documentation.text().unwrap();
    assert!(text.contains("<PDBx:length_a>10.5</PDBx:length_a>"));
}

#[test]
fn test_bad_example_is_skipped() {
    let dict = Dictionary::new().with_category(
        "entry",
        CategoryDef::new()
            .with_example(Example::new("loop_ _entry.id broken"))
            .with_example(Example::new("_entry.id 1ABC"))
            .with_key("id", ItemDef::new(TypeCode::String)),
    );
    let graph = RelationGraph::new();
    let renderer = TablesExampleRenderer::new(&dict, "PDBx", parse_cif_pairs);
    let mut schema = PdbMlSchema::new(Vec::new(), &dict, &graph, settings(KeyPolicy::AnyItems))
        .with_example_renderer(renderer);
    schema.convert().unwrap();
    let xsd = String::from_utf8(schema.into_inner()).unwrap();

    assert!(!xsd.contains("broken"));
    assert!(xsd.contains("&lt;PDBx:entry id=&quot;1ABC&quot;&gt;"));
    assert!(Document::parse(&xsd).is_ok());
}

#[test]
fn test_reruns_are_identical() {
    assert_eq!(generate(KeyPolicy::MandatoryItems), generate(KeyPolicy::MandatoryItems));
}

proptest! {
    #[test]
    fn category_key_is_independent_of_key_order(
        (keys, shuffled) in prop::collection::btree_set("[a-z]{1,8}", 1..5)
            .prop_flat_map(|set| {
                let keys: Vec<String> = set.into_iter().collect();
                (Just(keys.clone()), Just(keys).prop_shuffle())
            })
    ) {
        let build = |order: &[String]| {
            let category = order.iter().fold(CategoryDef::new(), |cat, key| {
                cat.with_key(key.clone(), ItemDef::new(TypeCode::String))
            });
            Dictionary::new().with_category("thing", category)
        };
        let graph = RelationGraph::new();

        let first = generate_schema(&build(&keys), &graph, settings(KeyPolicy::AnyItems)).unwrap();
        let second = generate_schema(&build(&shuffled), &graph, settings(KeyPolicy::AnyItems)).unwrap();
        prop_assert_eq!(first, second);
    }
}
