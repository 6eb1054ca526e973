//! Key, unique and keyref constraints
//!
//! Constraints are derived in two steps. [`filter_keys`] applies the
//! active [`KeyPolicy`] to every parent combo key of a category and its
//! child keys; [`plan_category_keys`] then assigns constraint ids. The
//! declarations and the keyrefs are both written from the same
//! [`KeyPlan`], so every `refer` names a declared constraint.
//!
//! Id 0 is the category key, the sorted set of all key items. Other
//! combo keys are numbered from 1 in the order they survive filtering.

use std::collections::BTreeSet;
use std::io::Write;

use tracing::{debug, warn};

use crate::cif;
use crate::dictionary::{ChildKeys, ComboKey, DictionaryInfo, ParentChild};
use crate::error::{Error, Result};
use crate::names;
use crate::settings::{ConstraintKind, KeyPolicy, SchemaSettings};
use crate::writers::XsdTag;

use super::ranges;
use super::PdbMlSchema;

/// Check if an item is dropped from parent combo keys
pub fn skip_parent_item<D: DictionaryInfo + ?Sized>(dict: &D, policy: KeyPolicy, item: &str) -> bool {
    let is_key = crate::dictionary::is_own_key_item(dict, item);
    match policy {
        KeyPolicy::IntrinsicKeysOnly => !is_key,
        KeyPolicy::KeySupersetsMandatory => {
            !is_key && (!dict.is_item_mandatory(item) || dict.can_be_inapplicable(item))
        }
        KeyPolicy::MandatoryItems => !dict.is_item_mandatory(item) || dict.can_be_inapplicable(item),
        KeyPolicy::AnyItems => dict.can_be_inapplicable(item),
    }
}

/// Check if an item is dropped from child combo keys
pub fn skip_child_item<D: DictionaryInfo + ?Sized>(dict: &D, policy: KeyPolicy, item: &str) -> bool {
    match policy {
        KeyPolicy::IntrinsicKeysOnly | KeyPolicy::KeySupersetsMandatory => {
            skip_parent_item(dict, policy, item)
        }
        KeyPolicy::MandatoryItems | KeyPolicy::AnyItems => {
            skip_parent_item(dict, policy, item) || dict.is_bad_child_relation(item)
        }
    }
}

/// Check if items are exactly the key items of their category
pub fn are_all_key_items<D: DictionaryInfo + ?Sized>(dict: &D, items: &[String]) -> bool {
    let Some(category) = items.first().and_then(|item| cif::category_of(item)) else {
        return false;
    };

    items.len() == dict.category_keys(category).len()
        && items.iter().all(|item| crate::dictionary::is_own_key_item(dict, item))
}

/// Check if items contain all key items of their category
pub fn is_superset_of_key_items<D: DictionaryInfo + ?Sized>(dict: &D, items: &[String]) -> bool {
    let Some(category) = items.first().and_then(|item| cif::category_of(item)) else {
        return false;
    };

    let key_items = items
        .iter()
        .filter(|item| crate::dictionary::is_own_key_item(dict, item))
        .count();
    key_items == dict.category_keys(category).len()
}

/// A parent combo key and the child keys that survived filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredKey {
    /// Parent items, in relation order
    pub parent: ComboKey,
    /// Children, each with its remaining keys
    pub children: Vec<ChildKeys>,
}

fn without_positions(key: &[String], positions: &BTreeSet<usize>) -> ComboKey {
    key.iter()
        .enumerate()
        .filter(|(i, _)| !positions.contains(i))
        .map(|(_, item)| item.clone())
        .collect()
}

/// Apply the skip rules of a policy to the combo keys of a category.
///
/// A parent key with any skipped item is discarded. A parent position
/// skipped in every child key is removed from the parent and all its
/// children. Child keys that still have a skipped position are dropped,
/// as are children left without keys.
pub fn filter_keys<D, P>(dict: &D, graph: &P, policy: KeyPolicy, category: &str) -> Vec<FilteredKey>
where
    D: DictionaryInfo + ?Sized,
    P: ParentChild + ?Sized,
{
    let mut filtered = Vec::new();

    for parent in graph.combo_keys(category) {
        if parent.iter().any(|item| skip_parent_item(dict, policy, item)) {
            debug!(category, key = ?parent, "Discarding parent key with skipped items");
            continue;
        }

        let children = graph.children_keys(&parent);

        let mut skipped: Vec<Vec<BTreeSet<usize>>> = children
            .iter()
            .map(|child| {
                child
                    .keys
                    .iter()
                    .map(|key| {
                        key.iter()
                            .enumerate()
                            .filter(|(_, item)| skip_child_item(dict, policy, item))
                            .map(|(i, _)| i)
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let total_keys: usize = skipped.iter().map(Vec::len).sum();
        let mut removed = BTreeSet::new();

        for position in 0..parent.len() {
            let skipped_in = skipped
                .iter()
                .flatten()
                .filter(|set| set.contains(&position))
                .count();

            if total_keys > 0 && skipped_in == total_keys {
                removed.insert(position);
                for set in skipped.iter_mut().flatten() {
                    set.remove(&position);
                }
            }
        }

        let mut kept_children = Vec::new();
        for (child, child_skipped) in children.iter().zip(&skipped) {
            let keys: Vec<ComboKey> = child
                .keys
                .iter()
                .zip(child_skipped)
                .filter(|(_, set)| set.is_empty())
                .map(|(key, _)| without_positions(key, &removed))
                .filter(|key| !key.is_empty())
                .collect();

            if keys.is_empty() {
                debug!(category, child = %child.category, "Dropping child without usable keys");
                continue;
            }

            kept_children.push(ChildKeys {
                category: child.category.clone(),
                keys,
            });
        }

        filtered.push(FilteredKey {
            parent: without_positions(&parent, &removed),
            children: kept_children,
        });
    }

    filtered
}

/// A key or unique constraint to declare
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDeclaration {
    /// Constraint id, 0 for the category key
    pub id: usize,
    /// Key or unique
    pub kind: ConstraintKind,
    /// Sorted items
    pub items: ComboKey,
}

/// Keyrefs of one filtered parent key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyrefGroup {
    /// Position of the parent key among the filtered keys
    pub ordinal: usize,
    /// Id of the referenced constraint
    pub key_id: usize,
    /// Parent items, in relation order
    pub parent: ComboKey,
    /// Referencing children
    pub children: Vec<ChildKeys>,
}

/// All constraints of one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPlan {
    /// Key and unique constraints, category key first
    pub declarations: Vec<KeyDeclaration>,
    /// Keyref groups
    pub keyrefs: Vec<KeyrefGroup>,
}

impl KeyPlan {
    /// Kind of the declared constraint with an id
    pub fn kind_of(&self, id: usize) -> Option<ConstraintKind> {
        self.declarations
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.kind)
    }
}

/// Name of a key or unique constraint, e.g. `cellKey_0`
pub fn constraint_name(category: &str, kind: ConstraintKind, id: usize) -> String {
    format!("{}{}_{}", category, kind.name_part(), id)
}

/// Name of a keyref, e.g. `entryKeyref_0_0_1_0`
pub fn keyref_name(category: &str, ordinal: usize, key_id: usize, child: usize, child_key: usize) -> String {
    format!("{}Keyref_{}_{}_{}_{}", category, ordinal, key_id, child, child_key)
}

fn warn_multiple_sub_ranges<D: DictionaryInfo + ?Sized>(dict: &D, items: &[String]) {
    for item in items {
        if ranges::has_multiple_sub_ranges(&dict.ranges(item)) {
            warn!(
                item = %item,
                "Item with multiple permitted value ranges participates in a key/keyref \
                 relationship as a union; validators disagree on matching such values"
            );
        }
    }
}

/// Assign constraint ids to the category key and the filtered combo keys
pub fn plan_category_keys<D, P>(dict: &D, graph: &P, settings: &SchemaSettings, category: &str) -> KeyPlan
where
    D: DictionaryInfo + ?Sized,
    P: ParentChild + ?Sized,
{
    let mut plan = KeyPlan::default();

    let mut intrinsic = dict.category_keys(category);
    intrinsic.sort();

    let intrinsic_declared = intrinsic.iter().any(|item| dict.is_item_defined(item));
    if intrinsic_declared {
        plan.declarations.push(KeyDeclaration {
            id: 0,
            kind: settings.intrinsic_kind(),
            items: intrinsic,
        });
    } else if !intrinsic.is_empty() {
        warn!(category, "No key item of the category is defined, category key not declared");
    }

    let policy = settings.key_policy();
    let mut next_id = 1;

    for (ordinal, key) in filter_keys(dict, graph, policy, category).into_iter().enumerate() {
        if key.parent.is_empty() || key.children.is_empty() {
            debug!(category, ordinal, "Discarding combo key without items or children");
            continue;
        }

        let all_key = are_all_key_items(dict, &key.parent);
        let admitted = match policy {
            KeyPolicy::IntrinsicKeysOnly => all_key,
            KeyPolicy::KeySupersetsMandatory => is_superset_of_key_items(dict, &key.parent),
            KeyPolicy::MandatoryItems | KeyPolicy::AnyItems => true,
        };
        if !admitted {
            debug!(category, ordinal, policy = %policy, "Combo key not admitted by policy");
            continue;
        }

        let key_id = if all_key {
            if !intrinsic_declared {
                warn!(category, ordinal, "Keyrefs to an undeclared category key skipped");
                continue;
            }
            0
        } else {
            let mut items = key.parent.clone();
            items.sort();
            if !items.iter().any(|item| dict.is_item_defined(item)) {
                warn!(category, key = ?items, "Combo key without defined items skipped");
                continue;
            }

            let id = next_id;
            next_id += 1;
            plan.declarations.push(KeyDeclaration {
                id,
                kind: settings.combo_kind(),
                items,
            });
            id
        };

        plan.keyrefs.push(KeyrefGroup {
            ordinal,
            key_id,
            parent: key.parent,
            children: key.children,
        });
    }

    plan
}

/// Child attributes ordered to align with the sorted parent items
fn aligned_child_fields(parent: &[String], child_key: &[String]) -> Vec<String> {
    let mut pairs: Vec<(&str, &str)> = parent
        .iter()
        .zip(child_key)
        .map(|(p, c)| (p.as_str(), cif::attribute_of(c).unwrap_or(c.as_str())))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs.into_iter().map(|(_, c)| c.to_string()).collect()
}

impl<'a, W, D, P> PdbMlSchema<'a, W, D, P>
where
    W: Write,
    D: DictionaryInfo + ?Sized,
    P: ParentChild + ?Sized,
{
    fn category_path(&self, category: &str) -> String {
        let ns = self.settings.namespace();
        let category = names::qualify_name(category, false);
        format!(
            "{}/{}",
            ns.qualify(&names::make_category_element_name(&category)),
            ns.qualify(&category)
        )
    }

    fn write_field(&mut self, category: &str, attribute: &str) -> Result<()> {
        self.writer.open(XsdTag::Field)?;
        if self.dict.is_key_item(category, attribute) {
            self.writer.write_xpath_attribute(attribute, true)?;
        } else {
            let path = self
                .settings
                .namespace()
                .qualify(&names::qualify_name(attribute, false));
            self.writer.write_xpath_attribute(&path, false)?;
        }
        self.writer.close_empty()
    }

    fn write_key_declaration(&mut self, category: &str, declaration: &KeyDeclaration) -> Result<()> {
        let tag = match declaration.kind {
            ConstraintKind::Key => XsdTag::Key,
            ConstraintKind::Unique => XsdTag::Unique,
        };

        self.writer.open(tag)?;
        self.writer
            .write_name_attribute(&constraint_name(category, declaration.kind, declaration.id))?;
        self.writer.begin_content()?;

        let path = self.category_path(category);
        self.writer.open(XsdTag::Selector)?;
        self.writer.write_xpath_attribute(&path, false)?;
        self.writer.close_empty()?;

        for item in &declaration.items {
            if !self.dict.is_item_defined(item) {
                warn!(category, item = %item, "Undefined key item omitted from constraint");
                continue;
            }
            let Some(attribute) = cif::attribute_of(item) else {
                continue;
            };
            self.write_field(category, attribute)?;
        }

        self.writer.close_block(tag)
    }

    pub(super) fn write_keyref(
        &mut self,
        name: &str,
        refer: &str,
        child_category: &str,
        child_fields: &[String],
    ) -> Result<()> {
        if child_fields.is_empty() {
            return Err(Error::EmptyKeyref(name.to_string()));
        }

        self.writer.open(XsdTag::Keyref)?;
        self.writer.write_name_attribute(name)?;
        self.writer.write_refer_attribute(refer)?;
        self.writer.begin_content()?;

        let path = self.category_path(child_category);
        self.writer.open(XsdTag::Selector)?;
        self.writer.write_xpath_attribute(&path, false)?;
        self.writer.close_empty()?;

        for attribute in child_fields {
            self.write_field(child_category, attribute)?;
        }

        self.writer.close_block(XsdTag::Keyref)
    }

    /// Write the key, unique and keyref constraints of a category
    pub(super) fn write_category_constraints(&mut self, category: &str) -> Result<usize> {
        let plan = plan_category_keys(self.dict, self.graph, &self.settings, category);

        for declaration in &plan.declarations {
            self.write_key_declaration(category, declaration)?;
        }

        let mut written = plan.declarations.len();

        for group in &plan.keyrefs {
            let Some(kind) = plan.kind_of(group.key_id) else {
                continue;
            };
            let refer = self
                .settings
                .namespace()
                .qualify(&constraint_name(category, kind, group.key_id));

            warn_multiple_sub_ranges(self.dict, &group.parent);

            for (child_index, child) in group.children.iter().enumerate() {
                for (child_key_index, child_key) in child.keys.iter().enumerate() {
                    warn_multiple_sub_ranges(self.dict, child_key);

                    let name = keyref_name(
                        category,
                        group.ordinal,
                        group.key_id,
                        child_index,
                        child_key_index,
                    );
                    let fields = aligned_child_fields(&group.parent, child_key);
                    self.write_keyref(&name, &refer, &child.category, &fields)?;
                    written += 1;
                }
            }
        }

        Ok(written)
    }
}
