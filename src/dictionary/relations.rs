//! In-memory parent/child relationship graph

use serde::{Deserialize, Serialize};

use super::{ChildKeys, ComboKey, ParentChild};
use crate::cif;
use crate::error::{Error, Result};

/// A child combo key referencing a parent combo key of equal arity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    /// Parent combo key
    pub parent: ComboKey,
    /// Child combo key, positionally paired with the parent
    pub child: ComboKey,
}

/// Parent/child graph built from individual links
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    links: Vec<ParentLink>,
}

fn same_key(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| cif::is_ci_equal(x, y))
}

fn key_category(key: &[String]) -> Option<&str> {
    key.first().and_then(|item| cif::category_of(item))
}

impl RelationGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from links
    pub fn from_links(links: Vec<ParentLink>) -> Result<Self> {
        let mut graph = Self::new();
        for link in links {
            graph.add_link(link.parent, link.child)?;
        }
        Ok(graph)
    }

    /// Load a graph from a JSON list of `{"parent": [...], "child": [...]}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let links: Vec<ParentLink> = serde_json::from_str(json)?;
        Self::from_links(links)
    }

    /// Add a link between a parent key and a child key
    pub fn add_link<P, C, S>(&mut self, parent: P, child: C) -> Result<()>
    where
        P: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parent: ComboKey = parent.into_iter().map(Into::into).collect();
        let child: ComboKey = child.into_iter().map(Into::into).collect();

        if parent.is_empty() || parent.len() != child.len() {
            return Err(Error::Relation(format!(
                "Parent key {:?} and child key {:?} differ in arity",
                parent, child
            )));
        }

        for item in parent.iter().chain(child.iter()) {
            if cif::split_cif_item(item).is_none() {
                return Err(Error::Relation(format!("Invalid item name \"{}\"", item)));
            }
        }

        self.add_link_unchecked(ParentLink { parent, child });
        Ok(())
    }

    /// Builder form of [`RelationGraph::add_link`]
    pub fn with_link<S: Into<String>>(
        mut self,
        parent: impl IntoIterator<Item = S>,
        child: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        self.add_link(parent, child)?;
        Ok(self)
    }

    fn add_link_unchecked(&mut self, link: ParentLink) {
        let duplicate = self
            .links
            .iter()
            .any(|l| same_key(&l.parent, &link.parent) && same_key(&l.child, &link.child));
        if !duplicate {
            self.links.push(link);
        }
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Check if the graph has no links
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl ParentChild for RelationGraph {
    fn combo_keys(&self, category: &str) -> Vec<ComboKey> {
        let mut keys: Vec<ComboKey> = Vec::new();
        for link in &self.links {
            let owned = key_category(&link.parent)
                .map(|cat| cif::is_ci_equal(cat, category))
                .unwrap_or(false);
            if owned && !keys.iter().any(|k| same_key(k, &link.parent)) {
                keys.push(link.parent.clone());
            }
        }
        keys
    }

    fn children_keys(&self, parent: &[String]) -> Vec<ChildKeys> {
        let mut children: Vec<ChildKeys> = Vec::new();
        for link in self.links.iter().filter(|l| same_key(&l.parent, parent)) {
            let Some(category) = key_category(&link.child) else {
                continue;
            };
            match children
                .iter_mut()
                .find(|c| cif::is_ci_equal(&c.category, category))
            {
                Some(entry) => entry.keys.push(link.child.clone()),
                None => children.push(ChildKeys {
                    category: category.to_string(),
                    keys: vec![link.child.clone()],
                }),
            }
        }
        children
    }
}
