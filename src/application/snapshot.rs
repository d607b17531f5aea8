//! In-memory image of the whole store
//!
//! A snapshot is loaded, mutated and committed as one unit; dropping an
//! uncommitted snapshot discards every change made to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Blueprint, ElementId, Leaf, Node, Tree, TreeKind, VersionLedger};

/// An element together with the version row that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub version_id: u64,
    pub element: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    kinds: Vec<TreeKind>,
    ledger: VersionLedger,
    nodes: Vec<Stored<Node>>,
    leafs: Vec<Stored<Leaf>>,
    trees: Vec<Tree>,
    next_tree_id: u64,
}

impl StoreSnapshot {
    pub fn kinds(&self) -> &[TreeKind] {
        &self.kinds
    }

    pub fn kind_by_name(&self, name: &str) -> Option<&TreeKind> {
        self.kinds.iter().find(|k| k.name == name)
    }

    pub fn kind(&self, id: u32) -> Option<&TreeKind> {
        self.kinds.iter().find(|k| k.id == id)
    }

    /// Register a new tree kind; names are unique.
    pub fn add_kind(&mut self, name: &str, description: &str) -> ApplicationResult<TreeKind> {
        if self.kind_by_name(name).is_some() {
            return Err(ApplicationError::KindExists(name.to_string()));
        }
        let id = self.kinds.iter().map(|k| k.id).max().unwrap_or(0) + 1;
        let kind = TreeKind {
            id,
            name: name.to_string(),
            description: description.to_string(),
        };
        self.kinds.push(kind.clone());
        Ok(kind)
    }

    pub fn ledger(&self) -> &VersionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut VersionLedger {
        &mut self.ledger
    }

    /// Store the elements of a blueprint under a version row.
    pub fn insert_elements(&mut self, version_id: u64, blueprint: &Blueprint) {
        self.nodes.extend(blueprint.nodes.iter().map(|n| Stored {
            version_id,
            element: n.clone(),
        }));
        self.leafs.extend(blueprint.leafs.iter().map(|l| Stored {
            version_id,
            element: l.clone(),
        }));
    }

    /// Count stored elements whose id carries the given version numbers.
    ///
    /// Counts across version rows, so elements of an earlier row with the
    /// same (major, minor) are included.
    pub fn count_elements(&self, kind_id: u32, major: u32, minor: u32) -> usize {
        let nodes = self
            .nodes
            .iter()
            .filter(|s| s.element.id.belongs_to(kind_id, major, minor))
            .count();
        let leafs = self
            .leafs
            .iter()
            .filter(|s| s.element.id.belongs_to(kind_id, major, minor))
            .count();
        nodes + leafs
    }

    pub fn nodes_of(&self, version_id: u64) -> Vec<Node> {
        self.nodes
            .iter()
            .filter(|s| s.version_id == version_id)
            .map(|s| s.element.clone())
            .collect()
    }

    pub fn leafs_of(&self, version_id: u64) -> Vec<Leaf> {
        self.leafs
            .iter()
            .filter(|s| s.version_id == version_id)
            .map(|s| s.element.clone())
            .collect()
    }

    /// Remove all elements of a version row; returns how many were removed.
    pub fn delete_version_elements(&mut self, version_id: u64) -> usize {
        let before = self.nodes.len() + self.leafs.len();
        self.nodes.retain(|s| s.version_id != version_id);
        self.leafs.retain(|s| s.version_id != version_id);
        before - (self.nodes.len() + self.leafs.len())
    }

    pub fn add_tree(
        &mut self,
        root: ElementId,
        version_id: u64,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Tree {
        self.next_tree_id += 1;
        let tree = Tree {
            id: self.next_tree_id,
            root,
            version_id,
            created_by: created_by.to_string(),
            created_at: now,
        };
        self.trees.push(tree.clone());
        tree
    }

    /// The tree built for a version row, if any.
    pub fn tree_for_version(&self, version_id: u64) -> Option<&Tree> {
        self.trees.iter().rev().find(|t| t.version_id == version_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{element_id, ElementKind};

    fn leaf(kind_id: u32, major: u32, minor: u32, number: i64) -> Leaf {
        Leaf {
            id: element_id(kind_id, major, minor, ElementKind::Leaf, number),
            number,
            display_name: format!("leaf {number}"),
            result: true,
            color: None,
        }
    }

    fn blueprint(leafs: Vec<Leaf>) -> Blueprint {
        Blueprint {
            root: leafs[0].id.clone(),
            nodes: vec![],
            leafs,
        }
    }

    #[test]
    fn given_existing_kind_when_adding_again_then_rejected() {
        let mut snap = StoreSnapshot::default();
        let kind = snap.add_kind("credit", "").unwrap();

        assert_eq!(kind.id, 1);
        assert!(matches!(
            snap.add_kind("credit", "again"),
            Err(ApplicationError::KindExists(_))
        ));
    }

    #[test]
    fn given_two_rows_with_same_numbers_when_counting_then_counts_both() {
        let mut snap = StoreSnapshot::default();
        snap.insert_elements(1, &blueprint(vec![leaf(1, 0, 2, 1), leaf(1, 0, 2, 2)]));
        snap.insert_elements(3, &blueprint(vec![leaf(1, 0, 2, 1)]));
        snap.insert_elements(4, &blueprint(vec![leaf(1, 0, 3, 1)]));

        assert_eq!(snap.count_elements(1, 0, 2), 3);
        assert_eq!(snap.leafs_of(3).len(), 1);
    }

    #[test]
    fn given_version_elements_when_deleting_twice_then_idempotent() {
        let mut snap = StoreSnapshot::default();
        snap.insert_elements(1, &blueprint(vec![leaf(1, 0, 1, 1), leaf(1, 0, 1, 2)]));

        assert_eq!(snap.delete_version_elements(1), 2);
        assert_eq!(snap.delete_version_elements(1), 0);
        assert!(snap.leafs_of(1).is_empty());
    }
}
