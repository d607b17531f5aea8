//! Human-readable element identifiers.
//!
//! A node or leaf id looks like `1_0.2_N.4`:
//! `{tree_kind}_{major}.{minor}_{N|L}.{number}`. The number is the one an author
//! used to declare relations inside a submission, before the element had an id.
//! Ids are unique per (kind, version) only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Distinguishes the two element kinds of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Leaf,
}

impl ElementKind {
    pub fn tag(self) -> char {
        match self {
            ElementKind::Node => 'N',
            ElementKind::Leaf => 'L',
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Node => write!(f, "node"),
            ElementKind::Leaf => write!(f, "leaf"),
        }
    }
}

/// Stable id of a node or leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this id was derived for the given kind and version.
    pub fn belongs_to(&self, kind_id: u32, major: u32, minor: u32) -> bool {
        self.0.starts_with(&version_prefix(kind_id, major, minor))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn version_prefix(kind_id: u32, major: u32, minor: u32) -> String {
    format!("{kind_id}_{major}.{minor}_")
}

/// Derive the id of an element once its owning version is known.
pub fn element_id(
    kind_id: u32,
    major: u32,
    minor: u32,
    kind: ElementKind,
    number: i64,
) -> ElementId {
    ElementId(format!(
        "{}{}.{}",
        version_prefix(kind_id, major, minor),
        kind.tag(),
        number
    ))
}
