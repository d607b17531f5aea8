//! Domain entities: tree kinds, versions, nodes, leaves and trees

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::ElementId;
use crate::domain::value::DataValue;

/// Named category under which decision trees are versioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeKind {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One build of a tree kind's tree.
///
/// Versions are ordered by creation, not by their (major, minor) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Row id, unique across all kinds
    pub id: u64,
    pub kind_id: u32,
    pub major: u32,
    pub minor: u32,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Version {
    /// `major.minor`
    pub fn label(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Parse a `major.minor` label.
    pub fn parse_label(label: &str) -> Option<(u32, u32)> {
        let (major, minor) = label.trim().split_once('.')?;
        Some((major.parse().ok()?, minor.parse().ok()?))
    }

    /// `kind name: major.minor`
    pub fn display_with(&self, kind: &TreeKind) -> String {
        format!("{}: {}", kind.name, self.label())
    }
}

/// Identifies which fact a node inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTypeId(pub u32);

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Comparison operator of a node.
///
/// Unknown tags survive deserialization as `Unrecognized` so a malformed
/// stored tree is reported instead of silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Comparison {
    #[default]
    GreaterThan,
    SmallerThan,
    Equal,
    NotEqual,
    Unrecognized(String),
}

impl Comparison {
    pub fn tag(&self) -> &str {
        match self {
            Comparison::GreaterThan => "GT",
            Comparison::SmallerThan => "ST",
            Comparison::Equal => "EQ",
            Comparison::NotEqual => "NE",
            Comparison::Unrecognized(tag) => tag,
        }
    }
}

impl From<String> for Comparison {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "GT" => Comparison::GreaterThan,
            "ST" => Comparison::SmallerThan,
            "EQ" => Comparison::Equal,
            "NE" => Comparison::NotEqual,
            _ => Comparison::Unrecognized(tag),
        }
    }
}

impl From<Comparison> for String {
    fn from(c: Comparison) -> Self {
        c.tag().to_string()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How per-element results of a list-valued fact are reduced to one boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Quorum {
    /// Every element must satisfy the comparison
    #[default]
    All,
    /// Exactly one element
    One,
    /// Exactly two elements
    Two,
    /// Any other tag, blank included: at least one element
    Other(String),
}

impl Quorum {
    pub fn tag(&self) -> &str {
        match self {
            Quorum::All => "ALL",
            Quorum::One => "ONE",
            Quorum::Two => "TWO",
            Quorum::Other(tag) => tag,
        }
    }
}

impl From<String> for Quorum {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "ALL" => Quorum::All,
            "ONE" => Quorum::One,
            "TWO" => Quorum::Two,
            _ => Quorum::Other(tag),
        }
    }
}

impl From<Quorum> for String {
    fn from(q: Quorum) -> Self {
        q.tag().to_string()
    }
}

/// Resolved reference from a node to the element that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Successor {
    Node(ElementId),
    Leaf(ElementId),
}

impl Successor {
    pub fn id(&self) -> &ElementId {
        match self {
            Successor::Node(id) | Successor::Leaf(id) => id,
        }
    }

    /// The id if the successor is itself a node.
    pub fn node_id(&self) -> Option<&ElementId> {
        match self {
            Successor::Node(id) => Some(id),
            Successor::Leaf(_) => None,
        }
    }
}

/// A branching comparison test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: ElementId,
    pub number: i64,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub data_type: DataTypeId,
    pub data_value: DataValue,
    #[serde(default)]
    pub comparison: Comparison,
    #[serde(default)]
    pub list_comparison: Option<Quorum>,
    #[serde(default)]
    pub explanation: String,
    pub true_successor: Successor,
    #[serde(default)]
    pub true_explanation: String,
    #[serde(default)]
    pub true_color: Option<u32>,
    pub false_successor: Successor,
    #[serde(default)]
    pub false_explanation: String,
    #[serde(default)]
    pub false_color: Option<u32>,
}

impl Node {
    pub fn successor(&self, outcome: bool) -> &Successor {
        if outcome {
            &self.true_successor
        } else {
            &self.false_successor
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.display_name)
    }
}

/// A terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub id: ElementId,
    pub number: i64,
    pub display_name: String,
    pub result: bool,
    #[serde(default)]
    pub color: Option<u32>,
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.display_name)
    }
}

/// Either element of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node(Node),
    Leaf(Leaf),
}

impl Element {
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Node(n) => &n.id,
            Element::Leaf(l) => &l.id,
        }
    }

    pub fn number(&self) -> i64 {
        match self {
            Element::Node(n) => n.number,
            Element::Leaf(l) => l.number,
        }
    }
}

/// One build artifact: the root of a version's graph and who submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub id: u64,
    pub root: ElementId,
    pub version_id: u64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.id, self.created_at.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("GT", Comparison::GreaterThan)]
    #[case("ST", Comparison::SmallerThan)]
    #[case("EQ", Comparison::Equal)]
    #[case("NE", Comparison::NotEqual)]
    #[case("NN", Comparison::Unrecognized("NN".into()))]
    fn test_comparison_from_tag(#[case] tag: &str, #[case] expected: Comparison) {
        let parsed = Comparison::from(tag.to_string());
        assert_eq!(parsed, expected);
        assert_eq!(parsed.tag(), tag);
    }

    #[rstest]
    #[case("ALL", Quorum::All)]
    #[case("", Quorum::Other(String::new()))]
    #[case("ONE", Quorum::One)]
    #[case("TWO", Quorum::Two)]
    #[case("ANY", Quorum::Other("ANY".into()))]
    fn test_quorum_from_tag(#[case] tag: &str, #[case] expected: Quorum) {
        assert_eq!(Quorum::from(tag.to_string()), expected);
    }

    #[test]
    fn given_version_when_displaying_then_shows_kind_and_numbers() {
        let kind = TreeKind {
            id: 1,
            name: "Test Kind".into(),
            description: "test description".into(),
        };
        let version = Version {
            id: 7,
            kind_id: 1,
            major: 2,
            minor: 3,
            valid: false,
            deleted: false,
            created_at: Utc::now(),
        };
        assert_eq!(version.display_with(&kind), "Test Kind: 2.3");
        assert_eq!(version.label(), "2.3");
    }

    #[rstest]
    #[case("2.3", Some((2, 3)))]
    #[case("0.10", Some((0, 10)))]
    #[case("2", None)]
    #[case("a.b", None)]
    fn test_parse_label(#[case] label: &str, #[case] expected: Option<(u32, u32)>) {
        assert_eq!(Version::parse_label(label), expected);
    }

    #[test]
    fn given_successor_json_when_roundtripping_then_keeps_variant() {
        let s = Successor::Leaf(ElementId::new("1_0.1_L.2"));
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"type":"leaf","id":"1_0.1_L.2"}"#);
        assert_eq!(s.node_id(), None);
    }
}
