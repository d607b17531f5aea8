//! Flat tree submissions as authored outside the system.
//!
//! Elements reference each other by their local `number`; ids do not exist yet.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Comparison, DataTypeId, Quorum};
use crate::domain::value::DataValue;

/// A whole tree: root reference plus all nodes and leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub created_by: String,
    #[serde(default, alias = "new_major_version")]
    pub is_major_update: bool,
    #[serde(alias = "root_number")]
    pub root: i64,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default, alias = "leaves")]
    pub leafs: Vec<LeafSpec>,
}

impl Submission {
    pub fn element_count(&self) -> usize {
        self.nodes.len() + self.leafs.len()
    }

    /// All submitted numbers, nodes first, in submission order.
    pub fn numbers(&self) -> impl Iterator<Item = i64> + '_ {
        self.nodes
            .iter()
            .map(|n| n.number)
            .chain(self.leafs.iter().map(|l| l.number))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub number: i64,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "data_type_id")]
    pub data_type: DataTypeId,
    pub data_value: DataValue,
    #[serde(default)]
    pub comparison: Comparison,
    #[serde(default)]
    pub list_comparison: Option<Quorum>,
    #[serde(default)]
    pub explanation: String,
    pub true_number: i64,
    #[serde(default)]
    pub true_explanation: String,
    #[serde(default, alias = "true_color_id")]
    pub true_color: Option<u32>,
    pub false_number: i64,
    #[serde(default)]
    pub false_explanation: String,
    #[serde(default, alias = "false_color_id")]
    pub false_color: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSpec {
    pub number: i64,
    pub display_name: String,
    pub result: bool,
    #[serde(default, alias = "color_id")]
    pub color: Option<u32>,
}
