//! Evaluation of one entity's facts against a built tree.
//!
//! Evaluation is a pure function of a [`TreeIndex`] and a fact list. The index
//! is built once per tree version; every entity gets a fresh trace.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::arena::TreeIndex;
use crate::domain::entities::{Comparison, DataTypeId, Element, Leaf, Node, Quorum};
use crate::domain::error::EvaluationError;
use crate::domain::ids::ElementId;
use crate::domain::value::{DataValue, FactValue};

/// One piece of information about an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub data_type: DataTypeId,
    #[serde(rename = "data_value", alias = "value")]
    pub value: FactValue,
}

impl Fact {
    pub fn new(data_type: u32, value: impl Into<FactValue>) -> Self {
        Self {
            data_type: DataTypeId(data_type),
            value: value.into(),
        }
    }
}

/// Trace record of one evaluated node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: ElementId,
    pub number: i64,
    pub name: String,
    pub description: String,
    /// Outcome color, 0 if none
    pub color: u32,
    pub data_type: DataTypeId,
    pub comparison_value: DataValue,
    pub comparison_method: String,
    pub list_comparison_method: String,
    /// Node explanation followed by the outcome-specific explanation
    pub explanation: String,
    pub input_value: FactValue,
    pub result: bool,
    /// Successor id if the successor is a node, empty otherwise
    pub based_on: String,
}

impl Criterion {
    pub fn new(node: &Node, result: bool, input: FactValue) -> Self {
        let (color, outcome_explanation) = if result {
            (node.true_color, &node.true_explanation)
        } else {
            (node.false_color, &node.false_explanation)
        };
        Self {
            id: node.id.clone(),
            number: node.number,
            name: node.display_name.clone(),
            description: node.description.clone(),
            color: color.unwrap_or(0),
            data_type: node.data_type,
            comparison_value: node.data_value.clone(),
            comparison_method: node.comparison.tag().to_string(),
            list_comparison_method: node
                .list_comparison
                .as_ref()
                .map(|q| q.tag().to_string())
                .unwrap_or_default(),
            explanation: format!("{}{}", node.explanation, outcome_explanation),
            input_value: input,
            result,
            based_on: node
                .successor(result)
                .node_id()
                .map(ElementId::to_string)
                .unwrap_or_default(),
        }
    }

    pub fn short(&self) -> ShortCriterion {
        ShortCriterion {
            id: self.id.clone(),
            input_value: self.input_value.clone(),
            result: self.result,
            based_on: self.based_on.clone(),
        }
    }
}

/// Compact trace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortCriterion {
    pub id: ElementId,
    pub input_value: FactValue,
    pub result: bool,
    pub based_on: String,
}

/// How a walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A leaf was reached: definitive result
    Leaf(Leaf),
    /// The node's data type had no fact: preliminary result
    MissingData { data_type: DataTypeId, node: Node },
}

/// Result of evaluating one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub criteria: Vec<Criterion>,
    pub outcome: Outcome,
}

impl Evaluation {
    pub fn end_leaf(&self) -> Option<&Leaf> {
        match &self.outcome {
            Outcome::Leaf(leaf) => Some(leaf),
            Outcome::MissingData { .. } => None,
        }
    }

    pub fn missing_data(&self) -> Option<DataTypeId> {
        match &self.outcome {
            Outcome::MissingData { data_type, .. } => Some(*data_type),
            Outcome::Leaf(_) => None,
        }
    }

    pub fn missing_at_node(&self) -> Option<&Node> {
        match &self.outcome {
            Outcome::MissingData { node, .. } => Some(node),
            Outcome::Leaf(_) => None,
        }
    }

    pub fn is_preliminary(&self) -> bool {
        matches!(self.outcome, Outcome::MissingData { .. })
    }
}

/// Walk the tree from its root with the given facts.
///
/// Stops at a leaf, or at the first node whose data type has no fact.
/// At most one fact per data type is accepted.
#[instrument(level = "debug", skip_all, fields(tree = index.tree().id, facts = facts.len()))]
pub fn evaluate(index: &TreeIndex, facts: &[Fact]) -> Result<Evaluation, EvaluationError> {
    let mut by_type: HashMap<DataTypeId, &FactValue> = HashMap::with_capacity(facts.len());
    for fact in facts {
        if by_type.insert(fact.data_type, &fact.value).is_some() {
            return Err(EvaluationError::DuplicateFact(fact.data_type));
        }
    }

    let mut criteria = Vec::new();
    let mut current = index.root()?;

    // an acyclic tree reaches a leaf within len() steps
    for _ in 0..=index.len() {
        let node = match current {
            Element::Leaf(leaf) => {
                debug!("reached leaf {}", leaf.id);
                return Ok(Evaluation {
                    criteria,
                    outcome: Outcome::Leaf(leaf.clone()),
                });
            }
            Element::Node(node) => node,
        };

        let Some(&value) = by_type.get(&node.data_type) else {
            debug!("missing data type {} at node {}", node.data_type, node.id);
            return Ok(Evaluation {
                criteria,
                outcome: Outcome::MissingData {
                    data_type: node.data_type,
                    node: node.clone(),
                },
            });
        };

        let result = evaluate_node(node, value)?;
        trace!("node {}: {} -> {}", node.id, value, result);
        criteria.push(Criterion::new(node, result, value.clone()));
        current = index.successor(node.successor(result))?;
    }

    Err(EvaluationError::DanglingReference(current.id().clone()))
}

/// Apply a node's predicate to a fact value.
///
/// Lists are compared element-wise and reduced by the node's quorum.
pub fn evaluate_node(node: &Node, value: &FactValue) -> Result<bool, EvaluationError> {
    match value {
        FactValue::Scalar(v) => compare(node, v),
        FactValue::List(values) => {
            let hits = values
                .iter()
                .map(|v| compare(node, v))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .filter(|&hit| hit)
                .count();
            Ok(match node.list_comparison.as_ref().unwrap_or(&Quorum::All) {
                Quorum::One => hits == 1,
                Quorum::Two => hits == 2,
                Quorum::All => hits == values.len(),
                Quorum::Other(_) => hits != 0,
            })
        }
    }
}

fn compare(node: &Node, value: &DataValue) -> Result<bool, EvaluationError> {
    let operand = &node.data_value;
    let ordering = || {
        value
            .semantic_cmp(operand)
            .ok_or_else(|| EvaluationError::Incomparable {
                node: node.id.clone(),
                value: value.to_string(),
                operand: operand.to_string(),
            })
    };
    match &node.comparison {
        Comparison::GreaterThan => Ok(ordering()? == Ordering::Greater),
        Comparison::SmallerThan => Ok(ordering()? == Ordering::Less),
        Comparison::Equal => Ok(value.semantic_eq(operand)),
        Comparison::NotEqual => Ok(!value.semantic_eq(operand)),
        Comparison::Unrecognized(tag) => Err(EvaluationError::UnrecognizedComparison {
            node: node.id.clone(),
            tag: tag.clone(),
        }),
    }
}
