//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

use crate::domain::entities::DataTypeId;
use crate::domain::ids::ElementId;

/// Where a dangling number reference was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Referrer {
    Root,
    Node(i64),
}

impl fmt::Display for Referrer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Referrer::Root => write!(f, "root"),
            Referrer::Node(number) => write!(f, "node {number}"),
        }
    }
}

/// A submitted tree violates a structural rule.
///
/// These are user-facing: the caller may fix the submission and resubmit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("submission contains no nodes")]
    EmptySubmission,

    #[error("number {number} is used more than once")]
    DuplicateNumber { number: i64 },

    #[error("number {number} (referenced by {referrer}) is not used in nodes/leafs")]
    UnresolvedSuccessor { number: i64, referrer: Referrer },

    #[error("root {number} is a leaf")]
    RootIsLeaf { number: i64 },

    #[error("node {number} uses unknown comparison '{tag}'")]
    UnknownComparison { number: i64, tag: String },

    #[error("recursion error: node {number} is reachable from itself")]
    CyclicGraph { number: i64 },

    #[error("number of saved nodes/leafs ({saved}) not like in query ({submitted})")]
    CountMismatch { saved: usize, submitted: usize },
}

impl ValidationError {
    /// Remediation text shown next to the error.
    pub fn hint(&self) -> String {
        match self {
            ValidationError::EmptySubmission => {
                "add at least one node and set it as root, then resubmit".to_string()
            }
            ValidationError::DuplicateNumber { number } => {
                format!(
                    "give every node and leaf its own number ({number} is taken), then resubmit"
                )
            }
            ValidationError::UnresolvedSuccessor { number, .. } => {
                format!("add an element with number {number} or fix the reference, then resubmit")
            }
            ValidationError::RootIsLeaf { number } => {
                format!("point root at a node instead of leaf {number}, then resubmit")
            }
            ValidationError::UnknownComparison { .. } => {
                "use one of GT, ST, EQ, NE as comparison, then resubmit".to_string()
            }
            ValidationError::CyclicGraph { number } => {
                format!(
                    "break the loop at node {number} so each path ends in a leaf, then resubmit"
                )
            }
            ValidationError::CountMismatch { .. } => {
                "probably the query has two 'roots' or a version collided with stored \
                 elements; check the numbers and resubmit"
                    .to_string()
            }
        }
    }
}

/// The stored tree or the supplied facts cannot be evaluated.
///
/// Signals a malformed tree or ambiguous input; never recovered by defaulting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("duplicate element {0} while indexing tree")]
    DuplicateElement(ElementId),

    #[error("element {0} is referenced but not part of the tree")]
    DanglingReference(ElementId),

    #[error("data type {0} supplied more than once")]
    DuplicateFact(DataTypeId),

    #[error("unrecognized comparison '{tag}' at node {node}")]
    UnrecognizedComparison { node: ElementId, tag: String },

    #[error("cannot order {value} against {operand} at node {node}")]
    Incomparable {
        node: ElementId,
        value: String,
        operand: String,
    },
}

/// Domain errors represent business logic violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid tree: {0}")]
    Validation(#[from] ValidationError),

    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
}
