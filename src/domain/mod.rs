//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod evaluator;
pub mod ids;
pub mod ledger;
pub mod submission;
pub mod value;

pub use arena::TreeIndex;
pub use builder::{Blueprint, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, EvaluationError, ValidationError};
pub use evaluator::{evaluate, Criterion, Evaluation, Fact, Outcome, ShortCriterion};
pub use ids::{ElementId, ElementKind};
pub use ledger::VersionLedger;
pub use submission::{LeafSpec, NodeSpec, Submission};
pub use value::{DataValue, FactValue};
