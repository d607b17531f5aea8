//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (TreeStore, FileSystem)
//! but are themselves concrete structs, not traits.

mod decision_service;
mod tree_service;

pub use decision_service::{Decision, DecisionResult, DecisionService, EntityRequest};
pub use tree_service::{BuiltTree, TreeService, VersionEntry};
