//! Decision service
//!
//! Evaluates entities against the current (or a chosen) tree of a kind and
//! shapes the result for callers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::application::services::tree_service::{BuiltTree, TreeService};
use crate::application::ApplicationResult;
use crate::domain::{
    evaluate, Criterion, DataTypeId, ElementId, Evaluation, Fact, Outcome, TreeIndex,
};

/// Facts of one entity, optionally tagged so batch results can be matched up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sec_identifier: Option<String>,
    #[serde(default)]
    pub data: Vec<Fact>,
}

/// Summary of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sec_identifier: Option<String>,
    /// `kind name: major.minor`
    pub version: String,
    pub is_preliminary: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_id: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_data: Option<DataTypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_missing_sth: Option<ElementId>,
}

impl Decision {
    fn new(version: String, request: &EntityRequest, evaluation: &Evaluation) -> Self {
        let mut decision = Self {
            identifier: request.identifier.clone(),
            sec_identifier: request.sec_identifier.clone(),
            version,
            is_preliminary: evaluation.is_preliminary(),
            description: String::new(),
            result: None,
            leaf_id: None,
            missing_data: None,
            node_missing_sth: None,
        };
        match &evaluation.outcome {
            Outcome::Leaf(leaf) => {
                decision.description = leaf.display_name.clone();
                decision.result = Some(leaf.result);
                decision.leaf_id = Some(leaf.id.clone());
            }
            Outcome::MissingData { data_type, node } => {
                decision.description = format!(
                    "missing data to evaluate tree: data type {} at node with id: {}",
                    data_type, node.id
                );
                decision.missing_data = Some(*data_type);
                decision.node_missing_sth = Some(node.id.clone());
            }
        }
        decision
    }
}

/// Decision plus the criteria that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionResult {
    pub decision: Decision,
    pub criteria: Vec<Criterion>,
}

impl DecisionResult {
    /// JSON form with full or short criteria.
    pub fn to_json(&self, full: bool) -> Value {
        let criteria: Vec<Value> = if full {
            self.criteria.iter().map(|c| json!(c)).collect()
        } else {
            self.criteria.iter().map(|c| json!(c.short())).collect()
        };
        json!({
            "decision": self.decision,
            "criteria": criteria,
        })
    }
}

/// Service for evaluating entities.
pub struct DecisionService {
    trees: Arc<TreeService>,
}

impl DecisionService {
    pub fn new(trees: Arc<TreeService>) -> Self {
        Self { trees }
    }

    /// Evaluate one entity.
    pub fn decide(
        &self,
        kind: &str,
        version: Option<&str>,
        request: &EntityRequest,
    ) -> ApplicationResult<DecisionResult> {
        let (built, index) = self.trees.index_for(kind, version)?;
        Self::decide_with(&built, &index, request)
    }

    /// Evaluate entities in input order against one tree.
    ///
    /// The tree is loaded once; the first failing entity aborts the batch.
    #[instrument(level = "debug", skip(self, requests), fields(entities = requests.len()))]
    pub fn decide_batch(
        &self,
        kind: &str,
        version: Option<&str>,
        requests: &[EntityRequest],
    ) -> ApplicationResult<Vec<DecisionResult>> {
        let (built, index) = self.trees.index_for(kind, version)?;
        requests
            .iter()
            .map(|request| Self::decide_with(&built, &index, request))
            .collect()
    }

    fn decide_with(
        built: &BuiltTree,
        index: &TreeIndex,
        request: &EntityRequest,
    ) -> ApplicationResult<DecisionResult> {
        let evaluation = evaluate(index, &request.data)?;
        debug!(
            "entity {:?}: preliminary={}, {} criteria",
            request.identifier,
            evaluation.is_preliminary(),
            evaluation.criteria.len()
        );
        let decision = Decision::new(built.version_display(), request, &evaluation);
        Ok(DecisionResult {
            decision,
            criteria: evaluation.criteria,
        })
    }
}
