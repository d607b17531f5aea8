//! Tree builder: turns a flat submission into a validated, addressable graph.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::domain::entities::{Comparison, Leaf, Node, Successor, Version};
use crate::domain::error::{Referrer, ValidationError};
use crate::domain::ids::{element_id, ElementId, ElementKind};
use crate::domain::submission::{NodeSpec, Submission};

/// Result type for tree building.
pub type BuildResult<T> = Result<T, ValidationError>;

/// Validated elements of one submission under its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    pub root: ElementId,
    pub nodes: Vec<Node>,
    pub leafs: Vec<Leaf>,
}

impl Blueprint {
    pub fn element_count(&self) -> usize {
        self.nodes.len() + self.leafs.len()
    }
}

/// Builds the elements of a submission under an already minted version.
pub struct TreeBuilder<'v> {
    version: &'v Version,
    /// Submitted number to element kind
    kinds: HashMap<i64, ElementKind>,
}

impl<'v> TreeBuilder<'v> {
    pub fn new(version: &'v Version) -> Self {
        Self {
            version,
            kinds: HashMap::new(),
        }
    }

    /// Validate a submission and derive its elements.
    ///
    /// Checks run in this order: no nodes, duplicate numbers, unknown
    /// comparisons, dangling references, root is a leaf, cycles.
    #[instrument(level = "debug", skip_all, fields(version = %self.version.label()))]
    pub fn build(&mut self, submission: &Submission) -> BuildResult<Blueprint> {
        self.kinds.clear();

        if submission.nodes.is_empty() {
            return Err(ValidationError::EmptySubmission);
        }
        if let Some(number) = submission.numbers().duplicates().next() {
            return Err(ValidationError::DuplicateNumber { number });
        }

        self.kinds.extend(submission.nodes.iter().map(|n| (n.number, ElementKind::Node)));
        self.kinds.extend(submission.leafs.iter().map(|l| (l.number, ElementKind::Leaf)));

        let nodes = submission
            .nodes
            .iter()
            .map(|spec| self.build_node(spec))
            .collect::<BuildResult<Vec<_>>>()?;
        let leafs = submission
            .leafs
            .iter()
            .map(|spec| Leaf {
                id: self.id(ElementKind::Leaf, spec.number),
                number: spec.number,
                display_name: spec.display_name.clone(),
                result: spec.result,
                color: spec.color,
            })
            .collect::<Vec<_>>();

        let root = match self.resolve(submission.root, Referrer::Root)? {
            Successor::Node(id) => id,
            Successor::Leaf(_) => {
                return Err(ValidationError::RootIsLeaf {
                    number: submission.root,
                })
            }
        };

        let reachable = self.check_acyclic(submission)?;
        let unreachable = submission
            .numbers()
            .filter(|n| !reachable.contains(n))
            .collect::<Vec<_>>();
        if !unreachable.is_empty() {
            warn!("elements not reachable from root {}: {:?}", submission.root, unreachable);
        }

        debug!("built {} nodes, {} leafs", nodes.len(), leafs.len());
        Ok(Blueprint { root, nodes, leafs })
    }

    fn id(&self, kind: ElementKind, number: i64) -> ElementId {
        element_id(
            self.version.kind_id,
            self.version.major,
            self.version.minor,
            kind,
            number,
        )
    }

    fn resolve(&self, number: i64, referrer: Referrer) -> BuildResult<Successor> {
        match self.kinds.get(&number) {
            Some(ElementKind::Node) => Ok(Successor::Node(self.id(ElementKind::Node, number))),
            Some(ElementKind::Leaf) => Ok(Successor::Leaf(self.id(ElementKind::Leaf, number))),
            None => Err(ValidationError::UnresolvedSuccessor { number, referrer }),
        }
    }

    fn build_node(&self, spec: &NodeSpec) -> BuildResult<Node> {
        if let Comparison::Unrecognized(tag) = &spec.comparison {
            return Err(ValidationError::UnknownComparison {
                number: spec.number,
                tag: tag.clone(),
            });
        }
        Ok(Node {
            id: self.id(ElementKind::Node, spec.number),
            number: spec.number,
            display_name: spec.display_name.clone(),
            description: spec.description.clone(),
            data_type: spec.data_type,
            data_value: spec.data_value.clone(),
            comparison: spec.comparison.clone(),
            list_comparison: spec.list_comparison.clone(),
            explanation: spec.explanation.clone(),
            true_successor: self.resolve(spec.true_number, Referrer::Node(spec.number))?,
            true_explanation: spec.true_explanation.clone(),
            true_color: spec.true_color,
            false_successor: self.resolve(spec.false_number, Referrer::Node(spec.number))?,
            false_explanation: spec.false_explanation.clone(),
            false_color: spec.false_color,
        })
    }

    /// Depth-first walk over nodes from the root.
    ///
    /// A node already on the current path means a cycle. Returns every
    /// number reached, leaves included.
    fn check_acyclic(&self, submission: &Submission) -> BuildResult<HashSet<i64>> {
        let successors: HashMap<i64, [i64; 2]> = submission
            .nodes
            .iter()
            .map(|n| (n.number, [n.true_number, n.false_number]))
            .collect();

        let mut on_path = HashSet::new();
        let mut finished = HashSet::new();
        let mut reached = HashSet::new();
        let mut stack = vec![(submission.root, false)];

        while let Some((number, exiting)) = stack.pop() {
            if exiting {
                on_path.remove(&number);
                finished.insert(number);
                continue;
            }
            reached.insert(number);
            let Some(next) = successors.get(&number) else {
                continue; // leaf
            };
            if finished.contains(&number) {
                continue;
            }
            on_path.insert(number);
            stack.push((number, true));
            for &succ in next {
                if on_path.contains(&succ) {
                    return Err(ValidationError::CyclicGraph { number: succ });
                }
                if !finished.contains(&succ) {
                    stack.push((succ, false));
                }
            }
        }
        Ok(reached)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::entities::DataTypeId;
    use crate::domain::submission::LeafSpec;
    use crate::domain::value::DataValue;

    fn version() -> Version {
        Version {
            id: 1,
            kind_id: 1,
            major: 1,
            minor: 0,
            valid: false,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    fn node(number: i64, t: i64, f: i64) -> NodeSpec {
        NodeSpec {
            number,
            display_name: format!("node {number}"),
            description: String::new(),
            data_type: DataTypeId(1),
            data_value: DataValue::Int(0),
            comparison: Comparison::Equal,
            list_comparison: None,
            explanation: String::new(),
            true_number: t,
            true_explanation: String::new(),
            true_color: None,
            false_number: f,
            false_explanation: String::new(),
            false_color: None,
        }
    }

    fn leaf(number: i64) -> LeafSpec {
        LeafSpec {
            number,
            display_name: format!("leaf {number}"),
            result: number % 2 == 0,
            color: None,
        }
    }

    fn submission(root: i64, nodes: Vec<NodeSpec>, leafs: Vec<LeafSpec>) -> Submission {
        Submission {
            created_by: "jonas".into(),
            is_major_update: false,
            root,
            nodes,
            leafs,
        }
    }

    #[test]
    fn given_valid_submission_when_building_then_resolves_ids() {
        let v = version();
        let sub = submission(1, vec![node(1, 2, 3)], vec![leaf(2), leaf(3)]);

        let bp = TreeBuilder::new(&v).build(&sub).unwrap();

        assert_eq!(bp.root.as_str(), "1_1.0_N.1");
        assert_eq!(bp.element_count(), 3);
        assert_eq!(bp.nodes[0].true_successor, Successor::Leaf(ElementId::new("1_1.0_L.2")));
        assert_eq!(bp.nodes[0].false_successor, Successor::Leaf(ElementId::new("1_1.0_L.3")));
    }

    #[test]
    fn given_shared_subtree_when_building_then_not_a_cycle() {
        let v = version();
        let sub = submission(
            1,
            vec![node(1, 2, 4), node(2, 4, 5), node(4, 5, 6)],
            vec![leaf(5), leaf(6)],
        );
        assert!(TreeBuilder::new(&v).build(&sub).is_ok());
    }

    #[test]
    fn given_self_loop_when_building_then_cyclic() {
        let v = version();
        let sub = submission(1, vec![node(1, 1, 2)], vec![leaf(2)]);
        assert_eq!(
            TreeBuilder::new(&v).build(&sub).unwrap_err(),
            ValidationError::CyclicGraph { number: 1 }
        );
    }

    #[test]
    fn given_unknown_comparison_when_building_then_rejected() {
        let v = version();
        let mut n = node(1, 2, 3);
        n.comparison = Comparison::Unrecognized("NN".into());
        let sub = submission(1, vec![n], vec![leaf(2), leaf(3)]);
        assert_eq!(
            TreeBuilder::new(&v).build(&sub).unwrap_err(),
            ValidationError::UnknownComparison {
                number: 1,
                tag: "NN".into()
            }
        );
    }

    #[test]
    fn given_leaf_as_root_when_building_then_rejected() {
        let v = version();
        let sub = submission(2, vec![node(1, 2, 3)], vec![leaf(2), leaf(3)]);
        assert_eq!(
            TreeBuilder::new(&v).build(&sub).unwrap_err(),
            ValidationError::RootIsLeaf { number: 2 }
        );
    }

    #[test]
    fn given_unreachable_node_when_building_then_still_builds() {
        let v = version();
        let sub = submission(1, vec![node(1, 2, 3), node(7, 2, 3)], vec![leaf(2), leaf(3)]);
        let bp = TreeBuilder::new(&v).build(&sub).unwrap();
        assert_eq!(bp.nodes.len(), 2);
    }

    #[test]
    fn given_unreachable_cycle_when_building_then_ignored() {
        let v = version();
        let sub = submission(
            1,
            vec![node(1, 2, 3), node(7, 8, 3), node(8, 7, 3)],
            vec![leaf(2), leaf(3)],
        );
        assert!(TreeBuilder::new(&v).build(&sub).is_ok());
    }
}
