use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use termtree::Tree as DisplayTree;
use tracing::instrument;

use crate::domain::entities::{Element, Leaf, Node, Successor, Tree};
use crate::domain::error::EvaluationError;
use crate::domain::ids::ElementId;

/// Arena-backed, id-addressable graph of one built tree.
///
/// Built once per tree version and shared read-only by every evaluation.
#[derive(Debug)]
pub struct TreeIndex {
    /// Arena storage for all nodes and leaves
    arena: Arena<Element>,
    /// Element id to arena slot
    by_id: HashMap<ElementId, Index>,
    tree: Tree,
}

impl TreeIndex {
    /// Index all elements of a tree.
    ///
    /// Fails if an id occurs twice or the root is not among the elements.
    #[instrument(level = "debug", skip_all, fields(tree = tree.id))]
    pub fn new(tree: Tree, nodes: Vec<Node>, leafs: Vec<Leaf>) -> Result<Self, EvaluationError> {
        let mut arena = Arena::with_capacity(nodes.len() + leafs.len());
        let mut by_id = HashMap::with_capacity(nodes.len() + leafs.len());

        let elements = nodes
            .into_iter()
            .map(Element::Node)
            .chain(leafs.into_iter().map(Element::Leaf));
        for element in elements {
            let id = element.id().clone();
            if by_id.contains_key(&id) {
                return Err(EvaluationError::DuplicateElement(id));
            }
            let idx = arena.insert(element);
            by_id.insert(id, idx);
        }

        if !by_id.contains_key(&tree.root) {
            return Err(EvaluationError::DanglingReference(tree.root.clone()));
        }

        Ok(Self { arena, by_id, tree })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root_id(&self) -> &ElementId {
        &self.tree.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.by_id.get(id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn root(&self) -> Result<&Element, EvaluationError> {
        self.lookup(&self.tree.root)
    }

    /// Follow a successor reference.
    pub fn successor(&self, successor: &Successor) -> Result<&Element, EvaluationError> {
        self.lookup(successor.id())
    }

    fn lookup(&self, id: &ElementId) -> Result<&Element, EvaluationError> {
        self.get(id)
            .ok_or_else(|| EvaluationError::DanglingReference(id.clone()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.arena.iter().filter_map(|(_, e)| match e {
            Element::Node(n) => Some(n),
            Element::Leaf(_) => None,
        })
    }

    pub fn leafs(&self) -> impl Iterator<Item = &Leaf> {
        self.arena.iter().filter_map(|(_, e)| match e {
            Element::Leaf(l) => Some(l),
            Element::Node(_) => None,
        })
    }

    /// Render the graph from the root, true branch first.
    ///
    /// Shared subtrees are printed once per path; a loop is cut at the
    /// repeated node.
    pub fn to_tree_string(&self) -> DisplayTree<String> {
        let mut on_path = HashSet::new();
        match self.get(&self.tree.root) {
            Some(root) => self.render(root, String::new(), &mut on_path),
            None => DisplayTree::new("Empty tree".to_string()),
        }
    }

    fn render(
        &self,
        element: &Element,
        prefix: String,
        on_path: &mut HashSet<ElementId>,
    ) -> DisplayTree<String> {
        match element {
            Element::Leaf(leaf) => DisplayTree::new(format!(
                "{prefix}{} {} => {}",
                leaf.id, leaf.display_name, leaf.result
            )),
            Element::Node(node) => {
                let label = format!(
                    "{prefix}{} {} [data type {} {} {}]",
                    node.id, node.display_name, node.data_type, node.comparison, node.data_value
                );
                if !on_path.insert(node.id.clone()) {
                    return DisplayTree::new(format!("{label} (loop)"));
                }
                let mut tree = DisplayTree::new(label);
                let branches = [
                    ("T: ", &node.true_successor),
                    ("F: ", &node.false_successor),
                ];
                for (branch, successor) in branches {
                    let child = match self.get(successor.id()) {
                        Some(next) => self.render(next, branch.to_string(), on_path),
                        None => DisplayTree::new(format!("{branch}{} (missing)", successor.id())),
                    };
                    tree.push(child);
                }
                on_path.remove(&node.id);
                tree
            }
        }
    }
}
