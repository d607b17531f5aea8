//! Tree authoring and retrieval service
//!
//! Handles tree kinds, versioned tree submission and loading of built trees.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::application::snapshot::StoreSnapshot;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    Leaf, Node, Submission, Tree, TreeBuilder, TreeIndex, TreeKind, ValidationError, Version,
};
use crate::infrastructure::traits::TreeStore;

/// A tree with everything needed to evaluate or display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTree {
    pub kind: TreeKind,
    pub version: Version,
    pub tree: Tree,
    pub nodes: Vec<Node>,
    pub leafs: Vec<Leaf>,
}

impl BuiltTree {
    /// `kind name: major.minor`
    pub fn version_display(&self) -> String {
        self.version.display_with(&self.kind)
    }

    /// Build the evaluation index for this tree.
    pub fn index(&self) -> ApplicationResult<TreeIndex> {
        Ok(TreeIndex::new(
            self.tree.clone(),
            self.nodes.clone(),
            self.leafs.clone(),
        )?)
    }
}

/// A version of a kind and the tree built for it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub version: Version,
    pub tree: Option<Tree>,
}

/// Service for tree kinds and versioned trees.
pub struct TreeService {
    store: Arc<dyn TreeStore>,
}

impl TreeService {
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self { store }
    }

    /// Register a new tree kind.
    pub fn add_kind(&self, name: &str, description: &str) -> ApplicationResult<TreeKind> {
        let mut snap = self.store.load()?;
        let kind = snap.add_kind(name, description)?;
        self.store.commit(snap)?;
        info!("added tree kind {} ({})", kind.name, kind.id);
        Ok(kind)
    }

    pub fn kinds(&self) -> ApplicationResult<Vec<TreeKind>> {
        Ok(self.store.load()?.kinds().to_vec())
    }

    /// Pick the kind a command works on.
    ///
    /// An explicit name wins, then the configured default, then the first kind.
    pub fn resolve_kind(
        &self,
        requested: Option<&str>,
        default: Option<&str>,
    ) -> ApplicationResult<TreeKind> {
        let snap = self.store.load()?;
        match requested.or(default) {
            Some(name) => Self::kind_named(&snap, name).cloned(),
            None => snap
                .kinds()
                .first()
                .cloned()
                .ok_or(ApplicationError::NoKinds),
        }
    }

    fn kind_named<'s>(snap: &'s StoreSnapshot, name: &str) -> ApplicationResult<&'s TreeKind> {
        snap.kind_by_name(name)
            .ok_or_else(|| ApplicationError::UnknownKind(name.to_string()))
    }

    /// Record a version with explicit numbers, without a tree.
    pub fn create_version(&self, kind: &str, major: u32, minor: u32) -> ApplicationResult<Version> {
        let mut snap = self.store.load()?;
        let kind_id = Self::kind_named(&snap, kind)?.id;
        let version = snap.ledger_mut().create_version(kind_id, major, minor, Utc::now());
        self.store.commit(snap)?;
        Ok(version)
    }

    /// Validate a submission and persist it as the new current tree of a kind.
    ///
    /// Runs as one transaction: a new version is minted, elements are built
    /// under it and stored, and the tree is recorded. Any failure leaves the
    /// store as it was.
    #[instrument(
        level = "debug",
        skip(self, submission),
        fields(created_by = %submission.created_by)
    )]
    pub fn submit(&self, kind: &str, submission: &Submission) -> ApplicationResult<BuiltTree> {
        let mut snap = self.store.load()?;
        let kind = Self::kind_named(&snap, kind)?.clone();
        let now = Utc::now();

        let version = snap
            .ledger_mut()
            .next_version(kind.id, submission.is_major_update, now);
        let blueprint = TreeBuilder::new(&version).build(submission)?;

        snap.insert_elements(version.id, &blueprint);
        let saved = snap.count_elements(kind.id, version.major, version.minor);
        if saved != submission.element_count() {
            return Err(ValidationError::CountMismatch {
                saved,
                submitted: submission.element_count(),
            }
            .into());
        }

        let tree = snap.add_tree(blueprint.root.clone(), version.id, &submission.created_by, now);
        self.store.commit(snap)?;
        info!(
            "stored tree {} as {}",
            tree.id,
            version.display_with(&kind)
        );

        Ok(BuiltTree {
            kind,
            version,
            tree,
            nodes: blueprint.nodes,
            leafs: blueprint.leafs,
        })
    }

    /// Load the tree of a kind's version, or of its current version.
    ///
    /// `version` is a `major.minor` label.
    pub fn complete_tree(&self, kind: &str, version: Option<&str>) -> ApplicationResult<BuiltTree> {
        let snap = self.store.load()?;
        let kind = Self::kind_named(&snap, kind)?.clone();
        let version = match version {
            Some(label) => Self::find_version(&snap, &kind, label)?,
            None => snap
                .ledger()
                .current_version(kind.id)
                .cloned()
                .ok_or_else(|| ApplicationError::NoTreeAvailable {
                    kind: kind.name.clone(),
                })?,
        };
        debug!("loading tree of {}", version.display_with(&kind));

        let tree = snap
            .tree_for_version(version.id)
            .cloned()
            .ok_or_else(|| ApplicationError::NoTreeAvailable {
                kind: version.display_with(&kind),
            })?;

        Ok(BuiltTree {
            nodes: snap.nodes_of(version.id),
            leafs: snap.leafs_of(version.id),
            kind,
            version,
            tree,
        })
    }

    fn find_version(
        snap: &StoreSnapshot,
        kind: &TreeKind,
        label: &str,
    ) -> ApplicationResult<Version> {
        let not_found = || ApplicationError::VersionNotFound {
            kind: kind.name.clone(),
            version: label.to_string(),
        };
        let (major, minor) = Version::parse_label(label).ok_or_else(not_found)?;
        snap.ledger()
            .find(kind.id, major, minor)
            .cloned()
            .ok_or_else(not_found)
    }

    /// Evaluation index of a kind's version, or of its current version.
    pub fn index_for(
        &self,
        kind: &str,
        version: Option<&str>,
    ) -> ApplicationResult<(BuiltTree, TreeIndex)> {
        let built = self.complete_tree(kind, version)?;
        let index = built.index()?;
        Ok((built, index))
    }

    /// All versions of a kind in creation order.
    pub fn versions(&self, kind: &str) -> ApplicationResult<Vec<VersionEntry>> {
        let snap = self.store.load()?;
        let kind = Self::kind_named(&snap, kind)?;
        Ok(snap
            .ledger()
            .versions_of(kind.id)
            .map(|v| VersionEntry {
                version: v.clone(),
                tree: snap.tree_for_version(v.id).cloned(),
            })
            .collect())
    }

    /// Remove the stored elements of a version; repeated calls are no-ops.
    pub fn delete_version_elements(&self, kind: &str, version: &str) -> ApplicationResult<usize> {
        let mut snap = self.store.load()?;
        let kind = Self::kind_named(&snap, kind)?.clone();
        let version = Self::find_version(&snap, &kind, version)?;
        let removed = snap.delete_version_elements(version.id);
        self.store.commit(snap)?;
        info!("removed {} elements of {}", removed, version.display_with(&kind));
        Ok(removed)
    }
}
