//! Version ledger: per-kind (major, minor) stamps in creation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::Version;

/// Append-only list of versions across all kinds.
///
/// "Current" means most recently *created* for a kind, even if a numerically
/// smaller version was created after a larger one. Nothing here guards against
/// two callers minting the same numbers; authoring must be serialized per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLedger {
    versions: Vec<Version>,
    next_id: u64,
}

impl VersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest created version of the kind.
    pub fn current_version(&self, kind_id: u32) -> Option<&Version> {
        self.versions.iter().rev().find(|v| v.kind_id == kind_id)
    }

    /// Create the version after the current one.
    ///
    /// Starts from 0.0 when the kind has no versions yet.
    pub fn next_version(&mut self, kind_id: u32, is_major: bool, now: DateTime<Utc>) -> Version {
        let (major, minor) = self
            .current_version(kind_id)
            .map(|v| (v.major, v.minor))
            .unwrap_or((0, 0));
        let (major, minor) = if is_major {
            (major + 1, 0)
        } else {
            (major, minor + 1)
        };
        self.create_version(kind_id, major, minor, now)
    }

    /// Record a version with explicit numbers.
    pub fn create_version(
        &mut self,
        kind_id: u32,
        major: u32,
        minor: u32,
        now: DateTime<Utc>,
    ) -> Version {
        self.next_id += 1;
        let version = Version {
            id: self.next_id,
            kind_id,
            major,
            minor,
            valid: false,
            deleted: false,
            created_at: now,
        };
        debug!("created version {} for kind {}", version.label(), kind_id);
        self.versions.push(version.clone());
        version
    }

    /// Look up a version of a kind by its numbers; the latest created wins.
    pub fn find(&self, kind_id: u32, major: u32, minor: u32) -> Option<&Version> {
        self.versions
            .iter()
            .rev()
            .find(|v| v.kind_id == kind_id && v.major == major && v.minor == minor)
    }

    /// All versions of a kind in creation order.
    pub fn versions_of(&self, kind_id: u32) -> impl Iterator<Item = &Version> {
        self.versions.iter().filter(move |v| v.kind_id == kind_id)
    }
}
