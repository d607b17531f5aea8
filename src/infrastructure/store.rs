//! Tree store implementations

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::application::snapshot::StoreSnapshot;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::infrastructure::traits::{FileSystem, TreeStore};

/// Store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> ApplicationError {
        ApplicationError::OperationFailed {
            context: "memory store lock".into(),
            source: "lock poisoned".into(),
        }
    }
}

impl TreeStore for MemoryStore {
    fn load(&self) -> ApplicationResult<StoreSnapshot> {
        let state = self.state.lock().map_err(|_| Self::poisoned())?;
        Ok(state.clone())
    }

    fn commit(&self, snapshot: StoreSnapshot) -> ApplicationResult<()> {
        let mut state = self.state.lock().map_err(|_| Self::poisoned())?;
        *state = snapshot;
        Ok(())
    }
}

/// Store persisted as one JSON file.
///
/// A missing file reads as an empty store. Commits write a sibling
/// temporary file and rename it over the target.
pub struct JsonFileStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl TreeStore for JsonFileStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> ApplicationResult<StoreSnapshot> {
        if !self.fs.exists(&self.path) {
            debug!("no store file yet");
            return Ok(StoreSnapshot::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read store", &self.path)?;
        serde_json::from_str(&content).with_path_context("parse store", &self.path)
    }

    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    fn commit(&self, snapshot: StoreSnapshot) -> ApplicationResult<()> {
        let content = serde_json::to_string_pretty(&snapshot)
            .with_path_context("serialize store", &self.path)?;
        let tmp = self.tmp_path();
        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create store directory", &self.path)?;
        self.fs
            .write(&tmp, &content)
            .with_path_context("write store", &tmp)?;
        self.fs
            .rename(&tmp, &self.path)
            .with_path_context("replace store", &self.path)?;
        Ok(())
    }
}
