//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{DecisionService, TreeService};
use crate::config::Settings;
use crate::infrastructure::store::JsonFileStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, TreeStore};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Tree persistence
    pub store: Arc<dyn TreeStore>,

    pub trees: Arc<TreeService>,
    pub decisions: DecisionService,
}

impl ServiceContainer {
    /// Create a new service container backed by the JSON file store.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(JsonFileStore::new(fs.clone(), settings.store_path()));
        Self::with_deps(settings, fs, store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        store: Arc<dyn TreeStore>,
    ) -> Self {
        let settings = Arc::new(settings);
        let trees = Arc::new(TreeService::new(store.clone()));
        let decisions = DecisionService::new(trees.clone());

        Self {
            settings,
            fs,
            store,
            trees,
            decisions,
        }
    }
}
