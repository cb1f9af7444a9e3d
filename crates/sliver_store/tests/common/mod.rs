#![allow(dead_code)]

use sliver_core::config::Config;
use sliver_core::hash::Id;
use sliver_core::system::current_system;
use sliver_store::hash::hash_path;
use sliver_store::store::Store;
use tempfile::TempDir;

/// A store rooted in a throwaway directory, with a seed area outside the
/// store for builders and pre-made content.
pub struct TestStore {
    pub store: Store,
    root: TempDir,
}

impl TestStore {
    pub async fn new() -> Self {
        let root = TempDir::new().unwrap();
        let base = root.path().to_string_lossy().to_string();
        let config = Config {
            store_dir: format!("{base}/store"),
            log_dir: format!("{base}/log"),
            state_dir: format!("{base}/state"),
            scratch_dir: format!("{base}/scratch"),
            system: current_system(),
        };
        std::fs::create_dir_all(format!("{base}/seed")).unwrap();
        let store = Store::open(config).await.unwrap();
        TestStore { store, root }
    }

    pub fn base(&self) -> String {
        self.root.path().to_string_lossy().to_string()
    }

    /// Absolute path inside the store directory.
    pub fn store_path(&self, name: &str) -> String {
        format!("{}/{name}", self.store.config().store_dir)
    }

    pub fn seed_path(&self, name: &str) -> String {
        format!("{}/seed/{name}", self.base())
    }

    /// Create a file outside the store and register it under its
    /// fingerprint, so the id can be expanded into the store later.
    pub async fn seed_file(&self, name: &str, contents: &str) -> (String, Id) {
        let path = self.seed_path(name);
        std::fs::write(&path, contents).unwrap();
        let id = hash_path(&path).await.unwrap();
        self.store.register_path(&path, &id).await.unwrap();
        (path, id)
    }

    /// Fingerprint of the given contents, registering nothing.
    pub async fn content_id(&self, name: &str, contents: &str) -> Id {
        let path = self.seed_path(name);
        std::fs::write(&path, contents).unwrap();
        hash_path(&path).await.unwrap()
    }

    /// Drop a builder script into the seed area. The runner makes it
    /// executable by itself.
    pub fn write_builder(&self, name: &str, script: &str) -> String {
        let path = self.seed_path(name);
        std::fs::write(&path, script).unwrap();
        path
    }

    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(format!("{}/scratch", self.base()))
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    pub fn run_log(&self) -> String {
        std::fs::read_to_string(self.store.config().run_log_path()).unwrap_or_default()
    }
}
