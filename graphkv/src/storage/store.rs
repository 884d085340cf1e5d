// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Key-value store with named keyspaces, snapshots and atomic commits
//!
//! `KvStore` owns one storage driver and hands out:
//! - [`Keyspace`] handles (create-or-open by name)
//! - [`Snapshot`] read views fixed at the latest commit
//! - atomic commits of a [`WriteBatch`] across any number of keyspaces

use super::batch::WriteBatch;
use super::persistent::{
    create_storage_driver, DynStorageDriver, StorageResult, StorageTree, StorageType,
};
use super::snapshot::{Snapshot, SnapshotInfo, VersionLog};
use crate::config::StoreConfig;
use crate::error::Result;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A named, independently ordered key-value collection within a store
#[derive(Clone)]
pub struct Keyspace {
    name: Arc<str>,
    pub(crate) tree: Arc<dyn StorageTree>,
}

impl Keyspace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }
}

impl std::fmt::Debug for Keyspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Keyspace").field(&self.name).finish()
    }
}

pub(crate) struct StoreShared {
    driver: DynStorageDriver,
    keyspaces: RwLock<HashMap<String, Keyspace>>,
    pub(crate) log: RwLock<VersionLog>,
    pub(crate) config: StoreConfig,
}

/// Handle to an ordered key-value store
///
/// Cloning shares the same underlying driver, keyspaces and version log.
#[derive(Clone)]
pub struct KvStore {
    shared: Arc<StoreShared>,
}

impl KvStore {
    /// Open a store as described by `config`
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let driver = match &config.path {
            Some(path) => create_storage_driver(config.storage_type, path)?,
            None => create_storage_driver(config.storage_type, Path::new(""))?,
        };
        info!(
            "Opened {} store at {:?}",
            config.storage_type,
            config.path.as_deref()
        );
        Self::with_driver(driver, config)
    }

    /// Open an ephemeral in-memory store
    pub fn memory() -> Result<Self> {
        Self::open(StoreConfig::memory())
    }

    /// Open (or create) an on-disk sled store at `path`
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(StoreConfig::sled(path.as_ref()))
    }

    /// Wrap an already opened driver
    pub fn with_driver(driver: DynStorageDriver, mut config: StoreConfig) -> Result<Self> {
        config.validate_tuning()?;
        config.storage_type = driver.storage_type();
        Ok(Self {
            shared: Arc::new(StoreShared {
                driver,
                keyspaces: RwLock::new(HashMap::new()),
                log: RwLock::new(VersionLog::default()),
                config,
            }),
        })
    }

    /// Create or open the keyspace called `name`
    pub fn open_keyspace(&self, name: &str) -> StorageResult<Keyspace> {
        if let Some(keyspace) = self.shared.keyspaces.read().get(name) {
            return Ok(keyspace.clone());
        }

        let mut keyspaces = self.shared.keyspaces.write();
        if let Some(keyspace) = keyspaces.get(name) {
            return Ok(keyspace.clone());
        }
        let tree: Arc<dyn StorageTree> = Arc::from(self.shared.driver.open_tree(name)?);
        let keyspace = Keyspace {
            name: Arc::from(name),
            tree,
        };
        keyspaces.insert(name.to_string(), keyspace.clone());
        debug!("Opened keyspace: {}", name);
        Ok(keyspace)
    }

    /// Names of every keyspace known to the driver
    pub fn keyspace_names(&self) -> StorageResult<Vec<String>> {
        let mut names = self.shared.driver.list_trees()?;
        names.sort();
        Ok(names)
    }

    /// A read view of the latest committed state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_for("anonymous")
    }

    /// A read view of the latest committed state, labelled for the leak auditor
    pub fn snapshot_for(&self, owner: impl Into<String>) -> Snapshot {
        let (id, version) = self.shared.log.write().register(owner.into());
        Snapshot::new(self.shared.clone(), id, version)
    }

    /// Atomically apply every operation in `batch`
    ///
    /// Returns the commit version. An empty batch commits nothing and returns
    /// the current version.
    pub fn commit(&self, batch: &WriteBatch) -> StorageResult<u64> {
        let mut log = self.shared.log.write();
        if batch.is_empty() {
            return Ok(log.version());
        }

        let version = log.version() + 1;
        let mut priors = Vec::new();
        if log.has_open_snapshots() {
            for (keyspace, ops) in batch.keyspaces() {
                for key in ops.keys() {
                    let prior = keyspace.tree.get(key)?;
                    priors.push((keyspace.shared_name().clone(), key.clone(), prior));
                }
            }
        }

        self.shared.driver.apply_batch(&batch.to_tree_batches())?;
        log.record_commit(version, priors);
        drop(log);

        debug!("Committed version {} ({} keys)", version, batch.len());
        if self.shared.config.flush_on_commit {
            self.shared.driver.flush()?;
        }
        Ok(version)
    }

    /// Version of the latest commit
    pub fn version(&self) -> u64 {
        self.shared.log.read().version()
    }

    /// Snapshots that have been opened and not yet released
    pub fn open_snapshots(&self) -> Vec<SnapshotInfo> {
        self.shared.log.read().open_snapshots()
    }

    #[cfg(test)]
    pub(crate) fn retained_history(&self) -> usize {
        self.shared.log.read().retained_keys()
    }

    pub fn flush(&self) -> StorageResult<()> {
        self.shared.driver.flush()
    }

    /// Flush the driver and report snapshots still open
    ///
    /// The store stays usable; this is the point at which the leak auditor
    /// logs every snapshot that was never released.
    pub fn shutdown(&self) -> StorageResult<Vec<SnapshotInfo>> {
        let leaked = self.open_snapshots();
        if self.shared.config.audit_leaks {
            for snapshot in &leaked {
                warn!(
                    "Snapshot {} owned by '{}' (version {}) still open at shutdown after {:?}",
                    snapshot.id, snapshot.owner, snapshot.version, snapshot.age
                );
            }
        }
        self.shared.driver.flush()?;
        info!(
            "Store shut down with {} open snapshot(s)",
            leaked.len()
        );
        Ok(leaked)
    }

    pub fn storage_type(&self) -> StorageType {
        self.shared.config.storage_type
    }

    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("storage_type", &self.shared.config.storage_type)
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    #[test]
    fn test_keyspaces_are_independent() {
        let store = KvStore::memory().unwrap();
        let a = store.open_keyspace("a").unwrap();
        let b = store.open_keyspace("b").unwrap();

        let mut batch = WriteBatch::new();
        batch.put(&a, b"k".to_vec(), b"a".to_vec());
        batch.put(&b, b"k".to_vec(), b"b".to_vec());
        assert_eq!(store.commit(&batch).unwrap(), 1);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get(&a, b"k").unwrap(), Some(b"a".to_vec()));
        assert_eq!(snapshot.get(&b, b"k").unwrap(), Some(b"b".to_vec()));
        assert_eq!(store.keyspace_names().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_batch_does_not_bump_version() {
        let store = KvStore::memory().unwrap();
        assert_eq!(store.commit(&WriteBatch::new()).unwrap(), 0);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_shutdown_reports_open_snapshots() {
        let store = KvStore::memory().unwrap();
        let held = store.snapshot_for("reporting test");
        let released = store.snapshot();
        drop(released);

        let leaked = store.shutdown().unwrap();
        assert_eq!(leaked.len(), 1);
        assert_eq!(leaked[0].owner, "reporting test");
        assert_eq!(leaked[0].id, held.id());
    }

    #[test]
    fn test_sled_store_requires_path() {
        let config = StoreConfig {
            path: None,
            ..StoreConfig::sled("unused")
        };
        assert!(matches!(
            KvStore::open(config),
            Err(GraphError::InvalidArgument(_))
        ));
    }
}
