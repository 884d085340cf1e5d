// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory storage driver implementation for testing

use super::traits::{KvPair, StorageDriver, StorageTree};
use super::types::{StorageResult, StorageType, TreeBatch, TreeOp};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

type TreeData = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

/// In-memory storage driver for testing
pub struct MemoryStorageDriver {
    trees: Arc<RwLock<HashMap<String, TreeData>>>,
}

/// In-memory tree implementation
pub struct MemoryTree {
    data: TreeData,
}

impl MemoryStorageDriver {
    /// Create a new memory storage driver
    pub fn new() -> Self {
        Self {
            trees: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn tree_data(&self, name: &str) -> TreeData {
        self.trees
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(BTreeMap::new())))
            .clone()
    }
}

impl Default for MemoryStorageDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageTree for MemoryTree {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn scan_forward(&self, start: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KvPair>> {
        let data = self.data.read();
        Ok(data
            .range::<[u8], _>((start, Bound::Unbounded))
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn scan_backward(&self, end: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KvPair>> {
        let data = self.data.read();
        Ok(data
            .range::<[u8], _>((Bound::Unbounded, end))
            .rev()
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl StorageDriver for MemoryStorageDriver {
    type Tree = Box<dyn StorageTree>;

    fn open<P: AsRef<Path>>(_path: P) -> StorageResult<Self> {
        Ok(Self::new())
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        Ok(Box::new(MemoryTree {
            data: self.tree_data(name),
        }) as Box<dyn StorageTree>)
    }

    fn list_trees(&self) -> StorageResult<Vec<String>> {
        Ok(self.trees.read().keys().cloned().collect())
    }

    fn apply_batch(&self, batch: &[TreeBatch]) -> StorageResult<()> {
        // Lock every touched tree in name order before mutating any of them
        let mut targets: Vec<(&str, TreeData)> = batch
            .iter()
            .map(|b| (b.tree.as_str(), self.tree_data(&b.tree)))
            .collect();
        targets.sort_by(|a, b| a.0.cmp(b.0));
        targets.dedup_by(|a, b| a.0 == b.0);

        let mut guards: HashMap<&str, _> = targets
            .iter()
            .map(|(name, data)| (*name, data.write()))
            .collect();

        for tree_batch in batch {
            if let Some(data) = guards.get_mut(tree_batch.tree.as_str()) {
                for op in &tree_batch.ops {
                    match op {
                        TreeOp::Insert(key, value) => {
                            data.insert(key.clone(), value.clone());
                        }
                        TreeOp::Remove(key) => {
                            data.remove(key);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn flush(&self) -> StorageResult<()> {
        // No-op for memory storage
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trees_share_data_by_name() {
        let driver = MemoryStorageDriver::new();
        let mut batch = TreeBatch::new("nodes");
        batch.ops.push(TreeOp::Insert(b"k".to_vec(), b"v".to_vec()));
        driver.apply_batch(&[batch]).unwrap();

        let reopened = driver.open_tree("nodes").unwrap();
        assert_eq!(reopened.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert!(driver
            .open_tree("other")
            .unwrap()
            .scan_forward(Bound::Unbounded, 1)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_scans_are_ordered() {
        let driver = MemoryStorageDriver::new();
        let mut batch = TreeBatch::new("t");
        for k in [3u8, 1, 2] {
            batch.ops.push(TreeOp::Insert(vec![k], vec![k * 10]));
        }
        driver.apply_batch(&[batch]).unwrap();
        let tree = driver.open_tree("t").unwrap();

        let keys: Vec<Vec<u8>> = tree
            .scan_forward(Bound::Included(&[2u8][..]), 10)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![vec![2], vec![3]]);

        let last = tree.scan_backward(Bound::Excluded(&[3u8][..]), 1).unwrap();
        assert_eq!(last, vec![(vec![2], vec![20])]);
    }
}
