// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled storage driver implementation

use super::traits::{KvPair, StorageDriver, StorageTree};
use super::types::{StorageDriverError, StorageResult, StorageType, TreeBatch, TreeOp};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::ops::Bound;
use std::path::Path;

/// Name of the tree sled creates for every database
const SLED_DEFAULT_TREE: &str = "__sled__default";

/// Sled driver implementation
pub struct SledDriver {
    db: sled::Db,
}

/// Sled tree wrapper that implements StorageTree trait
pub struct SledTree {
    tree: sled::Tree,
}

fn collect_pairs<I>(iter: I, limit: usize) -> StorageResult<Vec<KvPair>>
where
    I: Iterator<Item = sled::Result<(sled::IVec, sled::IVec)>>,
{
    iter.take(limit)
        .map(|result| {
            result
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(|e| StorageDriverError::BackendSpecific(e.to_string()))
        })
        .collect()
}

impl StorageTree for SledTree {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.tree
            .get(key)
            .map_err(|e| StorageDriverError::BackendSpecific(e.to_string()))
            .map(|opt| opt.map(|v| v.to_vec()))
    }

    fn scan_forward(&self, start: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KvPair>> {
        collect_pairs(self.tree.range::<&[u8], _>((start, Bound::Unbounded)), limit)
    }

    fn scan_backward(&self, end: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KvPair>> {
        collect_pairs(
            self.tree.range::<&[u8], _>((Bound::Unbounded, end)).rev(),
            limit,
        )
    }
}

impl StorageDriver for SledDriver {
    type Tree = Box<dyn StorageTree>;

    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path)?;
        Ok(SledDriver { db })
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        let tree = self
            .db
            .open_tree(name)
            .map_err(|e| StorageDriverError::BackendSpecific(e.to_string()))?;
        Ok(Box::new(SledTree { tree }) as Box<dyn StorageTree>)
    }

    fn list_trees(&self) -> StorageResult<Vec<String>> {
        let tree_names = self
            .db
            .tree_names()
            .into_iter()
            .map(|name| String::from_utf8_lossy(&name).to_string())
            .filter(|name| name != SLED_DEFAULT_TREE)
            .collect();
        Ok(tree_names)
    }

    fn apply_batch(&self, batch: &[TreeBatch]) -> StorageResult<()> {
        let trees = batch
            .iter()
            .map(|b| self.db.open_tree(&b.tree))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageDriverError::BackendSpecific(e.to_string()))?;

        let sled_batches: Vec<sled::Batch> = batch
            .iter()
            .map(|b| {
                let mut sled_batch = sled::Batch::default();
                for op in &b.ops {
                    match op {
                        TreeOp::Insert(key, value) => {
                            sled_batch.insert(key.as_slice(), value.as_slice())
                        }
                        TreeOp::Remove(key) => sled_batch.remove(key.as_slice()),
                    }
                }
                sled_batch
            })
            .collect();

        trees
            .as_slice()
            .transaction(|views| {
                for (view, sled_batch) in views.iter().zip(&sled_batches) {
                    view.apply_batch(sled_batch)?;
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(()) => {
                    StorageDriverError::BackendSpecific("batch transaction aborted".to_string())
                }
                TransactionError::Storage(e) => StorageDriverError::from(e),
            })
    }

    fn flush(&self) -> StorageResult<()> {
        self.db
            .flush()
            .map_err(|e| StorageDriverError::BackendSpecific(e.to_string()))?;
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sled
    }
}
