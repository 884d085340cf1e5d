// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Staged writes applied atomically on commit
//!
//! A [`WriteBatch`] keeps its operations ordered per keyspace so that
//! readers can overlay it on a snapshot with the same prefix scans they use
//! against the store. Staging the same key twice keeps only the last
//! operation.

use super::persistent::{TreeBatch, TreeOp};
use super::store::Keyspace;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

/// A staged operation on one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>),
    Delete,
}

struct StagedKeyspace {
    keyspace: Keyspace,
    ops: BTreeMap<Vec<u8>, BatchOp>,
}

/// An ordered set of staged inserts and deletes across keyspaces
#[derive(Default)]
pub struct WriteBatch {
    keyspaces: BTreeMap<Arc<str>, StagedKeyspace>,
    len: usize,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an insert (or overwrite) of `key`
    pub fn put(&mut self, keyspace: &Keyspace, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.stage(keyspace, key.into(), BatchOp::Put(value.into()));
    }

    /// Stage a delete of `key`
    pub fn delete(&mut self, keyspace: &Keyspace, key: impl Into<Vec<u8>>) {
        self.stage(keyspace, key.into(), BatchOp::Delete);
    }

    fn stage(&mut self, keyspace: &Keyspace, key: Vec<u8>, op: BatchOp) {
        let staged = self
            .keyspaces
            .entry(keyspace.shared_name().clone())
            .or_insert_with(|| StagedKeyspace {
                keyspace: keyspace.clone(),
                ops: BTreeMap::new(),
            });
        if staged.ops.insert(key, op).is_none() {
            self.len += 1;
        }
    }

    /// The staged operation for `key`, if any
    pub fn get(&self, keyspace: &Keyspace, key: &[u8]) -> Option<&BatchOp> {
        self.keyspaces.get(keyspace.name())?.ops.get(key)
    }

    /// Staged operations whose key starts with `prefix`, in key order
    pub fn scan_prefix<'a>(
        &'a self,
        keyspace: &Keyspace,
        prefix: &[u8],
    ) -> impl Iterator<Item = (&'a [u8], &'a BatchOp)> + 'a {
        let prefix = prefix.to_vec();
        self.keyspaces
            .get(keyspace.name())
            .into_iter()
            .flat_map(move |staged| {
                let prefix = prefix.clone();
                staged
                    .ops
                    .range((Bound::Included(prefix.clone()), Bound::Unbounded))
                    .take_while(move |(key, _)| key.starts_with(&prefix))
                    .map(|(key, op)| (key.as_slice(), op))
            })
    }

    /// Number of distinct staged keys
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.keyspaces.clear();
        self.len = 0;
    }

    /// Staged keyspaces with their operations, in keyspace name order
    pub(crate) fn keyspaces(
        &self,
    ) -> impl Iterator<Item = (&Keyspace, &BTreeMap<Vec<u8>, BatchOp>)> {
        self.keyspaces
            .values()
            .map(|staged| (&staged.keyspace, &staged.ops))
    }

    /// Driver-level representation of this batch
    pub(crate) fn to_tree_batches(&self) -> Vec<TreeBatch> {
        self.keyspaces()
            .map(|(keyspace, ops)| TreeBatch {
                tree: keyspace.name().to_string(),
                ops: ops
                    .iter()
                    .map(|(key, op)| match op {
                        BatchOp::Put(value) => TreeOp::Insert(key.clone(), value.clone()),
                        BatchOp::Delete => TreeOp::Remove(key.clone()),
                    })
                    .collect(),
            })
            .collect()
    }
}

impl std::fmt::Debug for WriteBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBatch")
            .field("keyspaces", &self.keyspaces.keys().collect::<Vec<_>>())
            .field("len", &self.len)
            .finish()
    }
}
