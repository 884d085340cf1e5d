// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Point-in-time read views
//!
//! Drivers only hold the latest committed state. To give every open
//! [`Snapshot`] a stable view, each commit that happens while snapshots are
//! open records the prior value of every key it touches, tagged with the
//! commit version. A snapshot taken at version `v` reads a key as the prior
//! value recorded by the first commit after `v`, or as the current driver
//! value when no later commit touched it. Records are pruned as soon as no
//! open snapshot is old enough to need them.
//!
//! The version log also serves as the registry of open snapshots that the
//! leak auditor reports from.

use super::persistent::{KvPair, StorageResult};
use super::store::{Keyspace, StoreShared};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Bound;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct PriorValue {
    version: u64,
    value: Option<Vec<u8>>,
}

#[derive(Debug)]
struct OpenSnapshot {
    version: u64,
    owner: String,
    opened_at: Instant,
}

/// Description of a snapshot that has not been released yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub id: u64,
    pub version: u64,
    pub owner: String,
    pub age: Duration,
}

/// Commit versions, open snapshots and the prior values they depend on
#[derive(Debug, Default)]
pub(crate) struct VersionLog {
    version: u64,
    next_snapshot_id: u64,
    open: BTreeMap<u64, OpenSnapshot>,
    history: HashMap<Arc<str>, BTreeMap<Vec<u8>, Vec<PriorValue>>>,
}

impl VersionLog {
    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn has_open_snapshots(&self) -> bool {
        !self.open.is_empty()
    }

    /// Register a snapshot at the current version, returning its id and version
    pub(crate) fn register(&mut self, owner: String) -> (u64, u64) {
        self.next_snapshot_id += 1;
        let id = self.next_snapshot_id;
        self.open.insert(
            id,
            OpenSnapshot {
                version: self.version,
                owner,
                opened_at: Instant::now(),
            },
        );
        (id, self.version)
    }

    pub(crate) fn release(&mut self, id: u64) {
        if self.open.remove(&id).is_none() {
            return;
        }
        match self.open.values().map(|s| s.version).min() {
            None => self.history.clear(),
            Some(oldest) => {
                for keys in self.history.values_mut() {
                    keys.retain(|_, priors| {
                        priors.retain(|p| p.version > oldest);
                        !priors.is_empty()
                    });
                }
                self.history.retain(|_, keys| !keys.is_empty());
            }
        }
    }

    /// Advance to `version`, keeping `priors` for snapshots older than it
    pub(crate) fn record_commit(
        &mut self,
        version: u64,
        priors: Vec<(Arc<str>, Vec<u8>, Option<Vec<u8>>)>,
    ) {
        for (keyspace, key, value) in priors {
            self.history
                .entry(keyspace)
                .or_default()
                .entry(key)
                .or_default()
                .push(PriorValue { version, value });
        }
        self.version = version;
    }

    /// `Some(value)` when a commit after `version` replaced the key
    fn resolve(&self, keyspace: &str, key: &[u8], version: u64) -> Option<Option<&Vec<u8>>> {
        let priors = self.history.get(keyspace)?.get(key)?;
        priors
            .iter()
            .find(|p| p.version > version)
            .map(|p| p.value.as_ref())
    }

    pub(crate) fn open_snapshots(&self) -> Vec<SnapshotInfo> {
        self.open
            .iter()
            .map(|(id, s)| SnapshotInfo {
                id: *id,
                version: s.version,
                owner: s.owner.clone(),
                age: s.opened_at.elapsed(),
            })
            .collect()
    }

    /// Number of keys with retained prior values
    #[cfg(test)]
    pub(crate) fn retained_keys(&self) -> usize {
        self.history.values().map(|keys| keys.len()).sum()
    }
}

struct SnapshotState {
    store: Arc<StoreShared>,
    id: u64,
    version: u64,
}

impl Drop for SnapshotState {
    fn drop(&mut self) {
        self.store.log.write().release(self.id);
    }
}

/// An immutable, point-in-time view of every keyspace of a store
///
/// Cloning is cheap and shares the same registration; the view is released
/// when the last clone (including iterators created from it) is dropped.
#[derive(Clone)]
pub struct Snapshot {
    state: Arc<SnapshotState>,
}

fn borrowed(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(key) => Bound::Included(key.as_slice()),
        Bound::Excluded(key) => Bound::Excluded(key.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

impl Snapshot {
    pub(crate) fn new(store: Arc<StoreShared>, id: u64, version: u64) -> Self {
        Self {
            state: Arc::new(SnapshotState { store, id, version }),
        }
    }

    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// Commit version this view was taken at
    pub fn version(&self) -> u64 {
        self.state.version
    }

    /// Point lookup by exact key
    pub fn get(&self, keyspace: &Keyspace, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let log = self.state.store.log.read();
        if let Some(prior) = log.resolve(keyspace.name(), key, self.state.version) {
            return Ok(prior.cloned());
        }
        keyspace.tree.get(key)
    }

    /// Forward iteration over keys starting with `prefix`
    ///
    /// An empty prefix iterates the whole keyspace.
    pub fn scan_prefix(&self, keyspace: &Keyspace, prefix: &[u8]) -> SnapshotIter {
        SnapshotIter {
            snapshot: self.clone(),
            keyspace: keyspace.clone(),
            prefix: prefix.to_vec(),
            lower: Bound::Included(prefix.to_vec()),
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Greatest key visible in `keyspace`
    pub fn last_key(&self, keyspace: &Keyspace) -> StorageResult<Option<Vec<u8>>> {
        let version = self.state.version;
        let chunk_size = self.state.store.config.scan_chunk_size;
        let log = self.state.store.log.read();

        let restored = log.history.get(keyspace.name()).and_then(|keys| {
            keys.iter().rev().find_map(|(key, priors)| {
                match priors.iter().find(|p| p.version > version) {
                    Some(PriorValue { value: Some(_), .. }) => Some(key.clone()),
                    _ => None,
                }
            })
        });

        let mut end: Bound<Vec<u8>> = Bound::Unbounded;
        let stored = loop {
            let chunk = keyspace.tree.scan_backward(borrowed(&end), chunk_size)?;
            let full = chunk.len() == chunk_size;
            let visible = chunk.iter().find(|(key, _)| {
                !matches!(log.resolve(keyspace.name(), key, version), Some(None))
            });
            if let Some((key, _)) = visible {
                break Some(key.clone());
            }
            match chunk.last() {
                Some((key, _)) if full => end = Bound::Excluded(key.clone()),
                _ => break None,
            }
        };

        Ok(stored.max(restored))
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("id", &self.state.id)
            .field("version", &self.state.version)
            .finish()
    }
}

/// Lazy prefix-bounded iterator over a snapshot
///
/// Entries are pulled from the driver in chunks of the configured size, each
/// chunk under the version log read lock, so a long scan never blocks
/// commits for more than one chunk.
pub struct SnapshotIter {
    snapshot: Snapshot,
    keyspace: Keyspace,
    prefix: Vec<u8>,
    lower: Bound<Vec<u8>>,
    buffer: VecDeque<KvPair>,
    exhausted: bool,
}

impl SnapshotIter {
    fn fill(&mut self) -> StorageResult<()> {
        let state = &self.snapshot.state;
        let chunk_size = state.store.config.scan_chunk_size;

        while self.buffer.is_empty() && !self.exhausted {
            let log = state.store.log.read();
            let chunk = self
                .keyspace
                .tree
                .scan_forward(borrowed(&self.lower), chunk_size)?;
            if chunk.len() < chunk_size {
                self.exhausted = true;
            }

            let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
            let mut upper: Option<Vec<u8>> = None;
            for (key, value) in chunk {
                if !key.starts_with(&self.prefix) {
                    self.exhausted = true;
                    break;
                }
                upper = Some(key.clone());
                merged.insert(key, Some(value));
            }

            let history_upper = match &upper {
                Some(key) if !self.exhausted => Bound::Included(key.as_slice()),
                _ => Bound::Unbounded,
            };
            if let Some(keys) = log.history.get(self.keyspace.name()) {
                for (key, priors) in keys.range::<[u8], _>((borrowed(&self.lower), history_upper)) {
                    if !key.starts_with(&self.prefix) {
                        break;
                    }
                    if let Some(prior) = priors.iter().find(|p| p.version > state.version) {
                        merged.insert(key.clone(), prior.value.clone());
                    }
                }
            }
            drop(log);

            if let Some(key) = upper {
                self.lower = Bound::Excluded(key);
            }
            self.buffer.extend(
                merged
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|value| (key, value))),
            );
        }
        Ok(())
    }
}

impl Iterator for SnapshotIter {
    type Item = StorageResult<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() {
            if let Err(e) = self.fill() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
