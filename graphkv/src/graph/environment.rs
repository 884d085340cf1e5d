// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph environment: keyspaces, id allocation and session factory
//!
//! One environment owns the three keyspaces of a named graph inside a
//! [`KvStore`]:
//! - `<name>_nodes`: node id -> encoded properties
//! - `<name>_edges`: (from, type, to) -> encoded properties
//! - `<name>_disconnected`: node id -> empty, for nodes without an outgoing edge yet
//!
//! The suffixes are part of the on-disk format.

use crate::error::{GraphError, Result};
use crate::graph::document::{BincodeCodec, DocumentCodec};
use crate::graph::keys::decode_node_key;
use crate::graph::session::Session;
use crate::graph::types::NodeId;
use crate::storage::{Keyspace, KvStore};
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const NODE_KEYSPACE_SUFFIX: &str = "_nodes";
pub const EDGE_KEYSPACE_SUFFIX: &str = "_edges";
pub const DISCONNECTED_KEYSPACE_SUFFIX: &str = "_disconnected";

/// Shared state of one named graph
pub struct GraphEnvironment {
    name: String,
    store: KvStore,
    nodes: Keyspace,
    edges: Keyspace,
    disconnected: Keyspace,
    codec: Arc<dyn DocumentCodec>,
    last_node_id: AtomicU64,
    session_seq: AtomicU64,
}

impl GraphEnvironment {
    /// Open the graph `name` in `store` with the default binary codec
    pub fn open(name: &str, store: &KvStore) -> Result<Arc<Self>> {
        Self::open_with_codec(name, store, Arc::new(BincodeCodec))
    }

    /// Open the graph `name` in `store`, encoding properties with `codec`
    pub fn open_with_codec(
        name: &str,
        store: &KvStore,
        codec: Arc<dyn DocumentCodec>,
    ) -> Result<Arc<Self>> {
        if name.trim().is_empty() {
            return Err(GraphError::InvalidArgument(
                "graph name must not be blank".to_string(),
            ));
        }

        let nodes = store.open_keyspace(&format!("{}{}", name, NODE_KEYSPACE_SUFFIX))?;
        let edges = store.open_keyspace(&format!("{}{}", name, EDGE_KEYSPACE_SUFFIX))?;
        let disconnected =
            store.open_keyspace(&format!("{}{}", name, DISCONNECTED_KEYSPACE_SUFFIX))?;

        let last_node_id = {
            let snapshot = store.snapshot_for(format!("graph '{}' id recovery", name));
            match snapshot.last_key(&nodes)? {
                Some(key) => decode_node_key(&key)?,
                None => 0,
            }
        };
        info!(
            "Opened graph '{}' ({} backend), last node id {}",
            name,
            store.storage_type(),
            last_node_id
        );

        Ok(Arc::new(Self {
            name: name.to_string(),
            store: store.clone(),
            nodes,
            edges,
            disconnected,
            codec,
            last_node_id: AtomicU64::new(last_node_id),
            session_seq: AtomicU64::new(0),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    /// Reserve the next node id
    ///
    /// Ids are unique and increasing for the lifetime of the environment.
    /// Ids reserved by sessions that never commit are not reused.
    pub fn next_node_id(&self) -> NodeId {
        self.last_node_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Most recently reserved node id (0 when none)
    pub fn last_node_id(&self) -> NodeId {
        self.last_node_id.load(Ordering::SeqCst)
    }

    /// Start a unit of work on this graph
    pub fn open_session(self: &Arc<Self>) -> Session {
        let id = self.session_seq.fetch_add(1, Ordering::Relaxed) + 1;
        Session::new(self.clone(), id)
    }

    pub(crate) fn nodes(&self) -> &Keyspace {
        &self.nodes
    }

    pub(crate) fn edges(&self) -> &Keyspace {
        &self.edges
    }

    pub(crate) fn disconnected(&self) -> &Keyspace {
        &self.disconnected
    }

    pub(crate) fn codec(&self) -> &dyn DocumentCodec {
        self.codec.as_ref()
    }
}

impl std::fmt::Debug for GraphEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphEnvironment")
            .field("name", &self.name)
            .field("last_node_id", &self.last_node_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let store = KvStore::memory().unwrap();
        for name in ["", "   ", "\t"] {
            assert!(matches!(
                GraphEnvironment::open(name, &store),
                Err(GraphError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_keyspaces_follow_naming_contract() {
        let store = KvStore::memory().unwrap();
        let env = GraphEnvironment::open("social", &store).unwrap();
        assert_eq!(env.nodes().name(), "social_nodes");
        assert_eq!(env.edges().name(), "social_edges");
        assert_eq!(env.disconnected().name(), "social_disconnected");
        assert_eq!(
            store.keyspace_names().unwrap(),
            vec!["social_disconnected", "social_edges", "social_nodes"]
        );
    }

    #[test]
    fn test_counter_starts_at_one() {
        let store = KvStore::memory().unwrap();
        let env = GraphEnvironment::open("g", &store).unwrap();
        assert_eq!(env.last_node_id(), 0);
        assert_eq!(env.next_node_id(), 1);
        assert_eq!(env.next_node_id(), 2);
        assert_eq!(env.last_node_id(), 2);
    }

    #[test]
    fn test_recovery_snapshot_is_released() {
        let store = KvStore::memory().unwrap();
        let _env = GraphEnvironment::open("g", &store).unwrap();
        assert!(store.open_snapshots().is_empty());
    }
}
