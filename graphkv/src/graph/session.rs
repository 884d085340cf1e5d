// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sessions: one snapshot plus one pending write batch
//!
//! Reads see the snapshot taken when the session was opened with the
//! session's own staged writes laid over it. Writes stay private to the
//! session until [`Session::save_changes`] commits them atomically. The
//! snapshot is never refreshed, so commits made by other sessions after this
//! one was opened stay invisible to it.

use crate::error::{GraphError, Result};
use crate::graph::cursor::{
    AdjacentNodes, EdgeCursor, EdgesBetween, NodeCursor, NodeIdCursor, RawCursor,
};
use crate::graph::document::{decode_stored, encode_stored, Document};
use crate::graph::environment::GraphEnvironment;
use crate::graph::keys::{
    edge_prefix_from, edge_prefix_from_type, encode_edge_key, encode_node_key,
};
use crate::graph::types::{Edge, EdgeKey, EdgeType, Node, NodeId, DEFAULT_EDGE_TYPE};
use crate::storage::{BatchOp, Keyspace, Snapshot, WriteBatch};
use std::sync::Arc;

struct SessionState {
    snapshot: Snapshot,
    batch: WriteBatch,
}

/// A unit of work against one graph
///
/// Open -> (reads, staged writes, `save_changes`)* -> `dispose` -> Disposed.
/// Every operation on a disposed session fails with
/// [`GraphError::SessionClosed`].
pub struct Session {
    id: u64,
    env: Arc<GraphEnvironment>,
    state: Option<SessionState>,
}

impl Session {
    pub(crate) fn new(env: Arc<GraphEnvironment>, id: u64) -> Self {
        let snapshot = env
            .store()
            .snapshot_for(format!("session {} on graph '{}'", id, env.name()));
        log::debug!(
            "Opened session {} on graph '{}' at version {}",
            id,
            env.name(),
            snapshot.version()
        );
        Self {
            id,
            env,
            state: Some(SessionState {
                snapshot,
                batch: WriteBatch::new(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn environment(&self) -> &Arc<GraphEnvironment> {
        &self.env
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_none()
    }

    fn state(&self) -> Result<&SessionState> {
        self.state.as_ref().ok_or(GraphError::SessionClosed)
    }

    fn state_mut(&mut self) -> Result<&mut SessionState> {
        self.state.as_mut().ok_or(GraphError::SessionClosed)
    }

    /// Value of `key` as this session sees it
    fn read(&self, keyspace: &Keyspace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let state = self.state()?;
        match state.batch.get(keyspace, key) {
            Some(BatchOp::Put(value)) => Ok(Some(value.clone())),
            Some(BatchOp::Delete) => Ok(None),
            None => Ok(state.snapshot.get(keyspace, key)?),
        }
    }

    fn scan(&self, keyspace: &Keyspace, prefix: &[u8]) -> Result<RawCursor<'_>> {
        let state = self.state()?;
        Ok(RawCursor::new(
            state.snapshot.scan_prefix(keyspace, prefix),
            Box::new(state.batch.scan_prefix(keyspace, prefix)),
        ))
    }

    /// All nodes in id order
    pub fn iterate_nodes(&self) -> Result<NodeCursor<'_>> {
        let raw = self.scan(self.env.nodes(), &[])?;
        Ok(NodeCursor::new(self, raw))
    }

    /// All edges in key order
    pub fn iterate_edges(&self) -> Result<EdgeCursor<'_>> {
        let raw = self.scan(self.env.edges(), &[])?;
        Ok(EdgeCursor::new(self, raw))
    }

    /// Outgoing edges of `node`, optionally restricted to one type
    pub fn get_outgoing_edges(
        &self,
        node: &Node,
        edge_type: Option<EdgeType>,
    ) -> Result<EdgeCursor<'_>> {
        let raw = match edge_type {
            Some(edge_type) => {
                self.scan(self.env.edges(), &edge_prefix_from_type(node.id, edge_type))?
            }
            None => self.scan(self.env.edges(), &edge_prefix_from(node.id))?,
        };
        Ok(EdgeCursor::new(self, raw))
    }

    /// Ids of nodes that still carry a disconnected marker
    ///
    /// Markers are set when a node is created and cleared by its first
    /// outgoing edge. Deleting that edge later does not restore the marker,
    /// so this is an approximation; [`Session::is_isolated`] is authoritative.
    pub fn iterate_disconnected(&self) -> Result<NodeIdCursor<'_>> {
        Ok(NodeIdCursor::new(self.scan(self.env.disconnected(), &[])?))
    }

    /// Stage a new node with a freshly allocated id
    pub fn create_node(&mut self, properties: Document) -> Result<Node> {
        self.state()?;
        let value = encode_stored(self.env.codec(), &properties)?;
        let id = self.env.next_node_id();
        let key = encode_node_key(id);

        let env = self.env.clone();
        let state = self.state_mut()?;
        state.batch.put(env.nodes(), key, value);
        state.batch.put(env.disconnected(), key, Vec::new());
        Ok(Node::new(id, properties))
    }

    /// Stage an edge `from -> to` with the given type and properties
    ///
    /// Re-creating an existing (from, type, to) edge replaces its properties.
    pub fn create_edge_between(
        &mut self,
        from: &Node,
        to: &Node,
        properties: Document,
        edge_type: EdgeType,
    ) -> Result<Edge> {
        self.state()?;
        let value = encode_stored(self.env.codec(), &properties)?;
        let key = EdgeKey::new(from.id, edge_type, to.id);

        let env = self.env.clone();
        let state = self.state_mut()?;
        let edge_key = encode_edge_key(key.from, key.edge_type, key.to);
        state.batch.put(env.edges(), edge_key, value);
        state.batch.delete(env.disconnected(), encode_node_key(from.id));
        Ok(Edge::new(key, properties))
    }

    /// Stage an untyped edge without properties
    pub fn create_edge(&mut self, from: &Node, to: &Node) -> Result<Edge> {
        self.create_edge_between(from, to, Document::empty(), DEFAULT_EDGE_TYPE)
    }

    /// Stage removal of a node entry and its marker
    ///
    /// Edges touching the node are left in place.
    pub fn delete_node(&mut self, node: &Node) -> Result<()> {
        let env = self.env.clone();
        let state = self.state_mut()?;
        let key = encode_node_key(node.id);
        state.batch.delete(env.nodes(), key);
        state.batch.delete(env.disconnected(), key);
        Ok(())
    }

    /// Stage removal of an edge entry
    pub fn delete_edge(&mut self, edge: &Edge) -> Result<()> {
        let env = self.env.clone();
        let state = self.state_mut()?;
        state
            .batch
            .delete(env.edges(), encode_edge_key(edge.from, edge.edge_type, edge.to));
        Ok(())
    }

    /// Distinct targets of `node`'s outgoing edges of `edge_type`
    pub fn get_adjacent_of(&self, node: &Node, edge_type: EdgeType) -> Result<AdjacentNodes<'_>> {
        let raw = self.scan(self.env.edges(), &edge_prefix_from_type(node.id, edge_type))?;
        Ok(AdjacentNodes::new(self, raw))
    }

    /// True when `node` has no outgoing edge of any type
    pub fn is_isolated(&self, node: &Node) -> Result<bool> {
        match self.scan(self.env.edges(), &edge_prefix_from(node.id))?.next() {
            None => Ok(true),
            Some(Ok(_)) => Ok(false),
            Some(Err(e)) => Err(e),
        }
    }

    /// Node `id` as this session sees it, `None` when absent
    pub fn load_node(&self, id: NodeId) -> Result<Option<Node>> {
        match self.read(self.env.nodes(), &encode_node_key(id))? {
            Some(value) => Ok(Some(Node::new(id, decode_stored(self.env.codec(), &value)?))),
            None => Ok(None),
        }
    }

    /// Edge `(from, edge_type, to)` as this session sees it, `None` when absent
    pub fn load_edge(&self, from: NodeId, edge_type: EdgeType, to: NodeId) -> Result<Option<Edge>> {
        let key = EdgeKey::new(from, edge_type, to);
        match self.read(self.env.edges(), &encode_edge_key(from, edge_type, to))? {
            Some(value) => Ok(Some(Edge::new(key, decode_stored(self.env.codec(), &value)?))),
            None => Ok(None),
        }
    }

    /// Edges `from -> to` of every type, in type order
    pub fn get_edges_between(&self, from: &Node, to: &Node) -> Result<EdgesBetween<'_>> {
        let raw = self.scan(self.env.edges(), &edge_prefix_from(from.id))?;
        Ok(EdgesBetween::new(self, raw, to.id, None))
    }

    /// Edges `from -> to` whose type satisfies `predicate`, in type order
    pub fn get_edges_between_matching<'s, F>(
        &'s self,
        from: &Node,
        to: &Node,
        predicate: F,
    ) -> Result<EdgesBetween<'s>>
    where
        F: Fn(EdgeType) -> bool + 's,
    {
        let raw = self.scan(self.env.edges(), &edge_prefix_from(from.id))?;
        Ok(EdgesBetween::new(self, raw, to.id, Some(Box::new(predicate))))
    }

    /// Atomically commit every staged write
    ///
    /// On failure the pending writes are kept so the caller can retry or
    /// discard them. The snapshot is not refreshed.
    pub fn save_changes(&mut self) -> Result<()> {
        let store = self.env.store().clone();
        let id = self.id;
        let state = self.state_mut()?;
        if state.batch.is_empty() {
            return Ok(());
        }
        let staged = state.batch.len();
        let version = store.commit(&state.batch)?;
        state.batch.clear();
        log::debug!(
            "Session {} committed {} staged key(s) as version {}",
            id,
            staged,
            version
        );
        Ok(())
    }

    /// Drop every staged write without committing
    pub fn discard_changes(&mut self) -> Result<()> {
        self.state_mut()?.batch.clear();
        Ok(())
    }

    pub fn has_pending_changes(&self) -> Result<bool> {
        Ok(!self.state()?.batch.is_empty())
    }

    /// Number of distinct keys staged
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.state()?.batch.len())
    }

    /// Release the snapshot and pending writes; calling again has no effect
    pub fn dispose(&mut self) {
        if let Some(state) = self.state.take() {
            log::debug!(
                "Disposed session {} ({} uncommitted key(s) dropped)",
                self.id,
                state.batch.len()
            );
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            if self.env.store().config().audit_leaks {
                log::warn!(
                    "Session {} on graph '{}' dropped without dispose (snapshot version {}, {} uncommitted key(s))",
                    self.id,
                    self.env.name(),
                    state.snapshot.version(),
                    state.batch.len()
                );
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("graph", &self.env.name())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KvStore;

    fn session() -> Session {
        let store = KvStore::memory().unwrap();
        GraphEnvironment::open("unit", &store).unwrap().open_session()
    }

    #[test]
    fn test_reads_see_own_staged_writes() {
        let mut s = session();
        let a = s.create_node(Document::object([("n", 1i64)])).unwrap();
        let b = s.create_node(Document::empty()).unwrap();
        s.create_edge(&a, &b).unwrap();

        assert_eq!(s.load_node(a.id).unwrap(), Some(a.clone()));
        assert!(!s.is_isolated(&a).unwrap());
        assert!(s.is_isolated(&b).unwrap());
        assert_eq!(s.iterate_nodes().unwrap().count(), 2);
        // the edge's marker delete replaces a's staged marker
        assert_eq!(s.pending_count().unwrap(), 5);
        s.dispose();
    }

    #[test]
    fn test_staged_delete_hides_entry() {
        let mut s = session();
        let a = s.create_node(Document::empty()).unwrap();
        s.save_changes().unwrap();
        s.delete_node(&a).unwrap();
        assert_eq!(s.load_node(a.id).unwrap(), None);
        assert_eq!(s.iterate_nodes().unwrap().count(), 0);
        s.discard_changes().unwrap();
        assert!(!s.has_pending_changes().unwrap());
        s.dispose();
    }

    #[test]
    fn test_disposed_session_rejects_everything() {
        let mut s = session();
        let node = Node::new(1, Document::empty());
        s.dispose();
        s.dispose();
        assert!(s.is_disposed());
        assert!(matches!(s.iterate_nodes(), Err(GraphError::SessionClosed)));
        assert!(matches!(
            s.create_node(Document::empty()),
            Err(GraphError::SessionClosed)
        ));
        assert!(matches!(s.delete_node(&node), Err(GraphError::SessionClosed)));
        assert!(matches!(s.load_node(1), Err(GraphError::SessionClosed)));
        assert!(matches!(s.save_changes(), Err(GraphError::SessionClosed)));
    }

    #[test]
    fn test_failed_create_does_not_burn_an_id() {
        let mut s = session();
        s.dispose();
        let env = s.environment().clone();
        assert!(s.create_node(Document::empty()).is_err());
        assert_eq!(env.last_node_id(), 0);
    }
}
