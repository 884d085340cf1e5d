// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lazy cursors over a session's view of the graph
//!
//! Every cursor is built on [`RawCursor`], which walks one key prefix of one
//! keyspace and merges two ordered sources:
//! - the session snapshot, pulled lazily in chunks
//! - the session's pending write batch
//!
//! A staged operation shadows the stored entry with the same key, and a
//! staged delete hides it. Cursors are forward-only, borrow the session
//! immutably and stop at the prefix boundary. Dropping one cancels the scan.

use crate::error::{GraphError, Result};
use crate::graph::document::decode_stored;
use crate::graph::keys::{decode_edge_key, decode_node_key};
use crate::graph::session::Session;
use crate::graph::types::{Edge, EdgeType, Node, NodeId};
use crate::storage::persistent::KvPair;
use crate::storage::{BatchOp, SnapshotIter};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::iter::Peekable;

type StagedEntries<'s> = Box<dyn Iterator<Item = (&'s [u8], &'s BatchOp)> + 's>;

enum Next {
    Stored,
    Staged,
    Shadowed,
}

/// Ordered merge of snapshot entries with staged operations
pub(crate) struct RawCursor<'s> {
    stored: Peekable<SnapshotIter>,
    staged: Peekable<StagedEntries<'s>>,
}

impl<'s> RawCursor<'s> {
    pub(crate) fn new(stored: SnapshotIter, staged: StagedEntries<'s>) -> Self {
        Self {
            stored: stored.peekable(),
            staged: staged.peekable(),
        }
    }
}

impl<'s> Iterator for RawCursor<'s> {
    type Item = Result<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = match (self.stored.peek(), self.staged.peek()) {
                (None, None) => return None,
                (Some(Err(_)), _) | (Some(Ok(_)), None) => Next::Stored,
                (None, Some(_)) => Next::Staged,
                (Some(Ok((stored, _))), Some((staged, _))) => {
                    match stored.as_slice().cmp(*staged) {
                        Ordering::Less => Next::Stored,
                        Ordering::Equal => Next::Shadowed,
                        Ordering::Greater => Next::Staged,
                    }
                }
            };

            match next {
                Next::Stored => {
                    return self
                        .stored
                        .next()
                        .map(|entry| entry.map_err(GraphError::from))
                }
                Next::Shadowed => {
                    self.stored.next();
                }
                Next::Staged => {}
            }

            if let Some((key, BatchOp::Put(value))) = self.staged.next() {
                return Some(Ok((key.to_vec(), value.clone())));
            }
        }
    }
}

/// Nodes in id order
pub struct NodeCursor<'s> {
    session: &'s Session,
    raw: RawCursor<'s>,
}

impl<'s> NodeCursor<'s> {
    pub(crate) fn new(session: &'s Session, raw: RawCursor<'s>) -> Self {
        Self { session, raw }
    }
}

impl<'s> Iterator for NodeCursor<'s> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let codec = self.session.environment().codec();
        self.raw.next().map(|entry| {
            let (key, value) = entry?;
            Ok(Node::new(decode_node_key(&key)?, decode_stored(codec, &value)?))
        })
    }
}

/// Edges in key order: by source, then type, then target
pub struct EdgeCursor<'s> {
    session: &'s Session,
    raw: RawCursor<'s>,
}

impl<'s> EdgeCursor<'s> {
    pub(crate) fn new(session: &'s Session, raw: RawCursor<'s>) -> Self {
        Self { session, raw }
    }
}

impl<'s> Iterator for EdgeCursor<'s> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        let codec = self.session.environment().codec();
        self.raw.next().map(|entry| {
            let (key, value) = entry?;
            Ok(Edge::new(decode_edge_key(&key)?, decode_stored(codec, &value)?))
        })
    }
}

/// Node ids of a presence-only keyspace
pub struct NodeIdCursor<'s> {
    raw: RawCursor<'s>,
}

impl<'s> NodeIdCursor<'s> {
    pub(crate) fn new(raw: RawCursor<'s>) -> Self {
        Self { raw }
    }
}

impl<'s> Iterator for NodeIdCursor<'s> {
    type Item = Result<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        self.raw
            .next()
            .map(|entry| entry.and_then(|(key, _)| decode_node_key(&key)))
    }
}

/// Distinct targets of a node's outgoing edges of one type
///
/// Each target is loaded the first time it is reached. Targets without a
/// node entry (edges left behind by a node delete) are skipped.
pub struct AdjacentNodes<'s> {
    session: &'s Session,
    raw: RawCursor<'s>,
    seen: HashSet<NodeId>,
}

impl<'s> AdjacentNodes<'s> {
    pub(crate) fn new(session: &'s Session, raw: RawCursor<'s>) -> Self {
        Self {
            session,
            raw,
            seen: HashSet::new(),
        }
    }
}

impl<'s> Iterator for AdjacentNodes<'s> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let target = match self.raw.next()? {
                Ok((key, _)) => match decode_edge_key(&key) {
                    Ok(edge) => edge.to,
                    Err(e) => return Some(Err(e)),
                },
                Err(e) => return Some(Err(e)),
            };
            if !self.seen.insert(target) {
                continue;
            }
            match self.session.load_node(target) {
                Ok(Some(node)) => return Some(Ok(node)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Edges from one node to another, in type order
pub struct EdgesBetween<'s> {
    session: &'s Session,
    raw: RawCursor<'s>,
    to: NodeId,
    predicate: Option<Box<dyn Fn(EdgeType) -> bool + 's>>,
}

impl<'s> EdgesBetween<'s> {
    pub(crate) fn new(
        session: &'s Session,
        raw: RawCursor<'s>,
        to: NodeId,
        predicate: Option<Box<dyn Fn(EdgeType) -> bool + 's>>,
    ) -> Self {
        Self {
            session,
            raw,
            to,
            predicate,
        }
    }

    fn accepts(&self, edge_type: EdgeType) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(edge_type))
    }
}

impl<'s> Iterator for EdgesBetween<'s> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, value) = match self.raw.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            let edge_key = match decode_edge_key(&key) {
                Ok(edge_key) => edge_key,
                Err(e) => return Some(Err(e)),
            };
            if edge_key.to != self.to || !self.accepts(edge_key.edge_type) {
                continue;
            }
            let codec = self.session.environment().codec();
            return Some(decode_stored(codec, &value).map(|props| Edge::new(edge_key, props)));
        }
    }
}
