// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph data structures
//!
//! Defines Node and Edge as materialized from the node and edge keyspaces.

use crate::graph::document::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identifier, assigned by the environment's counter
pub type NodeId = u64;

/// Edge type tag
pub type EdgeType = u16;

/// Default edge type
pub const DEFAULT_EDGE_TYPE: EdgeType = 0;

/// Graph node with id and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub properties: Document,
}

impl Node {
    pub fn new(id: NodeId, properties: Document) -> Self {
        Self { id, properties }
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&Document> {
        self.properties.get(key)
    }

    /// Set a property value on this in-memory copy
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Document>) {
        self.properties.insert(key, value);
    }
}

/// Identity of an edge: at most one edge is stored per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub from: NodeId,
    pub edge_type: EdgeType,
    pub to: NodeId,
}

impl EdgeKey {
    pub fn new(from: NodeId, edge_type: EdgeType, to: NodeId) -> Self {
        Self { from, edge_type, to }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})-[{}]->({})", self.from, self.edge_type, self.to)
    }
}

/// Directed, typed graph edge with properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub edge_type: EdgeType,
    pub to: NodeId,
    pub properties: Document,
}

impl Edge {
    pub fn new(key: EdgeKey, properties: Document) -> Self {
        Self {
            from: key.from,
            edge_type: key.edge_type,
            to: key.to,
            properties,
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            from: self.from,
            edge_type: self.edge_type,
            to: self.to,
        }
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&Document> {
        self.properties.get(key)
    }

    /// Set a property value on this in-memory copy
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Document>) {
        self.properties.insert(key, value);
    }

    /// Check if this edge goes from `from` to `to`
    pub fn goes_from_to(&self, from: NodeId, to: NodeId) -> bool {
        self.from == from && self.to == to
    }
}
