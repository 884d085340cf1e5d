// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Directed, typed multigraph over the ordered key-value store
//!
//! - [`keys`]: order-preserving node and edge key layout
//! - [`environment`]: keyspaces and node id allocation for one named graph
//! - [`session`]: snapshot reads plus buffered atomic writes
//! - [`cursor`]: lazy prefix-bounded iteration for sessions

pub mod cursor;
pub mod document;
pub mod environment;
pub mod keys;
pub mod session;
pub mod types;

pub use cursor::{AdjacentNodes, EdgeCursor, EdgesBetween, NodeCursor, NodeIdCursor};
pub use document::{BincodeCodec, Document, DocumentCodec, JsonCodec};
pub use environment::{
    GraphEnvironment, DISCONNECTED_KEYSPACE_SUFFIX, EDGE_KEYSPACE_SUFFIX, NODE_KEYSPACE_SUFFIX,
};
pub use session::Session;
pub use types::{Edge, EdgeKey, EdgeType, Node, NodeId, DEFAULT_EDGE_TYPE};
