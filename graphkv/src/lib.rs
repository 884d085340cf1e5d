// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! graphkv - A typed directed multigraph over an ordered key-value store
//!
//! Nodes and edges are encoded as sortable binary keys, so adjacency is
//! answered by prefix scans. Work happens in sessions that read from one
//! consistent snapshot and commit their writes atomically.
//!
//! # Features
//!
//! - **Typed edges**: 16-bit edge types, at most one edge per (from, type, to)
//! - **Snapshot isolation**: sessions never observe later commits
//! - **Atomic commits**: node, edge and marker writes land together
//! - **Embedded storage**: Sled on disk, or an in-memory driver for tests
//!
//! # Usage
//!
//! ```ignore
//! use graphkv::{Document, GraphEnvironment, KvStore};
//!
//! let store = KvStore::open_path("./graph-data")?;
//! let env = GraphEnvironment::open("social", &store)?;
//!
//! let mut session = env.open_session();
//! let ada = session.create_node(Document::object([("name", "Ada")]))?;
//! let bob = session.create_node(Document::object([("name", "Bob")]))?;
//! session.create_edge_between(&ada, &bob, Document::empty(), 1)?;
//! session.save_changes()?;
//!
//! for friend in session.get_adjacent_of(&ada, 1)? {
//!     println!("{}", friend?.properties);
//! }
//! session.dispose();
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod storage;

pub use config::StoreConfig;
pub use error::{GraphError, Result};
pub use graph::{
    AdjacentNodes, BincodeCodec, Document, DocumentCodec, Edge, EdgeCursor, EdgeKey, EdgeType,
    EdgesBetween, GraphEnvironment, JsonCodec, Node, NodeCursor, NodeId, NodeIdCursor, Session,
    DEFAULT_EDGE_TYPE,
};
pub use storage::{KvStore, Snapshot, SnapshotInfo, StorageType, WriteBatch};

/// graphkv version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// graphkv crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
