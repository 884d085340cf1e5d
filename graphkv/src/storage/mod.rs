// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Ordered key-value storage for graph data
//!
//! This module provides:
//! - Pluggable storage drivers (sled, in-memory) behind one trait
//! - Named keyspaces with byte-ordered keys
//! - Point-in-time snapshots over drivers that only keep current state
//! - Write batches committed atomically across keyspaces

mod batch;
pub mod persistent;
mod snapshot;
mod store;

pub use batch::{BatchOp, WriteBatch};
pub use persistent::{StorageDriver, StorageDriverError, StorageResult, StorageTree, StorageType};
pub use snapshot::{Snapshot, SnapshotInfo, SnapshotIter};
pub use store::{Keyspace, KvStore};
