// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent storage backends
//!
//! This module provides trait-based abstractions for ordered key-value storage,
//! allowing different storage backends (Sled, in-memory) to be used interchangeably.
//!
//! Drivers only expose the current state of each tree plus an atomic
//! multi-tree batch. Point-in-time reads are layered on top by
//! [`KvStore`](crate::storage::KvStore).
//!
//! # Architecture
//!
//! ```text
//! Session (graph operations)
//!     ↓
//! KvStore (keyspaces, snapshots, atomic commit)
//!     ↓
//! StorageDriver (key-value abstraction)
//!     ↓
//! Concrete Implementations (Sled, Memory)
//! ```

// Core modules
pub mod factory;
pub mod traits;
pub mod types;

// Driver implementations
pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

// Public API re-exports
pub use factory::{create_storage_driver, DynStorageDriver};
pub use traits::{KvPair, StorageDriver, StorageTree};
pub use types::{StorageDriverError, StorageResult, StorageType, TreeBatch, TreeOp};
