// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver traits
//!
//! This module defines the core traits for storage drivers and trees.
//! All storage drivers must implement these traits to provide a consistent interface.

use super::types::{StorageResult, StorageType, TreeBatch};
use std::ops::Bound;
use std::path::Path;

/// Owned key/value pair as returned by tree scans
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Trait for a tree/column family in the storage driver
///
/// Represents a named, ordered collection of key-value pairs within a storage
/// driver. Keys are compared lexicographically as raw bytes.
pub trait StorageTree: Send + Sync {
    /// Get a value by key
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Up to `limit` entries in ascending key order, starting at `start`
    fn scan_forward(&self, start: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KvPair>>;

    /// Up to `limit` entries in descending key order, ending at `end`
    fn scan_backward(&self, end: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KvPair>>;
}

/// Main storage driver trait
///
/// Defines the interface that all storage drivers must implement.
/// Provides methods for opening databases, managing trees, and applying
/// atomic multi-tree batches.
pub trait StorageDriver: Send + Sync {
    /// Type of tree/column family used by this driver
    type Tree: StorageTree;

    /// Open or create a storage driver at the given path
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>
    where
        Self: Sized;

    /// Open or create a named tree/column family
    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree>;

    /// List all available trees/column families
    fn list_trees(&self) -> StorageResult<Vec<String>>;

    /// Apply every operation of every tree batch, or none of them
    fn apply_batch(&self, batch: &[TreeBatch]) -> StorageResult<()>;

    /// Flush all pending writes to disk
    fn flush(&self) -> StorageResult<()>;

    /// Get storage type
    fn storage_type(&self) -> StorageType;
}

// Helper implementation for Box<dyn StorageTree>
// This allows us to use boxed trait objects seamlessly
impl StorageTree for Box<dyn StorageTree> {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn scan_forward(&self, start: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KvPair>> {
        (**self).scan_forward(start, limit)
    }

    fn scan_backward(&self, end: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KvPair>> {
        (**self).scan_backward(end, limit)
    }
}
