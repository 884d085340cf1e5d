// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver types and error handling
//!
//! This module defines the types, enums, and error handling used throughout
//! the storage driver system.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Storage driver type configuration
///
/// Specifies which underlying storage technology to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageType {
    /// Sled - Pure Rust embedded database
    /// Best for: persistent graphs, single-process embedding
    Sled,

    /// Memory - ordered in-memory storage
    /// Best for: Unit testing, ephemeral graphs
    Memory,
}

impl Default for StorageType {
    fn default() -> Self {
        StorageType::Sled
    }
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageType::Sled),
            "memory" => Ok(StorageType::Memory),
            _ => Err(format!(
                "Unknown storage type: {}. Valid options: sled, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageType::Sled => "sled",
            StorageType::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// A single staged mutation against one tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOp {
    Insert(Vec<u8>, Vec<u8>),
    Remove(Vec<u8>),
}

/// All mutations for one named tree inside an atomic multi-tree batch
#[derive(Debug, Clone, Default)]
pub struct TreeBatch {
    pub tree: String,
    pub ops: Vec<TreeOp>,
}

impl TreeBatch {
    pub fn new(tree: impl Into<String>) -> Self {
        Self {
            tree: tree.into(),
            ops: Vec::new(),
        }
    }
}

/// Error type for storage driver operations
///
/// Covers the failure modes of the drivers. Engine errors are carried as
/// text so that callers above the driver layer see one error shape
/// regardless of backend.
#[derive(Debug)]
pub enum StorageDriverError {
    /// I/O related errors (file system, locks)
    IoError(std::io::Error),

    /// Requested backend is not available in this build
    Unsupported(String),

    /// Driver-specific error (Sled, ...)
    BackendSpecific(String),
}

impl std::fmt::Display for StorageDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageDriverError::IoError(e) => write!(f, "I/O error: {}", e),
            StorageDriverError::Unsupported(e) => write!(f, "Unsupported storage: {}", e),
            StorageDriverError::BackendSpecific(e) => write!(f, "Storage driver error: {}", e),
        }
    }
}

impl std::error::Error for StorageDriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageDriverError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageDriverError {
    fn from(e: std::io::Error) -> Self {
        StorageDriverError::IoError(e)
    }
}

#[cfg(feature = "sled-backend")]
impl From<sled::Error> for StorageDriverError {
    fn from(e: sled::Error) -> Self {
        match e {
            sled::Error::Io(io) => StorageDriverError::IoError(io),
            other => StorageDriverError::BackendSpecific(other.to_string()),
        }
    }
}

/// Result type for storage driver operations
pub type StorageResult<T> = Result<T, StorageDriverError>;
