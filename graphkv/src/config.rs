// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Store configuration

use crate::error::{GraphError, Result};
use crate::storage::StorageType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of entries a snapshot iterator pulls per lock acquisition
pub const DEFAULT_SCAN_CHUNK_SIZE: usize = 256;

/// Configuration for opening a [`KvStore`](crate::storage::KvStore)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend used for the keyspaces
    pub storage_type: StorageType,

    /// Database directory; required for on-disk backends
    pub path: Option<PathBuf>,

    /// Entries fetched per driver call by snapshot scans
    pub scan_chunk_size: usize,

    /// Flush the driver after every commit
    pub flush_on_commit: bool,

    /// Report snapshots and sessions that are not released explicitly
    pub audit_leaks: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::default(),
            path: None,
            scan_chunk_size: DEFAULT_SCAN_CHUNK_SIZE,
            flush_on_commit: true,
            audit_leaks: cfg!(debug_assertions),
        }
    }
}

impl StoreConfig {
    /// Configuration for an on-disk sled store at `path`
    pub fn sled(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_type: StorageType::Sled,
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Configuration for an in-memory store
    pub fn memory() -> Self {
        Self {
            storage_type: StorageType::Memory,
            flush_on_commit: false,
            ..Self::default()
        }
    }

    pub fn with_scan_chunk_size(mut self, size: usize) -> Self {
        self.scan_chunk_size = size;
        self
    }

    pub fn with_flush_on_commit(mut self, enabled: bool) -> Self {
        self.flush_on_commit = enabled;
        self
    }

    pub fn with_audit_leaks(mut self, enabled: bool) -> Self {
        self.audit_leaks = enabled;
        self
    }

    /// Check the configuration before any backend is touched
    pub fn validate(&self) -> Result<()> {
        self.validate_tuning()?;
        if self.storage_type == StorageType::Sled && self.path.is_none() {
            return Err(GraphError::InvalidArgument(
                "sled storage requires a path".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks that apply regardless of how the driver was opened
    pub(crate) fn validate_tuning(&self) -> Result<()> {
        if self.scan_chunk_size == 0 {
            return Err(GraphError::InvalidArgument(
                "scan_chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
