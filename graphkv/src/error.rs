// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for graph operations

use crate::storage::StorageDriverError;
use thiserror::Error;

/// Errors surfaced by environments and sessions
///
/// Storage failures are carried unmodified; the graph layer never retries
/// or masks them.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Session is closed")]
    SessionClosed,

    #[error("Malformed {kind} key: expected {expected} bytes, got {actual}")]
    KeyFormat {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Document codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Storage(#[from] StorageDriverError),
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
