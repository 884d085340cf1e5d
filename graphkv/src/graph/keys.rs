// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Binary key layout for nodes and edges
//!
//! Every key is fixed-width big-endian so that byte order equals numeric
//! order:
//!
//! ```text
//! node key:  [ id: u64 ]                        8 bytes
//! edge key:  [ from: u64 | type: u16 | to: u64 ] 18 bytes
//! ```
//!
//! The `from` and `from ++ type` prefixes of an edge key bound exactly the
//! outgoing edges of a node (optionally of one type) in a single contiguous
//! range. Nothing else in the crate builds or parses these bytes.

use crate::error::{GraphError, Result};
use crate::graph::types::{EdgeKey, EdgeType, NodeId};

pub const NODE_KEY_LEN: usize = 8;
pub const EDGE_KEY_LEN: usize = 18;

const TYPE_OFFSET: usize = 8;
const TO_OFFSET: usize = 10;

pub fn encode_node_key(id: NodeId) -> [u8; NODE_KEY_LEN] {
    id.to_be_bytes()
}

pub fn decode_node_key(bytes: &[u8]) -> Result<NodeId> {
    let raw: [u8; NODE_KEY_LEN] = bytes.try_into().map_err(|_| GraphError::KeyFormat {
        kind: "node",
        expected: NODE_KEY_LEN,
        actual: bytes.len(),
    })?;
    Ok(NodeId::from_be_bytes(raw))
}

pub fn encode_edge_key(from: NodeId, edge_type: EdgeType, to: NodeId) -> [u8; EDGE_KEY_LEN] {
    let mut key = [0u8; EDGE_KEY_LEN];
    key[..TYPE_OFFSET].copy_from_slice(&from.to_be_bytes());
    key[TYPE_OFFSET..TO_OFFSET].copy_from_slice(&edge_type.to_be_bytes());
    key[TO_OFFSET..].copy_from_slice(&to.to_be_bytes());
    key
}

pub fn decode_edge_key(bytes: &[u8]) -> Result<EdgeKey> {
    if bytes.len() != EDGE_KEY_LEN {
        return Err(GraphError::KeyFormat {
            kind: "edge",
            expected: EDGE_KEY_LEN,
            actual: bytes.len(),
        });
    }
    let mut from = [0u8; 8];
    let mut edge_type = [0u8; 2];
    let mut to = [0u8; 8];
    from.copy_from_slice(&bytes[..TYPE_OFFSET]);
    edge_type.copy_from_slice(&bytes[TYPE_OFFSET..TO_OFFSET]);
    to.copy_from_slice(&bytes[TO_OFFSET..]);
    Ok(EdgeKey {
        from: NodeId::from_be_bytes(from),
        edge_type: EdgeType::from_be_bytes(edge_type),
        to: NodeId::from_be_bytes(to),
    })
}

/// Prefix of every edge leaving `from`
pub fn edge_prefix_from(from: NodeId) -> [u8; TYPE_OFFSET] {
    from.to_be_bytes()
}

/// Prefix of every edge of `edge_type` leaving `from`
pub fn edge_prefix_from_type(from: NodeId, edge_type: EdgeType) -> [u8; TO_OFFSET] {
    let mut prefix = [0u8; TO_OFFSET];
    prefix[..TYPE_OFFSET].copy_from_slice(&from.to_be_bytes());
    prefix[TYPE_OFFSET..].copy_from_slice(&edge_type.to_be_bytes());
    prefix
}
