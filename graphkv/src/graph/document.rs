// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Property documents and their codecs
//!
//! Node and edge properties are schema-less documents. The graph layer never
//! looks inside them; it only needs a [`DocumentCodec`] to turn them into
//! stored bytes and back.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Schema-less structured value for graph properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Document {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Document>),
    Object(BTreeMap<String, Document>),
}

impl Default for Document {
    fn default() -> Self {
        Document::empty()
    }
}

impl Document {
    /// The empty document: an object without fields
    pub fn empty() -> Self {
        Document::Object(BTreeMap::new())
    }

    /// True for an object without fields
    pub fn is_empty(&self) -> bool {
        matches!(self, Document::Object(fields) if fields.is_empty())
    }

    /// Build an object from `(key, value)` pairs
    pub fn object<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Document>,
        I: IntoIterator<Item = (K, V)>,
    {
        Document::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Field lookup on an object
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Set a field, turning a non-object document into an object first
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Document>) {
        if !matches!(self, Document::Object(_)) {
            *self = Document::empty();
        }
        if let Document::Object(fields) = self {
            fields.insert(key.into(), value.into());
        }
    }

    /// Extract as number if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Document::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract as string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as boolean if possible
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Document::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Document>> {
        match self {
            Document::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Get the type name of this document
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "Null",
            Document::Boolean(_) => "Boolean",
            Document::Number(_) => "Number",
            Document::String(_) => "String",
            Document::Array(_) => "Array",
            Document::Object(_) => "Object",
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::Null => write!(f, "null"),
            Document::Boolean(b) => write!(f, "{}", b),
            Document::Number(n) => write!(f, "{}", n),
            Document::String(s) => write!(f, "\"{}\"", s),
            Document::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Document::Object(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::String(s)
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl From<f64> for Document {
    fn from(n: f64) -> Self {
        Document::Number(n)
    }
}

/// Numbers are stored as `f64`; integers beyond 2^53 lose precision
impl From<i64> for Document {
    fn from(n: i64) -> Self {
        Document::Number(n as f64)
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Document::Boolean(b)
    }
}

impl<T: Into<Document>> From<Vec<T>> for Document {
    fn from(items: Vec<T>) -> Self {
        Document::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Document::Null,
            serde_json::Value::Bool(b) => Document::Boolean(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Document::Null, Document::Number),
            serde_json::Value::String(s) => Document::String(s),
            serde_json::Value::Array(items) => {
                Document::Array(items.into_iter().map(Document::from).collect())
            }
            serde_json::Value::Object(fields) => Document::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Document::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Fails on NaN and infinities, which have no JSON form
impl TryFrom<&Document> for serde_json::Value {
    type Error = GraphError;

    fn try_from(doc: &Document) -> Result<Self> {
        Ok(match doc {
            Document::Null => serde_json::Value::Null,
            Document::Boolean(b) => serde_json::Value::Bool(*b),
            Document::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    GraphError::Codec(format!("non-finite number {} has no JSON form", n))
                })?,
            Document::String(s) => serde_json::Value::String(s.clone()),
            Document::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_>>()?,
            ),
            Document::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), serde_json::Value::try_from(v)?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

/// Encoding of property documents to and from stored bytes
pub trait DocumentCodec: Send + Sync {
    fn encode(&self, doc: &Document) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<Document>;

    fn empty(&self) -> Document {
        Document::empty()
    }

    fn is_empty(&self, doc: &Document) -> bool {
        doc.is_empty()
    }
}

/// Compact binary encoding (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl DocumentCodec for BincodeCodec {
    fn encode(&self, doc: &Document) -> Result<Vec<u8>> {
        bincode::serialize(doc).map_err(|e| GraphError::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Document> {
        bincode::deserialize(bytes).map_err(|e| GraphError::Codec(e.to_string()))
    }
}

/// JSON text encoding, readable with external tools
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl DocumentCodec for JsonCodec {
    fn encode(&self, doc: &Document) -> Result<Vec<u8>> {
        let value = serde_json::Value::try_from(doc)?;
        serde_json::to_vec(&value).map_err(|e| GraphError::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Document> {
        serde_json::from_slice::<serde_json::Value>(bytes)
            .map(Document::from)
            .map_err(|e| GraphError::Codec(e.to_string()))
    }
}

/// Stored form of a property document; empty documents take no bytes
pub(crate) fn encode_stored(codec: &dyn DocumentCodec, doc: &Document) -> Result<Vec<u8>> {
    if codec.is_empty(doc) {
        Ok(Vec::new())
    } else {
        codec.encode(doc)
    }
}

pub(crate) fn decode_stored(codec: &dyn DocumentCodec, bytes: &[u8]) -> Result<Document> {
    if bytes.is_empty() {
        Ok(codec.empty())
    } else {
        codec.decode(bytes)
    }
}
