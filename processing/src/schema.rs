//! Feature schema handling.
//!
//! Two layers:
//! 1. [`SchemaDescriptor`] - the versioned, ordered slot list an encoder
//!    publishes and encodes against.
//! 2. [`FeatureSchema`] - the column list frozen when the engine is fit. Every
//!    vector scored afterwards is reindexed against it, never the other way
//!    round.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::model::FeatureVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Indicator,
    Continuous,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSlot {
    pub name: String,
    pub kind: FeatureKind,
}

/// Ordered, typed slot list describing what an encoder emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    version: u32,
    slots: Vec<FeatureSlot>,
}

impl SchemaDescriptor {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            slots: Vec::new(),
        }
    }

    /// Appends a slot. Names must be unique.
    pub fn push(&mut self, name: impl Into<String>, kind: FeatureKind) -> Result<(), SchemaError> {
        let name = name.into();
        if self.slots.iter().any(|s| s.name == name) {
            return Err(SchemaError::DuplicateSlot(name));
        }
        self.slots.push(FeatureSlot { name, kind });
        Ok(())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate feature slot '{0}'")]
    DuplicateSlot(String),
    #[error("feature '{name}' is not part of the frozen schema (fingerprint {fingerprint:08x})")]
    UnknownColumn { name: String, fingerprint: u32 },
}

/// Column list frozen at fit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Arc<[String]>,
    fingerprint: u32,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        let fingerprint = fingerprint(&names);
        Self {
            names: names.into(),
            fingerprint,
        }
    }

    /// Union of the realized column names, in first-appearance order.
    pub fn freeze<'a>(vectors: impl IntoIterator<Item = &'a FeatureVector>) -> Self {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for vector in vectors {
            for name in vector.names() {
                if seen.insert(name) {
                    names.push(name.to_string());
                }
            }
        }
        Self::new(names)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Lays a vector out in schema order.
    ///
    /// Schema columns the vector lacks are filled with 0. A column the schema
    /// has never seen is an invariant violation and aborts the reindex.
    pub fn reindex(&self, vector: &FeatureVector) -> Result<Vec<f64>, SchemaError> {
        if let Some(unknown) = vector.names().find(|name| !self.contains(name)) {
            return Err(SchemaError::UnknownColumn {
                name: unknown.to_string(),
                fingerprint: self.fingerprint,
            });
        }

        Ok(self
            .names
            .iter()
            .map(|name| vector.value(name).unwrap_or(0.0))
            .collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

fn fingerprint(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}
