//! Common type definitions shared by the database layer and the registries.
//!
//! This module defines:
//! - Type aliases for entity IDs (GateId, CameraId, etc.)
//! - [`ValueType`] and [`TypedValue`] for the string-encoded configuration values
//!   carried by camera settings and LPR profiles
//! - [`Pagination`] for offset-based list operations
//!
//! # ID Types
//!
//! All entity IDs are `BIGSERIAL` keys wrapped in type aliases for readability:
//!
//! - [`BuildingId`]: Building identifier
//! - [`GateId`]: Gate identifier
//! - [`CameraSettingId`]: Camera setting identifier
//! - [`CameraId`]: Camera identifier
//! - [`LprId`]: LPR profile identifier
//! - [`ClientId`]: Client device identifier

use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for IDs
pub type BuildingId = i64;
pub type GateId = i64;
pub type CameraSettingId = i64;
pub type CameraId = i64;
pub type LprId = i64;
pub type ClientId = i64;

/// Declared type of a configuration value.
///
/// The value itself is persisted as text; this tag only records how the value is meant to be
/// read. Nothing on the write path checks that the two agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "value_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    #[default]
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::String => write!(f, "string"),
        }
    }
}

/// A configuration value decoded according to its declared [`ValueType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Int(i64),
    Float(f64),
    String(String),
}

impl TypedValue {
    /// Decode a stored value. Returns `None` when the text does not parse as the declared type.
    pub fn parse(value: &str, value_type: ValueType) -> Option<Self> {
        match value_type {
            ValueType::Int => value.trim().parse().ok().map(TypedValue::Int),
            ValueType::Float => value.trim().parse().ok().map(TypedValue::Float),
            ValueType::String => Some(TypedValue::String(value.to_string())),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::Int(_) => ValueType::Int,
            TypedValue::Float(_) => ValueType::Float,
            TypedValue::String(_) => ValueType::String,
        }
    }
}

/// Default number of items to return per page.
pub const DEFAULT_LIMIT: i64 = 10;

/// Maximum number of items that can be requested per page.
pub const MAX_LIMIT: i64 = 100;

/// Offset-based pagination for list operations.
///
/// Results are always ordered by id, i.e. insertion order, so consecutive pages are disjoint
/// and their concatenation equals one larger page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl Pagination {
    /// Build a page, clamping `skip` to be non-negative and `limit` to `1..=MAX_LIMIT`.
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: skip.max(0),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, DEFAULT_LIMIT)
    }
}

/// Sort and dedupe a requested id set.
///
/// Membership checks compare the number of resolved rows with the number of distinct ids, so
/// a repeated id must not count twice.
pub fn distinct_ids(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
