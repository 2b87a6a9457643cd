use crate::types::{LprId, TypedValue, ValueType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database request for creating a new LPR profile
#[derive(Debug, Clone)]
pub struct LprCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub value: String,
    pub value_type: ValueType,
}

/// Database request for updating an LPR profile
#[derive(Debug, Clone, Default)]
pub struct LprUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub value: Option<String>,
    pub value_type: Option<ValueType>,
    pub is_active: Option<bool>,
}

/// Database response for an LPR profile
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct LprDBResponse {
    pub id: LprId,
    pub name: String,
    pub value: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LprDBResponse {
    pub fn typed_value(&self) -> Option<TypedValue> {
        TypedValue::parse(&self.value, self.value_type)
    }
}
