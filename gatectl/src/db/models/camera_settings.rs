use crate::types::{CameraSettingId, TypedValue, ValueType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database request for creating a new camera setting
#[derive(Debug, Clone)]
pub struct CameraSettingCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub value: String,
    pub setting_type: ValueType,
}

/// Database request for updating a camera setting. `None` leaves the column untouched and
/// `Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct CameraSettingUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub value: Option<String>,
    pub setting_type: Option<ValueType>,
    pub is_active: Option<bool>,
}

/// Database response for a camera setting
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CameraSettingDBResponse {
    pub id: CameraSettingId,
    pub name: String,
    pub description: Option<String>,
    pub value: String,
    pub setting_type: ValueType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CameraSettingDBResponse {
    /// The stored value decoded as its declared type, if it parses.
    pub fn typed_value(&self) -> Option<TypedValue> {
        TypedValue::parse(&self.value, self.setting_type)
    }
}
