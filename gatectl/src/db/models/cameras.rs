use crate::types::{CameraId, GateId};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database request for creating a new camera
#[derive(Debug, Clone, Builder)]
pub struct CameraCreateDBRequest {
    pub name: String,
    pub location: Option<String>,
    pub latitude: String,
    pub longitude: String,
    pub description: Option<String>,
    pub gate_id: GateId,
}

/// Database request for updating a camera. Settings are not part of an update.
///
/// Nullable columns take `Some(None)` to clear them.
#[derive(Debug, Clone, Default)]
pub struct CameraUpdateDBRequest {
    pub name: Option<String>,
    pub location: Option<Option<String>>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub description: Option<Option<String>>,
    pub gate_id: Option<GateId>,
    pub is_active: Option<bool>,
}

impl CameraUpdateDBRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.description.is_none()
            && self.gate_id.is_none()
            && self.is_active.is_none()
    }
}

/// Database response for a camera
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CameraDBResponse {
    pub id: CameraId,
    pub name: String,
    pub location: Option<String>,
    pub latitude: String,
    pub longitude: String,
    pub description: Option<String>,
    pub gate_id: GateId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
