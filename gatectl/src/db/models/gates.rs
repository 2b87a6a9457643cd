use crate::types::{BuildingId, GateId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database request for creating a new gate
#[derive(Debug, Clone)]
pub struct GateCreateDBRequest {
    pub name: String,
    pub location: Option<String>,
    pub building_id: BuildingId,
}

/// Database response for a gate
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct GateDBResponse {
    pub id: GateId,
    pub name: String,
    pub location: Option<String>,
    pub building_id: BuildingId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
