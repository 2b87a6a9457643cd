use crate::types::BuildingId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database request for creating a new building
#[derive(Debug, Clone)]
pub struct BuildingCreateDBRequest {
    pub name: String,
    pub address: Option<String>,
}

/// Database response for a building
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BuildingDBResponse {
    pub id: BuildingId,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
