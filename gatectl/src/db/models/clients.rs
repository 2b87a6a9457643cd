use crate::types::{ClientId, LprId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Database request for creating a new client device
#[derive(Debug, Clone)]
pub struct ClientCreateDBRequest {
    pub ip: String,
    pub port: u16,
    pub auth_token: String,
    pub lpr_id: LprId,
}

/// Database response for a client device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientDBResponse {
    pub id: ClientId,
    pub ip: String,
    pub port: u16,
    pub auth_token: String,
    pub lpr_id: LprId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
