//! Registry-level request and response types.
//!
//! Responses wrap the database records and carry the associations that are read eagerly with
//! them. Create requests that reference other entities by id set live here too, because the
//! id sets are validated and written by the registry rather than by a single repository.

use crate::db::models::{
    camera_settings::CameraSettingDBResponse,
    cameras::{CameraCreateDBRequest, CameraDBResponse},
    clients::{ClientCreateDBRequest, ClientDBResponse},
    lprs::LprDBResponse,
};
use crate::types::{CameraId, CameraSettingId, GateId, LprId};
use bon::Builder;
use serde::{Deserialize, Serialize};

/// A camera together with the settings it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraResponse {
    #[serde(flatten)]
    pub camera: CameraDBResponse,
    pub settings: Vec<CameraSettingDBResponse>,
}

impl CameraResponse {
    pub fn setting_ids(&self) -> Vec<CameraSettingId> {
        self.settings.iter().map(|s| s.id).collect()
    }
}

/// A camera setting together with the cameras that hold it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraSettingResponse {
    #[serde(flatten)]
    pub setting: CameraSettingDBResponse,
    pub cameras: Vec<CameraDBResponse>,
}

/// An LPR profile together with the clients configured from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LprResponse {
    #[serde(flatten)]
    pub lpr: LprDBResponse,
    pub clients: Vec<ClientDBResponse>,
}

/// A client device with its LPR profile and its cameras, each camera with its settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientResponse {
    #[serde(flatten)]
    pub client: ClientDBResponse,
    pub lpr: LprDBResponse,
    pub cameras: Vec<CameraResponse>,
}

impl ClientResponse {
    pub fn camera_ids(&self) -> Vec<CameraId> {
        self.cameras.iter().map(|c| c.camera.id).collect()
    }
}

/// Request for creating a camera and linking it to existing settings.
#[derive(Debug, Clone, Deserialize, Builder)]
pub struct CameraCreate {
    pub name: String,
    pub location: Option<String>,
    pub latitude: String,
    pub longitude: String,
    pub description: Option<String>,
    pub gate_id: GateId,
    #[serde(default)]
    #[builder(default)]
    pub setting_ids: Vec<CameraSettingId>,
}

impl From<&CameraCreate> for CameraCreateDBRequest {
    fn from(create: &CameraCreate) -> Self {
        Self {
            name: create.name.clone(),
            location: create.location.clone(),
            latitude: create.latitude.clone(),
            longitude: create.longitude.clone(),
            description: create.description.clone(),
            gate_id: create.gate_id,
        }
    }
}

/// Request for creating a client device bound to an LPR profile and a set of cameras.
#[derive(Debug, Clone, Deserialize, Builder)]
pub struct ClientCreate {
    pub ip: String,
    pub port: u16,
    pub auth_token: String,
    pub lpr_id: LprId,
    #[serde(default)]
    #[builder(default)]
    pub camera_ids: Vec<CameraId>,
}

impl From<&ClientCreate> for ClientCreateDBRequest {
    fn from(create: &ClientCreate) -> Self {
        Self {
            ip: create.ip.clone(),
            port: create.port,
            auth_token: create.auth_token.clone(),
            lpr_id: create.lpr_id,
        }
    }
}
