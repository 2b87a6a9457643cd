//! Test fixtures shared by the repository and registry tests.

use crate::{
    db::{
        handlers::{Buildings, Gates},
        models::{
            buildings::BuildingCreateDBRequest,
            camera_settings::CameraSettingCreateDBRequest,
            gates::{GateCreateDBRequest, GateDBResponse},
            lprs::LprCreateDBRequest,
        },
    },
    types::ValueType,
};
use sqlx::PgPool;

pub fn building_request(name: &str) -> BuildingCreateDBRequest {
    BuildingCreateDBRequest {
        name: name.to_string(),
        address: Some(format!("1 {name} Street")),
    }
}

/// Create a live gate in a building of its own, named after the gate.
pub async fn create_test_gate(pool: &PgPool, name: &str) -> GateDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    let building = Buildings::new(&mut conn)
        .create(&building_request(&format!("{name} building")))
        .await
        .expect("Failed to create test building");

    Gates::new(&mut conn)
        .create(&GateCreateDBRequest {
            name: name.to_string(),
            location: None,
            building_id: building.id,
        })
        .await
        .expect("Failed to create test gate")
}

/// A setting whose declared type matches its value.
pub fn setting_request(name: &str, value: &str) -> CameraSettingCreateDBRequest {
    let setting_type = if value.parse::<i64>().is_ok() {
        ValueType::Int
    } else if value.parse::<f64>().is_ok() {
        ValueType::Float
    } else {
        ValueType::String
    };

    CameraSettingCreateDBRequest {
        name: name.to_string(),
        description: None,
        value: value.to_string(),
        setting_type,
    }
}

pub fn lpr_request(name: &str) -> LprCreateDBRequest {
    LprCreateDBRequest {
        name: name.to_string(),
        description: Some(format!("Test LPR profile: {name}")),
        value: "EU".to_string(),
        value_type: ValueType::String,
    }
}
