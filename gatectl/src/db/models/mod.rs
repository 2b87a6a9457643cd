//! Database records and request types, one module per table.

pub mod buildings;
pub mod camera_settings;
pub mod cameras;
pub mod clients;
pub mod gates;
pub mod lprs;
