//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed `PgConnection` (usually a transaction) and returns models
//! from [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Buildings`]: Buildings that own gates
//! - [`Gates`]: Gates, looked up when validating camera references
//! - [`CameraSettings`]: Named configuration values for cameras
//! - [`Cameras`]: Cameras and the camera×setting join table
//! - [`Lprs`]: LPR profiles
//! - [`Clients`]: Client devices and the client×camera join table
//!
//! Association rows are written and removed only through the repository of the entity that
//! owns them.

pub mod buildings;
pub mod camera_settings;
pub mod cameras;
pub mod clients;
pub mod gates;
pub mod lprs;
pub mod repository;

pub use buildings::Buildings;
pub use camera_settings::CameraSettings;
pub use cameras::Cameras;
pub use clients::Clients;
pub use gates::Gates;
pub use lprs::Lprs;
pub use repository::Repository;
